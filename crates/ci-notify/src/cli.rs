use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Path to an explicit config file; a broken one is a hard error.
pub const CONFIG_PATH_ENV: &str = "CI_NOTIFY_CONFIG";
/// Exit with status 2 when delivery fails.
pub const FAIL_ON_ERROR_ENV: &str = "CI_NOTIFY_FAIL_ON_ERROR";

/// ci-notify – post a build notification to a custom webhook
///
/// Every argument is taken verbatim, including ones that start with `-`, so the
/// command line carries no flags. Options are read from the environment
/// (`CI_NOTIFY_CONFIG`, `CI_NOTIFY_FAIL_ON_ERROR`, `RUST_LOG`).
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Free-text notification message
    #[arg(value_name = "MESSAGE", allow_hyphen_values = true)]
    pub message: String,

    /// Repository identifier (e.g. owner/name)
    #[arg(value_name = "REPOSITORY", allow_hyphen_values = true)]
    pub repository: String,

    /// Branch name
    #[arg(value_name = "BRANCH", allow_hyphen_values = true)]
    pub branch: String,

    /// Extra arguments are accepted and ignored
    #[arg(
        hide = true,
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub rest: Vec<String>,
}

impl Cli {
    /// One-line usage string printed when positional arguments are missing.
    pub fn usage() -> String {
        Cli::command().render_usage().to_string()
    }
}

/// Settings that do not travel on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub fail_on_error: bool,
}

impl RunOptions {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            std::env::var(FAIL_ON_ERROR_ENV).ok().as_deref(),
        )
    }

    pub fn from_vars(config: Option<PathBuf>, fail_on_error: Option<&str>) -> Self {
        Self {
            config: config.filter(|p| !p.as_os_str().is_empty()),
            fail_on_error: fail_on_error.is_some_and(is_truthy),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positionals() {
        let cli =
            Cli::try_parse_from(["ci-notify", "Build passed", "acme/widgets", "main"]).unwrap();
        assert_eq!(cli.message, "Build passed");
        assert_eq!(cli.repository, "acme/widgets");
        assert_eq!(cli.branch, "main");
        assert!(cli.rest.is_empty());
    }

    #[test]
    fn empty_strings_are_accepted() {
        let cli = Cli::try_parse_from(["ci-notify", "", "", ""]).unwrap();
        assert_eq!(cli.message, "");
    }

    #[test]
    fn hyphen_values_are_taken_verbatim() {
        let cli = Cli::try_parse_from([
            "ci-notify",
            "-v",
            "--fixed flaky test",
            "-c",
        ])
        .unwrap();
        assert_eq!(cli.message, "-v");
        assert_eq!(cli.repository, "--fixed flaky test");
        assert_eq!(cli.branch, "-c");
    }

    #[test]
    fn help_and_version_are_plain_values() {
        let cli = Cli::try_parse_from(["ci-notify", "--help", "-V", "--version"]).unwrap();
        assert_eq!(cli.message, "--help");
        assert_eq!(cli.repository, "-V");
        assert_eq!(cli.branch, "--version");
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let cli = Cli::try_parse_from(["ci-notify", "m", "r", "b", "extra", "--more"]).unwrap();
        assert_eq!(cli.branch, "b");
        assert_eq!(cli.rest, ["extra", "--more"]);
    }

    #[test]
    fn missing_branch_is_rejected() {
        let err = Cli::try_parse_from(["ci-notify", "msg", "repo"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn usage_names_all_positionals() {
        let usage = Cli::usage();
        assert!(usage.contains("<MESSAGE> <REPOSITORY> <BRANCH>"));
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_options_from_vars() {
        let opts = RunOptions::from_vars(Some(PathBuf::from("ci.toml")), Some("TRUE"));
        assert_eq!(opts.config, Some(PathBuf::from("ci.toml")));
        assert!(opts.fail_on_error);

        let opts = RunOptions::from_vars(Some(PathBuf::new()), Some("0"));
        assert_eq!(opts, RunOptions::default());
    }
}
