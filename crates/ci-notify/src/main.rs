use clap::Parser;
use tokio::runtime::Runtime;

use ci_notify::cli::{Cli, RunOptions};
use ci_notify::config::Config;
use ci_notify::logging::setup_logging;
use ci_notify::notifier::{Notifier, Outcome};

fn main() -> anyhow::Result<()> {
    // Only missing positionals can fail here; extras and hyphen values are accepted.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) => {
            println!("{}", Cli::usage());
            std::process::exit(1);
        }
    };
    let opts = RunOptions::from_env();

    setup_logging();
    let config = Config::load(opts.config)?;

    let rt = Runtime::new()?;
    let outcome = rt.block_on(async {
        match Notifier::new(config) {
            Ok(notifier) => notifier.send(&cli.message, &cli.repository, &cli.branch).await,
            Err(e) => {
                let outcome = Outcome::TransportError {
                    detail: format!("{e:#}"),
                };
                outcome.log();
                outcome
            }
        }
    });

    // Exit code: 0 regardless of delivery, unless CI_NOTIFY_FAIL_ON_ERROR asks for 2
    if opts.fail_on_error && outcome.is_failure() {
        std::process::exit(2);
    }
    Ok(())
}
