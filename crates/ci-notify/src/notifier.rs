//! Single-shot webhook delivery.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, error, info};

use crate::config::{Config, WEBHOOK_URL_ENV};
use crate::payload::NotificationPayload;

/// Terminal classification of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No webhook URL configured; nothing was sent.
    Skipped,
    Success { status: u16 },
    /// The endpoint answered with a status outside `[200, 300)`.
    Failed { status: u16, body: String },
    /// The request never produced a response (connect, DNS, timeout, bad URL...).
    TransportError { detail: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::TransportError { .. })
    }

    pub fn log(&self) {
        if self.is_failure() {
            error!("{self}");
        } else {
            info!("{self}");
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Skipped => write!(
                f,
                "{WEBHOOK_URL_ENV} not set, skipping custom webhook notification"
            ),
            Outcome::Success { status } => write!(
                f,
                "Custom webhook notification sent successfully (status {status})"
            ),
            Outcome::Failed { status, body } => write!(
                f,
                "Custom webhook notification failed with status {status}: {body}"
            ),
            Outcome::TransportError { detail } => {
                write!(f, "Error sending custom webhook notification: {detail}")
            }
        }
    }
}

pub struct Notifier {
    config: Config,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Building HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Post one notification and report what happened. Never returns an error;
    /// every failure mode is folded into the [`Outcome`] and logged.
    pub async fn send(&self, message: &str, repository: &str, branch: &str) -> Outcome {
        let outcome = match self.config.webhook_url() {
            None => Outcome::Skipped,
            Some(url) => {
                let payload = NotificationPayload::new(message, repository, branch);
                self.post(url, &payload)
                    .await
                    .unwrap_or_else(|e| Outcome::TransportError {
                        detail: format!("{e:#}"),
                    })
            }
        };
        outcome.log();
        outcome
    }

    async fn post(&self, url: &str, payload: &NotificationPayload) -> Result<Outcome> {
        // An absent key still sends the header, with an empty value.
        let authorization = match self.config.api_key() {
            Some(key) => format!("Bearer {key}"),
            None => String::new(),
        };
        debug!(
            url,
            authenticated = self.config.api_key().is_some(),
            timeout_secs = self.config.timeout.as_secs_f64(),
            "Posting notification"
        );

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, authorization)
            .json(payload)
            .send()
            .await
            .with_context(|| "Sending custom webhook")?;

        let status = resp.status();
        if status.is_success() {
            return Ok(Outcome::Success {
                status: status.as_u16(),
            });
        }
        let body = resp
            .text()
            .await
            .with_context(|| format!("Reading response body (status {})", status.as_u16()))?;
        Ok(Outcome::Failed {
            status: status.as_u16(),
            body,
        })
    }
}
