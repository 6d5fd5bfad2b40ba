//! Demo parameters.
//!
//! Each value is a constant that an environment variable may override. A
//! value that does not parse is logged and replaced by its default.

use std::time::Duration;

pub const DEFAULT_CANCEL_AFTER: Duration = Duration::from_secs(5);
pub const DEFAULT_RESPONDER_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_FORM_TOKEN: &str = "testtoken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// How long the requester waits before firing the token.
    pub cancel_after: Duration,
    /// How long the responder stalls before answering.
    pub responder_delay: Duration,
    /// Value sent as the `token` form field.
    pub form_token: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            cancel_after: DEFAULT_CANCEL_AFTER,
            responder_delay: DEFAULT_RESPONDER_DELAY,
            form_token: DEFAULT_FORM_TOKEN.to_string(),
        }
    }
}

impl DemoConfig {
    /// Defaults overridden by `CANCEL_AFTER_MS`, `RESPONDER_DELAY_MS` and
    /// `FORM_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cancel_after: millis_or(
                "CANCEL_AFTER_MS",
                lookup("CANCEL_AFTER_MS"),
                defaults.cancel_after,
            ),
            responder_delay: millis_or(
                "RESPONDER_DELAY_MS",
                lookup("RESPONDER_DELAY_MS"),
                defaults.responder_delay,
            ),
            form_token: lookup("FORM_TOKEN").unwrap_or(defaults.form_token),
        }
    }
}

fn millis_or(name: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms),
        Err(err) => {
            tracing::warn!(
                variable = name,
                value = %raw,
                error = %err,
                default_ms = default.as_millis() as u64,
                "ignoring unparseable duration"
            );
            default
        }
    }
}
