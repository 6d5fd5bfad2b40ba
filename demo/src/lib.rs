//! Demo wiring: a slow local responder, one form POST, one cancellation race.

pub mod config;

pub use config::DemoConfig;

use bytes::Bytes;
use cancellable_core::{HttpRequest, Requester};

/// Run one request against a freshly spawned responder and return the
/// payload, which is empty when the request was cancelled or failed.
///
/// The responder is torn down before this returns. Only construction
/// failures (responder bind, malformed target) are returned as errors.
pub async fn run(config: &DemoConfig) -> Result<Bytes, Box<dyn std::error::Error>> {
    // stand-in for a real endpoint
    let responder = responder::spawn(config.responder_delay).await?;

    let request =
        HttpRequest::form_post(&responder.url(), &[("token", config.form_token.as_str())])?;
    let requester = Requester::new(reqwest::Client::new());

    let payload = match requester.execute(request, config.cancel_after).await {
        Ok(body) => body,
        Err(err) => {
            tracing::info!(error = %err, cancelled = err.is_cancelled(), "no payload");
            Bytes::new()
        }
    };

    responder.shutdown();
    Ok(payload)
}
