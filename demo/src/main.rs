use request_with_cancel::DemoConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cancellable_core=info,request_with_cancel=info,responder=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DemoConfig::from_env();
    tracing::info!(
        cancel_after_ms = config.cancel_after.as_millis() as u64,
        responder_delay_ms = config.responder_delay.as_millis() as u64,
        "configuration loaded"
    );

    let payload = request_with_cancel::run(&config).await?;

    // must stay the last line logged
    tracing::info!(response = %String::from_utf8_lossy(&payload), "response");
    Ok(())
}
