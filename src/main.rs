//! Cryptoton - a crypto price tracker for the terminal.
//!
//! Reads line commands from stdin and logs every accepted snapshot.

use anyhow::Context;
use cryptoton::events::{HELP, InputLoop};
use cryptoton::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let log_dir = cryptoton::config::log_dir()?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "cryptoton.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptoton=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    // Load configuration
    let config = Config::load_or_default().context("loading configuration")?;

    // Run the application
    let mut app = App::from_config(&config).context("starting application")?;
    eprintln!("{}", HELP);
    InputLoop::new(app.action_sender()).start();

    app.start();
    app.run().await?;

    Ok(())
}
