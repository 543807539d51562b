/// Agent Store - HTTP service entry point

use agent_store::{
    config::{LogFormat, LoggingConfig, ServerConfig},
    context::AppContext,
    error::StoreResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> StoreResult<()> {
    // .env must be loaded before the log filter is read
    dotenv::dotenv().ok();
    init_logging(&LoggingConfig::from_env());

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| "agent_store=debug,tower_http=debug".into());

    match logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

fn print_banner() {
    println!(
        r#"
    __ _  __ _  ___ _ __ | |_      ___| |_ ___  _ __ ___
   / _` |/ _` |/ _ \ '_ \| __|____/ __| __/ _ \| '__/ _ \
  | (_| | (_| |  __/ | | | ||_____\__ \ || (_) | | |  __/
   \__,_|\__, |\___|_| |_|\__|    |___/\__\___/|_|  \___|
         |___/
        Agent & transcription record store v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
