use anyhow::{Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use review_ledger::{build_app, config::LedgerConfig, LedgerService, LedgerState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        eprintln!("Please check REVIEW_LEDGER_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting package review ledger");

    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let state = LedgerState::with_genesis(
        config.ledger.ledger_identity(),
        config.ledger.to_params(),
        config.ledger.genesis(),
    )
    .context("Failed to build genesis ledger state")?;

    info!(
        "Ledger initialized: ledger_account={}, min_review_stake={}, total_supply={}",
        config.ledger.ledger_account,
        config.ledger.min_review_stake,
        state.total_supply()
    );

    let app = build_app(LedgerService::new(state), &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Review ledger listening on {}", bind_addr);
    info!(
        "Security: Auth={}, Max body={}KB, Identity header={}",
        config.security.enable_auth,
        config.security.max_request_size / 1024,
        config.security.identity_header
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &LedgerConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
