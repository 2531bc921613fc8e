#![cfg_attr(not(test), deny(clippy::panic))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use spektrum_server::catalog::Catalog;
use spektrum_server::metrics::Metrics;
use spektrum_server::registry::LobbyRegistry;
use spektrum_server::server::{build_router, AppState};
use spektrum_server::tokens::TokenMint;
use spektrum_server::{config, logging};

/// Spektrum -- real-time, room-based multiplayer music-quiz server
#[derive(Parser, Debug)]
#[command(name = "spektrum-server")]
#[command(about = "A real-time, room-based multiplayer music-quiz server")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Arc::new(config::load());

    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config_security(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Round duration (ms): {}", cfg.server.round_duration_ms);
                println!("  Admin passwords configured: {}", !cfg.security.admin_passwords.is_empty());
                println!("  CORS origins: {:?}", cfg.security.cors_origins);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let catalog = Arc::new(
        Catalog::load(cfg.catalog.clone())
            .await
            .map_err(|err| anyhow::anyhow!("failed to load catalog: {err}"))?,
    );
    let metrics = Arc::new(Metrics::new());
    let tokens = Arc::new(TokenMint::new(cfg.security.token_ttl_hours));
    let registry = Arc::new(LobbyRegistry::new(
        Arc::clone(&catalog),
        Arc::clone(&metrics),
        cfg.server.clone(),
    ));

    spawn_gc_task(Arc::clone(&registry), Arc::clone(&tokens), cfg.server.gc_sweep_interval_secs);

    let state = AppState::new(
        Arc::clone(&catalog),
        Arc::clone(&registry),
        Arc::clone(&tokens),
        Arc::clone(&metrics),
        Arc::clone(&cfg),
    );
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Spektrum server listening");

    axum::serve(listener, router).await?;

    Ok(())
}

/// Periodically reap idle lobbies and expired session tokens (§4.2, §4.4) so
/// neither map grows without bound in a long-running process.
fn spawn_gc_task(registry: Arc<LobbyRegistry>, tokens: Arc<TokenMint>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let reaped_lobbies = registry.gc_sweep().await;
            let reaped_tokens = tokens.sweep_expired().await;
            if reaped_lobbies > 0 || reaped_tokens > 0 {
                tracing::debug!(reaped_lobbies, reaped_tokens, "garbage collection sweep");
            }
        }
    });
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_flags() {
        let cli = Cli::try_parse_from(["spektrum-server"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_long() {
        let cli = Cli::try_parse_from(["spektrum-server", "--validate-config"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_short() {
        let cli = Cli::try_parse_from(["spektrum-server", "-c"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_print_config() {
        let cli = Cli::try_parse_from(["spektrum-server", "--print-config"]).unwrap();
        assert!(!cli.validate_config);
        assert!(cli.print_config);
    }

    #[test]
    fn test_cli_validate_and_print_config_conflict() {
        let result =
            Cli::try_parse_from(["spektrum-server", "--validate-config", "--print-config"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("cannot be used with"));
    }
}
