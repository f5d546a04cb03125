//! TRACE Feed Generator Binary
//!
//! Starts the synthetic trade report stream.
//!
//! # Usage
//!
//! ```bash
//! # One record per second to stdout
//! cargo run --bin trace-feed-generator
//!
//! # Paired legs over TCP, bursting 50 records every 30 seconds
//! cargo run --bin trace-feed-generator -- --tcp --pairs --burst 50 --burst-interval 30
//! ```
//!
//! Records go to stdout (plus `--out-file` and TCP clients when
//! enabled); diagnostics go to stderr, filtered by `RUST_LOG`
//! (default: info).

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use trace_feed_generator::cli::Cli;
use trace_feed_generator::infrastructure::telemetry;
use trace_feed_generator::{
    EmitterConfig, FeedQueue, FeedServerConfig, FileSink, GeneratorConfig, RecordSink, StdoutSink,
    TcpFeedServer, TradeEmitter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init();

    tracing::info!("Starting TRACE feed generator");

    let config = cli.into_config()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // The delivery queue and TCP server exist only when --tcp is set; a
    // bind failure is fatal before any record is generated.
    let queue = if config.tcp.enabled {
        let queue = Arc::new(FeedQueue::new());
        let server_config = FeedServerConfig {
            host: config.tcp.host.clone(),
            port: config.tcp.port,
        };
        let server =
            TcpFeedServer::bind(&server_config, Arc::clone(&queue), shutdown_token.clone()).await?;
        tokio::spawn(server.run());
        Some(queue)
    } else {
        None
    };

    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(StdoutSink::new())];
    if let Some(path) = &config.output.out_file {
        sinks.push(Box::new(FileSink::open(path)?));
    }

    let emitter_config = EmitterConfig {
        rate: config.feed.rate,
        rate_jitter: config.feed.rate_jitter,
        pairs: config.feed.pairs,
        pair_probability: config.feed.pair_probability,
        burst_size: config.feed.burst_size,
        burst_interval: config.feed.burst_interval,
    };
    let emitter = TradeEmitter::new(&emitter_config, sinks, queue, shutdown_token.clone());

    tokio::spawn(await_shutdown(shutdown_token));

    emitter.run().await?;

    tracing::info!("TRACE feed generator stopped");
    Ok(())
}

/// Log the effective configuration.
fn log_config(config: &GeneratorConfig) {
    tracing::info!(
        rate = config.feed.rate,
        rate_jitter = config.feed.rate_jitter,
        pairs = config.feed.pairs,
        pair_probability = config.feed.pair_probability,
        burst_size = config.feed.burst_size,
        burst_interval_secs = config.feed.burst_interval.as_secs(),
        tcp = config.tcp.enabled,
        "Configuration loaded"
    );
    if config.tcp.enabled {
        tracing::debug!(
            host = %config.tcp.host,
            port = config.tcp.port,
            "TCP feed settings"
        );
    }
}

/// Wait for Ctrl+C or SIGTERM, then cancel the shutdown token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
