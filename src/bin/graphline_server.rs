//! graphline-server - TCP line-protocol server for a shared graph
//!
//! Usage:
//!   graphline-server [--bind <addr>] [--port <port>] [--timeout-ms <ms>] [--metrics]
//!
//! Protocol: one newline-terminated UTF-8 line per request and per response.
//! On connect the server greets with `HI, I AM <session-id>`; the session
//! ends on `BYE MATE!`, on the idle timeout, or when the peer goes away.
//! The server runs until externally terminated; there is no administrative
//! shutdown command.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use graphline::metrics::Metrics;
use graphline::{Server, ServerConfig, SharedGraph};

fn print_usage() {
    println!("graphline-server {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Multi-client TCP server for a shared directed weighted graph");
    println!();
    println!("Usage: graphline-server [--bind <addr>] [--port <port>] [--timeout-ms <ms>] [--metrics]");
    println!();
    println!("Flags:");
    println!("  --bind <addr>     Listen address (default: 0.0.0.0)");
    println!("  --port <port>     Listen port (default: 50000)");
    println!("  --timeout-ms <ms> Idle timeout per connection (default: 30000)");
    println!("  --metrics         Enable per-command latency metrics");
    println!("  -V, --version     Print version information");
    println!("  -h, --help        Print this help message");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_config(args: &[String]) -> Result<ServerConfig, String> {
    let mut config = ServerConfig::default();

    if let Some(addr) = flag_value(args, "--bind") {
        config.bind_address = addr.to_string();
    }
    if let Some(port) = flag_value(args, "--port") {
        config.port = port
            .parse()
            .map_err(|_| format!("invalid --port value: {}", port))?;
    }
    if let Some(ms) = flag_value(args, "--timeout-ms") {
        let ms: u64 = ms
            .parse()
            .map_err(|_| format!("invalid --timeout-ms value: {}", ms))?;
        if ms == 0 {
            return Err("--timeout-ms must be positive".to_string());
        }
        config.idle_timeout = Duration::from_millis(ms);
    }
    config.metrics = args.iter().any(|a| a == "--metrics");

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("graphline-server {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = match parse_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Usage: graphline-server [--bind <addr>] [--port <port>] [--timeout-ms <ms>] [--metrics]");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("starting graphline-server v{}", env!("CARGO_PKG_VERSION"));

    let graph = Arc::new(SharedGraph::new());
    let metrics = config.metrics.then(|| Arc::new(Metrics::new()));
    if metrics.is_some() {
        info!("metrics collection enabled");
    }

    // Final stats on SIGINT/SIGTERM; the graph itself is in-memory only and
    // needs no flushing.
    let graph_for_signal = Arc::clone(&graph);
    let metrics_for_signal = metrics.clone();
    let mut signals = signal_hook::iterator::Signals::new([
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
    ])
    .context("failed to register signal handlers")?;
    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(
                "received signal {}, exiting with {} nodes and {} edges",
                sig,
                graph_for_signal.node_count(),
                graph_for_signal.edge_count()
            );
            if let Some(metrics) = metrics_for_signal {
                let snap = metrics.snapshot();
                info!(
                    "served {} commands ({} slow), p50={}ms p95={}ms p99={}ms over {}s",
                    snap.command_count,
                    snap.slow_command_count,
                    snap.latency_p50_ms,
                    snap.latency_p95_ms,
                    snap.latency_p99_ms,
                    snap.uptime_secs
                );
            }
            std::process::exit(0);
        }
    });

    let server = Server::bind(config.clone(), graph, metrics).with_context(|| {
        format!(
            "failed to bind {}:{}",
            config.bind_address, config.port
        )
    })?;
    server.run().context("accept loop failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let config = parse_config(&args(&[])).unwrap();
        assert_eq!(config.port, 50_000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.idle_timeout, Duration::from_millis(30_000));
        assert!(!config.metrics);
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse_config(&args(&[
            "--bind",
            "127.0.0.1",
            "--port",
            "6000",
            "--timeout-ms",
            "500",
            "--metrics",
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 6000);
        assert_eq!(config.idle_timeout, Duration::from_millis(500));
        assert!(config.metrics);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse_config(&args(&["--port", "seventy"])).is_err());
        assert!(parse_config(&args(&["--timeout-ms", "0"])).is_err());
        assert!(parse_config(&args(&["--timeout-ms", "-5"])).is_err());
    }
}
