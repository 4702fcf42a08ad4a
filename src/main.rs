//! mcp-catalog-server: single-session MCP server over stdio
//!
//! Serves the tools, prompts and resources described by a JSON configuration
//! file to one MCP client.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mcp_catalog_server::config;
use mcp_catalog_server::fetch::HttpFetcher;
use mcp_catalog_server::mcp::McpServer;
use mcp_catalog_server::rpc_log::{default_log_dir, FileRpcLog};

/// Single-session MCP server exposing a static catalog over stdio.
#[derive(Parser, Debug)]
#[command(name = "mcp-catalog-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Do not write the RPC traffic log
    #[arg(long)]
    no_rpc_log: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Output goes to stderr; stdout carries
/// protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the mcp-catalog-server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "mcp-catalog-server {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting mcp-catalog-server"
    );

    let fetcher = match HttpFetcher::new(cfg.fetch.timeout(), cfg.fetch.user_agent.as_deref()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let server_info = cfg.server_info();
    let catalog = cfg.catalog();
    info!(
        tools = cfg.tools.len(),
        prompts = cfg.prompts.len(),
        resources = cfg.resources.len(),
        "Catalog loaded"
    );

    let mut server = McpServer::new(server_info.clone(), catalog, fetcher);

    if cfg.rpc_log.enabled && !args.no_rpc_log {
        let dir = cfg
            .rpc_log
            .directory
            .clone()
            .or_else(|| default_log_dir(&server_info.name));
        match dir {
            Some(dir) => {
                let rpc_log = FileRpcLog::new(dir, cfg.rpc_log.max_lines);
                info!(path = %rpc_log.path().display(), "RPC traffic log enabled");
                server = server.with_rpc_log(rpc_log);
            }
            None => error!("No home directory found, RPC traffic log disabled"),
        }
    }

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(server.run());

    // A stdin read may still be parked on the blocking pool after a signal;
    // waiting for it would keep the process alive until the client writes.
    runtime.shutdown_background();

    match result {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn verbosity_overrides_config() {
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "nonsense"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }
}
