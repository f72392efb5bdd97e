/// # 360° Video Server
///
/// A single-purpose HTTP server for streaming large media files (360° video)
/// over byte-range requests.
///
/// This library contains the core logic for the server. The `run` function
/// initializes and starts the server based on command-line arguments.
pub mod cli;
pub mod error;
pub mod fs;
pub mod http;
pub mod mime;
pub mod range;
pub mod resolve;
pub mod response;
pub mod server;
pub mod stream;
pub mod utils;

use crate::cli::Cli;
use clap::Parser;
use log::error;
use std::io::Write;

/// Initializes the logger, parses command-line arguments, and starts the server.
///
/// This is the main entry point for the application. It sets up the logging
/// framework and then calls the `run_server` function to start the server.
/// If the server returns an error, it is logged and the process exits.
pub fn run() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.detailed_logging {
        "info"
    } else {
        "warn"
    };

    init_logger(log_level);
    log::debug!("Log level set to: {log_level}");

    if let Err(e) = server::run_server(cli, None, None) {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
