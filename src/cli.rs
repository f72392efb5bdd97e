use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for the video server.
///
/// The parsed struct doubles as the server configuration: it is constructed
/// once at startup and handed by value to `run_server`, which owns it for the
/// lifetime of the process.
#[derive(Parser)]
#[command(
    version,
    long_about = "A static-file HTTP server specialized for streaming large media (360\u{b0} video) \
over byte-range requests.\n\
Place video files (.mp4, .webm, .avi, .mov, .wmv) in the served directory and point a \
streaming client at http://<host>:<port>/<filename>.\n\
The server answers byte-range requests with 206 Partial Content so clients can seek \
without downloading whole files, and renders an HTML listing for directories.\n\
If the served directory does not exist it is created and seeded with a README.\n\
If the preferred port is busy, the next free port (within 100) is used instead.",
    about = "A byte-range streaming HTTP server for 360\u{b0} video files."
)]
pub struct Cli {
    /// Directory to serve video files from (created if missing).
    #[arg(short, long, default_value = "./videos")]
    pub directory: PathBuf,

    /// Host address to listen on (e.g., "127.0.0.1" for local only, "0.0.0.0" for everyone).
    #[arg(short, long, default_value = "0.0.0.0")]
    pub listen: String,

    /// Preferred port number to listen on.
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Number of threads in the worker pool.
    #[arg(short, long, default_value_t = 8)]
    pub threads: usize,

    /// Enable verbose logging for debugging (log level: debug).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Enable per-request logging (log level: info).
    #[arg(long, default_value_t = false)]
    pub detailed_logging: bool,
}
