use crate::cli::Cli;
use crate::error::AppError;
use crate::http::{handle_client, Dispatcher};
use log::{debug, error, info};
use rand::Rng;
use rust_embed::RustEmbed;
use std::fs;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use threadpool::ThreadPool;

/// How many successive ports to probe when the preferred one is taken.
const PORT_RETRY_WINDOW: u16 = 100;

#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Bootstraps the serving directory, binds a listener, and runs the accept
/// loop until the optional shutdown channel fires.
///
/// `addr_tx` reports the bound address back to the caller; tests pass port 0
/// and read the OS-assigned port from it.
pub fn run_server(
    cli: Cli,
    shutdown_rx: Option<mpsc::Receiver<()>>,
    addr_tx: Option<mpsc::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    ensure_media_directory(&cli.directory)?;
    let root = cli.directory.canonicalize().map_err(|_| {
        AppError::DirectoryUnavailable(cli.directory.to_string_lossy().into_owned())
    })?;
    if !root.is_dir() {
        return Err(AppError::DirectoryUnavailable(
            root.to_string_lossy().into_owned(),
        ));
    }

    let listener = bind_with_retry(&cli.listen, cli.port)?;
    let local_addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    if let Some(tx) = addr_tx {
        if tx.send(local_addr).is_err() {
            return Err(AppError::Internal(
                "Failed to send server address to test thread".to_string(),
            ));
        }
    }

    print_banner(&root, local_addr);
    info!(
        "Server listening on {} for directory '{}'",
        local_addr,
        root.display()
    );

    let pool = ThreadPool::new(cli.threads);
    let dispatcher = Arc::new(Dispatcher::new(root));

    'server_loop: loop {
        if let Some(ref rx) = shutdown_rx {
            if rx.try_recv().is_ok() {
                info!("Shutdown signal received. Shutting down gracefully.");
                break 'server_loop;
            }
        }

        match listener.accept() {
            Ok((stream, _)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let peer_addr = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                let request_id = generate_request_id();
                let log_prefix = format!("[ReqID: {request_id}][Peer: {peer_addr}]");

                pool.execute(move || {
                    debug!("{log_prefix} handling client connection");
                    handle_client(stream, &dispatcher, &log_prefix);
                    debug!("{log_prefix} connection closed");
                });
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
                continue;
            }
            Err(e) => {
                error!("Error accepting connection: {e}");
            }
        }
    }

    info!("Server shutting down gracefully.");
    Ok(())
}

/// Binds the preferred port, probing upward through a fixed window when it is
/// already taken.
fn bind_with_retry(listen: &str, preferred: u16) -> Result<TcpListener, AppError> {
    for port in preferred..preferred.saturating_add(PORT_RETRY_WINDOW) {
        match TcpListener::bind((listen, port)) {
            Ok(listener) => {
                if port != preferred {
                    info!("Port {preferred} is busy, using port {port} instead");
                }
                return Ok(listener);
            }
            Err(ref e) if e.kind() == ErrorKind::AddrInUse => continue,
            Err(e) => return Err(AppError::Io(e)),
        }
    }
    Err(AppError::PortsExhausted {
        start: preferred,
        attempts: PORT_RETRY_WINDOW,
    })
}

/// Creates the media directory on first run and seeds it with the embedded
/// README so users know where their videos go.
fn ensure_media_directory(dir: &Path) -> Result<(), AppError> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .map_err(|_| AppError::DirectoryUnavailable(dir.to_string_lossy().into_owned()))?;
    if let Some(readme) = Assets::get("README.txt") {
        fs::write(dir.join("README.txt"), readme.data.as_ref())?;
    }
    info!("Created media directory: {}", dir.display());
    Ok(())
}

fn print_banner(root: &Path, addr: SocketAddr) {
    println!("360\u{b0} Video HTTP Server");
    println!("  Serving:   {}", root.display());
    println!("  Listening: http://{addr}/");
    println!("  Press Ctrl+C to stop");
}

fn generate_request_id() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
