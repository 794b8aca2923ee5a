//! TCP server: accept loop and per-connection handler.
//!
//! One worker thread per accepted connection, blocking reads with an idle
//! timeout. A connection thread only ever blocks on its socket or on the
//! shared graph's lock, and lines from one connection are processed strictly
//! in arrival order.

use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use crate::command;
use crate::config::ServerConfig;
use crate::dispatch::{self, Reply};
use crate::graph::SharedGraph;
use crate::metrics::{Metrics, SLOW_COMMAND_THRESHOLD_MS};
use crate::session::Session;

// Client ids are for log correlation only; session identity on the wire is
// the session's ULID.
static NEXT_CLIENT_ID: AtomicUsize = AtomicUsize::new(1);

/// Listening server over one shared graph.
pub struct Server {
    listener: TcpListener,
    graph: Arc<SharedGraph>,
    config: ServerConfig,
    metrics: Option<Arc<Metrics>>,
}

impl Server {
    /// Bind the listening socket. Port 0 picks an ephemeral port, which the
    /// integration tests rely on.
    pub fn bind(
        config: ServerConfig,
        graph: Arc<SharedGraph>,
        metrics: Option<Arc<Metrics>>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind((config.bind_address.as_str(), config.port))?;
        Ok(Self {
            listener,
            graph,
            config,
            metrics,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the process is terminated, spawning one
    /// handler thread per client.
    pub fn run(&self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "listening");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::SeqCst);
                    let graph = Arc::clone(&self.graph);
                    let config = self.config.clone();
                    let metrics = self.metrics.clone();
                    thread::spawn(move || {
                        handle_client(stream, graph, config, client_id, metrics);
                    });
                }
                Err(e) => warn!("accept error: {}", e),
            }
        }
        Ok(())
    }
}

fn write_line(stream: &mut TcpStream, text: &str) -> io::Result<()> {
    stream.write_all(text.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}

fn handle_client(
    mut stream: TcpStream,
    graph: Arc<SharedGraph>,
    config: ServerConfig,
    client_id: usize,
    metrics: Option<Arc<Metrics>>,
) {
    info!(client_id, "client connected");

    if let Err(e) = stream.set_read_timeout(Some(config.idle_timeout)) {
        warn!(client_id, "failed to arm read timeout: {}", e);
        return;
    }
    let mut reader = match stream.try_clone() {
        Ok(read_half) => BufReader::new(read_half),
        Err(e) => {
            warn!(client_id, "failed to clone stream: {}", e);
            return;
        }
    };

    let mut session = Session::new();
    if let Err(e) = write_line(&mut stream, &dispatch::welcome(&session)) {
        warn!(client_id, "failed to send greeting: {}", e);
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!(client_id, "client disconnected");
                break;
            }
            Ok(_) => {
                let request = line.trim_end_matches(['\r', '\n']);
                let started = Instant::now();
                let reply = dispatch::dispatch(&graph, &mut session, request);
                if !request.trim().is_empty() {
                    record_command(&metrics, request, started, client_id);
                }

                match reply {
                    Ok(Reply::None) => {}
                    Ok(Reply::Line(text)) => {
                        if let Err(e) = write_line(&mut stream, &text) {
                            warn!(client_id, "write error: {}", e);
                            break;
                        }
                    }
                    Ok(Reply::Closing(text)) => {
                        // Best effort: the session is over either way.
                        if let Err(e) = write_line(&mut stream, &text) {
                            warn!(client_id, "write error on goodbye: {}", e);
                        }
                        info!(client_id, "session closed by client");
                        break;
                    }
                    Err(e) => {
                        warn!(client_id, "closing session: {}", e);
                        break;
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                match dispatch::timeout_farewell(&mut session, config.idle_timeout_ms()) {
                    Ok(farewell) => {
                        info!(client_id, "idle timeout, saying goodbye");
                        if let Err(e) = write_line(&mut stream, &farewell) {
                            warn!(client_id, "write error on timeout goodbye: {}", e);
                        }
                    }
                    // No name was ever registered: no goodbye can be formed,
                    // the connection just closes.
                    Err(e) => warn!(client_id, "idle timeout without goodbye: {}", e),
                }
                break;
            }
            Err(e) => {
                warn!(client_id, "read error: {}", e);
                break;
            }
        }
    }
}

fn record_command(
    metrics: &Option<Arc<Metrics>>,
    request: &str,
    started: Instant,
    client_id: usize,
) {
    let Some(metrics) = metrics else {
        return;
    };
    let duration_ms = started.elapsed().as_millis() as u64;
    let kind = command::parse(request)
        .map(|c| c.kind())
        .unwrap_or("unsupported");
    metrics.record_command(kind, duration_ms);
    if duration_ms >= SLOW_COMMAND_THRESHOLD_MS {
        warn!(client_id, command = kind, duration_ms, "slow command");
    }
}
