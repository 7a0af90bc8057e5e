use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use crate::application::{IncludeAnalyzer, TargetAnalyzer};
use crate::infrastructure::config::{IncludeConfig, DEFAULT_BLADE_DEPTH};

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IncludeParams {
    files: Vec<PathBuf>,
    #[serde(default)]
    include_paths: Vec<PathBuf>,
    depth: Option<usize>,
    #[serde(default)]
    deep_system: bool,
    project_root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TargetParams {
    target: String,
    blade_root: PathBuf,
    depth: Option<usize>,
}

/// Line-delimited JSON graph service: one request object per line, one
/// response object per line.
pub struct Server {
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    pub fn bind(port: u16) -> Result<Self> {
        let address = format!("127.0.0.1:{}", port);
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        Ok(Self {
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until a client sends `SHUTDOWN`.
    pub fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!("Graph service listening on {}", addr);

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let shutdown = Arc::clone(&self.shutdown);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &shutdown) {
                            error!("Connection error: {}", e);
                        }
                        if shutdown.load(Ordering::SeqCst) {
                            // Wake the accept loop so it sees the flag.
                            if let Err(e) = TcpStream::connect(addr) {
                                debug!("Wake-up connection to {} failed: {}", addr, e);
                            }
                        }
                    });
                }
                Err(e) => error!("Accept error: {}", e),
            }
        }

        info!("Graph service stopped");
        Ok(())
    }
}

pub fn start_server(port: u16) -> Result<()> {
    Server::bind(port)?.run()
}

/// Envelope written back for one request line.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Reply {
    Success { data: serde_json::Value },
    Error { message: String },
}

fn handle_connection(stream: TcpStream, shutdown: &AtomicBool) -> Result<()> {
    let peer = stream.peer_addr()?;
    debug!("Client connected: {}", peer);
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        let request = line.trim();
        if request.is_empty() {
            continue;
        }

        let (reply, stop) = match process_command(request) {
            Ok((data, stop)) => (Reply::Success { data }, stop),
            Err(e) => {
                debug!("Request from {} failed: {:#}", peer, e);
                (Reply::Error { message: format!("{:#}", e) }, false)
            }
        };
        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;

        if stop {
            info!("Shutdown requested by {}", peer);
            shutdown.store(true, Ordering::SeqCst);
            break;
        }
    }

    debug!("Client disconnected: {}", peer);
    Ok(())
}

/// Returns the response payload and whether the service should stop.
fn process_command(json_str: &str) -> Result<(serde_json::Value, bool)> {
    let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;

    match req.command.as_str() {
        "PING" => Ok((json!("PONG"), false)),
        "ANALYZE_INCLUDES" => Ok((handle_includes(req.params)?, false)),
        "ANALYZE_TARGET" => Ok((handle_target(req.params)?, false)),
        "SHUTDOWN" => Ok((json!("Shutting down..."), true)),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn params<T: for<'de> Deserialize<'de>>(params: Option<serde_json::Value>, command: &str) -> Result<T> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for {}", command))?;
    serde_json::from_value(params).with_context(|| format!("Invalid params for {}", command))
}

fn handle_includes(raw: Option<serde_json::Value>) -> Result<serde_json::Value> {
    let p: IncludeParams = params(raw, "ANALYZE_INCLUDES")?;
    let defaults = IncludeConfig::default();
    let config = IncludeConfig {
        search_paths: p.include_paths,
        max_depth: p.depth.unwrap_or(defaults.max_depth),
        deep_system: p.deep_system,
        ..defaults
    };
    let project_root = match p.project_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    info!("Analyzing {} file(s)", p.files.len());
    let modules = IncludeAnalyzer::new(config, project_root).analyze_files(&p.files)?;
    Ok(serde_json::to_value(modules)?)
}

fn handle_target(raw: Option<serde_json::Value>) -> Result<serde_json::Value> {
    let p: TargetParams = params(raw, "ANALYZE_TARGET")?;
    info!("Analyzing target {}", p.target);
    let report = TargetAnalyzer::new(&p.blade_root, p.depth.unwrap_or(DEFAULT_BLADE_DEPTH))?
        .analyze(&p.target)?;

    Ok(json!({
        "module": report.module,
        "stats": {
            "by_kind": report.stats.by_kind,
            "external": report.stats.external,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_and_unknown() {
        assert_eq!(process_command(r#"{"command":"PING"}"#).unwrap(), (json!("PONG"), false));
        assert!(process_command(r#"{"command":"FLY"}"#).is_err());
        assert!(process_command("not json").is_err());
    }

    #[test]
    fn shutdown_stops() {
        let (_, stop) = process_command(r#"{"command":"SHUTDOWN"}"#).unwrap();
        assert!(stop);
    }

    #[test]
    fn reply_envelope_shape() {
        let ok = serde_json::to_value(Reply::Success { data: json!("PONG") }).unwrap();
        assert_eq!(ok, json!({ "status": "success", "data": "PONG" }));
        let err = serde_json::to_value(Reply::Error { message: "boom".into() }).unwrap();
        assert_eq!(err, json!({ "status": "error", "message": "boom" }));
    }

    #[test]
    fn analyze_requires_params() {
        let err = process_command(r#"{"command":"ANALYZE_TARGET"}"#).unwrap_err();
        assert!(err.to_string().contains("Missing params"));
        let err = process_command(r#"{"command":"ANALYZE_INCLUDES","params":{"depth":2}}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid params"));
    }
}
