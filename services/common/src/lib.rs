use std::{
    env,
    fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
    panic,
    str::FromStr,
    thread,
    time::{Duration, SystemTime},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

const DEFAULT_LOG_DIR: &str = "/var/log/datapipe";

/// Keeps the non-blocking file writer alive; drop it only on exit.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

pub fn init_tracing(service_name: &str) -> TracingGuards {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env_or("LOG_FORMAT", LogFormat::Text);
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let log_root = PathBuf::from(log_dir).join(service_name);

    // Lambda and read-only containers cannot write under /var/log; fall back to stdout only.
    let (file_layer, file_guard) = match open_file_writer(&log_root, service_name) {
        Some((writer, guard)) => (
            Some(fmt::layer().with_ansi(false).with_writer(writer).boxed()),
            Some(guard),
        ),
        None => (None, None),
    };

    let stdout_layer = match format {
        LogFormat::Json => fmt::layer().json().with_writer(io::stdout).boxed(),
        LogFormat::Text => fmt::layer().with_writer(io::stdout).boxed(),
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    if file_guard.is_some() {
        let retention_days = env_or("LOG_RETENTION_DAYS", 14u64);
        let cleanup_interval = env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64);
        spawn_log_cleanup(log_root, service_name, retention_days, cleanup_interval);
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

fn open_file_writer(
    log_root: &Path,
    service_name: &str,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_root).ok()?;
    let appender = panic::catch_unwind(|| {
        tracing_appender::rolling::daily(log_root, format!("{service_name}.log"))
    })
    .ok()?;
    Some(tracing_appender::non_blocking(appender))
}

/// Parse a typed environment value, falling back to `default` when unset or malformed.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("{0} is required")]
    Missing(String),
    #[error("{0} is empty")]
    Empty(String),
}

/// Read a non-empty environment value.
pub fn env_required(key: &str) -> Result<String, EnvError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(EnvError::Empty(key.to_string())),
        Err(_) => Err(EnvError::Missing(key.to_string())),
    }
}

/// Periodically prune this service's rotated files; anything else in the directory is left alone.
fn spawn_log_cleanup(
    log_root: PathBuf,
    service_name: &str,
    retention_days: u64,
    cleanup_interval_minutes: u64,
) {
    if retention_days == 0 || cleanup_interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(cleanup_interval_minutes * 60);
    let prefix = format!("{service_name}.log");

    let spawned = thread::Builder::new()
        .name("log-cleanup".to_string())
        .spawn(move || loop {
            if let Some(cutoff) = SystemTime::now().checked_sub(retention) {
                let removed = prune_rotated_logs(&log_root, &prefix, cutoff);
                if removed > 0 {
                    tracing::debug!(removed, "pruned rotated log files");
                }
            }
            thread::sleep(interval);
        });
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "log cleanup thread not started");
    }
}

/// Remove files in `dir` named `<prefix>*` last modified before `cutoff`.
fn prune_rotated_logs(dir: &Path, prefix: &str, cutoff: SystemTime) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix))
        })
        .filter(|path| {
            fs::metadata(path)
                .and_then(|metadata| metadata.modified())
                .is_ok_and(|modified| modified < cutoff)
        })
        .filter(|path| fs::remove_file(path).is_ok())
        .count()
}

pub async fn bind_listener(port: u16) -> io::Result<TcpListener> {
    // Bind on all interfaces for container compatibility.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await
}

pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sigterm handler unavailable");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }

    tracing::info!("shutdown signal received");
}
