use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;

/// Which [`CategoryStore`](crate::server::store::CategoryStore) backs the
/// service.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// SQLite database addressed by `DATABASE_URL`.
    Sqlite,
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// Runtime configuration for the `category-tonic-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for local use.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "category-tonic-server",
    version,
    about = "A gRPC service for creating and reading categories"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix
    /// socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/category.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be
    /// a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Store backend.
    ///
    /// Environment variable: `CATEGORY_STORE`
    #[arg(long, env = "CATEGORY_STORE", value_enum, default_value_t = StoreKind::Sqlite)]
    pub store: StoreKind,

    /// SQLite connection URL, used when `--store sqlite`.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL", default_value_t = String::from("sqlite://data.db?mode=rwc"))]
    pub database_url: String,

    /// Maximum number of pooled SQLite connections.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 4)]
    pub database_max_connections: u32,

    /// Capacity of the response buffer between the bidirectional create
    /// driver and the gRPC stream.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Per-request timeout in seconds applied by the transport. `0` disables
    /// it.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 0)]
    pub request_timeout: u64,

    /// Seconds to wait for in-flight calls to drain on shutdown before they
    /// are cancelled.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub store: StoreKind,
    pub database_url: String,
    pub database_max_connections: u32,
    pub stream_buffer_size: usize,
    pub request_timeout: Option<Duration>,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.store == StoreKind::Sqlite {
            if args.database_url.trim().is_empty() {
                bail!("DATABASE_URL must be set when using the sqlite store");
            }
            if args.database_max_connections == 0 {
                bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
            }
        }

        let request_timeout =
            (args.request_timeout > 0).then(|| Duration::from_secs(args.request_timeout));

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            store: args.store,
            database_url: args.database_url,
            database_max_connections: args.database_max_connections,
            stream_buffer_size: args.stream_buffer_size,
            request_timeout,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> anyhow::Result<ServerConfig> {
        let args = CliArgs::try_parse_from(
            ["category-tonic-server"].iter().chain(extra.iter()).copied(),
        )?;
        ServerConfig::try_from(args)
    }

    #[test]
    fn explicit_flags_are_applied() {
        let config = parse(&[
            "--server-addr",
            "127.0.0.1:6000",
            "--store",
            "memory",
            "--stream-buffer-size",
            "2",
            "--request-timeout",
            "30",
            "--shutdown-timeout",
            "1",
        ])
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:6000");
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.stream_buffer_size, 2);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn zero_request_timeout_disables_it() {
        let config = parse(&["--request-timeout", "0", "--store", "memory"]).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn rejects_empty_stream_buffer() {
        let err = parse(&["--stream-buffer-size", "0"]).unwrap_err();
        assert!(err.to_string().contains("STREAM_BUFFER_SIZE"));
    }

    #[test]
    fn rejects_empty_sqlite_pool() {
        let err = parse(&["--store", "sqlite", "--database-max-connections", "0"]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }

    #[test]
    fn memory_store_ignores_pool_size() {
        let config = parse(&["--store", "memory", "--database-max-connections", "0"]).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
    }
}
