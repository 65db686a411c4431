//! Server initialization utilities
//!
//! Tracing setup and the `serve_stdio!` macro used by the server binaries.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map a `LOG_LEVEL` name to a tracing level directive.
///
/// Accepts `DEBUG`, `INFO`, `WARNING`/`WARN`, `ERROR` and `CRITICAL`, in any
/// case. `CRITICAL` has no tracing equivalent and maps to `error`.
pub fn level_directive(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARNING" | "WARN" => Some("warn"),
        "ERROR" | "CRITICAL" => Some("error"),
        _ => None,
    }
}

/// Initialize tracing for an MCP server
///
/// stdout carries the MCP protocol, so logs go to stderr unless
/// `LOG_DESTINATION` names a file to append to.
///
/// - `RUST_LOG` filters as usual
/// - `LOG_LEVEL` sets the default level for `crate_name` (default `info`)
/// - `LOG_FORMAT=json` switches to structured JSON output
///
/// ```rust,ignore
/// mcp_common::init_tracing("fileshare_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let level = match std::env::var("LOG_LEVEL") {
        Ok(value) => level_directive(&value)
            .with_context(|| format!("unknown LOG_LEVEL {:?}", value))?,
        Err(_) => "info",
    };
    let directive = format!("{}={}", crate_name, level);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let writer = match std::env::var("LOG_DESTINATION") {
        Ok(path) if !path.trim().is_empty() => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log destination {}", path))?;
            BoxMakeWriter::new(Arc::new(file))
        }
        _ => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Generate a stdio `main` for an MCP server
///
/// The server type must provide `try_new()`, returning a `Result` whose error
/// converts into `anyhow::Error`; configuration problems then end the process
/// before the transport starts.
///
/// ```rust,ignore
/// mcp_common::serve_stdio!(FileShareMcpServer, "fileshare_mcp");
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(concat!("Starting ", $crate_name, " MCP Server"));

            let server = <$server_type>::try_new()?;
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
