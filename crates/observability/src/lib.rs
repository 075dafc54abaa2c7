//! Tracing and structured logging setup shared by the binaries.

/// Initialize process-wide tracing from `RUST_LOG` / `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

pub mod tracing;

pub use tracing::{http_request_span, LogFormat};
