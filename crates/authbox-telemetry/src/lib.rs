#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Logging setup and span context shared by the Auth Box console.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (command spans
//! and task-local identifiers), `error.rs` (error type).

pub mod context;
pub mod error;
pub mod init;

pub use context::{CommandSpanGuard, current_command, current_trace_id, with_command_context};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
