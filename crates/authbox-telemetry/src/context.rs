//! Span context for console commands.
//!
//! # Design
//! - Each command runs inside a task-local scope carrying its trace id and
//!   name, so diagnostics logged deep in the call stack can be correlated with
//!   the `x-request-id` header sent to the server.
//! - A process-level span guard tags every log line with the build SHA.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the command-level span entered for the lifetime of the process.
pub struct CommandSpanGuard {
    _guard: Entered<'static>,
}

impl CommandSpanGuard {
    /// Enter the console tracing span for the lifetime of the guard.
    #[must_use]
    pub fn new(trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "console",
            trace_id = %trace_id,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Execute the provided future with the command context available to downstream logs.
pub async fn with_command_context<Fut, T>(
    trace_id: impl Into<String>,
    command: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let context = CommandContext {
        trace_id: Arc::from(trace_id.into()),
        command: Arc::from(command.into()),
    };
    ACTIVE_COMMAND_CONTEXT.scope(context, fut).await
}

/// Trace identifier of the command currently running, if any.
#[must_use]
pub fn current_trace_id() -> Option<String> {
    ACTIVE_COMMAND_CONTEXT
        .try_with(|ctx| ctx.trace_id.as_ref().to_string())
        .ok()
}

/// Name of the command currently running, if any.
#[must_use]
pub fn current_command() -> Option<String> {
    ACTIVE_COMMAND_CONTEXT
        .try_with(|ctx| ctx.command.as_ref().to_string())
        .ok()
}

#[derive(Clone)]
struct CommandContext {
    trace_id: Arc<str>,
    command: Arc<str>,
}

tokio::task_local! {
    static ACTIVE_COMMAND_CONTEXT: CommandContext;
}
