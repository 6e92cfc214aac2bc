//! User-visible notices and navigation requests.

/// Message shown for 403 responses. Never carries server detail.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied";

/// Toast variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational toast.
    Info,
    /// Success toast.
    Success,
    /// Error toast.
    Error,
}

/// Queued notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic toast identifier.
    pub id: u64,
    /// Severity classification.
    pub kind: ToastKind,
    /// Optional heading (the server error code for business errors).
    pub title: Option<String>,
    /// Display message for the toast.
    pub message: String,
}

/// Ordered toast queue with monotonic ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a toast and return its id.
    pub fn push(
        &mut self,
        kind: ToastKind,
        title: Option<String>,
        message: impl Into<String>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast {
            id,
            kind,
            title: title.filter(|title| !title.trim().is_empty()),
            message: message.into(),
        });
        id
    }

    /// Append a success toast.
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, None, message)
    }

    /// Append an untitled error toast.
    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, None, message)
    }

    /// Append an error toast with a heading.
    pub fn error_titled(&mut self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, Some(title.into()), message)
    }

    /// Toasts not yet drained, oldest first.
    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Most recent toast.
    #[must_use]
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    /// Remove and return every queued toast.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Remove one toast by id. Returns whether it was queued.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        before != self.toasts.len()
    }
}

/// Where the console should go next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Leave through the logout endpoint (login page came back instead of data).
    Logout,
    /// Reload the whole console (connection-level session loss).
    Reload,
    /// Return to the previous screen.
    Back,
    /// Open a console route such as `/accounts`.
    Route(String),
}

impl Navigation {
    /// Whether this navigation ends the authenticated session.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Logout | Self::Reload)
    }
}
