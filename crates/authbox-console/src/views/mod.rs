//! View models, one per console screen.
//!
//! Each view owns its transient state (cursor, loaded entities, selection,
//! pending confirmation) and issues calls through the [`ConsoleContext`]
//! passed to every operation. Successful mutations re-fetch with the view's
//! current cursor.

use std::future::Future;

use authbox_api_models::Page;
use serde::de::DeserializeOwned;

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;

pub mod access_log;
pub mod account;
pub mod accounts;
pub mod client_examples;
pub mod clients;
pub mod organization;
pub mod registration;
pub mod scopes;
pub mod tokens;
pub mod users;

/// Page size used until a view is asked for another one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page size and zero-based page index of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Entities per page.
    pub page_size: u32,
    /// Zero-based page index.
    pub current_page: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

impl PageCursor {
    /// Cursor for a given size and page.
    #[must_use]
    pub const fn new(page_size: u32, current_page: u32) -> Self {
        Self {
            page_size,
            current_page,
        }
    }

    /// Add `pageSize` and `currentPage` query parameters.
    #[must_use]
    pub fn apply(self, request: ApiRequest) -> ApiRequest {
        request
            .query("pageSize", self.page_size)
            .query("currentPage", self.current_page)
    }
}

/// Checked rows of a list, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a row. Returns `false` if it was already checked.
    pub fn select(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Flip a row. Returns whether it is checked afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(index) = self.ids.iter().position(|selected| selected == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Check every given row.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.select(id);
        }
    }

    /// Uncheck everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether a row is checked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Whether nothing is checked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of checked rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// The single checked row, if exactly one is checked.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        match self.ids.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// Checked ids.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// Warning shown before a bulk delete.
#[must_use]
pub fn delete_warning(count: usize, noun: &str) -> String {
    format!("You are about to delete {count} {noun}(s). This can not be undone.")
}

/// A view that may hold a mutation waiting for the user's acknowledgment.
pub trait Confirmable {
    /// Warning text of the pending mutation.
    fn pending_confirmation(&self) -> Option<&str>;

    /// Drop the pending mutation. Returns whether one was pending.
    fn dismiss(&mut self) -> bool;

    /// Run the pending mutation. Resolves to `false` when nothing was pending.
    fn confirm(
        &mut self,
        ctx: &mut ConsoleContext,
    ) -> impl Future<Output = ConsoleResult<bool>> + Send;
}

/// Settle the refresh that follows an applied mutation. A failed refresh has
/// already been surfaced by the context and does not undo the mutation.
pub(crate) fn keep_applied<T>(refresh: ConsoleResult<T>) {
    if let Err(error) = refresh {
        tracing::debug!(%error, "refresh after mutation failed");
    }
}

pub(crate) async fn fetch_page<T: DeserializeOwned>(
    ctx: &mut ConsoleContext,
    request: ApiRequest,
    cursor: PageCursor,
) -> ConsoleResult<Page<T>> {
    ctx.call(&cursor.apply(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_defaults_to_first_page_of_ten() {
        assert_eq!(PageCursor::default(), PageCursor::new(10, 0));
    }

    #[test]
    fn selection_keeps_check_order_without_duplicates() {
        let mut selection = Selection::new();
        assert!(selection.select("b"));
        assert!(selection.select("a"));
        assert!(!selection.select("b"));
        assert_eq!(selection.ids(), ["b".to_string(), "a".to_string()]);
        assert_eq!(selection.single(), None);

        assert!(!selection.toggle("b"));
        assert_eq!(selection.single(), Some("a"));
        assert!(selection.toggle("c"));
        assert_eq!(selection.len(), 2);

        selection.select_all(["a", "d"]);
        assert_eq!(selection.len(), 3);
        assert!(selection.contains("d"));
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn delete_warning_counts_entities() {
        assert_eq!(
            delete_warning(3, "account"),
            "You are about to delete 3 account(s). This can not be undone."
        );
    }
}
