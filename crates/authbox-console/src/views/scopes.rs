//! OAuth2 scope administration.

use authbox_api_models::{CreateScopeRequest, DeleteScopesRequest, OauthScope, Page};

use crate::confirm::ConfirmGate;
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::pager::page_window;
use crate::views::{Confirmable, PageCursor, Selection, fetch_page, keep_applied};

/// Submit control of the create dialog.
pub const CREATE_CONTROL: &str = "create-scope";
/// Submit control of the edit dialog.
pub const UPDATE_CONTROL: &str = "update-scope";

/// Mutation waiting behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopesMutation {
    /// Delete these scopes.
    Delete(Vec<String>),
}

/// How a delete request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// No client used the scopes; they were deleted straight away.
    Completed,
    /// Clients use the scopes; the delete waits for confirmation.
    AwaitingConfirmation,
}

/// Paged scope list with create/edit dialogs.
#[derive(Debug, Clone, Default)]
pub struct ScopesView {
    cursor: PageCursor,
    scopes: Option<Page<OauthScope>>,
    /// Checked rows of the list.
    pub selection: Selection,
    confirm: ConfirmGate<ScopesMutation>,
}

impl ScopesView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(CREATE_CONTROL, "Create scope");
        ctx.busy.register(UPDATE_CONTROL, "Update scope");
        Self::default()
    }

    /// Cursor of the last list request.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Loaded list page.
    #[must_use]
    pub const fn scopes(&self) -> Option<&Page<OauthScope>> {
        self.scopes.as_ref()
    }

    /// Page numbers to offer below the list.
    #[must_use]
    pub fn page_window(&self) -> Vec<i64> {
        self.scopes.as_ref().map(page_window).unwrap_or_default()
    }

    /// The listed scope behind a single checked row, for the edit dialog.
    #[must_use]
    pub fn selected_scope(&self) -> Option<&OauthScope> {
        let id = self.selection.single()?;
        self.scopes
            .as_ref()?
            .content
            .iter()
            .find(|scope| scope.id.as_deref() == Some(id))
    }

    /// Fetch one page of scopes.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(
        &mut self,
        ctx: &mut ConsoleContext,
        cursor: PageCursor,
    ) -> ConsoleResult<&Page<OauthScope>> {
        self.cursor = cursor;
        let page = fetch_page(ctx, ApiRequest::get("/oauth2-scope"), cursor).await?;
        Ok(self.scopes.insert(page))
    }

    /// Create a scope, then refetch the current page.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the create. A failed refetch is only surfaced.
    pub async fn create(
        &mut self,
        ctx: &mut ConsoleContext,
        scope: &CreateScopeRequest,
    ) -> ConsoleResult<OauthScope> {
        let request = ctx.with_json(ApiRequest::post("/oauth2-scope"), scope)?;
        let created = ctx.submit(CREATE_CONTROL, &request).await?;
        ctx.notify_success(format!("Scope '{}' is created", scope.scope));
        keep_applied(self.load(ctx, self.cursor).await);
        Ok(created)
    }

    /// Save a scope, then refetch the current page.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the update. A failed refetch is only surfaced.
    pub async fn update(
        &mut self,
        ctx: &mut ConsoleContext,
        scope: &OauthScope,
    ) -> ConsoleResult<OauthScope> {
        let id = scope.id.clone().unwrap_or_default();
        let request = ctx.with_json(ApiRequest::post("/oauth2-scope").segment(id), scope)?;
        let updated = ctx.submit(UPDATE_CONTROL, &request).await?;
        ctx.notify_success(format!(
            "Scope '{}' is updated",
            scope.scope.as_deref().unwrap_or_default()
        ));
        keep_applied(self.load(ctx, self.cursor).await);
        Ok(updated)
    }

    /// Number of clients using any of `ids`.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn count_clients(ctx: &mut ConsoleContext, ids: &[String]) -> ConsoleResult<u64> {
        let body = DeleteScopesRequest {
            scope_ids: ids.to_vec(),
        };
        let request = ctx.with_json(ApiRequest::post("/oauth2-scope/count-clients"), &body)?;
        ctx.call(&request).await
    }

    /// Delete the selected scopes. Scopes still used by clients wait for confirmation.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the count or of the delete.
    pub async fn delete_selected(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<Deletion> {
        let ids = self.selection.ids().to_vec();
        let clients = Self::count_clients(ctx, &ids).await?;
        if clients > 0 {
            let message = format!(
                "You are about to delete {} scope(s) that have {clients} client connections. This can not be undone.",
                ids.len()
            );
            self.confirm.request(message, ScopesMutation::Delete(ids));
            return Ok(Deletion::AwaitingConfirmation);
        }
        self.delete(ctx, ids).await?;
        Ok(Deletion::Completed)
    }

    async fn delete(&mut self, ctx: &mut ConsoleContext, ids: Vec<String>) -> ConsoleResult<()> {
        let body = DeleteScopesRequest { scope_ids: ids };
        let request = ctx.with_json(ApiRequest::delete("/oauth2-scope"), &body)?;
        ctx.call_discard(&request).await?;
        self.selection.clear();
        ctx.notify_success("Scope deleted");
        keep_applied(self.load(ctx, self.cursor).await);
        Ok(())
    }
}

impl Confirmable for ScopesView {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(ScopesMutation::Delete(ids)) => self.delete(ctx, ids).await.map(|()| true),
            None => Ok(false),
        }
    }
}
