//! Console account administration: list, detail, create, update, enable and delete.

use authbox_api_models::{
    Account, CreateAccountRequest, DeleteAccountsRequest, Page, PasswordChangeRequest, ROLE_USER,
};

use crate::confirm::ConfirmGate;
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::notice::Navigation;
use crate::pager::page_window;
use crate::validate::validate_new_account;
use crate::views::{
    Confirmable, PageCursor, Selection, delete_warning, fetch_page, keep_applied,
};

/// Submit control of the create form.
pub const CREATE_CONTROL: &str = "create-account";
/// Submit control of the details form.
pub const UPDATE_CONTROL: &str = "update-account-details";
/// Bulk delete control of the list.
pub const DELETE_CONTROL: &str = "delete-selected-accounts";

/// Route of the account list.
pub const LIST_ROUTE: &str = "/accounts";

/// Mutation waiting behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountsMutation {
    /// Delete these accounts.
    Delete(Vec<String>),
}

/// Account list plus the currently opened account.
#[derive(Debug, Clone, Default)]
pub struct AccountsView {
    cursor: PageCursor,
    accounts: Option<Page<Account>>,
    account: Option<Account>,
    /// Checked rows of the list.
    pub selection: Selection,
    confirm: ConfirmGate<AccountsMutation>,
}

impl AccountsView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(CREATE_CONTROL, "Create account");
        ctx.busy.register(UPDATE_CONTROL, "Update account");
        ctx.busy.register(DELETE_CONTROL, "Delete selected");
        Self::default()
    }

    /// Cursor of the last list request.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Loaded list page.
    #[must_use]
    pub const fn accounts(&self) -> Option<&Page<Account>> {
        self.accounts.as_ref()
    }

    /// Opened account.
    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Page numbers to offer below the list.
    #[must_use]
    pub fn page_window(&self) -> Vec<i64> {
        self.accounts.as_ref().map(page_window).unwrap_or_default()
    }

    /// Fetch one page of accounts. The opened account is closed.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load_accounts(
        &mut self,
        ctx: &mut ConsoleContext,
        cursor: PageCursor,
    ) -> ConsoleResult<&Page<Account>> {
        self.cursor = cursor;
        let page = fetch_page(ctx, ApiRequest::get("/account/list"), cursor).await?;
        self.account = None;
        Ok(self.accounts.insert(page))
    }

    /// Open one account. The list is closed and the password field cleared.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load_account(
        &mut self,
        ctx: &mut ConsoleContext,
        id: &str,
    ) -> ConsoleResult<&Account> {
        let mut account: Account = ctx.call(&ApiRequest::get("/account").segment(id)).await?;
        account.password = Some(String::new());
        self.accounts = None;
        Ok(self.account.insert(account))
    }

    /// Create an account in the current organization. An empty role defaults to `ROLE_USER`.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for a blank username, or the surfaced call failure.
    pub async fn create(
        &mut self,
        ctx: &mut ConsoleContext,
        mut request: CreateAccountRequest,
    ) -> ConsoleResult<Account> {
        if request.role.trim().is_empty() {
            request.role = ROLE_USER.to_string();
        }
        ctx.check(validate_new_account(&request.username, &request.role))?;
        let request = ctx.with_json(ApiRequest::post("/account/create"), &request)?;
        let account = ctx.submit(CREATE_CONTROL, &request).await?;
        ctx.notify_success("Account created successfully");
        ctx.navigate(Navigation::Route(LIST_ROUTE.to_string()));
        Ok(account)
    }

    /// Save an account's details, then reopen it.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the update or of the reload.
    pub async fn update(
        &mut self,
        ctx: &mut ConsoleContext,
        id: &str,
        account: &Account,
    ) -> ConsoleResult<&Account> {
        let request = ctx.with_json(ApiRequest::post("/account").segment(id), account)?;
        ctx.submit_discard(UPDATE_CONTROL, &request).await?;
        ctx.notify_success("Account details updated");
        self.load_account(ctx, id).await
    }

    /// Enable or disable an account, then refresh whichever screen is open.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the lookup or of the update. A failed
    /// refresh afterwards is only surfaced.
    pub async fn set_enabled(
        &mut self,
        ctx: &mut ConsoleContext,
        id: &str,
        enabled: bool,
    ) -> ConsoleResult<()> {
        let mut account = match self.known_account(id) {
            Some(account) => account,
            None => ctx.call(&ApiRequest::get("/account").segment(id)).await?,
        };
        account.enabled = Some(enabled);
        let request = ctx.with_json(ApiRequest::post("/account").segment(id), &account)?;
        ctx.call_discard(&request).await?;
        ctx.notify_success("Account details updated");
        if self.accounts.is_some() {
            keep_applied(self.load_accounts(ctx, self.cursor).await);
        } else {
            keep_applied(self.load_account(ctx, id).await);
        }
        Ok(())
    }

    /// Change the signed-in account's password from the account screen.
    ///
    /// # Errors
    ///
    /// Returns a validation failure when the new passwords differ, or the surfaced call failure.
    pub async fn change_password(
        &mut self,
        ctx: &mut ConsoleContext,
        change: &PasswordChangeRequest,
    ) -> ConsoleResult<&Account> {
        let account = super::account::change_password(ctx, change).await?;
        Ok(self.account.insert(account))
    }

    /// Ask to delete the selected accounts. Returns the warning text.
    pub fn request_delete_selected(&mut self) -> &str {
        let ids = self.selection.ids().to_vec();
        let message = delete_warning(ids.len(), "account");
        self.confirm.request(message, AccountsMutation::Delete(ids));
        self.confirm.message().unwrap_or_default()
    }

    fn known_account(&self, id: &str) -> Option<Account> {
        let listed = self
            .accounts
            .iter()
            .flat_map(|page| page.content.iter());
        listed
            .chain(self.account.iter())
            .find(|account| account.id.as_deref() == Some(id))
            .cloned()
    }

    async fn delete(&mut self, ctx: &mut ConsoleContext, ids: Vec<String>) -> ConsoleResult<()> {
        let body = DeleteAccountsRequest { account_ids: ids };
        let request = ctx.with_json(ApiRequest::delete("/account"), &body)?;
        ctx.submit_discard(DELETE_CONTROL, &request).await?;
        self.selection.clear();
        ctx.notify_success("Account(s) deleted");
        keep_applied(self.load_accounts(ctx, self.cursor).await);
        Ok(())
    }
}

impl Confirmable for AccountsView {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(AccountsMutation::Delete(ids)) => self.delete(ctx, ids).await.map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context_for;
    use crate::error::ConsoleError;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_defaults_role_and_returns_to_list() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/account/create").json_body(json!({
                "username": "bob",
                "password": "pw",
                "name": "Bob",
                "role": "ROLE_USER"
            }));
            then.status(200)
                .json_body(json!({"id": "a2", "username": "bob", "roles": ["ROLE_USER"]}));
        });

        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);
        let account = view
            .create(
                &mut ctx,
                CreateAccountRequest {
                    username: "bob".into(),
                    password: "pw".into(),
                    name: "Bob".into(),
                    role: String::new(),
                },
            )
            .await
            .expect("create");

        create.assert();
        assert_eq!(account.id.as_deref(), Some("a2"));
        assert_eq!(
            ctx.navigation(),
            Some(&Navigation::Route("/accounts".into()))
        );
        assert_eq!(
            ctx.toasts.last().map(|toast| toast.message.as_str()),
            Some("Account created successfully")
        );
    }

    #[tokio::test]
    async fn blank_username_is_rejected_before_sending() {
        let server = MockServer::start_async().await;
        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);

        let result = view
            .create(&mut ctx, CreateAccountRequest::default())
            .await;

        assert_eq!(
            result,
            Err(ConsoleError::validation("Account username can not be empty"))
        );
        assert!(ctx.busy.is_enabled(CREATE_CONTROL));
    }

    #[tokio::test]
    async fn opening_an_account_clears_password_and_closes_list() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/account/list")
                .query_param("pageSize", "10")
                .query_param("currentPage", "0");
            then.status(200).json_body(json!({
                "content": [{"id": "a1"}],
                "totalPages": 1, "currentPage": 0, "pageSize": 10
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/account/a1");
            then.status(200)
                .json_body(json!({"id": "a1", "username": "ada", "enabled": true}));
        });

        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);
        view.load_accounts(&mut ctx, PageCursor::default())
            .await
            .expect("list");
        assert_eq!(view.page_window(), vec![0]);

        let account = view.load_account(&mut ctx, "a1").await.expect("detail");
        assert_eq!(account.password.as_deref(), Some(""));
        assert!(view.accounts().is_none());
    }

    #[tokio::test]
    async fn disabling_from_list_posts_row_and_refetches_page() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET)
                .path("/api/account/list")
                .query_param("pageSize", "5")
                .query_param("currentPage", "1");
            then.status(200).json_body(json!({
                "content": [{"id": "a1", "username": "ada", "enabled": true}],
                "totalPages": 2, "currentPage": 1, "pageSize": 5
            }));
        });
        let update = server.mock(|when, then| {
            when.method(POST)
                .path("/api/account/a1")
                .json_body(json!({"id": "a1", "username": "ada", "enabled": false}));
            then.status(200).json_body(json!({"id": "a1", "enabled": false}));
        });

        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);
        view.load_accounts(&mut ctx, PageCursor::new(5, 1))
            .await
            .expect("list");
        view.set_enabled(&mut ctx, "a1", false)
            .await
            .expect("disable");

        update.assert();
        list.assert_hits(2);
        assert_eq!(
            ctx.toasts.last().map(|toast| toast.message.as_str()),
            Some("Account details updated")
        );
    }

    #[tokio::test]
    async fn dismissed_delete_sends_nothing() {
        let server = MockServer::start_async().await;
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/account");
            then.status(200);
        });

        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);
        view.selection.select("a1");
        assert_eq!(
            view.request_delete_selected(),
            "You are about to delete 1 account(s). This can not be undone."
        );
        assert!(view.dismiss());
        assert!(!view.confirm(&mut ctx).await.expect("nothing pending"));

        delete.assert_hits(0);
    }

    #[tokio::test]
    async fn failed_refresh_after_delete_keeps_success() {
        let server = MockServer::start_async().await;
        let mut list = server.mock(|when, then| {
            when.method(GET).path("/api/account/list");
            then.status(200).json_body(json!({
                "content": [{"id": "a1"}],
                "totalPages": 1, "currentPage": 0, "pageSize": 10
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/account")
                .json_body(json!({"accountIds": ["a1"]}));
            then.status(200);
        });

        let mut ctx = context_for(&server);
        let mut view = AccountsView::mount(&mut ctx);
        view.load_accounts(&mut ctx, PageCursor::default())
            .await
            .expect("list");

        list.delete();
        let failing_list = server.mock(|when, then| {
            when.method(GET).path("/api/account/list");
            then.status(500).json_body(json!({
                "message": "db hiccup",
                "error": "Internal Server Error",
                "timestamp": "2024-05-01T10:00:00Z"
            }));
        });

        view.selection.select("a1");
        view.request_delete_selected();
        assert_eq!(view.confirm(&mut ctx).await, Ok(true));

        delete.assert();
        failing_list.assert();
        let messages: Vec<&str> = ctx
            .toasts
            .toasts()
            .iter()
            .map(|toast| toast.message.as_str())
            .collect();
        assert_eq!(messages, ["Account(s) deleted", "db hiccup"]);
        assert!(view.selection.is_empty());
        assert!(ctx.busy.is_enabled(DELETE_CONTROL));
    }
}
