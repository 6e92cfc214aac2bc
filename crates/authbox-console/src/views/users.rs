//! OAuth2 end-user administration.

use authbox_api_models::{DeleteUsersRequest, OauthUser, Page, PasswordChangeRequest};

use crate::confirm::ConfirmGate;
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::notice::Navigation;
use crate::pager::page_window;
use crate::validate::{validate_new_user, validate_password_pair, validate_user_update};
use crate::views::{
    Confirmable, PageCursor, Selection, delete_warning, fetch_page, keep_applied,
};

/// Submit control of the create form.
pub const CREATE_CONTROL: &str = "create-user";
/// Submit control of the edit form.
pub const UPDATE_CONTROL: &str = "update-user";

/// Metadata of a user created without any.
pub const EMPTY_METADATA: &str = "{}";

/// Mutation waiting behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersMutation {
    /// Delete these users.
    Delete(Vec<String>),
}

/// Paged user list plus the opened user.
#[derive(Debug, Clone, Default)]
pub struct UsersView {
    cursor: PageCursor,
    users: Option<Page<OauthUser>>,
    user: Option<OauthUser>,
    /// Checked rows of the list.
    pub selection: Selection,
    confirm: ConfirmGate<UsersMutation>,
}

impl UsersView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(CREATE_CONTROL, "Create user");
        ctx.busy.register(UPDATE_CONTROL, "Update user");
        Self::default()
    }

    /// Cursor of the last list request.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Loaded list page.
    #[must_use]
    pub const fn users(&self) -> Option<&Page<OauthUser>> {
        self.users.as_ref()
    }

    /// Opened user.
    #[must_use]
    pub const fn user(&self) -> Option<&OauthUser> {
        self.user.as_ref()
    }

    /// Page numbers to offer below the list.
    #[must_use]
    pub fn page_window(&self) -> Vec<i64> {
        self.users.as_ref().map(page_window).unwrap_or_default()
    }

    /// Fetch one page of users.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load_users(
        &mut self,
        ctx: &mut ConsoleContext,
        cursor: PageCursor,
    ) -> ConsoleResult<&Page<OauthUser>> {
        self.cursor = cursor;
        let page = fetch_page(ctx, ApiRequest::get("/oauth2-user"), cursor).await?;
        Ok(self.users.insert(page))
    }

    /// Open one user.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load_user(&mut self, ctx: &mut ConsoleContext, id: &str) -> ConsoleResult<&OauthUser> {
        let user = ctx.call(&user_request(ApiRequest::get, id)).await?;
        Ok(self.user.insert(user))
    }

    /// Create a user and open its edit screen. Missing metadata defaults to `{}`.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for a blank username, or the surfaced call failure.
    pub async fn create(
        &mut self,
        ctx: &mut ConsoleContext,
        mut user: OauthUser,
    ) -> ConsoleResult<&OauthUser> {
        ctx.check(validate_new_user(user.username.as_deref().unwrap_or_default()))?;
        if user.metadata.as_deref().is_none_or(str::is_empty) {
            user.metadata = Some(EMPTY_METADATA.to_string());
        }
        let request = ctx.with_json(ApiRequest::post("/oauth2-user"), &user)?;
        let created: OauthUser = ctx.submit(CREATE_CONTROL, &request).await?;
        ctx.notify_success("User created successfully");
        ctx.navigate(Navigation::Route(format!(
            "/edit-oauth2-user/{}",
            created.id.as_deref().unwrap_or_default()
        )));
        Ok(self.user.insert(created))
    }

    /// Save a user, then reopen it.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for blank username or metadata, or the surfaced call failure.
    pub async fn update(
        &mut self,
        ctx: &mut ConsoleContext,
        user: &OauthUser,
    ) -> ConsoleResult<&OauthUser> {
        ctx.check(validate_user_update(
            user.username.as_deref(),
            user.metadata.as_deref(),
        ))?;
        let id = user.id.clone().unwrap_or_default();
        let request = ctx.with_json(user_request(ApiRequest::post, &id), user)?;
        ctx.submit_discard(UPDATE_CONTROL, &request).await?;
        ctx.notify_success("User updated");
        self.load_user(ctx, &id).await
    }

    /// Enable or disable a user, then refresh the list or the opened user.
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
        let from_list = self
            .users
            .iter()
            .flat_map(|page| page.content.iter())
            .find(|user| user.id.as_deref() == Some(id))
            .cloned();
        let opened = self
            .user
            .as_ref()
            .filter(|user| user.id.as_deref() == Some(id))
            .cloned();
        let refresh_list = from_list.is_some();
        let mut user = match from_list.or(opened) {
            Some(user) => user,
            None => ctx.call(&user_request(ApiRequest::get, id)).await?,
        };
        user.enabled = Some(enabled);
        let request = ctx.with_json(user_request(ApiRequest::post, id), &user)?;
        ctx.call_discard(&request).await?;
        ctx.notify_success("User details updated");
        if refresh_list {
            keep_applied(self.load_users(ctx, self.cursor).await);
        } else {
            keep_applied(self.load_user(ctx, id).await);
        }
        Ok(())
    }

    /// Reset or set a user's password.
    ///
    /// An empty new password asks the server to reset it.
    ///
    /// # Errors
    ///
    /// Returns a validation failure when the passwords differ, or the surfaced call failure.
    pub async fn reset_password(
        &mut self,
        ctx: &mut ConsoleContext,
        user: &OauthUser,
        new_password: &str,
        confirmation: &str,
    ) -> ConsoleResult<()> {
        ctx.check(validate_password_pair(new_password, confirmation))?;
        let change = PasswordChangeRequest {
            old_password: None,
            new_password: new_password.to_string(),
            new_password2: confirmation.to_string(),
        };
        let id = user.id.clone().unwrap_or_default();
        let request = ctx.with_json(
            user_request(ApiRequest::post, &id).segment("password-reset"),
            &change,
        )?;
        ctx.call_discard(&request).await?;
        let username = user.username.as_deref().unwrap_or_default();
        if new_password.is_empty() {
            ctx.notify_success(format!("User '{username}' password reset"));
        } else {
            ctx.notify_success(format!("User '{username}' password updated"));
        }
        Ok(())
    }

    /// Ask to delete the selected users. Returns the warning text.
    pub fn request_delete_selected(&mut self) -> &str {
        let ids = self.selection.ids().to_vec();
        let message = delete_warning(ids.len(), "user");
        self.confirm.request(message, UsersMutation::Delete(ids));
        self.confirm.message().unwrap_or_default()
    }

    async fn delete(&mut self, ctx: &mut ConsoleContext, ids: Vec<String>) -> ConsoleResult<()> {
        let count = ids.len();
        let body = DeleteUsersRequest { user_ids: ids };
        let request = ctx.with_json(ApiRequest::delete("/oauth2-user"), &body)?;
        ctx.call_discard(&request).await?;
        self.selection.clear();
        ctx.notify_success(format!("{count} user(s) deleted"));
        keep_applied(self.load_users(ctx, self.cursor).await);
        Ok(())
    }
}

impl Confirmable for UsersView {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(UsersMutation::Delete(ids)) => self.delete(ctx, ids).await.map(|()| true),
            None => Ok(false),
        }
    }
}

fn user_request(build: fn(&str) -> ApiRequest, id: &str) -> ApiRequest {
    build("/oauth2-user").segment(id)
}
