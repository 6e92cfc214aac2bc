//! OAuth2 client administration.
//!
//! [`ClientsView`] is the paged list with bulk actions; [`ClientEditor`]
//! covers the create and edit screens of a single client.

use authbox_api_models::{DeleteClientsRequest, OauthClient, OauthScope, Page};
use serde::Deserialize;

use crate::confirm::ConfirmGate;
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::notice::Navigation;
use crate::pager::page_window;
use crate::validate::{redirect_url_to_add, validate_client, validate_private_key};
use crate::views::{
    Confirmable, PageCursor, Selection, delete_warning, fetch_page, keep_applied,
};

/// Bulk delete control of the list.
pub const DELETE_SELECTED_CONTROL: &str = "delete-selected-clients";
/// Submit control of the create form.
pub const CREATE_CONTROL: &str = "create-client";
/// Submit control of the edit form.
pub const UPDATE_CONTROL: &str = "update-client";
/// Submit control of the private key dialog.
pub const PRIVATE_KEY_CONTROL: &str = "add-private-key";
/// Key regeneration control.
pub const GENERATE_KEYS_CONTROL: &str = "generate-keys";

/// Route of the client list.
pub const LIST_ROUTE: &str = "/oauth2-clients";
/// Default access token lifetime of a new client.
pub const DEFAULT_EXPIRATION: &str = "1h";
/// Default refresh token lifetime of a new client.
pub const DEFAULT_REFRESH_EXPIRATION: &str = "24h";

/// Mutation waiting behind a confirmation on the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientsMutation {
    /// Delete these clients.
    Delete(Vec<String>),
}

/// Paged client list.
#[derive(Debug, Clone, Default)]
pub struct ClientsView {
    cursor: PageCursor,
    clients: Option<Page<OauthClient>>,
    /// Checked rows of the list.
    pub selection: Selection,
    confirm: ConfirmGate<ClientsMutation>,
}

impl ClientsView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy
            .register(DELETE_SELECTED_CONTROL, "Delete selected");
        Self::default()
    }

    /// Cursor of the last list request.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Loaded list page.
    #[must_use]
    pub const fn clients(&self) -> Option<&Page<OauthClient>> {
        self.clients.as_ref()
    }

    /// Page numbers to offer below the list.
    #[must_use]
    pub fn page_window(&self) -> Vec<i64> {
        self.clients.as_ref().map(page_window).unwrap_or_default()
    }

    /// Fetch one page of clients.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(
        &mut self,
        ctx: &mut ConsoleContext,
        cursor: PageCursor,
    ) -> ConsoleResult<&Page<OauthClient>> {
        self.cursor = cursor;
        let page = fetch_page(ctx, ApiRequest::get("/oauth2-client"), cursor).await?;
        Ok(self.clients.insert(page))
    }

    /// Enable or disable a client, then refetch the current page.
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
        let listed = self
            .clients
            .iter()
            .flat_map(|page| page.content.iter())
            .find(|client| client.id.as_deref() == Some(id))
            .cloned();
        let mut client = match listed {
            Some(client) => client,
            None => ctx.call(&client_request(ApiRequest::get, id)).await?,
        };
        client.enabled = Some(enabled);
        let request = ctx.with_json(client_request(ApiRequest::post, id), &client)?;
        ctx.call_discard(&request).await?;
        ctx.notify_success("Client details updated");
        keep_applied(self.load(ctx, self.cursor).await);
        Ok(())
    }

    /// Ask to delete the selected clients. Returns the warning text.
    pub fn request_delete_selected(&mut self) -> &str {
        let ids = self.selection.ids().to_vec();
        let message = delete_warning(ids.len(), "client");
        self.confirm.request(message, ClientsMutation::Delete(ids));
        self.confirm.message().unwrap_or_default()
    }

    async fn delete(&mut self, ctx: &mut ConsoleContext, ids: Vec<String>) -> ConsoleResult<()> {
        let count = ids.len();
        let body = DeleteClientsRequest { client_ids: ids };
        let request = ctx.with_json(ApiRequest::delete("/oauth2-client"), &body)?;
        ctx.submit_discard(DELETE_SELECTED_CONTROL, &request).await?;
        self.selection.clear();
        ctx.notify_success(format!("{count} client(s) deleted"));
        keep_applied(self.load(ctx, self.cursor).await);
        Ok(())
    }
}

impl Confirmable for ClientsView {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(ClientsMutation::Delete(ids)) => self.delete(ctx, ids).await.map(|()| true),
            None => Ok(false),
        }
    }
}

/// Mutation waiting behind a confirmation on the edit screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMutation {
    /// Delete the opened client.
    Delete,
    /// Replace the opened client's key pair.
    RegenerateKeys,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedKeys {
    public_key: Option<String>,
}

/// Create/edit screen of a single client.
#[derive(Debug, Clone, Default)]
pub struct ClientEditor {
    client: OauthClient,
    scopes: Vec<OauthScope>,
    confirm: ConfirmGate<ClientMutation>,
}

impl ClientEditor {
    /// Register the screen's controls and start from a new-client draft.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(CREATE_CONTROL, "Create client");
        ctx.busy.register(UPDATE_CONTROL, "Update client");
        ctx.busy.register(PRIVATE_KEY_CONTROL, "Save private key");
        ctx.busy.register(GENERATE_KEYS_CONTROL, "Generate new keys");
        Self {
            client: new_client_draft(),
            ..Self::default()
        }
    }

    /// Client being edited.
    #[must_use]
    pub const fn client(&self) -> &OauthClient {
        &self.client
    }

    /// Mutable access for form edits.
    pub const fn client_mut(&mut self) -> &mut OauthClient {
        &mut self.client
    }

    /// Scopes available for assignment.
    #[must_use]
    pub fn scopes(&self) -> &[OauthScope] {
        &self.scopes
    }

    /// Fetch the scopes offered by the scope picker (first server page).
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load_scopes(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<&[OauthScope]> {
        let page: Page<OauthScope> = ctx.call(&ApiRequest::get("/oauth2-scope")).await?;
        self.scopes = page.content;
        Ok(&self.scopes)
    }

    /// Open an existing client. A blank id leaves the editor untouched.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(&mut self, ctx: &mut ConsoleContext, id: &str) -> ConsoleResult<&OauthClient> {
        if id.trim().is_empty() {
            return Ok(&self.client);
        }
        self.client = ctx.call(&client_request(ApiRequest::get, id)).await?;
        Ok(&self.client)
    }

    /// Append a redirect URL to the draft.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for a non-http(s) or duplicate URL.
    pub fn add_redirect_url(&mut self, ctx: &mut ConsoleContext, url: &str) -> ConsoleResult<()> {
        let url = ctx.check(redirect_url_to_add(&self.client.redirect_urls, url))?;
        self.client.redirect_urls.push(url);
        Ok(())
    }

    /// Remove a redirect URL from the draft. Returns whether it was listed.
    pub fn remove_redirect_url(&mut self, url: &str) -> bool {
        let before = self.client.redirect_urls.len();
        self.client.redirect_urls.retain(|listed| listed != url);
        before != self.client.redirect_urls.len()
    }

    /// Submit the draft as a new client, then return to the list.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for an inconsistent draft, or the surfaced call failure.
    pub async fn create(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<OauthClient> {
        ctx.check(validate_client(&self.client))?;
        let request = ctx.with_json(ApiRequest::post("/oauth2-client"), &self.client)?;
        let created = ctx.submit(CREATE_CONTROL, &request).await?;
        ctx.notify_success("Client created successfully");
        ctx.navigate(Navigation::Route(LIST_ROUTE.to_string()));
        Ok(created)
    }

    /// Save the opened client.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for an inconsistent draft, or the surfaced call failure.
    pub async fn update(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<&OauthClient> {
        self.save(ctx, UPDATE_CONTROL).await
    }

    /// Replace the client's private key and save.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for a blank key, or whatever [`Self::update`] returns.
    pub async fn set_private_key(
        &mut self,
        ctx: &mut ConsoleContext,
        private_key: &str,
    ) -> ConsoleResult<&OauthClient> {
        ctx.check(validate_private_key(private_key))?;
        self.client.private_key = Some(private_key.to_string());
        self.save(ctx, PRIVATE_KEY_CONTROL).await
    }

    /// Ask to delete the opened client. Returns the warning text.
    pub fn request_delete(&mut self) -> &str {
        self.confirm.request(
            "You are about to delete a client. This can not be undone.",
            ClientMutation::Delete,
        );
        self.confirm.message().unwrap_or_default()
    }

    /// Ask to replace the opened client's keys. Returns the warning text.
    pub fn request_regenerate_keys(&mut self) -> &str {
        self.confirm.request(
            "You are about to replace old security keys with new ones. This can not be undone.",
            ClientMutation::RegenerateKeys,
        );
        self.confirm.message().unwrap_or_default()
    }

    async fn save(&mut self, ctx: &mut ConsoleContext, control: &str) -> ConsoleResult<&OauthClient> {
        ctx.check(validate_client(&self.client))?;
        let id = self.client.id.clone().unwrap_or_default();
        let request = ctx.with_json(client_request(ApiRequest::post, &id), &self.client)?;
        let mut updated: OauthClient = ctx.submit(control, &request).await?;
        ctx.notify_success("Client updated");
        updated.private_key = None;
        self.client = updated;
        Ok(&self.client)
    }

    async fn delete(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<()> {
        let body = DeleteClientsRequest {
            client_ids: self.client.id.iter().cloned().collect(),
        };
        let request = ctx.with_json(ApiRequest::delete("/oauth2-client"), &body)?;
        ctx.call_discard(&request).await?;
        ctx.notify_success("Client deleted");
        ctx.navigate(Navigation::Route(LIST_ROUTE.to_string()));
        Ok(())
    }

    async fn regenerate_keys(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<()> {
        let id = self.client.id.clone().unwrap_or_default();
        let request = client_request(ApiRequest::post, &id).segment("create-new-keys");
        let keys: GeneratedKeys = ctx.submit(GENERATE_KEYS_CONTROL, &request).await?;
        ctx.notify_success("Client keys generated");
        self.client.public_key = keys.public_key;
        Ok(())
    }
}

impl Confirmable for ClientEditor {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(ClientMutation::Delete) => self.delete(ctx).await.map(|()| true),
            Some(ClientMutation::RegenerateKeys) => {
                self.regenerate_keys(ctx).await.map(|()| true)
            }
            None => Ok(false),
        }
    }
}

/// Draft of a new client with the console's default lifetimes.
#[must_use]
pub fn new_client_draft() -> OauthClient {
    OauthClient {
        description: Some(String::new()),
        expiration: Some(DEFAULT_EXPIRATION.to_string()),
        refresh_expiration: Some(DEFAULT_REFRESH_EXPIRATION.to_string()),
        ..OauthClient::default()
    }
}

fn client_request(build: fn(&str) -> ApiRequest, id: &str) -> ApiRequest {
    build("/oauth2-client").segment(id)
}
