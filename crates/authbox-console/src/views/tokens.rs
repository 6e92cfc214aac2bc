//! Issued token browser: paged lists, single-token lookups and revocation.

use std::fmt;

use authbox_api_models::{DeleteTokensRequest, OauthToken, Page};

use crate::confirm::ConfirmGate;
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::notice::Navigation;
use crate::pager::page_window;
use crate::views::{
    Confirmable, PageCursor, Selection, delete_warning, fetch_page, keep_applied,
};

/// What the token screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenQuery {
    /// Every token of the organization.
    List,
    /// Tokens issued to a client.
    Client(String),
    /// Tokens issued for a user.
    User(String),
    /// The token with this hash.
    Hash(String),
    /// The token with this value.
    Token(String),
    /// The token with this id.
    Id(String),
}

impl TokenQuery {
    /// Build a query from a search type (`client`, `user`, `hash`, `token`, `id`).
    #[must_use]
    pub fn parse(kind: &str, value: &str) -> Option<Self> {
        let value = value.trim().to_string();
        match kind {
            "client" => Some(Self::Client(value)),
            "user" => Some(Self::User(value)),
            "hash" => Some(Self::Hash(value)),
            "token" => Some(Self::Token(value)),
            "id" => Some(Self::Id(value)),
            _ => None,
        }
    }

    /// Whether the query yields a page rather than a single token.
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        matches!(self, Self::List | Self::Client(_) | Self::User(_))
    }

    fn request(&self) -> ApiRequest {
        match self {
            Self::List => ApiRequest::get("/oauth2-token/list"),
            Self::Client(value) => lookup("client", value),
            Self::User(value) => lookup("user", value),
            Self::Hash(value) => lookup("hash", value),
            Self::Token(value) => lookup("token", value),
            Self::Id(value) => lookup("id", value),
        }
    }
}

impl fmt::Display for TokenQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("/oauth2-tokens"),
            Self::Client(value) => write!(f, "/oauth2-tokens/client/{value}"),
            Self::User(value) => write!(f, "/oauth2-tokens/user/{value}"),
            Self::Hash(value) => write!(f, "/oauth2-tokens/hash/{value}"),
            Self::Token(value) => write!(f, "/oauth2-tokens/token/{value}"),
            Self::Id(value) => write!(f, "/oauth2-tokens/id/{value}"),
        }
    }
}

fn lookup(kind: &str, value: &str) -> ApiRequest {
    ApiRequest::get("/oauth2-token").segment(kind).segment(value)
}

/// Where to go once a delete succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterDelete {
    /// Refetch the current query.
    Refresh,
    /// Return to the previous screen (the deleted token was the one shown).
    Back,
}

/// Mutation waiting behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokensMutation {
    /// Delete these tokens.
    Delete {
        /// Tokens to delete.
        ids: Vec<String>,
        /// Follow-up after success.
        then: AfterDelete,
    },
}

/// Token list or single token, depending on the active query.
#[derive(Debug, Clone, Default)]
pub struct TokensView {
    query: Option<TokenQuery>,
    cursor: PageCursor,
    tokens: Option<Page<OauthToken>>,
    token: Option<OauthToken>,
    /// Checked rows of the list.
    pub selection: Selection,
    confirm: ConfirmGate<TokensMutation>,
}

impl TokensView {
    /// Empty view; the token screen has no submit controls to register.
    #[must_use]
    pub fn mount(_ctx: &mut ConsoleContext) -> Self {
        Self::default()
    }

    /// Query of the last load.
    #[must_use]
    pub const fn query(&self) -> Option<&TokenQuery> {
        self.query.as_ref()
    }

    /// Loaded list page, for paged queries.
    #[must_use]
    pub const fn tokens(&self) -> Option<&Page<OauthToken>> {
        self.tokens.as_ref()
    }

    /// Loaded token, for lookups.
    #[must_use]
    pub const fn token(&self) -> Option<&OauthToken> {
        self.token.as_ref()
    }

    /// Page numbers to offer below the list.
    #[must_use]
    pub fn page_window(&self) -> Vec<i64> {
        self.tokens.as_ref().map(page_window).unwrap_or_default()
    }

    /// Validate a search box entry and navigate to its result screen.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for a blank value or unknown search type.
    pub fn search(
        ctx: &mut ConsoleContext,
        kind: &str,
        value: &str,
    ) -> ConsoleResult<TokenQuery> {
        if value.trim().is_empty() {
            return ctx.reject(format!("Please enter a valid {kind}"));
        }
        let Some(query) = TokenQuery::parse(kind, value) else {
            return ctx.reject(format!("Please enter a valid {kind}"));
        };
        ctx.navigate(Navigation::Route(query.to_string()));
        Ok(query)
    }

    /// Run a query. Paged queries use `cursor`; lookups ignore it.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(
        &mut self,
        ctx: &mut ConsoleContext,
        query: TokenQuery,
        cursor: PageCursor,
    ) -> ConsoleResult<()> {
        self.cursor = cursor;
        if query.is_paged() {
            let page = fetch_page(ctx, query.request(), cursor).await?;
            self.token = None;
            self.tokens = Some(page);
        } else {
            let token = ctx.call(&query.request()).await?;
            self.tokens = None;
            self.token = Some(token);
        }
        self.query = Some(query);
        Ok(())
    }

    /// Ask to delete the selected tokens, or the shown token when nothing is selected.
    /// Returns the warning text.
    pub fn request_delete(&mut self) -> &str {
        let (ids, then) = if self.selection.is_empty() {
            let shown = self.token.as_ref().and_then(|token| token.id.clone());
            (shown.into_iter().collect::<Vec<_>>(), AfterDelete::Back)
        } else {
            (self.selection.ids().to_vec(), AfterDelete::Refresh)
        };
        let message = delete_warning(ids.len(), "token");
        self.confirm
            .request(message, TokensMutation::Delete { ids, then });
        self.confirm.message().unwrap_or_default()
    }

    async fn delete(
        &mut self,
        ctx: &mut ConsoleContext,
        ids: Vec<String>,
        then: AfterDelete,
    ) -> ConsoleResult<()> {
        let count = ids.len();
        let body = DeleteTokensRequest { token_ids: ids };
        let request = ctx.with_json(ApiRequest::delete("/oauth2-token"), &body)?;
        ctx.call_discard(&request).await?;
        ctx.notify_success(format!("{count} token(s) deleted"));
        self.selection.clear();
        match then {
            AfterDelete::Back => ctx.navigate(Navigation::Back),
            AfterDelete::Refresh => {
                let query = self.query.clone().unwrap_or(TokenQuery::List);
                keep_applied(self.load(ctx, query, self.cursor).await);
            }
        }
        Ok(())
    }
}

impl Confirmable for TokensView {
    fn pending_confirmation(&self) -> Option<&str> {
        self.confirm.message()
    }

    fn dismiss(&mut self) -> bool {
        self.confirm.dismiss()
    }

    async fn confirm(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<bool> {
        match self.confirm.confirm() {
            Some(TokensMutation::Delete { ids, then }) => {
                self.delete(ctx, ids, then).await.map(|()| true)
            }
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

    #[test]
    fn queries_map_to_routes() {
        assert_eq!(
            TokenQuery::parse("client", " c1 ").map(|query| query.to_string()),
            Some("/oauth2-tokens/client/c1".to_string())
        );
        assert_eq!(TokenQuery::parse("secret", "x"), None);
        assert!(TokenQuery::List.is_paged());
        assert!(!TokenQuery::Hash("h".into()).is_paged());
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let server = MockServer::start_async().await;
        let mut ctx = context_for(&server);
        let result = TokensView::search(&mut ctx, "hash", "   ");

        assert_eq!(
            result,
            Err(ConsoleError::validation("Please enter a valid hash"))
        );
        assert_eq!(ctx.navigation(), None);
        assert_eq!(
            TokensView::search(&mut ctx, "user", "u1"),
            Ok(TokenQuery::User("u1".into()))
        );
        assert_eq!(
            ctx.navigation(),
            Some(&Navigation::Route("/oauth2-tokens/user/u1".into()))
        );
    }

    #[tokio::test]
    async fn client_tokens_are_paged() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET)
                .path("/api/oauth2-token/client/c1")
                .query_param("pageSize", "10")
                .query_param("currentPage", "0");
            then.status(200).json_body(json!({
                "content": [{"id": "t1", "clientId": "c1", "tokenType": "ACCESS_TOKEN"}],
                "totalPages": 1, "currentPage": 0, "pageSize": 10
            }));
        });

        let mut ctx = context_for(&server);
        let mut view = TokensView::mount(&mut ctx);
        view.load(&mut ctx, TokenQuery::Client("c1".into()), PageCursor::default())
            .await
            .expect("tokens");

        list.assert();
        assert_eq!(view.tokens().map(|page| page.content.len()), Some(1));
        assert!(view.token().is_none());
    }

    #[tokio::test]
    async fn deleting_shown_token_navigates_back() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-token/hash/abc");
            then.status(200).json_body(json!({"id": "t9", "hash": "abc"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/oauth2-token")
                .header("content-type", "application/json")
                .json_body(json!({"tokenIds": ["t9"]}));
            then.status(200);
        });

        let mut ctx = context_for(&server);
        let mut view = TokensView::mount(&mut ctx);
        view.load(&mut ctx, TokenQuery::Hash("abc".into()), PageCursor::default())
            .await
            .expect("token");
        assert_eq!(
            view.request_delete(),
            "You are about to delete 1 token(s). This can not be undone."
        );
        assert!(view.confirm(&mut ctx).await.expect("delete"));

        delete.assert();
        assert_eq!(ctx.navigation(), Some(&Navigation::Back));
        assert_eq!(
            ctx.toasts.last().map(|toast| toast.message.as_str()),
            Some("1 token(s) deleted")
        );
    }

    #[tokio::test]
    async fn deleting_selection_refetches_query() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-token/list");
            then.status(200).json_body(json!({
                "content": [{"id": "t1"}, {"id": "t2"}],
                "totalPages": 1, "currentPage": 0, "pageSize": 10
            }));
        });
        server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/oauth2-token")
                .json_body(json!({"tokenIds": ["t2"]}));
            then.status(200);
        });

        let mut ctx = context_for(&server);
        let mut view = TokensView::mount(&mut ctx);
        view.load(&mut ctx, TokenQuery::List, PageCursor::default())
            .await
            .expect("tokens");
        view.selection.select("t2");
        view.request_delete();
        assert!(view.confirm(&mut ctx).await.expect("delete"));

        list.assert_hits(2);
        assert_eq!(ctx.navigation(), None);
    }
}
