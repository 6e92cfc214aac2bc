//! Issued tokens and the access log of a request.

use chrono::Utc;

use crate::cli::{AccessLogArgs, TokensCommand};
use crate::client::{AppContext, CliResult, confirm_pending};
use crate::output::{render_access_log, render_token, render_tokens};
use crate::views::PageCursor;
use crate::views::access_log::AccessLogView;
use crate::views::tokens::{TokenQuery, TokensView};

pub(crate) async fn handle_tokens(app: &mut AppContext, command: TokensCommand) -> CliResult<()> {
    let mut view = TokensView::mount(&mut app.console);
    match command {
        TokensCommand::List(args) => {
            let query = match (args.client, args.user) {
                (Some(client), _) => TokensView::search(&mut app.console, "client", &client)?,
                (None, Some(user)) => TokensView::search(&mut app.console, "user", &user)?,
                (None, None) => TokenQuery::List,
            };
            view.load(&mut app.console, query, args.page.cursor()).await?;
            if let Some(tokens) = view.tokens() {
                render_tokens(tokens, Utc::now(), app.output)?;
            }
            Ok(())
        }
        TokensCommand::Show(args) => {
            let query = TokensView::search(&mut app.console, args.by.as_str(), &args.value)?;
            view.load(&mut app.console, query, PageCursor::default()).await?;
            if let Some(token) = view.token() {
                render_token(token, Utc::now(), app.output)?;
            }
            Ok(())
        }
        TokensCommand::Delete(args) => {
            view.load(&mut app.console, TokenQuery::List, args.page.cursor())
                .await?;
            view.selection.select_all(args.ids);
            view.request_delete();
            confirm_pending(&mut view, app).await?;
            Ok(())
        }
    }
}

pub(crate) async fn handle_access_log(app: &mut AppContext, args: AccessLogArgs) -> CliResult<()> {
    let mut view = AccessLogView::default();
    view.load(&mut app.console, &args.request_id).await?;
    if let Some(entries) = view.entries() {
        render_access_log(entries, view.summary(), view.ip_details(), app.output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{PageArgs, TokenListArgs, TokenLookup, TokenShowArgs};
    use crate::client::CliError;
    use crate::commands::tests::app_for;
    use crate::error::ConsoleError;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_by_client_uses_client_lookup() {
        let server = MockServer::start_async().await;
        let tokens = server.mock(|when, then| {
            when.method(GET)
                .path("/api/oauth2-token/client/c1")
                .query_param("pageSize", "5")
                .query_param("currentPage", "1");
            then.status(200).json_body(json!({
                "content": [], "totalPages": 2, "currentPage": 1, "pageSize": 5
            }));
        });

        let mut app = app_for(&server, false);
        handle_tokens(
            &mut app,
            TokensCommand::List(TokenListArgs {
                client: Some("c1".into()),
                user: None,
                page: PageArgs {
                    page: 1,
                    page_size: 5,
                },
            }),
        )
        .await
        .expect("tokens");

        tokens.assert();
    }

    #[tokio::test]
    async fn blank_lookup_value_is_refused_locally() {
        let server = MockServer::start_async().await;
        let mut app = app_for(&server, false);

        let result = handle_tokens(
            &mut app,
            TokensCommand::Show(TokenShowArgs {
                by: TokenLookup::Hash,
                value: " ".into(),
            }),
        )
        .await;

        assert!(matches!(
            result,
            Err(CliError::Console(ConsoleError::Validation { .. }))
        ));
        assert_eq!(
            app.console.toasts.last().map(|toast| toast.message.as_str()),
            Some("Please enter a valid hash")
        );
    }

    #[tokio::test]
    async fn forbidden_access_log_shows_generic_notice() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/access-log/req-9");
            then.status(403).body("{\"message\":\"internal detail\"}");
        });

        let mut app = app_for(&server, false);
        let result = handle_access_log(
            &mut app,
            AccessLogArgs {
                request_id: "req-9".into(),
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(CliError::Console(ConsoleError::AccessDenied))
        ));
        assert_eq!(
            app.console.toasts.last().map(|toast| toast.message.as_str()),
            Some("Access denied")
        );
    }
}
