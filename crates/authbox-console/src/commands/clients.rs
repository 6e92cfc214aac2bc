//! OAuth2 client administration.

use anyhow::anyhow;
use authbox_api_models::{GrantType, TokenFormat};

use crate::cli::{ClientFields, ClientsCommand, GrantArg, TokenFormatArg};
use crate::client::{AppContext, CliError, CliResult, confirm_pending};
use crate::context::ConsoleContext;
use crate::output::{render_client, render_client_examples, render_clients};
use crate::views::client_examples::ClientExamplesView;
use crate::views::clients::{ClientEditor, ClientsView};

pub(crate) async fn handle_clients(app: &mut AppContext, command: ClientsCommand) -> CliResult<()> {
    match command {
        ClientsCommand::List(page) => {
            let mut view = ClientsView::mount(&mut app.console);
            let clients = view.load(&mut app.console, page.cursor()).await?;
            render_clients(clients, app.output)
        }
        ClientsCommand::Show(args) => {
            let mut editor = ClientEditor::mount(&mut app.console);
            let client = editor.load(&mut app.console, &args.id).await?;
            render_client(client, app.output)
        }
        ClientsCommand::Create(fields) => {
            let mut editor = ClientEditor::mount(&mut app.console);
            apply_fields(&mut editor, &mut app.console, fields)?;
            let created = editor.create(&mut app.console).await?;
            render_client(&created, app.output)
        }
        ClientsCommand::Update(args) => {
            let mut editor = ClientEditor::mount(&mut app.console);
            editor.load(&mut app.console, &args.id).await?;
            for url in &args.remove_redirect_urls {
                if !editor.remove_redirect_url(url) {
                    return Err(CliError::validation(format!(
                        "redirect URL '{url}' is not registered"
                    )));
                }
            }
            apply_fields(&mut editor, &mut app.console, args.fields)?;
            let updated = editor.update(&mut app.console).await?;
            render_client(updated, app.output)
        }
        ClientsCommand::Enable(args) => {
            let mut view = ClientsView::mount(&mut app.console);
            view.set_enabled(&mut app.console, &args.id, true).await?;
            Ok(())
        }
        ClientsCommand::Disable(args) => {
            let mut view = ClientsView::mount(&mut app.console);
            view.set_enabled(&mut app.console, &args.id, false).await?;
            Ok(())
        }
        ClientsCommand::Delete(args) => {
            if let [id] = args.ids.as_slice() {
                let mut editor = ClientEditor::mount(&mut app.console);
                editor.load(&mut app.console, id).await?;
                editor.request_delete();
                confirm_pending(&mut editor, app).await?;
                return Ok(());
            }
            let mut view = ClientsView::mount(&mut app.console);
            view.load(&mut app.console, args.page.cursor()).await?;
            view.selection.select_all(args.ids);
            view.request_delete_selected();
            confirm_pending(&mut view, app).await?;
            Ok(())
        }
        ClientsCommand::RegenerateKeys(args) => {
            let mut editor = ClientEditor::mount(&mut app.console);
            editor.load(&mut app.console, &args.id).await?;
            editor.request_regenerate_keys();
            if confirm_pending(&mut editor, app).await? {
                render_client(editor.client(), app.output)?;
            }
            Ok(())
        }
        ClientsCommand::SetPrivateKey(args) => {
            let private_key = std::fs::read_to_string(&args.file).map_err(|err| {
                CliError::failure(anyhow!(
                    "failed to read private key '{}': {err}",
                    args.file.display()
                ))
            })?;
            let mut editor = ClientEditor::mount(&mut app.console);
            editor.load(&mut app.console, &args.id).await?;
            let updated = editor.set_private_key(&mut app.console, &private_key).await?;
            render_client(updated, app.output)
        }
        ClientsCommand::Examples(args) => {
            let mut view = ClientExamplesView::default();
            view.load(&mut app.console, args.id.as_deref()).await?;
            let examples = view.examples(&app.console.properties.domain);
            render_client_examples(&examples, app.output)
        }
    }
}

/// Copy the given flags onto the editor's draft. Unset flags keep the draft's values.
fn apply_fields(
    editor: &mut ClientEditor,
    ctx: &mut ConsoleContext,
    fields: ClientFields,
) -> CliResult<()> {
    for url in &fields.redirect_urls {
        editor.add_redirect_url(ctx, url)?;
    }
    let client = editor.client_mut();
    if let Some(description) = fields.description {
        client.description = Some(description);
    }
    if !fields.grants.is_empty() {
        client.grant_types = fields.grants.into_iter().map(GrantType::from).collect();
    }
    if !fields.scopes.is_empty() {
        client.scope_ids = fields.scopes;
    }
    if let Some(expiration) = fields.expiration {
        client.expiration = Some(expiration);
    }
    if let Some(refresh) = fields.refresh_expiration {
        client.refresh_expiration = Some(refresh);
    }
    if let Some(format) = fields.token_format {
        client.token_format = Some(TokenFormat::from(format));
    }
    Ok(())
}

impl From<GrantArg> for GrantType {
    fn from(value: GrantArg) -> Self {
        match value {
            GrantArg::ClientCredentials => Self::ClientCredentials,
            GrantArg::Password => Self::Password,
            GrantArg::AuthorizationCode => Self::AuthorizationCode,
            GrantArg::RefreshToken => Self::RefreshToken,
        }
    }
}

impl From<TokenFormatArg> for TokenFormat {
    fn from(value: TokenFormatArg) -> Self {
        match value {
            TokenFormatArg::Standard => Self::Standard,
            TokenFormatArg::Jwt => Self::Jwt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ClientExamplesArgs, IdArgs};
    use crate::commands::tests::app_for;
    use crate::error::ConsoleError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fields() -> ClientFields {
        ClientFields {
            description: Some("Billing backend".into()),
            grants: vec![GrantArg::AuthorizationCode],
            redirect_urls: Vec::new(),
            scopes: Vec::new(),
            expiration: None,
            refresh_expiration: None,
            token_format: None,
        }
    }

    #[tokio::test]
    async fn authorization_code_without_redirect_is_refused_locally() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/oauth2-client");
            then.status(200);
        });

        let mut app = app_for(&server, false);
        let result = handle_clients(&mut app, ClientsCommand::Create(fields())).await;

        assert!(matches!(
            result,
            Err(CliError::Console(ConsoleError::Validation { .. }))
        ));
        create.assert_hits(0);
        assert_eq!(
            app.console.toasts.last().map(|toast| toast.kind),
            Some(crate::notice::ToastKind::Error)
        );
    }

    #[tokio::test]
    async fn create_posts_draft_with_flags() {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/oauth2-client").json_body(json!({
                "description": "Billing backend",
                "grantTypes": ["authorization_code"],
                "redirectUrls": ["https://billing.example.com/cb"],
                "expiration": "1h",
                "refreshExpiration": "24h",
                "scopeIds": []
            }));
            then.status(200)
                .json_body(json!({"id": "c1", "description": "Billing backend"}));
        });

        let mut app = app_for(&server, false);
        let mut args = fields();
        args.redirect_urls = vec![" https://billing.example.com/cb ".into()];
        handle_clients(&mut app, ClientsCommand::Create(args))
            .await
            .expect("create");

        create.assert();
        assert_eq!(
            app.console.toasts.last().map(|toast| toast.message.as_str()),
            Some("Client created successfully")
        );
    }

    #[tokio::test]
    async fn regenerate_keys_needs_confirmation() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-client/c1");
            then.status(200).json_body(json!({"id": "c1"}));
        });
        let regenerate = server.mock(|when, then| {
            when.method(POST).path("/api/oauth2-client/c1/create-new-keys");
            then.status(200).json_body(json!({"id": "c1", "publicKey": "PEM"}));
        });

        let mut app = app_for(&server, false);
        handle_clients(
            &mut app,
            ClientsCommand::RegenerateKeys(IdArgs { id: "c1".into() }),
        )
        .await
        .expect("declined");
        regenerate.assert_hits(0);

        app.assume_yes = true;
        handle_clients(
            &mut app,
            ClientsCommand::RegenerateKeys(IdArgs { id: "c1".into() }),
        )
        .await
        .expect("regenerated");
        regenerate.assert();
    }

    #[tokio::test]
    async fn examples_use_configured_domain() {
        let server = MockServer::start_async().await;
        let client = server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-client/c1");
            then.status(200)
                .json_body(json!({"id": "c1", "grantTypes": ["client_credentials"]}));
        });
        let organization = server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(200)
                .json_body(json!({"id": "o1", "domainPrefix": "acme"}));
        });

        let mut app = app_for(&server, false);
        app.console.properties.domain = "auth.example.com".into();
        handle_clients(
            &mut app,
            ClientsCommand::Examples(ClientExamplesArgs {
                id: Some("c1".into()),
            }),
        )
        .await
        .expect("examples");

        client.assert();
        organization.assert();
    }

    #[tokio::test]
    async fn examples_stop_when_organization_fails() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-client");
            then.status(200)
                .json_body(json!({"content": [], "totalPages": 0, "currentPage": 0, "pageSize": 1000}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(500).json_body(json!({
                "message": "db hiccup",
                "error": "internal",
                "timestamp": "2024-05-01T10:00:00Z"
            }));
        });

        let mut app = app_for(&server, false);
        let result =
            handle_clients(&mut app, ClientsCommand::Examples(ClientExamplesArgs { id: None }))
                .await;

        assert!(matches!(
            result,
            Err(CliError::Console(ConsoleError::Business { .. }))
        ));
    }
}
