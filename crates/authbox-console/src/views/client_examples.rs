//! Copy-paste token requests for OAuth2 clients.
//!
//! Opened for one client, or for every client of the organization when no id
//! is given. The OAuth2 server is addressed as `https://{domainPrefix}.{domain}`;
//! with no domain configured the prefix alone is the host.

use authbox_api_models::{GrantType, OauthClient, Organization, Page};
use serde::Serialize;
use url::form_urlencoded;

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::views::{PageCursor, fetch_page};

/// Page requested when examples are shown for every client.
pub const ALL_CLIENTS: PageCursor = PageCursor::new(1000, 0);

const CLIENT_SECRET_PLACEHOLDER: &str = "CLIENT_SECRET";
const REDIRECT_URL_PLACEHOLDER: &str = "REDIRECT_URL";

/// Example requests for one grant type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenExample {
    /// Grant the requests exercise.
    pub grant: GrantType,
    /// Shell commands, in the order they are run.
    pub commands: Vec<String>,
}

/// Examples for every grant a client allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientExamples {
    /// Client the examples authenticate as.
    pub client_id: String,
    /// Client description, empty when unset.
    pub description: String,
    /// One entry per allowed grant, in the client's order.
    pub examples: Vec<TokenExample>,
}

/// Clients and organization behind the examples screen.
#[derive(Debug, Clone, Default)]
pub struct ClientExamplesView {
    clients: Vec<OauthClient>,
    organization: Option<Organization>,
}

impl ClientExamplesView {
    /// Load one client (or all of them for a blank id), then the organization.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of either call.
    pub async fn load(
        &mut self,
        ctx: &mut ConsoleContext,
        client_id: Option<&str>,
    ) -> ConsoleResult<()> {
        self.clients = match client_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let client: OauthClient = ctx
                    .call(&ApiRequest::get("/oauth2-client").segment(id))
                    .await?;
                vec![client]
            }
            None => {
                let page: Page<OauthClient> =
                    fetch_page(ctx, ApiRequest::get("/oauth2-client"), ALL_CLIENTS).await?;
                page.content
            }
        };
        self.organization = Some(ctx.call(&ApiRequest::get("/organization")).await?);
        Ok(())
    }

    /// Loaded clients.
    #[must_use]
    pub fn clients(&self) -> &[OauthClient] {
        &self.clients
    }

    /// Loaded organization.
    #[must_use]
    pub const fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// Examples for every loaded client, against the organization's server.
    #[must_use]
    pub fn examples(&self, domain: &str) -> Vec<ClientExamples> {
        let prefix = self
            .organization
            .as_ref()
            .and_then(|organization| organization.domain_prefix.as_deref())
            .unwrap_or_default();
        let base = oauth_base_url(prefix, domain);
        self.clients
            .iter()
            .map(|client| ClientExamples {
                client_id: client.id.clone().unwrap_or_default(),
                description: client.description.clone().unwrap_or_default(),
                examples: token_examples(client, &base),
            })
            .collect()
    }
}

/// Root URL of an organization's OAuth2 endpoints.
#[must_use]
pub fn oauth_base_url(domain_prefix: &str, domain: &str) -> String {
    let domain = domain.trim().trim_start_matches('.');
    if domain.is_empty() {
        format!("https://{domain_prefix}")
    } else {
        format!("https://{domain_prefix}.{domain}")
    }
}

/// Token requests for each grant `client` allows.
#[must_use]
pub fn token_examples(client: &OauthClient, base_url: &str) -> Vec<TokenExample> {
    let client_id = client.id.as_deref().unwrap_or_default();
    let secret = client
        .secret
        .as_deref()
        .filter(|secret| !secret.is_empty())
        .unwrap_or(CLIENT_SECRET_PLACEHOLDER);
    let token_request =
        |params: &[(&str, &str)]| token_command(base_url, client_id, secret, params);

    client
        .grant_types
        .iter()
        .map(|grant| {
            let commands = match grant {
                GrantType::ClientCredentials => {
                    vec![token_request(&[("grant_type", "client_credentials")])]
                }
                GrantType::Password => vec![token_request(&[
                    ("grant_type", "password"),
                    ("username", "USERNAME"),
                    ("password", "PASSWORD"),
                ])],
                GrantType::AuthorizationCode => {
                    let redirect = client
                        .redirect_urls
                        .first()
                        .map_or(REDIRECT_URL_PLACEHOLDER, String::as_str);
                    vec![
                        authorize_url(base_url, client_id, redirect),
                        token_request(&[
                            ("grant_type", "authorization_code"),
                            ("code", "AUTHORIZATION_CODE"),
                        ]),
                    ]
                }
                GrantType::RefreshToken => vec![token_request(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", "REFRESH_TOKEN"),
                ])],
            };
            TokenExample {
                grant: *grant,
                commands,
            }
        })
        .collect()
}

fn token_command(base_url: &str, client_id: &str, secret: &str, params: &[(&str, &str)]) -> String {
    let data: String = params
        .iter()
        .map(|(key, value)| format!(" -d '{key}={value}'"))
        .collect();
    format!("curl -X POST -u '{client_id}:{secret}' '{base_url}/oauth/token'{data}")
}

fn authorize_url(base_url: &str, client_id: &str, redirect_url: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_url)
        .append_pair("state", "STATE")
        .finish();
    format!("{base_url}/oauth/authorize?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context_for;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(grants: Vec<GrantType>) -> OauthClient {
        OauthClient {
            id: Some("c1".into()),
            secret: Some("s3cret".into()),
            grant_types: grants,
            redirect_urls: vec!["https://app.example.com/cb".into()],
            ..OauthClient::default()
        }
    }

    #[test]
    fn base_url_uses_prefix_as_subdomain() {
        assert_eq!(oauth_base_url("acme", "auth.example.com"), "https://acme.auth.example.com");
        assert_eq!(oauth_base_url("acme", ".auth.example.com"), "https://acme.auth.example.com");
        assert_eq!(oauth_base_url("acme", ""), "https://acme");
    }

    #[test]
    fn one_example_per_allowed_grant() {
        let examples = token_examples(
            &client(vec![GrantType::ClientCredentials, GrantType::RefreshToken]),
            "https://acme.example.com",
        );

        assert_eq!(examples.len(), 2);
        assert_eq!(
            examples[0].commands,
            ["curl -X POST -u 'c1:s3cret' 'https://acme.example.com/oauth/token' -d 'grant_type=client_credentials'"]
        );
        assert_eq!(examples[1].grant, GrantType::RefreshToken);
        assert!(examples[1].commands[0].ends_with("-d 'refresh_token=REFRESH_TOKEN'"));
    }

    #[test]
    fn authorization_code_starts_at_authorize_endpoint() {
        let examples = token_examples(
            &client(vec![GrantType::AuthorizationCode]),
            "https://acme.example.com",
        );

        let commands = &examples[0].commands;
        assert_eq!(
            commands[0],
            "https://acme.example.com/oauth/authorize?response_type=code&client_id=c1&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=STATE"
        );
        assert!(commands[1].contains("-d 'grant_type=authorization_code' -d 'code=AUTHORIZATION_CODE'"));
    }

    #[test]
    fn missing_secret_is_left_as_placeholder() {
        let mut client = client(vec![GrantType::Password]);
        client.secret = None;
        let examples = token_examples(&client, "https://acme");
        assert!(examples[0].commands[0].starts_with("curl -X POST -u 'c1:CLIENT_SECRET'"));
    }

    #[tokio::test]
    async fn without_id_loads_every_client_and_organization() {
        let server = MockServer::start_async().await;
        let clients = server.mock(|when, then| {
            when.method(GET)
                .path("/api/oauth2-client")
                .query_param("pageSize", "1000")
                .query_param("currentPage", "0");
            then.status(200).json_body(json!({
                "content": [
                    {"id": "c1", "grantTypes": ["client_credentials"]},
                    {"id": "c2", "grantTypes": ["password"]}
                ],
                "totalPages": 1, "currentPage": 0, "pageSize": 1000
            }));
        });
        let organization = server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(200)
                .json_body(json!({"id": "o1", "domainPrefix": "acme"}));
        });

        let mut ctx = context_for(&server);
        let mut view = ClientExamplesView::default();
        view.load(&mut ctx, None).await.expect("examples");

        clients.assert();
        organization.assert();
        let examples = view.examples("auth.example.com");
        assert_eq!(examples.len(), 2);
        assert!(examples[1].examples[0].commands[0]
            .contains("'https://acme.auth.example.com/oauth/token'"));
    }

    #[tokio::test]
    async fn with_id_loads_that_client_only() {
        let server = MockServer::start_async().await;
        let client = server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-client/c9");
            then.status(200)
                .json_body(json!({"id": "c9", "description": "Billing"}));
        });
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/oauth2-client");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(200)
                .json_body(json!({"id": "o1", "domainPrefix": "acme"}));
        });

        let mut ctx = context_for(&server);
        let mut view = ClientExamplesView::default();
        view.load(&mut ctx, Some("c9")).await.expect("examples");

        client.assert();
        list.assert_hits(0);
        assert_eq!(view.clients().len(), 1);
        assert_eq!(
            view.organization().and_then(|org| org.domain_prefix.as_deref()),
            Some("acme")
        );
        assert_eq!(view.examples("")[0].description, "Billing");
    }
}
