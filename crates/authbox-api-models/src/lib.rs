#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Auth Box management API.
//!
//! Entity types double as drafts: every field the server may omit is an
//! `Option`, unset fields are skipped on the wire, and a fetched entity can be
//! edited in place and posted back. Field names follow the server's camelCase
//! JSON.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role granted to regular console accounts.
pub const ROLE_USER: &str = "ROLE_USER";
/// Role granted to organization administrators.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Structured error payload returned by the server on business failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub message: String,
    /// Short error code or reason phrase (e.g. `Bad Request`).
    #[serde(default)]
    pub error: String,
    /// Server-side time of the failure, as sent.
    #[serde(default, deserialize_with = "timestamp_as_string")]
    pub timestamp: String,
    /// HTTP status echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    /// Request path echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn timestamp_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// One bounded slice of a server collection.
///
/// Decoding accepts both the nested Spring layout
/// (`{content, page: {size, number, totalPages}}`) and the flat one
/// (`{content, totalPages, currentPage|number, pageSize|size}`); encoding
/// always produces the flat layout. The server never returns more than
/// `page_size` entities; decoding takes `content` as sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    rename_all = "camelCase",
    from = "PageWire<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Page<T> {
    /// Entities on this page, in server order.
    pub content: Vec<T>,
    /// Number of pages in the collection.
    pub total_pages: u32,
    /// Zero-based index of this page.
    pub current_page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of entities, when the server reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
}

impl<T> Page<T> {
    /// Page with no entities.
    #[must_use]
    pub const fn empty(page_size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            current_page: 0,
            page_size,
            total_elements: None,
        }
    }

    /// Whether the page carries no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Index of the last page, or `0` for an empty collection.
    #[must_use]
    pub const fn last_page_index(&self) -> u32 {
        self.total_pages.saturating_sub(1)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageWire<T> {
    Nested {
        #[serde(default = "Vec::new")]
        content: Vec<T>,
        page: PageMetadata,
    },
    Flat(FlatPage<T>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata {
    #[serde(default)]
    size: u32,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    total_elements: Option<u64>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatPage<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default, alias = "number")]
    current_page: u32,
    #[serde(default, alias = "size")]
    page_size: u32,
    #[serde(default)]
    total_elements: Option<u64>,
}

impl<T> From<PageWire<T>> for Page<T> {
    fn from(wire: PageWire<T>) -> Self {
        match wire {
            PageWire::Nested { content, page } => Self {
                content,
                total_pages: page.total_pages,
                current_page: page.number,
                page_size: page.size,
                total_elements: page.total_elements,
            },
            PageWire::Flat(flat) => Self {
                content: flat.content,
                total_pages: flat.total_pages,
                current_page: flat.current_page,
                page_size: flat.page_size,
                total_elements: flat.total_elements,
            },
        }
    }
}

/// Tenant owning every other resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sub-domain prefix used by the OAuth2 endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_prefix: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Whether the organization is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Console account (administrator or regular user of the management portal).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plain-text password; only ever sent, never returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Granted roles (`ROLE_USER`, `ROLE_ADMIN`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Whether the account may sign in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether the account holds the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ROLE_ADMIN)
    }
}

/// OAuth2 grant types a client may be allowed to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Machine-to-machine credentials grant.
    ClientCredentials,
    /// Resource owner password grant.
    Password,
    /// Authorization code grant (requires redirect URLs).
    AuthorizationCode,
    /// Refresh token grant.
    RefreshToken,
}

impl GrantType {
    /// Every grant type, in the order the console offers them.
    pub const ALL: [Self; 4] = [
        Self::ClientCredentials,
        Self::Password,
        Self::AuthorizationCode,
        Self::RefreshToken,
    ];

    /// Wire name of the grant type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|grant| grant.as_str() == value.trim())
    }
}

/// How access tokens issued for a client are encoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenFormat {
    /// Opaque random token.
    Standard,
    /// Signed JSON Web Token.
    Jwt,
    /// Any value this console does not know about.
    #[serde(other)]
    Other,
}

/// Registered OAuth2 client application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct OauthClient {
    /// Client identifier (`client_id`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Allowed grant types.
    pub grant_types: Vec<GrantType>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Whether the client may obtain tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Allowed redirect URLs for the authorization code flow.
    pub redirect_urls: Vec<String>,
    /// Access token lifetime, e.g. `1h`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// Refresh token lifetime, e.g. `24h`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expiration: Option<String>,
    /// Token encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_format: Option<TokenFormat>,
    /// PEM private key; only ever sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// PEM public key used to verify JWTs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Scopes the client may request.
    pub scope_ids: Vec<String>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl OauthClient {
    /// Whether the client allows the given grant type.
    #[must_use]
    pub fn allows(&self, grant: GrantType) -> bool {
        self.grant_types.contains(&grant)
    }
}

/// OAuth2 scope definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct OauthScope {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scope name as requested by clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// End user authenticated by the OAuth2 server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct OauthUser {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plain-text password; only ever sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Whether the user may authenticate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Arbitrary JSON metadata, stored as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// Whether two-factor authentication is enabled.
    #[serde(rename = "using2Fa", skip_serializing_if = "Option::is_none")]
    pub using_2fa: Option<bool>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Kind of issued token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Access token.
    AccessToken,
    /// Refresh token.
    RefreshToken,
    /// Any value this console does not know about.
    #[serde(other)]
    Other,
}

/// Issued OAuth2 token record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct OauthToken {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Issue time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// SHA-256 hash of the token value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Client the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Expiry time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// User the token was issued for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_user_id: Option<String>,
    /// Access or refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    /// Requesting IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Requesting user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request that issued the token; links to the access log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Paired access/refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_token_id: Option<String>,
}

impl OauthToken {
    /// Whether the token had expired at `now`. Tokens without an expiry never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }
}

/// Component that produced an access log entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessLogSource {
    /// The OAuth2 token server.
    Oauth2Server,
    /// The management portal.
    WebManagementPortal,
}

/// Single audit entry recorded while serving a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessLog {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Record time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Owning organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Token involved in the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token_id: Option<String>,
    /// Client involved in the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Request correlation id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Producing component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AccessLogSource>,
    /// Processing time as serialized by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    /// Log message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text when the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP status returned to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
    /// Caller IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Caller user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Bulk delete of console accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountsRequest {
    /// Accounts to delete.
    pub account_ids: Vec<String>,
}

/// Bulk delete of OAuth2 clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteClientsRequest {
    /// Clients to delete.
    pub client_ids: Vec<String>,
}

/// Bulk delete of scopes; also the body of the client-count query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteScopesRequest {
    /// Scopes to delete or count.
    pub scope_ids: Vec<String>,
}

/// Bulk delete of OAuth2 users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUsersRequest {
    /// Users to delete.
    pub user_ids: Vec<String>,
}

/// Bulk delete of issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTokensRequest {
    /// Tokens to delete.
    pub token_ids: Vec<String>,
}

/// New console account inside the current organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Login name.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Granted role.
    pub role: String,
}

/// Self-service sign-up creating an organization and its first administrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountWithOrganizationRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub password2: String,
    /// Display name.
    pub name: String,
    /// Organization display name.
    pub organization_name: String,
    /// Organization domain prefix.
    pub domain_prefix: String,
}

/// New scope definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateScopeRequest {
    /// Scope name.
    pub scope: String,
    /// Free-form description.
    pub description: String,
}

/// Password change for the signed-in account or reset for an OAuth2 user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    /// Current password; omitted for administrative resets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    /// New password.
    pub new_password: String,
    /// New password confirmation.
    pub new_password2: String,
}

/// Answer to a domain-prefix availability query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainPrefixAvailability {
    /// Whether another organization already uses the prefix.
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn page_decodes_nested_spring_layout() {
        let page: Page<OauthScope> = serde_json::from_value(json!({
            "content": [{"id": "s1", "scope": "read"}],
            "page": {"size": 10, "number": 2, "totalElements": 21, "totalPages": 3}
        }))
        .expect("nested page");

        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].scope.as_deref(), Some("read"));
        assert_eq!(page.page_size, 10);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_elements, Some(21));
        assert_eq!(page.last_page_index(), 2);
    }

    #[test]
    fn page_decodes_flat_layouts() {
        let flat: Page<Account> = serde_json::from_value(json!({
            "content": [],
            "totalPages": 4,
            "currentPage": 1,
            "pageSize": 25
        }))
        .expect("flat page");
        assert!(flat.is_empty());
        assert_eq!((flat.total_pages, flat.current_page, flat.page_size), (4, 1, 25));

        let legacy: Page<Account> = serde_json::from_value(json!({
            "content": [{"username": "alice"}],
            "totalPages": 1,
            "number": 0,
            "size": 10,
            "totalElements": 1,
            "pageable": {"sort": []}
        }))
        .expect("legacy page");
        assert_eq!(legacy.page_size, 10);
        assert_eq!(legacy.total_elements, Some(1));
    }

    #[test]
    fn page_content_is_taken_as_sent() {
        let page: Page<OauthScope> = serde_json::from_value(json!({
            "content": [{"id": "s1"}, {"id": "s2"}],
            "totalPages": 1,
            "currentPage": 0,
            "pageSize": 2
        }))
        .expect("full page");
        assert!(page.content.len() <= page.page_size as usize);

        let oversized: Page<OauthScope> = serde_json::from_value(json!({
            "content": [{"id": "s1"}, {"id": "s2"}, {"id": "s3"}],
            "totalPages": 1,
            "currentPage": 0,
            "pageSize": 2
        }))
        .expect("oversized page");
        assert_eq!(oversized.content.len(), 3);
        assert_eq!(oversized.page_size, 2);
    }

    #[test]
    fn page_encodes_flat_layout() {
        let page = Page {
            content: vec![DomainPrefixAvailability { exists: true }],
            total_pages: 1,
            current_page: 0,
            page_size: 10,
            total_elements: None,
        };
        assert_eq!(
            serde_json::to_value(&page).expect("encode"),
            json!({
                "content": [{"exists": true}],
                "totalPages": 1,
                "currentPage": 0,
                "pageSize": 10
            })
        );
        assert_eq!(Page::<Account>::empty(10).last_page_index(), 0);
    }

    #[test]
    fn error_body_tolerates_missing_and_numeric_fields() {
        let body: ErrorBody = serde_json::from_value(json!({
            "timestamp": 1_700_000_000_000_i64,
            "status": 400,
            "error": "Bad Request",
            "message": "Client description can not be empty",
            "path": "/api/oauth2-client"
        }))
        .expect("error body");
        assert_eq!(body.timestamp, "1700000000000");
        assert_eq!(body.status, Some(400));

        let minimal: ErrorBody =
            serde_json::from_value(json!({"message": "boom"})).expect("minimal body");
        assert_eq!(minimal.error, "");
        assert_eq!(minimal.timestamp, "");

        assert!(serde_json::from_value::<ErrorBody>(json!({"error": "x"})).is_err());
    }

    #[test]
    fn client_draft_skips_unset_fields() {
        let draft = OauthClient {
            description: Some("demo".into()),
            grant_types: vec![GrantType::ClientCredentials, GrantType::AuthorizationCode],
            enabled: Some(true),
            expiration: Some("1h".into()),
            refresh_expiration: Some("24h".into()),
            ..OauthClient::default()
        };
        assert_eq!(
            serde_json::to_value(&draft).expect("encode"),
            json!({
                "description": "demo",
                "grantTypes": ["client_credentials", "authorization_code"],
                "enabled": true,
                "redirectUrls": [],
                "expiration": "1h",
                "refreshExpiration": "24h",
                "scopeIds": []
            })
        );
        assert!(draft.allows(GrantType::AuthorizationCode));
        assert!(!draft.allows(GrantType::Password));
    }

    #[test]
    fn grant_type_parses_wire_names() {
        assert_eq!(
            GrantType::parse(" refresh_token "),
            Some(GrantType::RefreshToken)
        );
        assert_eq!(GrantType::parse("implicit"), None);
        for grant in GrantType::ALL {
            assert_eq!(GrantType::parse(grant.as_str()), Some(grant));
        }
    }

    #[test]
    fn oauth_user_uses_server_field_names() {
        let user: OauthUser = serde_json::from_value(json!({
            "id": "u1",
            "username": "bob",
            "enabled": true,
            "metadata": "{}",
            "using2Fa": true,
            "createTime": "2024-01-02T03:04:05Z"
        }))
        .expect("user");
        assert_eq!(user.using_2fa, Some(true));
        assert_eq!(
            user.create_time,
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single()
        );
    }

    #[test]
    fn token_expiry_and_unknown_enums() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("time");
        let token: OauthToken = serde_json::from_value(json!({
            "id": "t1",
            "expiration": "2024-05-31T23:59:59Z",
            "tokenType": "SOMETHING_NEW",
            "scopes": ["read"]
        }))
        .expect("token");
        assert!(token.is_expired_at(now));
        assert_eq!(token.token_type, Some(TokenType::Other));
        assert!(!OauthToken::default().is_expired_at(now));
    }

    #[test]
    fn account_admin_role_detection() {
        let admin = Account {
            roles: vec![ROLE_USER.into(), ROLE_ADMIN.into()],
            ..Account::default()
        };
        assert!(admin.is_admin());
        assert!(!Account::default().is_admin());
    }
}
