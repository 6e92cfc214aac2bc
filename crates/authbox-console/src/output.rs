//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use authbox_api_models::{
    AccessLog, Account, OauthClient, OauthScope, OauthToken, OauthUser, Organization, Page,
    TokenFormat, TokenType,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::context::SessionState;
use crate::pager::page_window;
use crate::views::access_log::RequestSummary;
use crate::views::client_examples::ClientExamples;

const MASK: &str = "*****";
const MASK_VISIBLE_CHARS: usize = 8;
const MASK_MIN_CHARS: usize = 10;

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_session(session: &SessionState, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "organization": session.organization,
                "account": session.account,
            });
            print_json(&document)?;
        }
        OutputFormat::Table => {
            if let Some(account) = &session.account {
                let role = if account.is_admin() { "admin" } else { "user" };
                println!(
                    "signed in as: {} ({role})",
                    text(account.username.as_deref())
                );
            }
            if let Some(organization) = &session.organization {
                println!(
                    "organization: {} [{}]",
                    text(organization.name.as_deref()),
                    text(organization.domain_prefix.as_deref())
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_organization(organization: &Organization, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(organization)?,
        OutputFormat::Table => {
            println!("id: {}", text(organization.id.as_deref()));
            println!("name: {}", text(organization.name.as_deref()));
            println!("domain prefix: {}", text(organization.domain_prefix.as_deref()));
            if let Some(address) = &organization.address {
                println!("address: {address}");
            }
            println!("enabled: {}", flag(organization.enabled));
            println!("created: {}", timestamp(organization.create_time));
        }
    }
    Ok(())
}

pub(crate) fn render_account(account: &Account, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(account)?,
        OutputFormat::Table => {
            println!("id: {}", text(account.id.as_deref()));
            println!("username: {}", text(account.username.as_deref()));
            println!("name: {}", text(account.name.as_deref()));
            println!("roles: {}", account.roles.join(", "));
            println!("enabled: {}", flag(account.enabled));
            println!("created: {}", timestamp(account.create_time));
        }
    }
    Ok(())
}

pub(crate) fn render_accounts(page: &Page<Account>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:<36} {:<24} {:<8} {:<10} NAME", "ID", "USERNAME", "ENABLED", "ROLE");
            for account in &page.content {
                let role = if account.is_admin() { "admin" } else { "user" };
                println!(
                    "{:<36} {:<24} {:<8} {:<10} {}",
                    text(account.id.as_deref()),
                    text(account.username.as_deref()),
                    flag(account.enabled),
                    role,
                    text(account.name.as_deref())
                );
            }
            print_page_footer(page);
        }
    }
    Ok(())
}

pub(crate) fn render_client(client: &OauthClient, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(client)?,
        OutputFormat::Table => {
            println!("id: {}", text(client.id.as_deref()));
            println!("description: {}", text(client.description.as_deref()));
            if let Some(secret) = &client.secret {
                println!("secret: {}", mask_secret(secret));
            }
            println!("enabled: {}", flag(client.enabled));
            println!("grant types: {}", grant_list(client));
            if !client.redirect_urls.is_empty() {
                println!("redirect urls:");
                for url in &client.redirect_urls {
                    println!("  - {url}");
                }
            }
            println!("scopes: {}", client.scope_ids.join(", "));
            println!("expiration: {}", text(client.expiration.as_deref()));
            if let Some(refresh) = &client.refresh_expiration {
                println!("refresh expiration: {refresh}");
            }
            println!("token format: {}", token_format(client.token_format));
            if let Some(public_key) = &client.public_key {
                println!("public key:\n{public_key}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_clients(page: &Page<OauthClient>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:<36} {:<8} {:<10} {:<48} DESCRIPTION", "ID", "ENABLED", "FORMAT", "GRANTS");
            for client in &page.content {
                println!(
                    "{:<36} {:<8} {:<10} {:<48} {}",
                    text(client.id.as_deref()),
                    flag(client.enabled),
                    token_format(client.token_format),
                    grant_list(client),
                    text(client.description.as_deref())
                );
            }
            print_page_footer(page);
        }
    }
    Ok(())
}

pub(crate) fn render_client_examples(
    clients: &[ClientExamples],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(clients)?,
        OutputFormat::Table => {
            if clients.is_empty() {
                println!("No clients.");
            }
            for client in clients {
                println!("client: {} {}", client.client_id, client.description);
                if client.examples.is_empty() {
                    println!("  (no grant types allowed)");
                }
                for example in &client.examples {
                    println!("  {}:", example.grant.as_str());
                    for command in &example.commands {
                        println!("    {command}");
                    }
                }
                println!();
            }
        }
    }
    Ok(())
}

pub(crate) fn render_scope(scope: &OauthScope, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(scope)?,
        OutputFormat::Table => {
            println!("id: {}", text(scope.id.as_deref()));
            println!("scope: {}", text(scope.scope.as_deref()));
            println!("description: {}", text(scope.description.as_deref()));
        }
    }
    Ok(())
}

pub(crate) fn render_scopes(page: &Page<OauthScope>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:<36} {:<24} DESCRIPTION", "ID", "SCOPE");
            for scope in &page.content {
                println!(
                    "{:<36} {:<24} {}",
                    text(scope.id.as_deref()),
                    text(scope.scope.as_deref()),
                    text(scope.description.as_deref())
                );
            }
            print_page_footer(page);
        }
    }
    Ok(())
}

pub(crate) fn render_user(user: &OauthUser, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(user)?,
        OutputFormat::Table => {
            println!("id: {}", text(user.id.as_deref()));
            println!("username: {}", text(user.username.as_deref()));
            println!("enabled: {}", flag(user.enabled));
            println!("2fa: {}", flag(user.using_2fa));
            println!("metadata: {}", text(user.metadata.as_deref()));
            println!("created: {}", timestamp(user.create_time));
        }
    }
    Ok(())
}

pub(crate) fn render_users(page: &Page<OauthUser>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:<36} {:<8} {:<5} USERNAME", "ID", "ENABLED", "2FA");
            for user in &page.content {
                println!(
                    "{:<36} {:<8} {:<5} {}",
                    text(user.id.as_deref()),
                    flag(user.enabled),
                    flag(user.using_2fa),
                    text(user.username.as_deref())
                );
            }
            print_page_footer(page);
        }
    }
    Ok(())
}

pub(crate) fn render_token(
    token: &OauthToken,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(token)?,
        OutputFormat::Table => {
            println!("id: {}", text(token.id.as_deref()));
            println!("type: {}", token_type(token.token_type));
            println!("hash: {}", text(token.hash.as_deref()));
            println!("client: {}", text(token.client_id.as_deref()));
            if let Some(user) = &token.oauth_user_id {
                println!("user: {user}");
            }
            println!("scopes: {}", token.scopes.join(" "));
            println!(
                "expires: {}{}",
                timestamp(token.expiration),
                if token.is_expired_at(now) { " (expired)" } else { "" }
            );
            if let Some(linked) = &token.linked_token_id {
                println!("linked token: {linked}");
            }
            if let Some(request_id) = &token.request_id {
                println!("request: {request_id}");
            }
            if let Some(ip) = &token.ip {
                println!("ip: {ip}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_tokens(
    page: &Page<OauthToken>,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:<36} {:<8} {:<36} {:<25} SCOPES", "ID", "TYPE", "CLIENT", "EXPIRES");
            for token in &page.content {
                let expires = if token.is_expired_at(now) {
                    "expired".to_string()
                } else {
                    timestamp(token.expiration)
                };
                println!(
                    "{:<36} {:<8} {:<36} {:<25} {}",
                    text(token.id.as_deref()),
                    token_type(token.token_type),
                    text(token.client_id.as_deref()),
                    expires,
                    token.scopes.join(" ")
                );
            }
            print_page_footer(page);
        }
    }
    Ok(())
}

pub(crate) fn render_access_log(
    entries: &Page<AccessLog>,
    summary: Option<&RequestSummary>,
    ip_details: Option<&Value>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "entries": entries,
                "ipDetails": ip_details,
            });
            print_json(&document)?;
        }
        OutputFormat::Table => {
            if let Some(summary) = summary {
                println!("ip: {}", text(summary.ip.as_deref()));
                println!("user agent: {}", text(summary.user_agent.as_deref()));
                println!("started: {}", timestamp(summary.timestamp));
                if let Some(status) = summary.status_code {
                    println!("status: {status}");
                }
                if let Some(error) = &summary.error {
                    println!("error: {error}");
                }
            }
            if let Some(details) = ip_details {
                let text = serde_json::to_string(details)
                    .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
                println!("ip details: {text}");
            }
            println!();
            println!("{:<25} {:<6} {:<20} MESSAGE", "TIME", "STATUS", "ERROR");
            for entry in &entries.content {
                println!(
                    "{:<25} {:<6} {:<20} {}",
                    timestamp(entry.create_time),
                    entry
                        .status_code
                        .map_or_else(|| "-".to_string(), |code| code.to_string()),
                    text(entry.error.as_deref()),
                    text(entry.message.as_deref())
                );
            }
        }
    }
    Ok(())
}

/// Hide all but the start of a secret. Short secrets are hidden entirely.
pub(crate) fn mask_secret(secret: &str) -> String {
    if secret.chars().count() < MASK_MIN_CHARS {
        return MASK.to_string();
    }
    let visible: String = secret.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{visible}...")
}

/// Page window line: zero-based page numbers with the current one bracketed.
pub(crate) fn format_page_window<T>(page: &Page<T>) -> String {
    let current = i64::from(page.current_page);
    let stops: Vec<String> = page_window(page)
        .into_iter()
        .map(|stop| {
            if stop == current {
                format!("[{stop}]")
            } else {
                stop.to_string()
            }
        })
        .collect();
    let mut line = format!(
        "page {} of {}: {}",
        page.current_page,
        page.total_pages.max(1),
        stops.join(" ")
    );
    if let Some(total) = page.total_elements {
        line.push_str(&format!(" ({total} total)"));
    }
    line
}

fn print_page_footer<T>(page: &Page<T>) {
    if page.is_empty() {
        println!("(no entries)");
    }
    println!("{}", format_page_window(page));
}

fn text(value: Option<&str>) -> &str {
    value.filter(|value| !value.is_empty()).unwrap_or("-")
}

const fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |time| time.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn grant_list(client: &OauthClient) -> String {
    client
        .grant_types
        .iter()
        .map(|grant| grant.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

const fn token_format(format: Option<TokenFormat>) -> &'static str {
    match format {
        Some(TokenFormat::Standard) => "standard",
        Some(TokenFormat::Jwt) => "jwt",
        Some(TokenFormat::Other) => "other",
        None => "-",
    }
}

const fn token_type(kind: Option<TokenType>) -> &'static str {
    match kind {
        Some(TokenType::AccessToken) => "access",
        Some(TokenType::RefreshToken) => "refresh",
        Some(TokenType::Other) => "other",
        None => "-",
    }
}
