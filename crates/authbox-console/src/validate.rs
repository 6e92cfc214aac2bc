//! Checks performed before a form is submitted.
//!
//! Every function returns the user-facing message on failure; views pass the
//! result through [`crate::context::ConsoleContext::check`] so a failed check
//! shows a notice and never reaches the network.

use authbox_api_models::{GrantType, OauthClient};

/// Whether a form value is missing or only whitespace.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

fn require(value: Option<&str>, message: &str) -> Result<(), String> {
    if is_blank(value) {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Keep ASCII letters and digits only, lowercased.
#[must_use]
pub fn normalize_domain_prefix(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Normalize a domain prefix and reject it when nothing usable remains.
///
/// # Errors
///
/// Returns the notice text when the normalized prefix is empty.
pub fn validate_domain_prefix(raw: &str) -> Result<String, String> {
    let prefix = normalize_domain_prefix(raw);
    if prefix.is_empty() {
        Err("Domain prefix can not be empty".to_string())
    } else {
        Ok(prefix)
    }
}

/// Trimmed redirect URL ready to be appended to `existing`.
///
/// # Errors
///
/// Returns the notice text when the URL is blank, not http(s), or already listed.
pub fn redirect_url_to_add(existing: &[String], candidate: &str) -> Result<String, String> {
    let candidate = candidate.trim();
    if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
        return Err(
            "Redirect url should not be empty, and should start with 'http://' or 'https://'"
                .to_string(),
        );
    }
    if existing.iter().any(|url| url == candidate) {
        return Err("Redirect url already in the list".to_string());
    }
    Ok(candidate.to_string())
}

/// Client form consistency: description, grants, redirect URLs and lifetimes.
///
/// # Errors
///
/// Returns the first failing check's notice text.
pub fn validate_client(client: &OauthClient) -> Result<(), String> {
    require(
        client.description.as_deref(),
        "Client description can not be empty",
    )?;
    if client.grant_types.is_empty() {
        return Err("Grant types list can not be empty".to_string());
    }
    if client.allows(GrantType::AuthorizationCode) && client.redirect_urls.is_empty() {
        return Err(
            "Redirect url list can not be empty when 'authorization_code' is selected".to_string(),
        );
    }
    require(
        client.expiration.as_deref(),
        "Token expiration can not be empty",
    )?;
    if client.allows(GrantType::RefreshToken) {
        require(
            client.refresh_expiration.as_deref(),
            "Refresh token expiration can not be empty",
        )?;
    }
    Ok(())
}

/// A replacement private key must carry content.
///
/// # Errors
///
/// Returns the notice text when the key is blank.
pub fn validate_private_key(private_key: &str) -> Result<(), String> {
    require(Some(private_key), "Private key can not be empty")
}

/// New OAuth2 user: username required, metadata defaults elsewhere.
///
/// # Errors
///
/// Returns the notice text when the username is blank.
pub fn validate_new_user(username: &str) -> Result<(), String> {
    require(Some(username), "Username can not be empty")
}

/// Edited OAuth2 user: username and metadata required.
///
/// # Errors
///
/// Returns the first failing check's notice text.
pub fn validate_user_update(username: Option<&str>, metadata: Option<&str>) -> Result<(), String> {
    require(username, "User username can not be empty")?;
    require(metadata, "Metadata can not be empty")
}

/// New console account: username and role required.
///
/// # Errors
///
/// Returns the first failing check's notice text.
pub fn validate_new_account(username: &str, role: &str) -> Result<(), String> {
    require(Some(username), "Account username can not be empty")?;
    require(Some(role), "Account access role can not be empty")
}

/// Password pairs must match before they are sent.
///
/// # Errors
///
/// Returns the notice text when the confirmation differs.
pub fn validate_password_pair(password: &str, confirmation: &str) -> Result<(), String> {
    if password == confirmation {
        Ok(())
    } else {
        Err("Passwords do not match".to_string())
    }
}
