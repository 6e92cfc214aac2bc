//! Self-service sign-up of a new organization and its first account.

use authbox_api_models::{Account, CreateAccountWithOrganizationRequest};
use reqwest::Method;

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::{ApiRequest, LOGIN_PATH, REGISTRATION_PATH};
use crate::notice::Navigation;
use crate::validate::{validate_domain_prefix, validate_password_pair};

/// Submit control of the sign-up form.
pub const REGISTER_CONTROL: &str = "register";

/// Register an organization with its administrator account, then go to the login page.
///
/// # Errors
///
/// Returns a validation failure when registration is disabled, the passwords
/// differ or the domain prefix is unusable, or the surfaced call failure.
pub async fn register(
    ctx: &mut ConsoleContext,
    mut request: CreateAccountWithOrganizationRequest,
) -> ConsoleResult<Account> {
    if !ctx.properties.registration_enabled {
        return ctx.reject("Registration is disabled");
    }
    ctx.check(validate_password_pair(&request.password, &request.password2))?;
    request.domain_prefix = ctx.check(validate_domain_prefix(&request.domain_prefix))?;

    ctx.busy.register(REGISTER_CONTROL, "Register");
    let request = ctx.with_json(ApiRequest::new(Method::POST, REGISTRATION_PATH), &request)?;
    let account = ctx.submit(REGISTER_CONTROL, &request).await?;
    ctx.notify_success("Account created successfully");
    ctx.navigate(Navigation::Route(LOGIN_PATH.to_string()));
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context_for;
    use crate::error::ConsoleError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn sign_up() -> CreateAccountWithOrganizationRequest {
        CreateAccountWithOrganizationRequest {
            username: "founder".into(),
            password: "pw".into(),
            password2: "pw".into(),
            name: "Founder".into(),
            organization_name: "Acme".into(),
            domain_prefix: "Acme!".into(),
        }
    }

    #[tokio::test]
    async fn registration_posts_outside_api_prefix() {
        let server = MockServer::start_async().await;
        let register_mock = server.mock(|when, then| {
            when.method(POST).path("/registration").json_body(json!({
                "username": "founder",
                "password": "pw",
                "password2": "pw",
                "name": "Founder",
                "organizationName": "Acme",
                "domainPrefix": "acme"
            }));
            then.status(200)
                .json_body(json!({"id": "a1", "username": "founder"}));
        });

        let mut ctx = context_for(&server);
        let account = register(&mut ctx, sign_up()).await.expect("register");

        register_mock.assert();
        assert_eq!(account.username.as_deref(), Some("founder"));
        assert_eq!(ctx.navigation(), Some(&Navigation::Route("/login".into())));
    }

    #[tokio::test]
    async fn disabled_registration_is_refused_locally() {
        let server = MockServer::start_async().await;
        let mut ctx = context_for(&server);
        ctx.properties.registration_enabled = false;

        let result = register(&mut ctx, sign_up()).await;

        assert_eq!(
            result,
            Err(ConsoleError::validation("Registration is disabled"))
        );
    }
}
