//! Signed-in account screen.

use authbox_api_models::{Account, PasswordChangeRequest};

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::validate::validate_password_pair;

/// Submit control of the details form.
pub const UPDATE_CONTROL: &str = "update-account";
/// Submit control of the password form.
pub const PASSWORD_CONTROL: &str = "update-password";

/// Details of the signed-in account.
#[derive(Debug, Clone, Default)]
pub struct AccountView {
    account: Option<Account>,
}

impl AccountView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(UPDATE_CONTROL, "Update account");
        ctx.busy.register(PASSWORD_CONTROL, "Change password");
        Self::default()
    }

    /// Loaded account.
    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Fetch the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<&Account> {
        let account = ctx.call(&ApiRequest::get("/account")).await?;
        Ok(self.account.insert(account))
    }

    /// Save account details.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn update(
        &mut self,
        ctx: &mut ConsoleContext,
        account: &Account,
    ) -> ConsoleResult<&Account> {
        let request = ctx.with_json(ApiRequest::post("/account"), account)?;
        let updated = ctx.submit(UPDATE_CONTROL, &request).await?;
        ctx.notify_success("Account details updated");
        Ok(self.account.insert(updated))
    }

    /// Change the signed-in account's password.
    ///
    /// # Errors
    ///
    /// Returns a validation failure when the new passwords differ, or the surfaced call failure.
    pub async fn change_password(
        &mut self,
        ctx: &mut ConsoleContext,
        change: &PasswordChangeRequest,
    ) -> ConsoleResult<&Account> {
        let updated = change_password(ctx, change).await?;
        Ok(self.account.insert(updated))
    }
}

/// `POST /account/password` for the signed-in account.
///
/// # Errors
///
/// Returns a validation failure when the new passwords differ, or the surfaced call failure.
pub async fn change_password(
    ctx: &mut ConsoleContext,
    change: &PasswordChangeRequest,
) -> ConsoleResult<Account> {
    ctx.check(validate_password_pair(
        &change.new_password,
        &change.new_password2,
    ))?;
    let request = ctx.with_json(ApiRequest::post("/account/password"), change)?;
    let account = ctx.submit(PASSWORD_CONTROL, &request).await?;
    ctx.notify_success("Account password updated");
    Ok(account)
}
