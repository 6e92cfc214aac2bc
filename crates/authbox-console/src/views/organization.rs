//! Organization settings screen.

use authbox_api_models::{DomainPrefixAvailability, Organization};

use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gateway::ApiRequest;
use crate::validate::{normalize_domain_prefix, validate_domain_prefix};
use crate::views::keep_applied;

/// Submit control of the update form.
pub const UPDATE_CONTROL: &str = "update-organization";

/// Organization of the signed-in account.
#[derive(Debug, Clone, Default)]
pub struct OrganizationView {
    organization: Option<Organization>,
}

impl OrganizationView {
    /// Register the view's controls.
    #[must_use]
    pub fn mount(ctx: &mut ConsoleContext) -> Self {
        ctx.busy.register(UPDATE_CONTROL, "Update organization");
        Self::default()
    }

    /// Loaded organization.
    #[must_use]
    pub const fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// Fetch the organization.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the call.
    pub async fn load(&mut self, ctx: &mut ConsoleContext) -> ConsoleResult<&Organization> {
        let organization = ctx.call(&ApiRequest::get("/organization")).await?;
        Ok(self.organization.insert(organization))
    }

    /// Save organization details, then refresh the session's organization and account.
    ///
    /// The domain prefix is normalized before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure of the update. A failed session refresh is only surfaced.
    pub async fn update(
        &mut self,
        ctx: &mut ConsoleContext,
        mut organization: Organization,
    ) -> ConsoleResult<&Organization> {
        if let Some(prefix) = organization.domain_prefix.as_deref() {
            let prefix = ctx.check(validate_domain_prefix(prefix))?;
            organization.domain_prefix = Some(prefix);
        }
        let request = ctx.with_json(ApiRequest::post("/organization"), &organization)?;
        let updated: Organization = ctx.submit(UPDATE_CONTROL, &request).await?;
        ctx.notify_success("Organization details updated");
        let organization = self.organization.insert(updated);
        keep_applied(ctx.load_initial_app_data().await);
        Ok(organization)
    }

    /// Whether another organization already uses `prefix`.
    ///
    /// # Errors
    ///
    /// Returns a validation failure for an unusable prefix, or the surfaced call failure.
    pub async fn prefix_taken(ctx: &mut ConsoleContext, prefix: &str) -> ConsoleResult<bool> {
        let prefix = ctx.check(validate_domain_prefix(prefix))?;
        let request = ApiRequest::get("/organization/available-domain-prefix").segment(prefix);
        let availability: DomainPrefixAvailability = ctx.call(&request).await?;
        Ok(availability.exists)
    }
}

/// Domain prefix derived from an organization name.
#[must_use]
pub fn suggest_domain_prefix(name: &str) -> String {
    normalize_domain_prefix(name)
}
