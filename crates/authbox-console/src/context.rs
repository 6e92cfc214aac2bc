//! Per-session UI state passed explicitly to every view.
//!
//! # Design
//! - Holds the gateway, the toast queue and busy controls, the signed-in
//!   organization/account and app properties. A navigation slot records
//!   "go elsewhere" requests.
//! - [`ConsoleContext::settle`] is the one place gateway outcomes turn into
//!   side effects. Every failure resets the busy controls first.
//! - Calls are independent; concurrent loads are applied in arrival order.

use authbox_api_models::{Account, Organization};
use authbox_telemetry::{current_command, current_trace_id};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::busy::BusyControls;
use crate::error::{ConsoleError, ConsoleResult};
use crate::gateway::{ApiOutcome, ApiRequest, ExpirySignal, Gateway};
use crate::notice::{ACCESS_DENIED_MESSAGE, Navigation, ToastQueue};

/// Server-provided switches that shape which screens are available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppProperties {
    /// Whether self-service registration is offered.
    pub registration_enabled: bool,
    /// Parent domain of the organizations' OAuth2 hosts; empty when each
    /// domain prefix is a host on its own.
    pub domain: String,
}

impl Default for AppProperties {
    fn default() -> Self {
        Self {
            registration_enabled: true,
            domain: String::new(),
        }
    }
}

/// Organization and account of the signed-in user, once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Organization the account belongs to.
    pub organization: Option<Organization>,
    /// Signed-in console account.
    pub account: Option<Account>,
}

/// Explicit UI-state store for one console session.
#[derive(Debug, Clone)]
pub struct ConsoleContext {
    gateway: Gateway,
    /// Pending user notices.
    pub toasts: ToastQueue,
    /// Submit controls and their busy state.
    pub busy: BusyControls,
    /// Signed-in organization and account.
    pub session: SessionState,
    /// Server-provided switches.
    pub properties: AppProperties,
    navigation: Option<Navigation>,
}

enum InitialData {
    Organization(ApiOutcome<Organization>),
    Account(ApiOutcome<Account>),
}

impl ConsoleContext {
    /// Fresh session state around a gateway.
    #[must_use]
    pub fn new(gateway: Gateway, properties: AppProperties) -> Self {
        Self {
            gateway,
            toasts: ToastQueue::new(),
            busy: BusyControls::new(),
            session: SessionState::default(),
            properties,
            navigation: None,
        }
    }

    /// Gateway used for every call of this session.
    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Record where the console should go next. The latest request wins.
    pub fn navigate(&mut self, target: Navigation) {
        tracing::debug!(?target, "navigation requested");
        self.navigation = Some(target);
    }

    /// Pending navigation, if any.
    #[must_use]
    pub const fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    /// Take the pending navigation.
    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    /// Queue a success notice.
    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.toasts.success(message);
    }

    /// Fail a pre-submit check: show the message like a business error, send nothing.
    ///
    /// # Errors
    ///
    /// Always returns [`ConsoleError::Validation`].
    pub fn reject<T>(&mut self, message: impl Into<String>) -> ConsoleResult<T> {
        let message = message.into();
        self.toasts.error(message.clone());
        Err(ConsoleError::Validation { message })
    }

    /// Surface a failed pre-submit check through [`Self::reject`].
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] when `check` failed.
    pub fn check<T>(&mut self, check: Result<T, String>) -> ConsoleResult<T> {
        check.or_else(|message| self.reject(message))
    }

    /// Attach a JSON body to `request`. An encoding failure is settled like a transport error.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Transport`] when the body cannot be serialised.
    pub fn with_json<B: Serialize + ?Sized>(
        &mut self,
        request: ApiRequest,
        body: &B,
    ) -> ConsoleResult<ApiRequest> {
        match request.json(body) {
            Ok(request) => Ok(request),
            Err(err) => self.settle(ApiOutcome::TransportError(err.to_string())),
        }
    }

    /// Turn a gateway outcome into data or a surfaced failure.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown, logged or turned into a navigation.
    pub fn settle<T>(&mut self, outcome: ApiOutcome<T>) -> ConsoleResult<T> {
        let error = match outcome {
            ApiOutcome::Ok(value) => return Ok(value),
            ApiOutcome::SessionExpired(signal) => {
                self.busy.reset(None);
                let target = match signal {
                    ExpirySignal::LoginPage => Navigation::Logout,
                    ExpirySignal::ConnectionLost => Navigation::Reload,
                };
                tracing::info!(?signal, "session expired");
                self.navigate(target);
                ConsoleError::SessionExpired { signal }
            }
            ApiOutcome::AccessDenied => {
                self.busy.reset(None);
                self.toasts.error(ACCESS_DENIED_MESSAGE);
                ConsoleError::AccessDenied
            }
            ApiOutcome::BusinessError(body) => {
                self.busy.reset(None);
                self.toasts
                    .error_titled(body.error.clone(), body.message.clone());
                tracing::warn!(
                    timestamp = %body.timestamp,
                    message = %body.message,
                    error = %body.error,
                    command = current_command().as_deref().unwrap_or("-"),
                    trace_id = current_trace_id().as_deref().unwrap_or("-"),
                    "{}: {} {}",
                    body.timestamp,
                    body.message,
                    body.error
                );
                ConsoleError::Business { body }
            }
            ApiOutcome::TransportError(detail) => {
                self.busy.reset(None);
                tracing::warn!(
                    detail = %detail,
                    command = current_command().as_deref().unwrap_or("-"),
                    trace_id = current_trace_id().as_deref().unwrap_or("-"),
                    "request failed"
                );
                ConsoleError::Transport { detail }
            }
        };
        Err(error)
    }

    /// Issue a call and settle it, decoding the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure; see [`Self::settle`].
    pub async fn call<T: DeserializeOwned>(&mut self, request: &ApiRequest) -> ConsoleResult<T> {
        let outcome = self.gateway.call(request).await;
        self.settle(outcome)
    }

    /// Issue a call whose success body is irrelevant and settle it.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure; see [`Self::settle`].
    pub async fn call_discard(&mut self, request: &ApiRequest) -> ConsoleResult<()> {
        let outcome = self.gateway.call_discard(request).await;
        self.settle(outcome)
    }

    /// Like [`Self::call`], with `control` marked busy while the call is in flight.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure; see [`Self::settle`].
    pub async fn submit<T: DeserializeOwned>(
        &mut self,
        control: &str,
        request: &ApiRequest,
    ) -> ConsoleResult<T> {
        self.busy.start(control);
        let result = self.call(request).await;
        if result.is_ok() {
            self.busy.reset(Some(control));
        }
        result
    }

    /// Like [`Self::call_discard`], with `control` marked busy while the call is in flight.
    ///
    /// # Errors
    ///
    /// Returns the surfaced failure; see [`Self::settle`].
    pub async fn submit_discard(&mut self, control: &str, request: &ApiRequest) -> ConsoleResult<()> {
        self.busy.start(control);
        let result = self.call_discard(request).await;
        if result.is_ok() {
            self.busy.reset(Some(control));
        }
        result
    }

    /// Load the signed-in organization and account concurrently.
    ///
    /// Responses are applied as they arrive. Every failure is surfaced; the
    /// first one is returned.
    ///
    /// # Errors
    ///
    /// Returns the first surfaced failure.
    pub async fn load_initial_app_data(&mut self) -> ConsoleResult<()> {
        let mut pending: FuturesUnordered<BoxFuture<'static, InitialData>> =
            FuturesUnordered::new();

        let gateway = self.gateway.clone();
        pending.push(
            async move {
                let request = ApiRequest::get("/organization");
                InitialData::Organization(gateway.call(&request).await)
            }
            .boxed(),
        );
        let gateway = self.gateway.clone();
        pending.push(
            async move {
                let request = ApiRequest::get("/account");
                InitialData::Account(gateway.call(&request).await)
            }
            .boxed(),
        );

        let mut first_error = None;
        while let Some(loaded) = pending.next().await {
            let applied = match loaded {
                InitialData::Organization(outcome) => self
                    .settle(outcome)
                    .map(|organization| self.session.organization = Some(organization)),
                InitialData::Account(outcome) => self
                    .settle(outcome)
                    .map(|account| self.session.account = Some(account)),
            };
            if let Err(err) = applied {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::notice::ToastKind;
    use authbox_api_models::ErrorBody;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;

    pub(crate) fn context_for(server: &MockServer) -> ConsoleContext {
        let gateway = Gateway::with_client(
            Client::new(),
            server.base_url().parse().expect("valid URL"),
            None,
        )
        .expect("gateway");
        ConsoleContext::new(gateway, AppProperties::default())
    }

    fn offline_context() -> ConsoleContext {
        let gateway = Gateway::with_client(
            Client::new(),
            "http://127.0.0.1:9".parse().expect("valid URL"),
            None,
        )
        .expect("gateway");
        ConsoleContext::new(gateway, AppProperties::default())
    }

    #[test]
    fn login_page_navigates_to_logout_without_toast() {
        let mut ctx = offline_context();
        ctx.busy.register("save", "Save");
        ctx.busy.start("save");

        let result: ConsoleResult<()> =
            ctx.settle(ApiOutcome::SessionExpired(ExpirySignal::LoginPage));

        assert!(matches!(
            result,
            Err(ConsoleError::SessionExpired {
                signal: ExpirySignal::LoginPage
            })
        ));
        assert_eq!(ctx.navigation(), Some(&Navigation::Logout));
        assert!(ctx.toasts.toasts().is_empty());
        assert!(!ctx.busy.is_busy("save"));
    }

    #[test]
    fn connection_loss_reloads_without_toast() {
        let mut ctx = offline_context();
        let result: ConsoleResult<()> =
            ctx.settle(ApiOutcome::SessionExpired(ExpirySignal::ConnectionLost));
        assert!(result.is_err());
        assert_eq!(ctx.take_navigation(), Some(Navigation::Reload));
        assert_eq!(ctx.navigation(), None);
        assert!(ctx.toasts.toasts().is_empty());
    }

    #[test]
    fn access_denied_shows_generic_notice_and_resets_busy() {
        let mut ctx = offline_context();
        ctx.busy.register("a", "A");
        ctx.busy.register("b", "B");
        ctx.busy.start("a");
        ctx.busy.start("b");

        let result: ConsoleResult<()> = ctx.settle(ApiOutcome::AccessDenied);

        assert_eq!(result, Err(ConsoleError::AccessDenied));
        assert_eq!(ctx.toasts.toasts().len(), 1);
        assert_eq!(ctx.toasts.toasts()[0].message, "Access denied");
        assert_eq!(ctx.toasts.toasts()[0].title, None);
        assert!(ctx.busy.busy_ids().is_empty());
        assert_eq!(ctx.navigation(), None);
    }

    #[test]
    fn business_error_toasts_message_titled_with_error() {
        let mut ctx = offline_context();
        let body = ErrorBody {
            message: "Grant types list can not be empty".into(),
            error: "Bad Request".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            status: Some(400),
            path: None,
        };

        let result: ConsoleResult<()> = ctx.settle(ApiOutcome::BusinessError(body.clone()));

        assert_eq!(result, Err(ConsoleError::Business { body }));
        let toast = &ctx.toasts.toasts()[0];
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title.as_deref(), Some("Bad Request"));
        assert_eq!(toast.message, "Grant types list can not be empty");
    }

    #[test]
    fn transport_error_is_logged_not_toasted() {
        let mut ctx = offline_context();
        let result: ConsoleResult<()> =
            ctx.settle(ApiOutcome::TransportError("request failed with status 502".into()));
        assert!(matches!(result, Err(ConsoleError::Transport { .. })));
        assert!(ctx.toasts.toasts().is_empty());
    }

    #[test]
    fn reject_and_check_surface_validation_errors() {
        let mut ctx = offline_context();
        let result: ConsoleResult<()> = ctx.check(Err("Username can not be empty".to_string()));
        assert_eq!(
            result,
            Err(ConsoleError::validation("Username can not be empty"))
        );
        assert_eq!(ctx.toasts.toasts()[0].message, "Username can not be empty");
        assert_eq!(ctx.check(Ok::<_, String>(7)), Ok(7));
    }

    #[tokio::test]
    async fn submit_restores_control_on_success() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/organization");
            then.status(200).json_body(json!({"id": "o1", "name": "Acme"}));
        });
        let mut ctx = context_for(&server);
        ctx.busy.register("update-organization", "Update");

        let request = ApiRequest::post("/organization")
            .json(&json!({"name": "Acme"}))
            .expect("body");
        let organization: Organization = ctx
            .submit("update-organization", &request)
            .await
            .expect("update");

        assert_eq!(organization.name.as_deref(), Some("Acme"));
        assert_eq!(ctx.busy.label("update-organization"), Some("Update"));
        assert!(ctx.busy.is_enabled("update-organization"));
    }

    #[tokio::test]
    async fn initial_app_data_loads_organization_and_account() {
        let server = MockServer::start_async().await;
        let organization = server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(200)
                .json_body(json!({"id": "o1", "name": "Acme", "domainPrefix": "acme"}));
        });
        let account = server.mock(|when, then| {
            when.method(GET).path("/api/account");
            then.status(200)
                .json_body(json!({"id": "a1", "username": "admin", "roles": ["ROLE_ADMIN"]}));
        });

        let mut ctx = context_for(&server);
        ctx.load_initial_app_data().await.expect("initial data");

        organization.assert();
        account.assert();
        assert_eq!(
            ctx.session
                .organization
                .as_ref()
                .and_then(|org| org.domain_prefix.as_deref()),
            Some("acme")
        );
        assert!(ctx.session.account.as_ref().is_some_and(Account::is_admin));
    }

    #[tokio::test]
    async fn initial_app_data_keeps_partial_results() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/organization");
            then.status(403);
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/account");
            then.status(200).json_body(json!({"id": "a1"}));
        });

        let mut ctx = context_for(&server);
        let result = ctx.load_initial_app_data().await;

        assert_eq!(result, Err(ConsoleError::AccessDenied));
        assert!(ctx.session.account.is_some());
        assert!(ctx.session.organization.is_none());
        assert_eq!(ctx.toasts.toasts().len(), 1);
    }
}
