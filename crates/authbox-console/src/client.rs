//! Shared CLI plumbing: error type, session bootstrap, prompts and notice output.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use anyhow::anyhow;

use crate::cli::{Cli, OutputFormat};
use crate::context::{AppProperties, ConsoleContext};
use crate::error::ConsoleError;
use crate::gateway::{Gateway, GatewayConfig};
use crate::notice::{Navigation, Toast, ToastKind};
use crate::views::Confirmable;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Console(ConsoleError),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Console(error) => error.exit_code(),
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Console(error) => error.display_message(),
        }
    }

    /// Whether the message already reached the terminal as an error notice.
    pub(crate) const fn was_reported(&self) -> bool {
        match self {
            Self::Console(error) => error.was_toasted(),
            Self::Validation(_) | Self::Failure(_) => false,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConsoleError> for CliError {
    fn from(error: ConsoleError) -> Self {
        Self::Console(error)
    }
}

/// Console session plus the output switches every handler needs.
pub(crate) struct AppContext {
    pub(crate) console: ConsoleContext,
    pub(crate) output: OutputFormat,
    pub(crate) assume_yes: bool,
    pub(crate) interactive: bool,
}

/// Dependencies constructed from environment flags and CLI options.
pub(crate) struct CliDependencies {
    pub(crate) gateway: Gateway,
    pub(crate) properties: AppProperties,
}

impl CliDependencies {
    /// Construct the gateway from the global flags.
    pub(crate) fn from_env(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let config = GatewayConfig {
            base_url: cli.base_url.clone(),
            timeout: Duration::from_secs(cli.timeout),
            trace_id: trace_id.to_string(),
            access_token: cli.access_token.clone(),
        };
        let gateway = Gateway::new(&config)
            .map_err(|err| CliError::failure(anyhow!(err).context("failed to build HTTP client")))?;
        Ok(Self {
            gateway,
            properties: AppProperties {
                registration_enabled: cli.registration_enabled,
                domain: cli.oauth_domain.trim().to_string(),
            },
        })
    }

    /// Form-login when a username was given; the session cookie stays in the gateway.
    pub(crate) async fn sign_in(&self, username: &str, password: Option<&str>) -> CliResult<()> {
        let password = match password {
            Some(password) => password.to_string(),
            None => read_secret(&format!("Password for {username}: "))?,
        };
        self.gateway
            .sign_in(username, &password)
            .await
            .map_err(|err| CliError::failure(anyhow!(err).context("failed to sign in")))
    }

    pub(crate) fn into_context(self, output: OutputFormat, assume_yes: bool) -> AppContext {
        AppContext {
            console: ConsoleContext::new(self.gateway, self.properties),
            output,
            assume_yes,
            interactive: io::stdin().is_terminal(),
        }
    }
}

/// Read a secret from the terminal without echo.
pub(crate) fn read_secret(prompt: &str) -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::validation(format!(
            "cannot prompt without a terminal: {}",
            prompt.trim_end_matches([':', ' '])
        )));
    }
    rpassword::prompt_password(prompt)
        .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))
}

/// Settle a pending confirmation: `--yes` or an interactive `y` runs it,
/// anything else dismisses it and prints `Cancelled.`.
///
/// Returns whether the mutation ran.
pub(crate) async fn confirm_pending<V: Confirmable>(
    view: &mut V,
    app: &mut AppContext,
) -> CliResult<bool> {
    let Some(message) = view.pending_confirmation().map(str::to_string) else {
        return Ok(false);
    };
    let accepted = if app.assume_yes {
        true
    } else if app.interactive {
        prompt_yes_no(&message)?
    } else {
        eprintln!("{message}");
        eprintln!("not a terminal; pass --yes to confirm");
        false
    };
    if !accepted {
        view.dismiss();
        println!("Cancelled.");
        return Ok(false);
    }
    Ok(view.confirm(&mut app.console).await?)
}

fn prompt_yes_no(message: &str) -> CliResult<bool> {
    eprint!("{message} Continue? [y/N] ");
    io::stderr()
        .flush()
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| CliError::failure(anyhow!("failed to read answer: {err}")))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Print queued notices: successes to stdout, errors to stderr.
pub(crate) fn report_toasts(toasts: Vec<Toast>) {
    for toast in toasts {
        let line = format_toast(&toast);
        match toast.kind {
            ToastKind::Error => eprintln!("{line}"),
            ToastKind::Info | ToastKind::Success => println!("{line}"),
        }
    }
}

pub(crate) fn format_toast(toast: &Toast) -> String {
    match (toast.kind, toast.title.as_deref()) {
        (ToastKind::Error, Some(title)) => format!("error: {title}: {}", toast.message),
        (ToastKind::Error, None) => format!("error: {}", toast.message),
        (_, _) => toast.message.clone(),
    }
}

/// Report where the console asked to go. Returns the exit code it implies.
pub(crate) fn report_navigation(navigation: Option<Navigation>) -> Option<i32> {
    match navigation? {
        Navigation::Logout => {
            eprintln!("session expired; sign in again");
            Some(4)
        }
        Navigation::Reload => {
            eprintln!("no response from server; sign in again");
            Some(4)
        }
        Navigation::Back => {
            tracing::debug!("navigation back requested");
            None
        }
        Navigation::Route(route) => {
            tracing::debug!(route = %route, "navigation requested");
            None
        }
    }
}
