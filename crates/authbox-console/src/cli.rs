//! Argument parsing and command dispatch for the `authbox` binary.

use authbox_telemetry::init::{LogFormat, LoggingConfig, build_sha, init_logging};
use authbox_telemetry::{CommandSpanGuard, with_command_context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{
    AppContext, CliDependencies, CliError, CliResult, report_navigation, report_toasts,
};
use crate::commands::accounts::handle_accounts;
use crate::commands::clients::handle_clients;
use crate::commands::directory::{handle_scopes, handle_users};
use crate::commands::session::{
    handle_account, handle_organization, handle_register, handle_whoami,
};
use crate::commands::tokens::{handle_access_log, handle_tokens};
use crate::error::ConsoleError;
use crate::views::{DEFAULT_PAGE_SIZE, PageCursor};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9090";

/// Parses CLI arguments, runs the requested command inside its trace context,
/// and reports notices. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let _span = CommandSpanGuard::new(trace_id.clone());
    with_command_context(trace_id.clone(), command_name, execute(cli, trace_id)).await
}

async fn execute(cli: Cli, trace_id: String) -> i32 {
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let Cli {
        username,
        password,
        output,
        yes,
        command,
        ..
    } = cli;

    if let Some(username) = username.as_deref().filter(|_| needs_session(&command)) {
        if let Err(err) = deps.sign_in(username, password.as_deref()).await {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    }

    let mut app = deps.into_context(output, yes);
    let result = dispatch(command, &mut app).await;

    report_toasts(app.console.toasts.drain());
    let navigation_code = report_navigation(app.console.take_navigation());

    match result {
        Ok(()) => navigation_code.unwrap_or(0),
        Err(err) => {
            let announced = err.was_reported()
                || matches!(err, CliError::Console(ConsoleError::SessionExpired { .. }));
            if !announced {
                eprintln!("error: {}", err.display_message());
            }
            err.exit_code()
        }
    }
}

async fn dispatch(command: Command, app: &mut AppContext) -> CliResult<()> {
    match command {
        Command::Whoami => handle_whoami(app).await,
        Command::Organization(command) => handle_organization(app, command).await,
        Command::Account(command) => handle_account(app, command).await,
        Command::Accounts(command) => handle_accounts(app, command).await,
        Command::Clients(command) => handle_clients(app, command).await,
        Command::Scopes(command) => handle_scopes(app, command).await,
        Command::Users(command) => handle_users(app, command).await,
        Command::Tokens(command) => handle_tokens(app, command).await,
        Command::AccessLog(args) => handle_access_log(app, args).await,
        Command::Register(args) => handle_register(app, args).await,
    }
}

const fn needs_session(command: &Command) -> bool {
    !matches!(command, Command::Register(_))
}

#[derive(Parser)]
#[command(name = "authbox", about = "Administration console for the Auth Box OAuth2 server")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "AUTHBOX_URL",
        value_parser = parse_url,
        default_value = DEFAULT_BASE_URL
    )]
    pub(crate) base_url: Url,
    #[arg(long, global = true, env = "AUTHBOX_USERNAME")]
    username: Option<String>,
    #[arg(long, global = true, env = "AUTHBOX_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, global = true, env = "AUTHBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,
    #[arg(
        long,
        global = true,
        env = "AUTHBOX_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "AUTHBOX_REGISTRATION_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub(crate) registration_enabled: bool,
    #[arg(
        long,
        global = true,
        env = "AUTHBOX_OAUTH_DOMAIN",
        default_value = "",
        help = "Parent domain of the OAuth2 hosts, e.g. auth.example.com"
    )]
    pub(crate) oauth_domain: String,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "AUTHBOX_LOG", default_value = "warn")]
    log_level: String,
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,
    #[arg(long, short = 'y', global = true, help = "Confirm destructive actions without prompting")]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the signed-in account and its organization.
    Whoami,
    #[command(subcommand)]
    Organization(OrganizationCommand),
    #[command(subcommand)]
    Account(AccountCommand),
    #[command(subcommand)]
    Accounts(AccountsCommand),
    #[command(subcommand)]
    Clients(ClientsCommand),
    #[command(subcommand)]
    Scopes(ScopesCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Tokens(TokensCommand),
    AccessLog(AccessLogArgs),
    Register(RegisterArgs),
}

#[derive(Subcommand)]
pub(crate) enum OrganizationCommand {
    Show,
    Update(OrganizationUpdateArgs),
    CheckPrefix(PrefixArgs),
}

#[derive(Args)]
pub(crate) struct OrganizationUpdateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) domain_prefix: Option<String>,
    #[arg(long)]
    pub(crate) address: Option<String>,
}

#[derive(Args)]
pub(crate) struct PrefixArgs {
    pub(crate) prefix: String,
}

#[derive(Subcommand)]
pub(crate) enum AccountCommand {
    Show,
    Update(AccountUpdateArgs),
    Password(PasswordArgs),
}

#[derive(Args)]
pub(crate) struct AccountUpdateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) new_username: Option<String>,
}

#[derive(Args)]
pub(crate) struct PasswordArgs {
    #[arg(long, help = "Current password (prompted when omitted)")]
    pub(crate) old_password: Option<String>,
    #[arg(long, help = "New password (prompted when omitted)")]
    pub(crate) new_password: Option<String>,
}

#[derive(Args, Clone, Copy)]
pub(crate) struct PageArgs {
    #[arg(long, default_value_t = 0, help = "Zero-based page index")]
    pub(crate) page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub(crate) page_size: u32,
}

impl PageArgs {
    pub(crate) const fn cursor(self) -> PageCursor {
        PageCursor::new(self.page_size, self.page)
    }
}

#[derive(Args)]
pub(crate) struct IdArgs {
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct IdsArgs {
    #[arg(required = true, num_args = 1..)]
    pub(crate) ids: Vec<String>,
    #[command(flatten)]
    pub(crate) page: PageArgs,
}

#[derive(Subcommand)]
pub(crate) enum AccountsCommand {
    List(PageArgs),
    Show(IdArgs),
    Create(AccountCreateArgs),
    Update(AccountsUpdateArgs),
    Enable(IdArgs),
    Disable(IdArgs),
    Delete(IdsArgs),
}

#[derive(Args)]
pub(crate) struct AccountCreateArgs {
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, help = "Role to grant (defaults to ROLE_USER)")]
    pub(crate) role: Option<String>,
    #[arg(long, help = "Initial password (prompted when omitted)")]
    pub(crate) initial_password: Option<String>,
}

#[derive(Args)]
pub(crate) struct AccountsUpdateArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) new_username: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum ClientsCommand {
    List(PageArgs),
    Show(IdArgs),
    Create(ClientFields),
    Update(ClientUpdateArgs),
    Enable(IdArgs),
    Disable(IdArgs),
    Delete(IdsArgs),
    RegenerateKeys(IdArgs),
    SetPrivateKey(PrivateKeyArgs),
    /// Print example token requests for one client, or for all of them.
    Examples(ClientExamplesArgs),
}

#[derive(Args)]
pub(crate) struct ClientExamplesArgs {
    pub(crate) id: Option<String>,
}

#[derive(Args)]
pub(crate) struct ClientFields {
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long = "grant", value_enum, help = "Allowed grant type (repeatable)")]
    pub(crate) grants: Vec<GrantArg>,
    #[arg(long = "redirect-url", help = "Redirect URL for the authorization code flow (repeatable)")]
    pub(crate) redirect_urls: Vec<String>,
    #[arg(long = "scope", help = "Scope id the client may request (repeatable)")]
    pub(crate) scopes: Vec<String>,
    #[arg(long, help = "Access token lifetime, e.g. 1h")]
    pub(crate) expiration: Option<String>,
    #[arg(long, help = "Refresh token lifetime, e.g. 24h")]
    pub(crate) refresh_expiration: Option<String>,
    #[arg(long, value_enum)]
    pub(crate) token_format: Option<TokenFormatArg>,
}

#[derive(Args)]
pub(crate) struct ClientUpdateArgs {
    pub(crate) id: String,
    #[command(flatten)]
    pub(crate) fields: ClientFields,
    #[arg(long = "remove-redirect-url")]
    pub(crate) remove_redirect_urls: Vec<String>,
}

#[derive(Args)]
pub(crate) struct PrivateKeyArgs {
    pub(crate) id: String,
    #[arg(short = 'f', long = "file", help = "PEM file holding the private key")]
    pub(crate) file: std::path::PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum GrantArg {
    ClientCredentials,
    Password,
    AuthorizationCode,
    RefreshToken,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum TokenFormatArg {
    Standard,
    Jwt,
}

#[derive(Subcommand)]
pub(crate) enum ScopesCommand {
    List(PageArgs),
    Create(ScopeCreateArgs),
    Update(ScopeUpdateArgs),
    Delete(IdsArgs),
}

#[derive(Args)]
pub(crate) struct ScopeCreateArgs {
    #[arg(long)]
    pub(crate) scope: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
}

#[derive(Args)]
pub(crate) struct ScopeUpdateArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) scope: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum UsersCommand {
    List(PageArgs),
    Show(IdArgs),
    Create(UserCreateArgs),
    Update(UserUpdateArgs),
    Enable(IdArgs),
    Disable(IdArgs),
    Delete(IdsArgs),
    ResetPassword(UserPasswordArgs),
}

#[derive(Args)]
pub(crate) struct UserCreateArgs {
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) initial_password: Option<String>,
    #[arg(long, help = "JSON metadata (defaults to {})")]
    pub(crate) metadata: Option<String>,
}

#[derive(Args)]
pub(crate) struct UserUpdateArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) new_username: Option<String>,
    #[arg(long)]
    pub(crate) metadata: Option<String>,
}

#[derive(Args)]
pub(crate) struct UserPasswordArgs {
    pub(crate) id: String,
    #[arg(long, help = "New password; omit to let the server reset it")]
    pub(crate) new_password: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum TokensCommand {
    List(TokenListArgs),
    Show(TokenShowArgs),
    Delete(IdsArgs),
}

#[derive(Args)]
pub(crate) struct TokenListArgs {
    #[arg(long, conflicts_with = "user")]
    pub(crate) client: Option<String>,
    #[arg(long)]
    pub(crate) user: Option<String>,
    #[command(flatten)]
    pub(crate) page: PageArgs,
}

#[derive(Args)]
pub(crate) struct TokenShowArgs {
    #[arg(value_enum)]
    pub(crate) by: TokenLookup,
    pub(crate) value: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum TokenLookup {
    Hash,
    Token,
    Id,
}

impl TokenLookup {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Token => "token",
            Self::Id => "id",
        }
    }
}

#[derive(Args)]
pub(crate) struct AccessLogArgs {
    pub(crate) request_id: String,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) organization: String,
    #[arg(long, help = "Domain prefix (suggested from the organization name when omitted)")]
    pub(crate) domain_prefix: Option<String>,
    #[arg(long, help = "Password (prompted twice when omitted)")]
    pub(crate) new_password: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Whoami => "whoami",
        Command::Organization(OrganizationCommand::Show) => "organization_show",
        Command::Organization(OrganizationCommand::Update(_)) => "organization_update",
        Command::Organization(OrganizationCommand::CheckPrefix(_)) => "organization_check_prefix",
        Command::Account(AccountCommand::Show) => "account_show",
        Command::Account(AccountCommand::Update(_)) => "account_update",
        Command::Account(AccountCommand::Password(_)) => "account_password",
        Command::Accounts(AccountsCommand::List(_)) => "accounts_list",
        Command::Accounts(AccountsCommand::Show(_)) => "accounts_show",
        Command::Accounts(AccountsCommand::Create(_)) => "accounts_create",
        Command::Accounts(AccountsCommand::Update(_)) => "accounts_update",
        Command::Accounts(AccountsCommand::Enable(_) | AccountsCommand::Disable(_)) => {
            "accounts_set_enabled"
        }
        Command::Accounts(AccountsCommand::Delete(_)) => "accounts_delete",
        Command::Clients(ClientsCommand::List(_)) => "clients_list",
        Command::Clients(ClientsCommand::Show(_)) => "clients_show",
        Command::Clients(ClientsCommand::Create(_)) => "clients_create",
        Command::Clients(ClientsCommand::Update(_)) => "clients_update",
        Command::Clients(ClientsCommand::Enable(_) | ClientsCommand::Disable(_)) => {
            "clients_set_enabled"
        }
        Command::Clients(ClientsCommand::Delete(_)) => "clients_delete",
        Command::Clients(ClientsCommand::RegenerateKeys(_)) => "clients_regenerate_keys",
        Command::Clients(ClientsCommand::SetPrivateKey(_)) => "clients_set_private_key",
        Command::Clients(ClientsCommand::Examples(_)) => "clients_examples",
        Command::Scopes(ScopesCommand::List(_)) => "scopes_list",
        Command::Scopes(ScopesCommand::Create(_)) => "scopes_create",
        Command::Scopes(ScopesCommand::Update(_)) => "scopes_update",
        Command::Scopes(ScopesCommand::Delete(_)) => "scopes_delete",
        Command::Users(UsersCommand::List(_)) => "users_list",
        Command::Users(UsersCommand::Show(_)) => "users_show",
        Command::Users(UsersCommand::Create(_)) => "users_create",
        Command::Users(UsersCommand::Update(_)) => "users_update",
        Command::Users(UsersCommand::Enable(_) | UsersCommand::Disable(_)) => "users_set_enabled",
        Command::Users(UsersCommand::Delete(_)) => "users_delete",
        Command::Users(UsersCommand::ResetPassword(_)) => "users_reset_password",
        Command::Tokens(TokensCommand::List(_)) => "tokens_list",
        Command::Tokens(TokensCommand::Show(_)) => "tokens_show",
        Command::Tokens(TokensCommand::Delete(_)) => "tokens_delete",
        Command::AccessLog(_) => "access_log",
        Command::Register(_) => "register",
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_url_rejects_invalid_input() {
        let err = parse_url("not-a-url").expect_err("invalid URL should fail");
        assert!(err.contains("invalid URL"));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "authbox",
            "accounts",
            "list",
            "--page",
            "2",
            "--output",
            "json",
            "--base-url",
            "http://auth.example.com",
            "--yes",
        ])
        .expect("parse");

        assert!(cli.yes);
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.base_url.as_str(), "http://auth.example.com/");
        match cli.command {
            Command::Accounts(AccountsCommand::List(page)) => {
                assert_eq!(page.cursor(), PageCursor::new(10, 2));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn delete_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["authbox", "accounts", "delete"]).is_err());
        assert!(Cli::try_parse_from(["authbox", "tokens", "list", "--client", "c", "--user", "u"]).is_err());
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(command_label(&Command::Whoami), "whoami");
        assert_eq!(
            command_label(&Command::Accounts(AccountsCommand::Disable(IdArgs {
                id: "a1".into()
            }))),
            "accounts_set_enabled"
        );
        assert!(!needs_session(&Command::Register(RegisterArgs {
            username: "u".into(),
            name: "n".into(),
            organization: "o".into(),
            domain_prefix: None,
            new_password: None,
        })));
    }
}
