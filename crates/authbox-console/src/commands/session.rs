//! Signed-in identity, organization settings, own account and sign-up.

use authbox_api_models::{CreateAccountWithOrganizationRequest, PasswordChangeRequest};

use crate::cli::{AccountCommand, OrganizationCommand, PasswordArgs, RegisterArgs};
use crate::client::{AppContext, CliResult, read_secret};
use crate::output::{render_account, render_organization, render_session};
use crate::views::account::AccountView;
use crate::views::organization::{OrganizationView, suggest_domain_prefix};
use crate::views::registration::register;

pub(crate) async fn handle_whoami(app: &mut AppContext) -> CliResult<()> {
    app.console.load_initial_app_data().await?;
    render_session(&app.console.session, app.output)
}

pub(crate) async fn handle_organization(
    app: &mut AppContext,
    command: OrganizationCommand,
) -> CliResult<()> {
    let ctx = &mut app.console;
    let mut view = OrganizationView::mount(ctx);
    match command {
        OrganizationCommand::Show => {
            let organization = view.load(ctx).await?;
            render_organization(organization, app.output)
        }
        OrganizationCommand::Update(args) => {
            let mut organization = view.load(ctx).await?.clone();
            if let Some(name) = args.name {
                organization.name = Some(name);
            }
            if let Some(prefix) = args.domain_prefix {
                organization.domain_prefix = Some(prefix);
            }
            if let Some(address) = args.address {
                organization.address = Some(address);
            }
            let updated = view.update(ctx, organization).await?;
            render_organization(updated, app.output)
        }
        OrganizationCommand::CheckPrefix(args) => {
            let taken = OrganizationView::prefix_taken(ctx, &args.prefix).await?;
            if taken {
                println!("domain prefix '{}' is taken", args.prefix);
            } else {
                println!("domain prefix '{}' is available", args.prefix);
            }
            Ok(())
        }
    }
}

pub(crate) async fn handle_account(app: &mut AppContext, command: AccountCommand) -> CliResult<()> {
    let ctx = &mut app.console;
    let mut view = AccountView::mount(ctx);
    match command {
        AccountCommand::Show => {
            let account = view.load(ctx).await?;
            render_account(account, app.output)
        }
        AccountCommand::Update(args) => {
            let mut account = view.load(ctx).await?.clone();
            if let Some(name) = args.name {
                account.name = Some(name);
            }
            if let Some(username) = args.new_username {
                account.username = Some(username);
            }
            let updated = view.update(ctx, &account).await?;
            render_account(updated, app.output)
        }
        AccountCommand::Password(args) => {
            let change = password_change(args)?;
            view.change_password(ctx, &change).await?;
            Ok(())
        }
    }
}

fn password_change(args: PasswordArgs) -> CliResult<PasswordChangeRequest> {
    let old_password = match args.old_password {
        Some(password) => password,
        None => read_secret("Current password: ")?,
    };
    let (new_password, new_password2) = new_password_pair(args.new_password)?;
    Ok(PasswordChangeRequest {
        old_password: Some(old_password),
        new_password,
        new_password2,
    })
}

/// A password given on the command line counts as confirmed; otherwise prompt twice.
fn new_password_pair(given: Option<String>) -> CliResult<(String, String)> {
    if let Some(password) = given {
        return Ok((password.clone(), password));
    }
    let password = read_secret("New password: ")?;
    let confirmation = read_secret("Repeat new password: ")?;
    Ok((password, confirmation))
}

pub(crate) async fn handle_register(app: &mut AppContext, args: RegisterArgs) -> CliResult<()> {
    let (password, password2) = new_password_pair(args.new_password)?;
    let domain_prefix = args
        .domain_prefix
        .unwrap_or_else(|| suggest_domain_prefix(&args.organization));
    let request = CreateAccountWithOrganizationRequest {
        username: args.username,
        password,
        password2,
        name: args.name,
        organization_name: args.organization,
        domain_prefix,
    };
    let account = register(&mut app.console, request).await?;
    render_account(&account, app.output)
}
