//! Console account administration.

use authbox_api_models::CreateAccountRequest;

use crate::cli::AccountsCommand;
use crate::client::{AppContext, CliResult, confirm_pending, read_secret};
use crate::output::{render_account, render_accounts};
use crate::views::accounts::AccountsView;

pub(crate) async fn handle_accounts(app: &mut AppContext, command: AccountsCommand) -> CliResult<()> {
    let mut view = AccountsView::mount(&mut app.console);
    match command {
        AccountsCommand::List(page) => {
            let accounts = view.load_accounts(&mut app.console, page.cursor()).await?;
            render_accounts(accounts, app.output)
        }
        AccountsCommand::Show(args) => {
            let account = view.load_account(&mut app.console, &args.id).await?;
            render_account(account, app.output)
        }
        AccountsCommand::Create(args) => {
            let password = match args.initial_password {
                Some(password) => password,
                None => read_secret("Initial password: ")?,
            };
            let request = CreateAccountRequest {
                username: args.username,
                password,
                name: args.name,
                role: args.role.unwrap_or_default(),
            };
            let account = view.create(&mut app.console, request).await?;
            render_account(&account, app.output)
        }
        AccountsCommand::Update(args) => {
            let mut account = view.load_account(&mut app.console, &args.id).await?.clone();
            if let Some(name) = args.name {
                account.name = Some(name);
            }
            if let Some(username) = args.new_username {
                account.username = Some(username);
            }
            let updated = view.update(&mut app.console, &args.id, &account).await?;
            render_account(updated, app.output)
        }
        AccountsCommand::Enable(args) => {
            view.set_enabled(&mut app.console, &args.id, true).await?;
            Ok(())
        }
        AccountsCommand::Disable(args) => {
            view.set_enabled(&mut app.console, &args.id, false).await?;
            Ok(())
        }
        AccountsCommand::Delete(args) => {
            view.load_accounts(&mut app.console, args.page.cursor()).await?;
            view.selection.select_all(args.ids);
            view.request_delete_selected();
            confirm_pending(&mut view, app).await?;
            Ok(())
        }
    }
}
