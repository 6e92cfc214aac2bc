//! Scopes and OAuth2 users.

use authbox_api_models::{CreateScopeRequest, OauthScope, OauthUser};

use crate::cli::{ScopesCommand, UsersCommand};
use crate::client::{AppContext, CliResult, confirm_pending};
use crate::output::{render_scope, render_scopes, render_user, render_users};
use crate::views::scopes::{Deletion, ScopesView};
use crate::views::users::UsersView;

pub(crate) async fn handle_scopes(app: &mut AppContext, command: ScopesCommand) -> CliResult<()> {
    let mut view = ScopesView::mount(&mut app.console);
    match command {
        ScopesCommand::List(page) => {
            let scopes = view.load(&mut app.console, page.cursor()).await?;
            render_scopes(scopes, app.output)
        }
        ScopesCommand::Create(args) => {
            let request = CreateScopeRequest {
                scope: args.scope,
                description: args.description,
            };
            let created = view.create(&mut app.console, &request).await?;
            render_scope(&created, app.output)
        }
        ScopesCommand::Update(args) => {
            let scope = OauthScope {
                id: Some(args.id),
                scope: Some(args.scope),
                description: args.description,
                ..OauthScope::default()
            };
            let updated = view.update(&mut app.console, &scope).await?;
            render_scope(&updated, app.output)
        }
        ScopesCommand::Delete(args) => {
            view.load(&mut app.console, args.page.cursor()).await?;
            view.selection.select_all(args.ids);
            if view.delete_selected(&mut app.console).await? == Deletion::AwaitingConfirmation {
                confirm_pending(&mut view, app).await?;
            }
            Ok(())
        }
    }
}

pub(crate) async fn handle_users(app: &mut AppContext, command: UsersCommand) -> CliResult<()> {
    let mut view = UsersView::mount(&mut app.console);
    match command {
        UsersCommand::List(page) => {
            let users = view.load_users(&mut app.console, page.cursor()).await?;
            render_users(users, app.output)
        }
        UsersCommand::Show(args) => {
            let user = view.load_user(&mut app.console, &args.id).await?;
            render_user(user, app.output)
        }
        UsersCommand::Create(args) => {
            let user = OauthUser {
                username: Some(args.username),
                password: args.initial_password,
                metadata: args.metadata,
                ..OauthUser::default()
            };
            let created = view.create(&mut app.console, user).await?;
            render_user(created, app.output)
        }
        UsersCommand::Update(args) => {
            let mut user = view.load_user(&mut app.console, &args.id).await?.clone();
            if let Some(username) = args.new_username {
                user.username = Some(username);
            }
            if let Some(metadata) = args.metadata {
                user.metadata = Some(metadata);
            }
            let updated = view.update(&mut app.console, &user).await?;
            render_user(updated, app.output)
        }
        UsersCommand::Enable(args) => {
            view.set_enabled(&mut app.console, &args.id, true).await?;
            Ok(())
        }
        UsersCommand::Disable(args) => {
            view.set_enabled(&mut app.console, &args.id, false).await?;
            Ok(())
        }
        UsersCommand::Delete(args) => {
            view.load_users(&mut app.console, args.page.cursor()).await?;
            view.selection.select_all(args.ids);
            view.request_delete_selected();
            confirm_pending(&mut view, app).await?;
            Ok(())
        }
        UsersCommand::ResetPassword(args) => {
            let user = view.load_user(&mut app.console, &args.id).await?.clone();
            let password = args.new_password.unwrap_or_default();
            view.reset_password(&mut app.console, &user, &password, &password)
                .await?;
            Ok(())
        }
    }
}
