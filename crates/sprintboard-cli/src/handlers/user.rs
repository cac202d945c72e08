use anyhow::{anyhow, bail};
use serde::Serialize;
use sprintboard_domain::{NewUser, User, UserId, UserQuery};
use sprintboard_persistence::EntityStore;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{PasswordArgs, UserAction};
use crate::output;

#[derive(Serialize)]
struct UserSummary {
    id: UserId,
    username: String,
    full_name: String,
    is_active: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            is_active: user.is_active,
        }
    }
}

/// Only printed when a token is created or rotated.
#[derive(Serialize)]
struct UserWithToken {
    #[serde(flatten)]
    user: UserSummary,
    token: String,
}

impl From<User> for UserWithToken {
    fn from(user: User) -> Self {
        let token = user.token.clone();
        Self {
            user: user.into(),
            token,
        }
    }
}

async fn find(store: &dyn EntityStore, username: &str) -> anyhow::Result<User> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("User not found: {}", username))
}

async fn read_password(args: PasswordArgs) -> anyhow::Result<String> {
    let password = if args.password_stdin {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        match args.password {
            Some(password) => password,
            None => bail!("A password is required: use --password-stdin or SPRINTBOARD_PASSWORD"),
        }
    };
    if password.is_empty() {
        bail!("Password may not be blank.");
    }
    Ok(password)
}

async fn set_active(store: &dyn EntityStore, username: &str, active: bool) -> anyhow::Result<User> {
    let mut user = find(store, username).await?;
    user.is_active = active;
    let user = store.update_user(&user).await?;
    tracing::info!(username = %user.username, active, "User activation changed");
    Ok(user)
}

pub async fn handle(store: &dyn EntityStore, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::Add {
            username,
            password,
            full_name,
        } => {
            let password = read_password(password).await?;
            let mut new_user = NewUser::new(username.trim(), &password)?;
            if let Some(full_name) = full_name {
                new_user = new_user.with_full_name(full_name);
            }
            let user = store.insert_user(new_user).await?;
            output::output_success(UserWithToken::from(user))?;
        }
        UserAction::Passwd { username, password } => {
            let mut user = find(store, &username).await?;
            user.set_password(&read_password(password).await?)?;
            let user = store.update_user(&user).await?;
            tracing::info!(username = %user.username, "Password changed");
            output::output_success(UserSummary::from(user))?;
        }
        UserAction::List => {
            let users = UserQuery::new().execute(store.list_users().await?);
            output::output_list(users.into_iter().map(UserSummary::from).collect())?;
        }
        UserAction::Get { username } => {
            let user = find(store, &username).await?;
            output::output_success(UserSummary::from(user))?;
        }
        UserAction::Deactivate { username } => {
            let user = set_active(store, &username, false).await?;
            output::output_success(UserSummary::from(user))?;
        }
        UserAction::Activate { username } => {
            let user = set_active(store, &username, true).await?;
            output::output_success(UserSummary::from(user))?;
        }
        UserAction::Token { username } => {
            let mut user = find(store, &username).await?;
            user.rotate_token();
            let user = store.update_user(&user).await?;
            output::output_success(UserWithToken::from(user))?;
        }
        UserAction::Remove { username } => {
            let user = find(store, &username).await?;
            store.delete_user(user.id).await?;
            output::output_success(serde_json::json!({ "deleted": user.username }))?;
        }
    }
    Ok(())
}
