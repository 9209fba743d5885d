//! `taskdeck` -- terminal client for the taskdeck task-management API.
//!
//! Thin consumer of `taskdeck-client`: parses a subcommand, performs one
//! API call, and prints the result. Session state lives in a token file
//! so a login survives across invocations.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                  | Description                    |
//! |-----------------------|----------|--------------------------|--------------------------------|
//! | `TASKDECK_API_URL`    | no       | `http://localhost:8000`  | Base URL of the backend        |
//! | `TASKDECK_TOKEN_FILE` | no       | `$HOME/.taskdeck/token`  | Where the bearer token is kept |
//! | `RUST_LOG`            | no       | `taskdeck=warn`          | Log filter                     |

mod args;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck_client::api::ApiClient;
use taskdeck_client::error::ApiError;
use taskdeck_client::session::{FileTokenStore, SessionStore};
use taskdeck_core::models::{Credentials, Task, TaskPayload};

use crate::args::{Args, Command};

/// Default backend URL when `TASKDECK_API_URL` is unset.
const DEFAULT_API_URL: &str = "http://localhost:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let base_url =
        std::env::var("TASKDECK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let client = ApiClient::new(base_url, session_store());

    if let Err(e) = run(&client, args.command).await {
        // A rejected credential means the stored session is gone; tell
        // the user where to go instead of just failing.
        if matches!(
            e.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthorized | ApiError::MissingIdentity)
        ) {
            eprintln!("Not logged in or session expired - run `taskdeck login <email>`.");
        }
        return Err(e);
    }
    Ok(())
}

/// Build the session store from the environment.
///
/// Without a resolvable token file path there is nowhere to persist a
/// login, so the session degrades to detached (always anonymous).
fn session_store() -> SessionStore {
    let path = std::env::var("TASKDECK_TOKEN_FILE").map(PathBuf::from).or_else(|_| {
        std::env::var("HOME").map(|home| PathBuf::from(home).join(".taskdeck").join("token"))
    });

    match path {
        Ok(path) => SessionStore::new(Arc::new(FileTokenStore::new(path))),
        Err(_) => {
            tracing::warn!(
                "Neither TASKDECK_TOKEN_FILE nor HOME is set; session will not persist"
            );
            SessionStore::detached()
        }
    }
}

/// Dispatch one subcommand against the API.
async fn run(client: &ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Register { email, password } => {
            let user = client
                .register(&Credentials { email, password })
                .await
                .context("registration failed")?;
            println!("Registered {} ({})", user.email, user.id);
            println!("Run `taskdeck login {}` to sign in.", user.email);
        }
        Command::Login { email, password } => {
            client
                .login(&Credentials { email, password })
                .await
                .context("login failed")?;
            match client.current_user_id() {
                Some(user_id) => println!("Logged in as user {user_id}"),
                None => println!("Logged in"),
            }
        }
        Command::Logout => {
            client.logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{} ({:?}, id {})", user.email, user.role, user.id);
        }
        Command::List => {
            let tasks = client.list_tasks(None).await?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in &tasks {
                print_task(task);
            }
        }
        Command::Add { title, description } => {
            let task = client
                .create_task(&TaskPayload { title, description }, None)
                .await?;
            println!("Created:");
            print_task(&task);
        }
        Command::Show { id } => {
            let task = client.get_task(id, None).await?;
            print_task(&task);
            if let Some(description) = &task.description {
                println!("    {description}");
            }
            println!("    created {}, updated {}", task.created_at, task.updated_at);
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let task = client
                .update_task(id, &TaskPayload { title, description }, None)
                .await?;
            println!("Updated:");
            print_task(&task);
        }
        Command::Done { id } => {
            let task = client.toggle_complete(id, None).await?;
            print_task(&task);
        }
        Command::Rm { id } => {
            client.delete_task(id, None).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

/// One-line task rendering: checkbox, id, title.
fn print_task(task: &Task) {
    let mark = if task.completed { 'x' } else { ' ' };
    println!("[{mark}] {}  {}", task.id, task.title);
}
