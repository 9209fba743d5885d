//! [`Args`] definitions for the `taskdeck` binary.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Task management from the terminal.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new account.
    Register {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in and store the session token.
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and discard the session token.
    Logout,
    /// Show the currently logged-in user.
    Whoami,
    /// List all tasks.
    List,
    /// Add a new task.
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show one task.
    Show { id: Uuid },
    /// Replace a task's title and description.
    Edit {
        id: Uuid,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Toggle a task's completion state.
    Done { id: Uuid },
    /// Delete a task.
    Rm { id: Uuid },
}
