//! Quill - a terminal client for a self-hosted micro-blogging server.
//!
//! Handles the full session lifecycle (password + TOTP login, persisted
//! tokens, forced logout on rejected tokens) and the post/like/comment
//! surface of the backend REST API.

mod api;
mod auth;
mod commands;
mod config;
mod feed;
mod models;
mod otp;
mod utils;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Ctx;
use models::UserUpdate;

/// Default page size when listing users.
const USER_LIST_LIMIT: u64 = 50;

#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Backend API base URL (overrides the config file)
    #[arg(long, global = true, env = "QUILL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account (prints the TOTP enrollment secret)
    Register { username: String, email: String },
    /// Log in with password and TOTP code
    Login {
        username: Option<String>,
        /// Save the password in the system keychain
        #[arg(long)]
        remember: bool,
    },
    /// Log out and clear the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Permanently delete your account
    DeleteAccount,
    /// Re-fetch the logged-in user's profile
    Refresh,
    /// Show the post feed with like/comment counts
    Feed {
        /// Only show posts by this user
        #[arg(long)]
        user: Option<String>,
    },
    /// Post operations
    #[command(subcommand)]
    Post(PostCommand),
    /// Like a post
    Like { post_id: String },
    /// Remove a like from a post
    Unlike { post_id: String },
    /// Comment operations
    #[command(subcommand)]
    Comment(CommentCommand),
    /// User operations
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand)]
enum PostCommand {
    /// Show one post with its comments
    Show { id: String },
    /// Create a new post
    Create { content: String },
    /// Edit one of your posts
    Edit { id: String, content: String },
    /// Delete one of your posts
    Delete { id: String },
}

#[derive(Subcommand)]
enum CommentCommand {
    /// Comment on a post
    Add { post_id: String, content: String },
    /// Edit one of your comments
    Edit { id: String, content: String },
    /// Delete one of your comments
    Delete { id: String },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Show a user's profile and recent posts
    Show { username: String },
    /// List registered users
    List {
        #[arg(long, default_value_t = USER_LIST_LIMIT)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Show all comments written by a user
    Comments { username: String },
    /// Show the posts a user has liked
    Likes { username: String },
    /// Update your profile
    Update(UpdateArgs),
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    bio: Option<String>,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut ctx = match Ctx::init(cli.api_url.as_deref()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut ctx, cli.command).await;
    if let Err(e) = result {
        ctx.handle_auth_failure(&e).await;
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(ctx: &mut Ctx, command: Command) -> Result<()> {
    debug!(base_url = %ctx.api.base_url(), "Dispatching command");

    match command {
        Command::Register { username, email } => {
            commands::account::register(ctx, &username, &email).await
        }
        Command::Login { username, remember } => {
            commands::account::login(ctx, username, remember).await
        }
        Command::Logout => commands::account::logout(ctx).await,
        Command::Whoami => commands::account::whoami(ctx).await,
        Command::DeleteAccount => commands::account::delete_account(ctx).await,
        Command::Refresh => commands::account::refresh(ctx).await,
        Command::Feed { user } => commands::posts::show_feed(ctx, user.as_deref()).await,
        Command::Post(cmd) => match cmd {
            PostCommand::Show { id } => commands::posts::show_post(ctx, &id).await,
            PostCommand::Create { content } => commands::posts::create_post(ctx, &content).await,
            PostCommand::Edit { id, content } => {
                commands::posts::edit_post(ctx, &id, &content).await
            }
            PostCommand::Delete { id } => commands::posts::delete_post(ctx, &id).await,
        },
        Command::Like { post_id } => commands::posts::like(ctx, &post_id).await,
        Command::Unlike { post_id } => commands::posts::unlike(ctx, &post_id).await,
        Command::Comment(cmd) => match cmd {
            CommentCommand::Add { post_id, content } => {
                commands::posts::add_comment(ctx, &post_id, &content).await
            }
            CommentCommand::Edit { id, content } => {
                commands::posts::edit_comment(ctx, &id, &content).await
            }
            CommentCommand::Delete { id } => commands::posts::delete_comment(ctx, &id).await,
        },
        Command::User(cmd) => match cmd {
            UserCommand::Show { username } => commands::users::show(ctx, &username).await,
            UserCommand::List { limit, offset } => commands::users::list(ctx, limit, offset).await,
            UserCommand::Comments { username } => commands::users::comments(ctx, &username).await,
            UserCommand::Likes { username } => commands::users::likes(ctx, &username).await,
            UserCommand::Update(args) => {
                let update = UserUpdate {
                    username: args.username,
                    email: args.email,
                    bio: args.bio,
                };
                commands::users::update(ctx, update).await
            }
        },
    }
}
