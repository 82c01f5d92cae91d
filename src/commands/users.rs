//! User profile commands.

use anyhow::Result;

use crate::feed;
use crate::models::UserUpdate;
use crate::utils::{format_optional, format_timestamp, truncate};

use super::posts::resolve_user_id;
use super::Ctx;

/// How many of the user's recent posts to show under their profile.
const PROFILE_POST_LIMIT: usize = 5;

/// Maximum width of one-line content previews.
const PREVIEW_WIDTH: usize = 72;

/// Show a user's profile, activity counts, and recent posts. Accepts a
/// username or a numeric user id.
pub async fn show(ctx: &mut Ctx, name: &str) -> Result<()> {
    let user = match ctx.api.fetch_user_by_username(name).await? {
        Some(user) => user,
        None if name.chars().all(|c| c.is_ascii_digit()) && !name.is_empty() => {
            ctx.api.fetch_user(name).await?
        }
        None => anyhow::bail!("No user named '{name}'"),
    };

    let stats = feed::user_stats(&ctx.api, &user.id).await?;
    let posts = feed::load_feed(&ctx.api, Some(&user.id)).await?;

    println!("{} (id {})", user.username, user.id);
    println!("  bio: {}", format_optional(&user.bio, "-"));
    println!(
        "  {} posts, {} likes, {} comments",
        stats.posts, stats.likes, stats.comments
    );

    if !posts.is_empty() {
        println!("\nRecent posts:");
        for post in posts.iter().take(PROFILE_POST_LIMIT) {
            println!(
                "  #{} {} [{} likes, {} comments]",
                post.post.id,
                truncate(&post.post.content, PREVIEW_WIDTH),
                post.likes,
                post.comments
            );
        }
    }
    Ok(())
}

/// List registered users.
pub async fn list(ctx: &mut Ctx, limit: u64, offset: u64) -> Result<()> {
    let page = ctx.api.fetch_users(limit, offset).await?;
    if page.items.is_empty() {
        println!("No users.");
        return Ok(());
    }
    for user in &page.items {
        println!(
            "{} (id {}) {}",
            user.username,
            user.id,
            format_optional(&user.bio, "")
        );
    }
    if let Some(count) = page.count {
        println!("\n{} of {} users", page.items.len(), count);
    }
    Ok(())
}

/// Show all comments written by a user (assembled client-side; the server
/// cannot filter comments by author).
pub async fn comments(ctx: &mut Ctx, username: &str) -> Result<()> {
    let user_id = resolve_user_id(ctx, username).await?;
    let comments = feed::comments_by_user(&ctx.api, &user_id).await?;

    if comments.is_empty() {
        println!("No comments.");
        return Ok(());
    }
    for comment in &comments {
        let when = comment
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "post #{} ({}): {}",
            comment.post_id,
            when,
            truncate(&comment.content, PREVIEW_WIDTH)
        );
    }
    Ok(())
}

/// List the posts a user has liked.
pub async fn likes(ctx: &mut Ctx, username: &str) -> Result<()> {
    let user_id = resolve_user_id(ctx, username).await?;
    let likes = ctx.api.fetch_user_likes(&user_id).await?;

    if likes.is_empty() {
        println!("No likes.");
        return Ok(());
    }
    for like in &likes {
        let when = like
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!("post #{} ({})", like.post_id, when);
    }
    Ok(())
}

/// Update the logged-in user's profile, then refresh the cached record so
/// the session reflects what the backend committed.
pub async fn update(ctx: &mut Ctx, update: UserUpdate) -> Result<()> {
    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let user_id = ctx.require_user()?.id.clone();
    let updated = ctx.authed()?.update_user(&user_id, &update).await?;
    println!("Profile updated: {}", updated.username);

    let refreshed = ctx.session.refresh_user(&ctx.api).await?;
    println!("  bio: {}", format_optional(&refreshed.bio, "-"));
    Ok(())
}
