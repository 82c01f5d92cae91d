//! Feed, post, like, and comment commands.

use anyhow::{Context, Result};

use crate::feed;
use crate::models::PostWithCounts;
use crate::utils::format_timestamp;

use super::Ctx;

/// Print the feed with per-post like/comment counts, optionally filtered
/// to one author.
pub async fn show_feed(ctx: &mut Ctx, username: Option<&str>) -> Result<()> {
    let user_id = match username {
        Some(name) => Some(resolve_user_id(ctx, name).await?),
        None => None,
    };

    let posts = feed::load_feed(&ctx.api, user_id.as_deref()).await?;
    if posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }
    for post in &posts {
        print_post(post);
    }
    Ok(())
}

/// Print one post with its comments and, when logged in, whether the
/// viewer has liked it.
pub async fn show_post(ctx: &mut Ctx, id: &str) -> Result<()> {
    let post = ctx.api.fetch_post(id).await?;
    let comments = ctx.api.fetch_comments(Some(id), None).await?;

    println!("{} ({})", post.author_name(), timestamp(&post.created_at));
    println!("{}", post.content);

    if let Some(viewer) = ctx.session.user() {
        let status = feed::like_status(&ctx.api, id, &viewer.id).await?;
        println!(
            "[{} likes{}]",
            status.like_count,
            if status.liked { ", liked by you" } else { "" }
        );
    } else {
        let likes = ctx.api.fetch_like_count(id).await?;
        println!("[{} likes]", likes);
    }

    if comments.items.is_empty() {
        println!("\nNo comments.");
    } else {
        println!("\nComments:");
        for comment in &comments.items {
            println!(
                "  {} ({}): {}",
                comment.author_name(),
                timestamp(&comment.created_at),
                comment.content
            );
        }
    }
    Ok(())
}

pub async fn create_post(ctx: &mut Ctx, content: &str) -> Result<()> {
    ctx.authed()?.create_post(content).await?;
    println!("Posted.");
    Ok(())
}

pub async fn edit_post(ctx: &mut Ctx, id: &str, content: &str) -> Result<()> {
    ctx.authed()?.update_post(id, content).await?;
    println!("Post {id} updated.");
    Ok(())
}

pub async fn delete_post(ctx: &mut Ctx, id: &str) -> Result<()> {
    ctx.authed()?.delete_post(id).await?;
    println!("Post {id} deleted.");
    Ok(())
}

pub async fn like(ctx: &mut Ctx, post_id: &str) -> Result<()> {
    ctx.authed()?.like_post(post_id).await?;
    println!("Liked post {post_id}.");
    Ok(())
}

pub async fn unlike(ctx: &mut Ctx, post_id: &str) -> Result<()> {
    ctx.authed()?.unlike_post(post_id).await?;
    println!("Unliked post {post_id}.");
    Ok(())
}

pub async fn add_comment(ctx: &mut Ctx, post_id: &str, content: &str) -> Result<()> {
    ctx.authed()?.create_comment(post_id, content).await?;
    println!("Comment added to post {post_id}.");
    Ok(())
}

pub async fn edit_comment(ctx: &mut Ctx, id: &str, content: &str) -> Result<()> {
    ctx.authed()?.update_comment(id, content).await?;
    println!("Comment {id} updated.");
    Ok(())
}

pub async fn delete_comment(ctx: &mut Ctx, id: &str) -> Result<()> {
    ctx.authed()?.delete_comment(id).await?;
    println!("Comment {id} deleted.");
    Ok(())
}

pub(super) async fn resolve_user_id(ctx: &Ctx, username: &str) -> Result<String> {
    let user = ctx
        .api
        .fetch_user_by_username(username)
        .await?
        .with_context(|| format!("No user named '{username}'"))?;
    Ok(user.id)
}

fn print_post(post: &PostWithCounts) {
    println!(
        "#{} {} ({})",
        post.post.id,
        post.post.author_name(),
        timestamp(&post.post.created_at)
    );
    println!("{}", post.post.content);
    println!("[{} likes, {} comments]", post.likes, post.comments);
    println!();
}

fn timestamp(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "-".to_string())
}
