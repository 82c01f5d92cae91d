//! Client-side feed and profile assembly.
//!
//! The backend returns posts without like/comment counts and cannot filter
//! comments by author, so views are assembled here by fanning out per-item
//! count requests and merging the results. The fan-out runs with bounded
//! parallelism; any failed call fails the whole load, and nothing is
//! retried. This pattern does not scale with feed size - the real fix is a
//! backend that returns aggregated counts inline - but it is the contract
//! this client gets.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::api::{ApiClient, ApiError};
use crate::models::{Comment, LikeStatus, PostWithCounts, UserStats};

/// Maximum concurrent count requests during feed assembly.
/// Bounds the N+1 fan-out so large feeds don't open a request per post
/// all at once.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Page size used when scanning all comments to filter by author.
/// Large enough to defeat server-side pagination on any realistic dataset.
const COMMENT_SCAN_LIMIT: u64 = 5000;

/// Load the feed (optionally one author's posts) and attach per-post like
/// and comment counts. Order of the returned posts matches the server's.
pub async fn load_feed(
    api: &ApiClient,
    user_id: Option<&str>,
) -> Result<Vec<PostWithCounts>, ApiError> {
    let posts = api.fetch_posts(user_id).await?;

    stream::iter(posts)
        .map(|post| async move {
            let likes = api.fetch_like_count(&post.id);
            let comments = api.fetch_comment_count(&post.id);
            let (likes, comments) = futures::future::try_join(likes, comments).await?;
            Ok(PostWithCounts {
                post,
                likes,
                comments,
            })
        })
        .buffered(MAX_CONCURRENT_REQUESTS)
        .try_collect()
        .await
}

/// Aggregate a user's activity counts from three parallel queries.
pub async fn user_stats(api: &ApiClient, user_id: &str) -> Result<UserStats, ApiError> {
    let (posts, likes, comments) = tokio::try_join!(
        api.fetch_user_post_count(user_id),
        api.fetch_user_like_count(user_id),
        count_comments_by_user(api, user_id),
    )?;
    Ok(UserStats {
        posts,
        likes,
        comments,
    })
}

/// All comments written by one user.
///
/// The server only filters comments by post, so this fetches everything and
/// filters locally.
pub async fn comments_by_user(api: &ApiClient, user_id: &str) -> Result<Vec<Comment>, ApiError> {
    let page = api.fetch_comments(None, Some(COMMENT_SCAN_LIMIT)).await?;
    Ok(page
        .items
        .into_iter()
        .filter(|c| c.user_id == user_id)
        .collect())
}

async fn count_comments_by_user(api: &ApiClient, user_id: &str) -> Result<u64, ApiError> {
    Ok(comments_by_user(api, user_id).await?.len() as u64)
}

/// Like state of a post for one viewer: total count plus whether the viewer
/// has liked it, derived from two filtered count queries.
pub async fn like_status(
    api: &ApiClient,
    post_id: &str,
    viewer_id: &str,
) -> Result<LikeStatus, ApiError> {
    let total = api.fetch_like_count(post_id);
    let viewer = api.fetch_viewer_like_count(post_id, viewer_id);
    let (like_count, viewer_count) = futures::future::try_join(total, viewer).await?;
    Ok(LikeStatus {
        like_count,
        liked: viewer_count > 0,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn count_mock(route: &'static str, id_param: (&'static str, &'static str), count: u64) -> Mock {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param(id_param.0, id_param.1))
            .and(query_param("count", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": count})))
    }

    #[tokio::test]
    async fn test_load_feed_merges_counts_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 1, "user_id": 9, "content": "first"},
                    {"id": 2, "user_id": 9, "content": "second"}
                ]
            })))
            .mount(&server)
            .await;
        count_mock("/likes", ("post_id", "1"), 3).mount(&server).await;
        count_mock("/comments", ("post_id", "1"), 1).mount(&server).await;
        count_mock("/likes", ("post_id", "2"), 0).mount(&server).await;
        count_mock("/comments", ("post_id", "2"), 4).mount(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let feed = load_feed(&api, None).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].post.id, "1");
        assert_eq!((feed[0].likes, feed[0].comments), (3, 1));
        assert_eq!(feed[1].post.id, "2");
        assert_eq!((feed[1].likes, feed[1].comments), (0, 4));
    }

    #[tokio::test]
    async fn test_load_feed_fails_when_a_count_call_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": 1, "user_id": 9, "content": "first"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/likes"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;
        count_mock("/comments", ("post_id", "1"), 0).mount(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        assert!(load_feed(&api, None).await.is_err());
    }

    #[tokio::test]
    async fn test_comments_by_user_filters_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("limit", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 1, "post_id": 1, "user_id": 9, "content": "mine"},
                    {"id": 2, "post_id": 1, "user_id": 8, "content": "theirs"},
                    {"id": 3, "post_id": 2, "user_id": 9, "content": "also mine"}
                ]
            })))
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let comments = comments_by_user(&api, "9").await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|c| c.user_id == "9"));
    }

    #[tokio::test]
    async fn test_user_stats_aggregates_three_counts() {
        let server = MockServer::start().await;
        count_mock("/posts", ("user_id", "9"), 5).mount(&server).await;
        count_mock("/likes", ("user_id", "9"), 12).mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("limit", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": 1, "post_id": 1, "user_id": 9, "content": "hi"}]
            })))
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let stats = user_stats(&api, "9").await.unwrap();
        assert_eq!(stats.posts, 5);
        assert_eq!(stats.likes, 12);
        assert_eq!(stats.comments, 1);
    }

    #[tokio::test]
    async fn test_like_status_derived_from_two_counts() {
        let server = MockServer::start().await;
        // Mounted first: the viewer-scoped count is the more specific match
        Mock::given(method("GET"))
            .and(path("/likes"))
            .and(query_param("post_id", "3"))
            .and(query_param("user_id", "9"))
            .and(query_param("count", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
            .mount(&server)
            .await;
        count_mock("/likes", ("post_id", "3"), 5).mount(&server).await;
        let api = ApiClient::new(&server.uri()).unwrap();

        let status = like_status(&api, "3", "9").await.unwrap();
        assert_eq!(status.like_count, 5);
        assert!(status.liked);
    }
}
