use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        account::Capability,
        post::{CreatePostRequest, CreateReplyRequest, ForumPost, PostListParams, PostSummary, Reply},
    },
    services::Viewer,
    store::RecordStore,
    utils::html::clean_html,
};

/// Create a new post.
pub async fn create_post(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = ForumPost {
        id: Uuid::new_v4().to_string(),
        author: viewer.username.clone(),
        title: payload.title,
        course: payload.course,
        content: clean_html(&payload.content),
        created_at: Utc::now(),
        views: 0,
        replies: Vec::new(),
    };
    let post_id = post.id.clone();

    store.update(|posts: &mut Vec<ForumPost>| {
        posts.push(post);
        Ok::<_, AppError>(())
    })?;

    tracing::info!("User '{}' created post '{}'", viewer.username, post_id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": post_id})),
    ))
}

/// List posts (Recent first), optionally filtered by course and title keyword.
pub async fn list_posts(
    State(store): State<Arc<RecordStore>>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).min(100); // Default 20, max 100
    let keyword = params.q.map(|q| q.to_lowercase());

    let mut posts: Vec<ForumPost> = store
        .load::<ForumPost>()?
        .into_iter()
        .filter(|p| params.course.as_ref().is_none_or(|c| &p.course == c))
        .filter(|p| {
            keyword
                .as_ref()
                .is_none_or(|k| p.title.to_lowercase().contains(k))
        })
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let summaries: Vec<PostSummary> = posts.iter().take(limit).map(PostSummary::from).collect();
    Ok(Json(summaries))
}

/// Get a single post with its replies. Counts as a view.
pub async fn get_post(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = store.update(|posts: &mut Vec<ForumPost>| {
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Post not found".to_string()))?;
        post.views += 1;
        Ok::<_, AppError>(post.clone())
    })?;

    Ok(Json(post))
}

/// Append a reply to a post.
pub async fn create_reply(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = Reply {
        author: viewer.username.clone(),
        content: clean_html(&payload.content),
        created_at: Utc::now(),
    };

    store.update(|posts: &mut Vec<ForumPost>| {
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound("Post not found".to_string()))?;
        post.replies.push(reply.clone());
        Ok::<_, AppError>(())
    })?;

    Ok((StatusCode::CREATED, Json(reply)))
}

/// Delete a post.
/// Requires: Author OR a role that moderates the forum.
pub async fn delete_post(
    State(store): State<Arc<RecordStore>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.update(|posts: &mut Vec<ForumPost>| {
        let pos = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

        if posts[pos].author != viewer.username && !viewer.role.can(Capability::ModerateForum) {
            return Err(AppError::Forbidden(
                "You are not authorized to delete this post".to_string(),
            ));
        }

        posts.remove(pos);
        Ok(())
    })?;

    tracing::info!("User '{}' deleted post '{}'", viewer.username, id);
    Ok(StatusCode::NO_CONTENT)
}
