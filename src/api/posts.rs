//! Blog post endpoints

use crate::api::{non_empty, parse_id, required};
use crate::auth::{
    policy::{authorize_resource, require_admin},
    CurrentUser,
};
use crate::error::{ApiError, JsonBody};
use crate::models::{
    BlogPostView, Category, CreatePostRequest, NewPost, PostChanges, PostStatus, SearchQuery,
    UpdatePostRequest,
};
use crate::state::AppState;
use crate::store::PostFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

const BLOG_NOT_FOUND: ApiError = ApiError::NotFound("Blog not found");

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse::<Category>().map_err(ApiError::InvalidInput)
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn load_view(state: &AppState, post_id: &Uuid) -> Result<Json<BlogPostView>, ApiError> {
    state
        .posts
        .find_view(post_id)?
        .map(Json)
        .ok_or(BLOG_NOT_FOUND)
}

/// GET /api/blogs
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPostView>>, ApiError> {
    Ok(Json(state.posts.list(&PostFilter::All)?))
}

/// POST /api/blogs
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPostView>), ApiError> {
    let missing = "Please provide title, content and category";
    let title = required(payload.title, missing)?;
    let content = required(payload.content, missing)?;
    let category = parse_category(&required(payload.category, missing)?)?;

    let post = state.posts.create(
        actor.id,
        NewPost {
            title,
            content,
            category,
            tags: clean_tags(payload.tags.unwrap_or_default()),
        },
    )?;

    info!("📝 Blog created by {}: {}", actor.email, post.title);

    let Json(view) = load_view(&state, &post.id)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/blogs/my-blogs
pub async fn my_posts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<BlogPostView>>, ApiError> {
    Ok(Json(state.posts.list(&PostFilter::Author(actor.id))?))
}

/// GET /api/blogs/search?query=
pub async fn search_posts(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<BlogPostView>>, ApiError> {
    let query = required(params.query, "Please provide a search query")?;
    Ok(Json(state.posts.list(&PostFilter::Search(query))?))
}

/// GET /api/blogs/category/:category
pub async fn posts_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<BlogPostView>>, ApiError> {
    let category = parse_category(&category)?;
    Ok(Json(state.posts.list(&PostFilter::Category(category))?))
}

/// GET /api/blogs/pending (Admin only)
pub async fn pending_posts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<BlogPostView>>, ApiError> {
    require_admin(&actor)?;
    Ok(Json(state.posts.list(&PostFilter::Status(PostStatus::Pending))?))
}

/// GET /api/blogs/:id - counts a view
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<BlogPostView>, ApiError> {
    let post_id = parse_id(&post_id)?;
    state
        .posts
        .record_view(&post_id)?
        .map(Json)
        .ok_or(BLOG_NOT_FOUND)
}

/// PUT /api/blogs/:id (owner or admin)
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<String>,
    JsonBody(payload): JsonBody<UpdatePostRequest>,
) -> Result<Json<BlogPostView>, ApiError> {
    let post_id = parse_id(&post_id)?;
    let post = state.posts.find_by_id(&post_id)?.ok_or(BLOG_NOT_FOUND)?;
    authorize_resource(&actor, &post, "update this blog")?;

    let changes = PostChanges {
        title: non_empty(payload.title),
        content: non_empty(payload.content),
        category: non_empty(payload.category)
            .map(|c| parse_category(&c))
            .transpose()?,
        tags: payload.tags.map(clean_tags),
    };

    state.posts.update(&post_id, changes)?.ok_or(BLOG_NOT_FOUND)?;
    load_view(&state, &post_id)
}

/// DELETE /api/blogs/:id (owner or admin)
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post_id = parse_id(&post_id)?;
    let post = state.posts.find_by_id(&post_id)?.ok_or(BLOG_NOT_FOUND)?;
    authorize_resource(&actor, &post, "delete this blog")?;

    if !state.posts.delete(&post_id)? {
        return Err(BLOG_NOT_FOUND);
    }

    info!("🗑️  Blog deleted by {}: {}", actor.email, post.title);

    Ok(Json(json!({ "message": "Blog deleted" })))
}

/// PUT /api/blogs/:id/approve (Admin only)
pub async fn approve_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<BlogPostView>, ApiError> {
    require_admin(&actor)?;
    let post_id = parse_id(&post_id)?;
    let post = state.posts.find_by_id(&post_id)?.ok_or(BLOG_NOT_FOUND)?;

    if post.status == PostStatus::Approved {
        return Err(ApiError::Conflict("Blog is already approved".to_string()));
    }

    state
        .posts
        .set_status(&post_id, PostStatus::Approved)?
        .ok_or(BLOG_NOT_FOUND)?;

    info!("✅ Blog approved by {}: {}", actor.email, post.title);

    load_view(&state, &post_id)
}
