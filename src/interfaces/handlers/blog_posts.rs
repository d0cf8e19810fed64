use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::blog_post::{NewBlogPostRequest, UpdateBlogPostRequest},
    errors::AppError,
    query::{BlogListParams, TrendingParams},
    use_cases::extractors::AdminSession,
    AppState,
};

#[instrument(skip(admin, state, query))]
pub async fn list_blog_posts(
    admin: Option<AdminSession>,
    state: web::Data<AppState>,
    query: web::Query<BlogListParams>,
) -> Result<impl Responder, AppError> {
    let visibility = query.visibility();
    if visibility.requires_admin() && admin.is_none() {
        return Err(AppError::UnauthorizedAccess);
    }

    let posts = state.blog_handler.list_blog_posts(visibility).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_blog_post(
    _admin: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<NewBlogPostRequest>,
) -> Result<impl Responder, AppError> {
    let post = state.blog_handler.create_blog_post(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

#[instrument(skip(state, query))]
pub async fn list_trending(
    state: web::Data<AppState>,
    query: web::Query<TrendingParams>,
) -> Result<impl Responder, AppError> {
    let listing = state.blog_handler.list_trending(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[instrument(skip(state))]
pub async fn list_by_priority(
    priority: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let listing = state.blog_handler.list_by_priority(&priority).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[instrument(skip(state))]
pub async fn get_blog_post_by_slug(
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.blog_handler.get_blog_post_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[instrument(skip(state))]
pub async fn get_blog_post(
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.blog_handler.get_blog_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Serves both PUT and PATCH; each is a partial update.
#[instrument(skip(_admin, state, data))]
pub async fn update_blog_post(
    _admin: AdminSession,
    post_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateBlogPostRequest>,
) -> Result<impl Responder, AppError> {
    let post = state
        .blog_handler
        .update_blog_post(&post_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

#[instrument(skip(_admin, state))]
pub async fn delete_blog_post(
    _admin: AdminSession,
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.blog_handler.delete_blog_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn record_view(
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.blog_handler.record_view(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[instrument(skip(state))]
pub async fn record_like(
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.blog_handler.record_like(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}
