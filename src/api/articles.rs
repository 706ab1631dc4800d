/// Article CRUD, search, and markdown upload endpoints
use crate::{
    api::payload::FormPayload,
    asset_store::names,
    content::{articles::ArticleQuery, articles::ArticleUpdate, articles::NewArticle, Article},
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Build article routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/articles", get(list_articles).post(create_article))
        .route("/api/articles/search", get(search_articles))
        .route(
            "/api/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
}

/// Full wire representation of an article
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing representation: everything but the inline body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleResponse {
    fn render(article: Article, ctx: &AppContext) -> Self {
        Self {
            content_url: article
                .content_name
                .as_deref()
                .map(|name| ctx.assets.public_url(name)),
            id: article.id,
            title: article.title,
            author: article.author,
            content: article.content,
            description: article.description,
            tags: article.tags,
            published: article.published,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

impl ArticleSummary {
    fn render(article: Article, ctx: &AppContext) -> Self {
        Self {
            content_url: article
                .content_name
                .as_deref()
                .map(|name| ctx.assets.public_url(name)),
            id: article.id,
            title: article.title,
            author: article.author,
            description: article.description,
            tags: article.tags,
            published: article.published,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub author: Option<String>,
}

/// Validate an attached markdown body and move it into the asset store
async fn store_markdown(
    ctx: &AppContext,
    payload: &FormPayload,
    title: &str,
) -> ApiResult<Option<String>> {
    let Some(file) = &payload.file else {
        return Ok(None);
    };

    if !names::is_allowed_markdown(&file.filename) {
        return Err(ApiError::UnsupportedFileType(
            "Invalid markdown file type".to_string(),
        ));
    }

    let name = names::markdown_name(title);
    ctx.assets.store(&name, &file.data).await?;
    Ok(Some(name))
}

async fn list_articles(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<ArticleSummary>>> {
    let articles = ctx.articles.list().await?;
    Ok(Json(
        articles
            .into_iter()
            .map(|a| ArticleSummary::render(a, &ctx))
            .collect(),
    ))
}

async fn search_articles(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ArticleSummary>>> {
    let hits = ctx
        .articles
        .search(&ArticleQuery {
            q: params.q,
            tag: params.tag,
            author: params.author,
        })
        .await?;

    Ok(Json(
        hits.into_iter()
            .map(|a| ArticleSummary::render(a, &ctx))
            .collect(),
    ))
}

async fn get_article(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = ctx
        .articles
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))?;

    Ok(Json(ArticleResponse::render(article, &ctx)))
}

async fn create_article(
    State(ctx): State<AppContext>,
    payload: FormPayload,
) -> ApiResult<(StatusCode, Json<ArticleResponse>)> {
    let title = payload.require_str("title", "Title")?;
    let author = payload.require_str("author", "Author")?;

    let content_name = store_markdown(&ctx, &payload, &title).await?;

    let article = ctx
        .articles
        .create(NewArticle {
            title,
            author,
            content: payload.str_field("content"),
            content_name,
            description: payload.str_field("description"),
            tags: payload.list_field("tags").unwrap_or_default(),
            published: payload.bool_field("published").unwrap_or(false),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse::render(article, &ctx)),
    ))
}

async fn update_article(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    payload: FormPayload,
) -> ApiResult<Json<ArticleResponse>> {
    // 404 before any filesystem side effect
    let existing = ctx
        .articles
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))?;

    // A replacement body is named after the effective title
    let title = payload.str_field("title").unwrap_or(existing.title);
    let content_name = store_markdown(&ctx, &payload, &title).await?;

    let (previous, updated) = ctx
        .articles
        .update(
            &id,
            ArticleUpdate {
                title: payload.str_field("title"),
                author: payload.str_field("author"),
                content: payload.str_field("content"),
                content_name,
                description: payload.str_field("description"),
                tags: payload.list_field("tags"),
                published: payload.bool_field("published"),
            },
        )
        .await?;

    // The new reference is durably written; drop the superseded file.
    if previous.content_name != updated.content_name {
        if let Some(old) = &previous.content_name {
            ctx.assets.remove_best_effort(old).await;
        }
    }

    Ok(Json(ArticleResponse::render(updated, &ctx)))
}

async fn delete_article(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let article = ctx
        .articles
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))?;

    if let Some(content) = &article.content_name {
        ctx.assets.remove_best_effort(content).await;
    }

    ctx.articles.delete(&id).await?;

    Ok(Json(json!({ "message": "Article deleted" })))
}
