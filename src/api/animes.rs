/// Anime CRUD endpoints
use crate::{
    api::payload::FormPayload,
    content::{animes::AnimeUpdate, animes::NewAnime, Anime},
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

/// Build anime routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/animes", get(list_animes).post(create_anime))
        .route(
            "/api/animes/:id",
            get(get_anime).put(update_anime).delete(delete_anime),
        )
}

/// Wire representation of an anime entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Anime> for AnimeResponse {
    fn from(anime: Anime) -> Self {
        Self {
            id: anime.id,
            title: anime.title,
            description: anime.description,
            genre: anime.genre,
            rating: anime.rating,
            created_at: anime.created_at,
            updated_at: anime.updated_at,
        }
    }
}

async fn list_animes(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<AnimeResponse>>> {
    let animes = ctx.animes.list().await?;
    Ok(Json(animes.into_iter().map(AnimeResponse::from).collect()))
}

async fn get_anime(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnimeResponse>> {
    let anime = ctx
        .animes
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Anime {} not found", id)))?;

    Ok(Json(AnimeResponse::from(anime)))
}

async fn create_anime(
    State(ctx): State<AppContext>,
    payload: FormPayload,
) -> ApiResult<(StatusCode, Json<AnimeResponse>)> {
    let title = payload.require_str("title", "Title")?;

    let anime = ctx
        .animes
        .create(NewAnime {
            title,
            description: payload.str_field("description"),
            genre: payload.list_field("genre").unwrap_or_default(),
            rating: payload.f64_field("rating"),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AnimeResponse::from(anime))))
}

async fn update_anime(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    payload: FormPayload,
) -> ApiResult<Json<AnimeResponse>> {
    let anime = ctx
        .animes
        .update(
            &id,
            AnimeUpdate {
                title: payload.str_field("title"),
                description: payload.str_field("description"),
                genre: payload.list_field("genre"),
                rating: payload.f64_field("rating"),
            },
        )
        .await?;

    Ok(Json(AnimeResponse::from(anime)))
}

async fn delete_anime(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.animes.delete(&id).await?;
    Ok(Json(json!({ "message": "Anime deleted" })))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::*;
    use crate::server::build_router;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (_dir, ctx) = test_context().await;
        let app = build_router(ctx);

        let resp = app
            .clone()
            .oneshot(json_request(
                "/api/animes",
                "POST",
                json!({
                    "title": "Mushishi",
                    "description": "Episodic and quiet.",
                    "genre": ["slice of life", "supernatural"],
                    "rating": 9.0,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = response_json(resp).await;
        let id = created["id"].as_str().unwrap();

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(format!("/api/animes/{}", id))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let fetched = response_json(resp).await;

        assert_eq!(fetched["title"], "Mushishi");
        assert_eq!(fetched["genre"], json!(["slice of life", "supernatural"]));
        assert_eq!(fetched["rating"], 9.0);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let (_dir, ctx) = test_context().await;
        let app = build_router(ctx);

        let resp = app
            .oneshot(json_request("/api/animes", "POST", json!({"rating": 5.0})))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = response_json(resp).await;
        assert_eq!(body["message"], "Title is required");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_dir, ctx) = test_context().await;
        let app = build_router(ctx);

        let resp = app
            .clone()
            .oneshot(json_request(
                "/api/animes",
                "POST",
                json!({"title": "Mushishi", "rating": 8.5}),
            ))
            .await
            .unwrap();
        let created = response_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(json_request(
                &format!("/api/animes/{}", id),
                "PUT",
                json!({"rating": 9.5}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = response_json(resp).await;
        assert_eq!(updated["title"], "Mushishi");
        assert_eq!(updated["rating"], 9.5);

        let resp = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/animes/{}", id))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(format!("/api/animes/{}", id))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_is_404() {
        let (_dir, ctx) = test_context().await;
        let app = build_router(ctx);

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("DELETE")
                    .uri("/api/animes/no-such-id")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
