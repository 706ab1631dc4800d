/// Project CRUD endpoints with image upload
use crate::{
    api::payload::FormPayload,
    asset_store::names,
    content::{projects::NewProject, projects::ProjectUpdate, Project},
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

/// Build project routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

/// Wire representation of a project; the stored image name is resolved
/// to a public URL here and nowhere leaks out as-is
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    fn render(project: Project, ctx: &AppContext) -> Self {
        Self {
            image_url: project
                .image_name
                .as_deref()
                .map(|name| ctx.assets.public_url(name)),
            id: project.id,
            title: project.title,
            description: project.description,
            technologies: project.technologies,
            project_url: project.project_url,
            github_url: project.github_url,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Validate an attached image and move it into the asset store
///
/// Runs before any database write: a rejected extension costs nothing, and
/// a storage failure aborts the request with no record mutated.
async fn store_image(ctx: &AppContext, payload: &FormPayload) -> ApiResult<Option<String>> {
    let Some(file) = &payload.file else {
        return Ok(None);
    };

    if !names::is_allowed_image(&file.filename) {
        return Err(ApiError::UnsupportedFileType(
            "Invalid image file type".to_string(),
        ));
    }

    let name = names::image_name("project", &file.filename);
    ctx.assets.store(&name, &file.data).await?;
    Ok(Some(name))
}

async fn list_projects(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = ctx.projects.list().await?;
    Ok(Json(
        projects
            .into_iter()
            .map(|p| ProjectResponse::render(p, &ctx))
            .collect(),
    ))
}

async fn get_project(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = ctx
        .projects
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

    Ok(Json(ProjectResponse::render(project, &ctx)))
}

async fn create_project(
    State(ctx): State<AppContext>,
    payload: FormPayload,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let title = payload.require_str("title", "Title")?;
    let description = payload.require_str("description", "Description")?;

    let image_name = store_image(&ctx, &payload).await?;

    let project = ctx
        .projects
        .create(NewProject {
            title,
            description,
            technologies: payload.list_field("technologies").unwrap_or_default(),
            image_name,
            project_url: payload.str_field("projectUrl"),
            github_url: payload.str_field("githubUrl"),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse::render(project, &ctx)),
    ))
}

async fn update_project(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    payload: FormPayload,
) -> ApiResult<Json<ProjectResponse>> {
    // 404 before any filesystem side effect
    if ctx.projects.get(&id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Project {} not found", id)));
    }

    let image_name = store_image(&ctx, &payload).await?;

    let (previous, updated) = ctx
        .projects
        .update(
            &id,
            ProjectUpdate {
                title: payload.str_field("title"),
                description: payload.str_field("description"),
                technologies: payload.list_field("technologies"),
                image_name,
                project_url: payload.str_field("projectUrl"),
                github_url: payload.str_field("githubUrl"),
            },
        )
        .await?;

    // The new reference is durably written; drop the superseded file.
    if previous.image_name != updated.image_name {
        if let Some(old) = &previous.image_name {
            ctx.assets.remove_best_effort(old).await;
        }
    }

    Ok(Json(ProjectResponse::render(updated, &ctx)))
}

async fn delete_project(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let project = ctx
        .projects
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

    if let Some(image) = &project.image_name {
        ctx.assets.remove_best_effort(image).await;
    }

    ctx.projects.delete(&id).await?;

    Ok(Json(json!({ "message": "Project deleted" })))
}
