/// Project collection store
use crate::{
    content::{parse_string_list, parse_timestamp},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Project record
///
/// `image_name` is the internal stored-asset reference; it is rewritten
/// to a public URL before it leaves the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub image_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub image_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
}

/// Partial update; only provided fields are applied
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub image_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
}

/// Project store
#[derive(Clone)]
pub struct ProjectStore {
    db: SqlitePool,
}

const PROJECT_COLUMNS: &str =
    "id, title, description, technologies, image_name, project_url, github_url, created_at, updated_at";

impl ProjectStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new project
    pub async fn create(&self, new: NewProject) -> ApiResult<Project> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO projects (id, title, description, technologies, image_name, project_url, github_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(serde_json::to_string(&new.technologies).unwrap_or_else(|_| "[]".into()))
        .bind(&new.image_name)
        .bind(&new.project_url)
        .bind(&new.github_url)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Project {
            id,
            title: new.title,
            description: new.description,
            technologies: new.technologies,
            image_name: new.image_name,
            project_url: new.project_url,
            github_url: new.github_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all projects, newest first
    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects ORDER BY created_at DESC",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_project).collect()
    }

    /// Get a project by id
    pub async fn get(&self, id: &str) -> ApiResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_project).transpose()
    }

    /// Apply a partial update, refreshing `updated_at`
    ///
    /// Returns the previous record alongside the updated one so callers
    /// can reconcile a replaced asset reference after the write.
    pub async fn update(&self, id: &str, update: ProjectUpdate) -> ApiResult<(Project, Project)> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

        let mut updated = existing.clone();
        if let Some(title) = update.title {
            updated.title = title;
        }
        if let Some(description) = update.description {
            updated.description = description;
        }
        if let Some(technologies) = update.technologies {
            updated.technologies = technologies;
        }
        if let Some(image_name) = update.image_name {
            updated.image_name = Some(image_name);
        }
        if let Some(project_url) = update.project_url {
            updated.project_url = Some(project_url);
        }
        if let Some(github_url) = update.github_url {
            updated.github_url = Some(github_url);
        }
        updated.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE projects
            SET title = ?, description = ?, technologies = ?, image_name = ?,
                project_url = ?, github_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.title)
        .bind(&updated.description)
        .bind(serde_json::to_string(&updated.technologies).unwrap_or_else(|_| "[]".into()))
        .bind(&updated.image_name)
        .bind(&updated.project_url)
        .bind(&updated.github_url)
        .bind(updated.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok((existing, updated))
    }

    /// Delete a project row
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }
}

fn parse_project(row: sqlx::sqlite::SqliteRow) -> ApiResult<Project> {
    let technologies_raw: String = row.get("technologies");
    let created_at_raw: String = row.get("created_at");
    let updated_at_raw: String = row.get("updated_at");

    Ok(Project {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        technologies: parse_string_list(&technologies_raw, "technologies")?,
        image_name: row.get("image_name"),
        project_url: row.get("project_url"),
        github_url: row.get("github_url"),
        created_at: parse_timestamp(&created_at_raw, "created_at")?,
        updated_at: parse_timestamp(&updated_at_raw, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::tempdir;

    async fn test_store() -> (tempfile::TempDir, ProjectStore) {
        let dir = tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("test.sqlite"), db::DatabaseOptions::default())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        (dir, ProjectStore::new(pool))
    }

    fn sample() -> NewProject {
        NewProject {
            title: "Demo".into(),
            description: "desc".into(),
            technologies: vec!["rust".into(), "axum".into()],
            image_name: Some("project-1-abc.png".into()),
            project_url: Some("https://demo.example.com".into()),
            github_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (_dir, store) = test_store().await;

        let created = store.create(sample()).await.unwrap();
        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_returns_previous_record() {
        let (_dir, store) = test_store().await;
        let created = store.create(sample()).await.unwrap();

        let (previous, updated) = store
            .update(
                &created.id,
                ProjectUpdate {
                    image_name: Some("project-2-def.png".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(previous.image_name.as_deref(), Some("project-1-abc.png"));
        assert_eq!(updated.image_name.as_deref(), Some("project-2-def.png"));
        assert_eq!(updated.title, created.title);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = test_store().await;
        let created = store.create(sample()).await.unwrap();

        store.delete(&created.id).await.unwrap();
        assert!(store.get(&created.id).await.unwrap().is_none());
    }
}
