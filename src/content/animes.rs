/// Anime collection store
use crate::{
    content::{parse_string_list, parse_timestamp},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Anime record
#[derive(Debug, Clone, PartialEq)]
pub struct Anime {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new anime entry
#[derive(Debug, Clone, Default)]
pub struct NewAnime {
    pub title: String,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub rating: Option<f64>,
}

/// Partial update; only provided fields are applied
#[derive(Debug, Clone, Default)]
pub struct AnimeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub rating: Option<f64>,
}

/// Anime store
#[derive(Clone)]
pub struct AnimeStore {
    db: SqlitePool,
}

const ANIME_COLUMNS: &str = "id, title, description, genre, rating, created_at, updated_at";

impl AnimeStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new anime entry
    pub async fn create(&self, new: NewAnime) -> ApiResult<Anime> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO animes (id, title, description, genre, rating, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(serde_json::to_string(&new.genre).unwrap_or_else(|_| "[]".into()))
        .bind(new.rating)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Anime {
            id,
            title: new.title,
            description: new.description,
            genre: new.genre,
            rating: new.rating,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all anime entries, newest first
    pub async fn list(&self) -> ApiResult<Vec<Anime>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM animes ORDER BY created_at DESC",
            ANIME_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_anime).collect()
    }

    /// Get an anime entry by id
    pub async fn get(&self, id: &str) -> ApiResult<Option<Anime>> {
        let row = sqlx::query(&format!("SELECT {} FROM animes WHERE id = ?", ANIME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(parse_anime).transpose()
    }

    /// Apply a partial update, refreshing `updated_at`
    pub async fn update(&self, id: &str, update: AnimeUpdate) -> ApiResult<Anime> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Anime {} not found", id)))?;

        let mut updated = existing;
        if let Some(title) = update.title {
            updated.title = title;
        }
        if let Some(description) = update.description {
            updated.description = Some(description);
        }
        if let Some(genre) = update.genre {
            updated.genre = genre;
        }
        if let Some(rating) = update.rating {
            updated.rating = Some(rating);
        }
        updated.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE animes
            SET title = ?, description = ?, genre = ?, rating = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.title)
        .bind(&updated.description)
        .bind(serde_json::to_string(&updated.genre).unwrap_or_else(|_| "[]".into()))
        .bind(updated.rating)
        .bind(updated.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(updated)
    }

    /// Delete an anime entry
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM animes WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Anime {} not found", id)));
        }

        Ok(())
    }
}

fn parse_anime(row: sqlx::sqlite::SqliteRow) -> ApiResult<Anime> {
    let genre_raw: String = row.get("genre");
    let created_at_raw: String = row.get("created_at");
    let updated_at_raw: String = row.get("updated_at");

    Ok(Anime {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        genre: parse_string_list(&genre_raw, "genre")?,
        rating: row.get("rating"),
        created_at: parse_timestamp(&created_at_raw, "created_at")?,
        updated_at: parse_timestamp(&updated_at_raw, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::tempdir;

    async fn test_store() -> (tempfile::TempDir, AnimeStore) {
        let dir = tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("test.sqlite"), db::DatabaseOptions::default())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        (dir, AnimeStore::new(pool))
    }

    #[tokio::test]
    async fn test_create_list_get() {
        let (_dir, store) = test_store().await;

        let created = store
            .create(NewAnime {
                title: "Mushishi".into(),
                description: Some("Episodic and quiet.".into()),
                genre: vec!["slice of life".into(), "supernatural".into()],
                rating: Some(9.0),
            })
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.genre.len(), 2);
        assert_eq!(fetched.rating, Some(9.0));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (_dir, store) = test_store().await;
        let created = store
            .create(NewAnime {
                title: "Mushishi".into(),
                rating: Some(8.5),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = store
            .update(
                &created.id,
                AnimeUpdate {
                    rating: Some(9.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Mushishi");
        assert_eq!(updated.rating, Some(9.5));
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_dir, store) = test_store().await;
        let err = store.delete("no-such-id").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
