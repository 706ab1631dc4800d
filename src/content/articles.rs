/// Article collection store
use crate::{
    content::{escape_like, parse_string_list, parse_timestamp},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Article record
///
/// The body lives either inline in `content` or as a stored markdown file
/// referenced by `content_name`; the stored name is rewritten to a public
/// URL before it leaves the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: String,
    pub content: Option<String>,
    pub content_name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new article
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub content: Option<String>,
    pub content_name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Partial update; only provided fields are applied
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub content_name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// Search filters for the article collection
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    /// Substring match against title and content
    pub q: Option<String>,
    /// Case-insensitive tag filter
    pub tag: Option<String>,
    /// Case-insensitive author substring filter
    pub author: Option<String>,
}

/// Article store
#[derive(Clone)]
pub struct ArticleStore {
    db: SqlitePool,
}

const ARTICLE_COLUMNS: &str =
    "id, title, author, content, content_name, description, tags, published, created_at, updated_at";

impl ArticleStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new article
    pub async fn create(&self, new: NewArticle) -> ApiResult<Article> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO articles (id, title, author, content, content_name, description, tags, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.content)
        .bind(&new.content_name)
        .bind(&new.description)
        .bind(serde_json::to_string(&new.tags).unwrap_or_else(|_| "[]".into()))
        .bind(new.published)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Article {
            id,
            title: new.title,
            author: new.author,
            content: new.content,
            content_name: new.content_name,
            description: new.description,
            tags: new.tags,
            published: new.published,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all articles, newest first
    pub async fn list(&self) -> ApiResult<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles ORDER BY created_at DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_article).collect()
    }

    /// Get an article by id
    pub async fn get(&self, id: &str) -> ApiResult<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_article).transpose()
    }

    /// Apply a partial update, refreshing `updated_at`
    ///
    /// Returns the previous record alongside the updated one so callers
    /// can reconcile a replaced asset reference after the write.
    pub async fn update(&self, id: &str, update: ArticleUpdate) -> ApiResult<(Article, Article)> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))?;

        let mut updated = existing.clone();
        if let Some(title) = update.title {
            updated.title = title;
        }
        if let Some(author) = update.author {
            updated.author = author;
        }
        if let Some(content) = update.content {
            updated.content = Some(content);
        }
        if let Some(content_name) = update.content_name {
            updated.content_name = Some(content_name);
        }
        if let Some(description) = update.description {
            updated.description = Some(description);
        }
        if let Some(tags) = update.tags {
            updated.tags = tags;
        }
        if let Some(published) = update.published {
            updated.published = published;
        }
        updated.updated_at = Utc::now();

        // Last write wins: concurrent updates to the same record are not
        // serialized beyond this single UPDATE statement.
        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, author = ?, content = ?, content_name = ?,
                description = ?, tags = ?, published = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.title)
        .bind(&updated.author)
        .bind(&updated.content)
        .bind(&updated.content_name)
        .bind(&updated.description)
        .bind(serde_json::to_string(&updated.tags).unwrap_or_else(|_| "[]".into()))
        .bind(updated.published)
        .bind(updated.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok((existing, updated))
    }

    /// Delete an article row
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Article {} not found", id)));
        }

        Ok(())
    }

    /// Free-text search with optional tag and author filters
    ///
    /// Matching is case-insensitive substring via escaped LIKE patterns;
    /// the tag filter is applied in-process against the decoded tag list.
    pub async fn search(&self, query: &ArticleQuery) -> ApiResult<Vec<Article>> {
        let mut sql = format!("SELECT {} FROM articles WHERE 1 = 1", ARTICLE_COLUMNS);
        let mut binds: Vec<String> = Vec::new();

        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            sql.push_str(
                r#" AND (LOWER(title) LIKE ? ESCAPE '\' OR LOWER(COALESCE(content, '')) LIKE ? ESCAPE '\')"#,
            );
            let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
            binds.push(pattern.clone());
            binds.push(pattern);
        }
        if let Some(author) = query.author.as_deref().filter(|a| !a.is_empty()) {
            sql.push_str(r#" AND LOWER(author) LIKE ? ESCAPE '\'"#);
            binds.push(format!("%{}%", escape_like(&author.to_lowercase())));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut db_query = sqlx::query(&sql);
        for bind in binds {
            db_query = db_query.bind(bind);
        }

        let rows = db_query.fetch_all(&self.db).await?;
        let mut articles: Vec<Article> = rows
            .into_iter()
            .map(parse_article)
            .collect::<ApiResult<_>>()?;

        if let Some(tag) = query.tag.as_deref().filter(|t| !t.is_empty()) {
            let tag = tag.to_lowercase();
            articles.retain(|a| a.tags.iter().any(|t| t.to_lowercase().contains(&tag)));
        }

        Ok(articles)
    }
}

fn parse_article(row: sqlx::sqlite::SqliteRow) -> ApiResult<Article> {
    let tags_raw: String = row.get("tags");
    let created_at_raw: String = row.get("created_at");
    let updated_at_raw: String = row.get("updated_at");

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        content: row.get("content"),
        content_name: row.get("content_name"),
        description: row.get("description"),
        tags: parse_string_list(&tags_raw, "tags")?,
        published: row.get("published"),
        created_at: parse_timestamp(&created_at_raw, "created_at")?,
        updated_at: parse_timestamp(&updated_at_raw, "updated_at")?,
    })
}
