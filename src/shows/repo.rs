use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::ShowResponse;

#[derive(Debug, Clone, FromRow)]
pub struct Show {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Show> for ShowResponse {
    fn from(s: Show) -> Self {
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            genre: s.genre,
            release_year: s.release_year,
            poster_url: s.poster_url,
            created_at: s.created_at,
        }
    }
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Show>> {
    let rows = sqlx::query_as::<_, Show>(
        r#"
        SELECT id, title, description, genre, release_year, poster_url, created_at
          FROM shows
         ORDER BY created_at DESC
         LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list shows")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Show>> {
    let row = sqlx::query_as::<_, Show>(
        r#"
        SELECT id, title, description, genre, release_year, poster_url, created_at
          FROM shows
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find show")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, show: &Show) -> anyhow::Result<Show> {
    let row = sqlx::query_as::<_, Show>(
        r#"
        INSERT INTO shows (title, description, genre, release_year, poster_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, description, genre, release_year, poster_url, created_at
        "#,
    )
    .bind(&show.title)
    .bind(&show.description)
    .bind(&show.genre)
    .bind(show.release_year)
    .bind(&show.poster_url)
    .fetch_one(db)
    .await
    .context("insert show")?;
    Ok(row)
}

pub async fn update(db: &PgPool, show: &Show) -> anyhow::Result<Show> {
    let row = sqlx::query_as::<_, Show>(
        r#"
        UPDATE shows
           SET title = $2, description = $3, genre = $4, release_year = $5, poster_url = $6
         WHERE id = $1
        RETURNING id, title, description, genre, release_year, poster_url, created_at
        "#,
    )
    .bind(show.id)
    .bind(&show.title)
    .bind(&show.description)
    .bind(&show.genre)
    .bind(show.release_year)
    .bind(&show.poster_url)
    .fetch_one(db)
    .await
    .context("update show")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM shows WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete show")?;
    Ok(res.rows_affected() > 0)
}
