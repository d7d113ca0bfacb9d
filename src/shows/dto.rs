use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShowRequest {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShowRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

const FIRST_FILM_YEAR: i32 = 1888;

pub(crate) fn check_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title must not be empty"));
    }
    Ok(title.to_string())
}

pub(crate) fn check_release_year(year: Option<i32>) -> Result<(), ApiError> {
    let latest = OffsetDateTime::now_utc().year() + 5;
    match year {
        Some(y) if !(FIRST_FILM_YEAR..=latest).contains(&y) => Err(ApiError::validation(
            format!("Release year must be between {FIRST_FILM_YEAR} and {latest}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_required() {
        assert_eq!(check_title("  Dark  ").unwrap(), "Dark");
        assert!(check_title("   ").is_err());
    }

    #[test]
    fn release_year_bounds() {
        assert!(check_release_year(None).is_ok());
        assert!(check_release_year(Some(2017)).is_ok());
        assert!(check_release_year(Some(1887)).is_err());
        assert!(check_release_year(Some(3000)).is_err());
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.clamped(), (20, 0));
        let p = Pagination {
            limit: 10_000,
            offset: -3,
        };
        assert_eq!(p.clamped(), (100, 0));
    }
}
