use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        check_release_year, check_title, CreateShowRequest, Pagination, ShowResponse,
        UpdateShowRequest,
    },
    repo::{self, Show},
};
use crate::{
    auth::jwt::AdminUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn show_routes() -> Router<AppState> {
    Router::new()
        .route("/shows", get(list_shows).post(create_show))
        .route(
            "/shows/:id",
            get(get_show).patch(update_show).delete(delete_show),
        )
}

#[instrument(skip(state))]
pub async fn list_shows(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<ShowResponse>>> {
    let (limit, offset) = p.clamped();
    let shows = repo::list(&state.db, limit, offset).await?;
    Ok(Json(shows.into_iter().map(ShowResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShowResponse>> {
    let show = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Show"))?;
    Ok(Json(show.into()))
}

#[instrument(skip(state, admin, body))]
pub async fn create_show(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<CreateShowRequest>,
) -> ApiResult<(StatusCode, Json<ShowResponse>)> {
    let draft = new_show(body)?;
    let show = repo::insert(&state.db, &draft).await?;
    info!(show_id = %show.id, admin_id = %admin.id, "show created");
    Ok((StatusCode::CREATED, Json(show.into())))
}

#[instrument(skip(state, admin, body))]
pub async fn update_show(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateShowRequest>,
) -> ApiResult<Json<ShowResponse>> {
    let current = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Show"))?;
    let next = apply_update(current, body)?;
    let show = repo::update(&state.db, &next).await?;
    info!(show_id = %id, admin_id = %admin.id, "show updated");
    Ok(Json(show.into()))
}

#[instrument(skip(state, admin))]
pub async fn delete_show(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Show"));
    }
    info!(show_id = %id, admin_id = %admin.id, "show deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn new_show(body: CreateShowRequest) -> ApiResult<Show> {
    check_release_year(body.release_year)?;
    Ok(Show {
        id: Uuid::nil(), // assigned by the database
        title: check_title(&body.title)?,
        description: body.description,
        genre: body.genre,
        release_year: body.release_year,
        poster_url: body.poster_url,
        created_at: OffsetDateTime::now_utc(),
    })
}

fn apply_update(mut show: Show, body: UpdateShowRequest) -> ApiResult<Show> {
    if let Some(title) = body.title {
        show.title = check_title(&title)?;
    }
    if body.release_year.is_some() {
        check_release_year(body.release_year)?;
        show.release_year = body.release_year;
    }
    if body.description.is_some() {
        show.description = body.description;
    }
    if body.genre.is_some() {
        show.genre = body.genre;
    }
    if body.poster_url.is_some() {
        show.poster_url = body.poster_url;
    }
    Ok(show)
}
