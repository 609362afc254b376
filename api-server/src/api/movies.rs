use super::ApiError;
use crate::models::context::ContextPointer;
use movie_info::{ItemDetail, MovieProvider, SearchResponse};
use rocket::serde::json::Json;
use rocket::{get, State};

/// Rejects an absent or blank parameter before anything goes upstream.
fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::Validation(format!(
            "Bad Request: Missing or invalid parameter '{}'",
            name
        ))),
    }
}

#[get("/movies/search?<s>")]
pub async fn search(
    s: Option<&str>,
    context: &State<ContextPointer>,
) -> Result<Json<SearchResponse>, ApiError> {
    let term = required("s", s)?;
    let response = context.movie_provider().search(term).await?;
    Ok(Json(response))
}

#[get("/movies/<id>")]
pub async fn detail(
    id: &str,
    context: &State<ContextPointer>,
) -> Result<Json<ItemDetail>, ApiError> {
    let id = required("id", Some(id))?;
    let detail = context.movie_provider().fetch_detail(id).await?;
    Ok(Json(detail))
}
