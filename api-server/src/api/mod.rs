mod error;
mod health;
mod movies;

pub use error::{ApiError, ErrorBody};
pub use health::HealthStatus;

use rocket::fairing::AdHoc;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catch, catchers, routes, Catcher, Request, Route};

pub fn routes() -> Vec<Route> {
    routes![movies::search, movies::detail, health::health]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, default_catcher]
}

/// Lets a front end served from another origin call the API.
pub fn cors() -> AdHoc {
    AdHoc::on_response("CORS", |_request, response| {
        Box::pin(async move {
            response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
            response.set_header(Header::new("Access-Control-Allow-Methods", "GET, OPTIONS"));
            response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        })
    })
}

#[catch(404)]
fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Not Found"))
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let reason = status.reason().unwrap_or("Server Error");
    (status, Json(ErrorBody::new(reason)))
}
