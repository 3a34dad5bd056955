use rocket::serde::json::Json;
use rocket::Route;
use serde_json::Value;
use crate::types::{ApiError, ApiResult};

static ENDPOINTS_JSON: &str = include_str!("../endpoints.json");

lazy_static! {
    static ref ENDPOINTS: Option<Value> = serde_json::from_str(ENDPOINTS_JSON).ok();
}

#[derive(Debug, Serialize)]
pub struct EndpointsResponse {
    endpoints: Value,
}

/// Describes every endpoint of the api.
#[get("/")]
pub fn endpoints() -> ApiResult<EndpointsResponse> {
    let endpoints = ENDPOINTS.clone().ok_or(ApiError::Internal)?;
    Ok(Json(EndpointsResponse { endpoints }))
}

pub fn routes() -> Vec<Route> {
    routes![endpoints]
}
