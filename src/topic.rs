use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::Route;
use crate::db::schema::topics;
use crate::db::Db;
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Queryable, Serialize, PartialEq)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

pub fn fetch_topics(connection: &mut PgConnection) -> Result<Vec<Topic>, ApiError> {
    let topics = topics::table
        .order(topics::slug.asc())
        .load::<Topic>(connection)?;
    Ok(topics)
}

#[get("/")]
pub async fn list(db: Db) -> ApiResult<TopicsResponse> {
    let topics = db.run(fetch_topics).await?;
    Ok(Json(TopicsResponse { topics }))
}

pub fn routes() -> Vec<Route> {
    routes![list]
}
