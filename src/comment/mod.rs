use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::tokio::join;
use rocket::Route;
use crate::article::models::check_article_exists;
use crate::article::query::PageParams;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Body, Resource, Validate};
use crate::utils::parse_id;

pub mod models;

use self::models::{Comment, NewComment};

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

/// The existence check and the page are fetched together; an unknown article
/// wins over an empty page.
#[get("/<article_id>/comments?<params..>")]
pub async fn list(db: Db, article_id: &str, params: PageParams) -> ApiResult<CommentsResponse> {
    let id = parse_id(article_id, Resource::Article)?;
    let page = params.validate()?;
    let (article, comments) = join!(
        db.run(move |connection| check_article_exists(connection, id)),
        db.run(move |connection| models::fetch_comments(connection, id, &page))
    );
    article?;
    Ok(Json(CommentsResponse {
        comments: comments?,
    }))
}

#[post("/<article_id>/comments", data = "<body>")]
pub async fn add(
    db: Db,
    article_id: &str,
    body: Body,
) -> Result<Custom<Json<CommentResponse>>, ApiError> {
    let id = parse_id(article_id, Resource::Article)?;
    let new_comment = NewComment::from_body(id, &body?)?;
    let comment = db
        .run(move |connection| models::insert_comment(connection, &new_comment))
        .await?;
    Ok(Custom(Status::Created, Json(CommentResponse { comment })))
}

#[delete("/<comment_id>")]
pub async fn remove(db: Db, comment_id: &str) -> Result<Status, ApiError> {
    let id = parse_id(comment_id, Resource::Comment)?;
    db.run(move |connection| models::delete_comment(connection, id))
        .await?;
    Ok(Status::NoContent)
}

#[patch("/<comment_id>", data = "<body>")]
pub async fn vote(db: Db, comment_id: &str, body: Body) -> ApiResult<CommentResponse> {
    let id = parse_id(comment_id, Resource::Comment)?;
    let delta = body?.inc_votes()?;
    let comment = db
        .run(move |connection| models::update_votes(connection, id, delta))
        .await?;
    Ok(Json(CommentResponse { comment }))
}

/// Mounted under `/api/articles`.
pub fn article_routes() -> Vec<Route> {
    routes![list, add]
}

pub fn routes() -> Vec<Route> {
    routes![remove, vote]
}
