use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::Route;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Body, Resource, Validate};
use crate::utils::parse_id;

pub mod models;
pub mod query;

use self::models::{ArticleDetail, ArticleSummary, NewArticle};
use self::query::ArticleParams;

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
    total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    article: ArticleDetail,
}

#[get("/?<params..>")]
pub async fn list(db: Db, params: ArticleParams) -> ApiResult<ArticlesResponse> {
    let query = params.validate()?;
    let page = db
        .run(move |connection| models::fetch_articles(connection, &query))
        .await?;

    Ok(Json(ArticlesResponse {
        articles: page.articles,
        total_count: page.total_count,
    }))
}

#[get("/<article_id>")]
pub async fn show(db: Db, article_id: &str) -> ApiResult<ArticleResponse> {
    let id = parse_id(article_id, Resource::Article)?;
    let article = db
        .run(move |connection| models::fetch_article_by_id(connection, id))
        .await?;
    Ok(Json(ArticleResponse { article }))
}

#[patch("/<article_id>", data = "<body>")]
pub async fn vote(db: Db, article_id: &str, body: Body) -> ApiResult<ArticleResponse> {
    let id = parse_id(article_id, Resource::Article)?;
    let delta = body?.inc_votes()?;
    let article = db
        .run(move |connection| models::update_votes(connection, id, delta))
        .await?;
    Ok(Json(ArticleResponse { article }))
}

#[post("/", data = "<body>")]
pub async fn create(db: Db, body: Body) -> Result<Custom<Json<ArticleResponse>>, ApiError> {
    let new_article = NewArticle::from_body(&body?)?;
    let article = db
        .run(move |connection| models::insert_article(connection, &new_article))
        .await?;
    Ok(Custom(Status::Created, Json(ArticleResponse { article })))
}

pub fn routes() -> Vec<Route> {
    routes![list, show, vote, create]
}
