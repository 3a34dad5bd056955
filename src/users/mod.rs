use rocket::serde::json::Json;
use rocket::Route;
use crate::db::Db;
use crate::types::ApiResult;

pub mod models;

use self::models::User;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

#[get("/")]
pub async fn list(db: Db) -> ApiResult<UsersResponse> {
    let users = db.run(|connection| User::load_all(connection)).await?;
    Ok(Json(UsersResponse { users }))
}

#[get("/<username>")]
pub async fn profile(db: Db, username: &str) -> ApiResult<UserResponse> {
    let username = username.to_string();
    let user = db
        .run(move |connection| User::load_by_name(connection, &username))
        .await?;
    Ok(Json(UserResponse { user }))
}

pub fn routes() -> Vec<Route> {
    routes![list, profile]
}
