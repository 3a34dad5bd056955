extern crate chrono;
#[macro_use]
extern crate diesel;
extern crate dotenv;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
extern crate log;
extern crate r2d2;
#[macro_use]
extern crate rocket;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

mod api;
mod article;
mod comment;
mod db;
mod topic;
mod types;
mod users;
mod utils;

use dotenv::dotenv;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use serde_json::Value;
use crate::types::ApiError;

#[catch(404)]
fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<Value> {
    Json(json!({ "msg": status.reason().unwrap_or("Unknown error") }))
}

/// Routes and catchers, without a store attached.
fn app() -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .mount("/api/topics", topic::routes())
        .mount("/api/articles", article::routes())
        .mount("/api/articles", comment::article_routes())
        .mount("/api/comments", comment::routes())
        .mount("/api/users", users::routes())
        .register("/", catchers![not_found, default_catcher])
}

#[launch]
fn rocket() -> _ {
    dotenv().ok();
    app().attach(db::stage())
}
