use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel::result::Error as DieselError;
use dotenv::dotenv;
use log::{error, info};
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::request::{self, FromRequest};
use rocket::outcome::Outcome;
use rocket::tokio::task;
use rocket::Request;
use std::env;
use std::num::ParseIntError;
use crate::types::ApiError;

pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

const DEFAULT_POOL_SIZE: u32 = 10;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(ParseIntError);
        R2D2(r2d2::Error);
        Diesel(DieselError);
    }
}

/// Handle to the managed connection pool, handed to every route that talks to
/// the store. Diesel is blocking, so queries go through [`Db::run`].
#[derive(Clone)]
pub struct Db(Pool);

/// Retrieves the managed pool. If no pool is currently managed, fails with an
/// `InternalServerError` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Db, ()> {
        match request.rocket().state::<Pool>() {
            Some(pool) => Outcome::Success(Db(pool.clone())),
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

impl Db {
    /// Checks out a connection and runs `f` with it on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> ::std::result::Result<T, ApiError>
    where
        F: FnOnce(&mut PgConnection) -> ::std::result::Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.0.clone();
        let outcome = task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            f(&mut *connection)
        })
        .await;

        outcome.map_err(|e| {
            error!("store task failed: {}", e);
            ApiError::Internal
        })?
    }
}

pub fn init_pool() -> Result<Pool> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;
    let max_size = match env::var("DATABASE_POOL_SIZE") {
        Ok(size) => size.parse::<u32>()?,
        Err(_) => DEFAULT_POOL_SIZE,
    };
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Opens the pool when the server ignites and reports it when the server shuts
/// down; connections are closed when the managed pool is dropped.
pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Database", |rocket| async {
        rocket
            .attach(AdHoc::try_on_ignite("Database pool", |rocket| async {
                match task::spawn_blocking(init_pool).await {
                    Ok(Ok(pool)) => {
                        info!("database pool ready ({} connections)", pool.max_size());
                        Ok(rocket.manage(pool))
                    }
                    Ok(Err(e)) => {
                        error!("failed to create database pool: {}", e);
                        Err(rocket)
                    }
                    Err(e) => {
                        error!("database pool task failed: {}", e);
                        Err(rocket)
                    }
                }
            }))
            .attach(AdHoc::on_shutdown("Database pool", |rocket| {
                Box::pin(async move {
                    if let Some(pool) = rocket.state::<Pool>() {
                        info!(
                            "closing database pool ({} connections open)",
                            pool.state().connections
                        );
                    }
                })
            }))
    })
}
