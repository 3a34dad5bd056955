use diesel::prelude::*;
use crate::db::schema::users;
use crate::types::{ApiError, Resource};

#[derive(Debug, Queryable, Serialize, PartialEq)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

impl User {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<User>, ApiError> {
        users::table
            .order(users::username.asc())
            .load::<User>(connection)
            .map_err(|e| e.into())
    }

    pub fn load_by_name(connection: &mut PgConnection, username: &str) -> Result<User, ApiError> {
        users::table
            .find(username)
            .get_result::<User>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(Resource::User))
    }
}
