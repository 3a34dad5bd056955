use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::{delete, insert_into, select, update};
use crate::article::query::Pagination;
use crate::db::schema::comments;
use crate::types::{ApiError, JsonBody, Resource};
use crate::utils::{serialize_date, vote_bounds};

#[derive(Debug, Queryable, Serialize, PartialEq)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
}

impl NewComment {
    /// The body must be exactly `{username, body}`, both strings.
    pub fn from_body(article_id: i32, body: &JsonBody) -> Result<NewComment, ApiError> {
        if !body.has_exactly(&["username", "body"]) {
            return Err(ApiError::MissingRequiredFields);
        }
        match (body.str_field("username"), body.str_field("body")) {
            (Some(username), Some(text)) => Ok(NewComment {
                body: text.to_string(),
                article_id,
                author: username.to_string(),
                votes: 0,
            }),
            _ => Err(ApiError::MissingRequiredFields),
        }
    }
}

/// Newest first.
pub fn fetch_comments(
    connection: &mut PgConnection,
    article_id: i32,
    page: &Pagination,
) -> Result<Vec<Comment>, ApiError> {
    let comments = comments::table
        .filter(comments::article_id.eq(article_id))
        .order((comments::created_at.desc(), comments::comment_id.desc()))
        .limit(page.limit)
        .offset(page.offset())
        .load::<Comment>(connection)?;
    Ok(comments)
}

/// Missing users and articles surface as foreign key violations.
pub fn insert_comment(
    connection: &mut PgConnection,
    new_comment: &NewComment,
) -> Result<Comment, ApiError> {
    let comment = insert_into(comments::table)
        .values(new_comment)
        .get_result::<Comment>(connection)?;
    Ok(comment)
}

pub fn delete_comment(connection: &mut PgConnection, id: i32) -> Result<(), ApiError> {
    let deleted = delete(comments::table.find(id)).execute(connection)?;
    if deleted == 0 {
        Err(ApiError::NotFound(Resource::Comment))
    } else {
        Ok(())
    }
}

/// Out-of-range sums are refused in the same statement that applies the delta.
pub fn update_votes(
    connection: &mut PgConnection,
    id: i32,
    delta: i32,
) -> Result<Comment, ApiError> {
    let (low, high) = vote_bounds(delta);
    let updated = update(
        comments::table
            .filter(comments::comment_id.eq(id))
            .filter(comments::votes.between(low, high)),
    )
    .set(comments::votes.eq(comments::votes + delta))
    .get_result::<Comment>(connection)
    .optional()?;

    match updated {
        Some(comment) => Ok(comment),
        None => {
            let found = select(exists(comments::table.find(id))).get_result::<bool>(connection)?;
            if found {
                Err(ApiError::InvalidVote)
            } else {
                Err(ApiError::NotFound(Resource::Comment))
            }
        }
    }
}
