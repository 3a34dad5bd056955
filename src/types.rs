use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::error;
use rocket::data::{self, Data, FromData, Limits};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Error as IoError;
use crate::utils::try_respond;

pub trait Validate
where
    Self: Sized,
{
    type Output;
    type Error;
    fn validate(self) -> Result<Self::Output, Self::Error>;
}

/// The record a failure is about. Chosen by the call site, rendered into the
/// `Invalid <resource>_id` and `<Resource> not found` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Article,
    Comment,
    User,
    Topic,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Article => "article",
            Resource::Comment => "comment",
            Resource::User => "user",
            Resource::Topic => "topic",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Resource::Article => "Article",
            Resource::Comment => "Comment",
            Resource::User => "User",
            Resource::Topic => "Topic",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Foreign keys whose violation means the referenced row does not exist.
const FOREIGN_KEYS: &[(&str, Resource)] = &[
    ("comments_author_fkey", Resource::User),
    ("comments_article_id_fkey", Resource::Article),
    ("articles_author_fkey", Resource::User),
    ("articles_topic_fkey", Resource::Topic),
];

#[derive(Debug)]
pub enum ApiError {
    InvalidIdentifier(Resource),
    MissingRequiredFields,
    InvalidVote,
    InvalidLimit,
    InvalidPage,
    InvalidSortColumn,
    InvalidOrder,
    NotFound(Resource),
    RouteNotFound,
    Diesel(DieselError),
    Pool(r2d2::Error),
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl From<IoError> for ApiError {
    fn from(_: IoError) -> ApiError {
        ApiError::Internal
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    /// Maps a store failure onto the domain failure it stands for, if any.
    fn from_store(error: &DieselError) -> Option<ApiError> {
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                let constraint = info.constraint_name()?;
                FOREIGN_KEYS
                    .iter()
                    .find(|(name, _)| *name == constraint)
                    .map(|&(_, resource)| ApiError::NotFound(resource))
            }
            DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, _) => {
                Some(ApiError::MissingRequiredFields)
            }
            DieselError::NotFound => Some(ApiError::RouteNotFound),
            _ => None,
        }
    }

    /// The status and message reported to the client for this failure.
    pub fn normalize(&self) -> (Status, String) {
        let bad_request = |msg: &str| (Status::BadRequest, msg.to_string());
        match self {
            ApiError::InvalidIdentifier(resource) => {
                (Status::BadRequest, format!("Invalid {}_id", resource))
            }
            ApiError::MissingRequiredFields => bad_request("Missing required fields"),
            ApiError::InvalidVote => bad_request("Invalid vote"),
            ApiError::InvalidLimit => bad_request("Invalid limit query"),
            ApiError::InvalidPage => bad_request("Invalid page query"),
            ApiError::InvalidSortColumn => bad_request("Invalid sort_by query"),
            ApiError::InvalidOrder => bad_request("Invalid order query"),
            ApiError::NotFound(resource) => {
                (Status::NotFound, format!("{} not found", resource.title()))
            }
            ApiError::RouteNotFound => (Status::NotFound, "Not found".to_string()),
            ApiError::Diesel(error) => match ApiError::from_store(error) {
                Some(domain) => domain.normalize(),
                None => internal_error(),
            },
            ApiError::Pool(_) => (Status::ServiceUnavailable, "Service unavailable".to_string()),
            ApiError::Internal => internal_error(),
        }
    }
}

fn internal_error() -> (Status, String) {
    (Status::InternalServerError, "Internal Server Error".to_string())
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, msg) = self.normalize();
        if status.code >= 500 {
            error!("{} {} failed: {:?}", req.method(), req.uri(), self);
        }
        try_respond(req, &json!({ "msg": msg }), status)
    }
}

/// A request body that must be a JSON object. Anything else counts as missing
/// fields.
#[derive(Debug, Default)]
pub struct JsonBody(pub Map<String, Value>);

/// Taken by routes so body failures reach the handler and render as `{msg}`.
pub type Body = Result<JsonBody, ApiError>;

impl JsonBody {
    pub fn has_exactly(&self, keys: &[&str]) -> bool {
        self.0.len() == keys.len() && keys.iter().all(|key| self.0.contains_key(*key))
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The signed `inc_votes` delta.
    pub fn inc_votes(&self) -> Result<i32, ApiError> {
        let value = self.0.get("inc_votes").ok_or(ApiError::MissingRequiredFields)?;
        let delta = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        delta
            .and_then(|delta| i32::try_from(delta).ok())
            .ok_or(ApiError::InvalidVote)
    }
}

#[rocket::async_trait]
impl<'r> FromData<'r> for JsonBody {
    type Error = ApiError;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(Limits::JSON);
        let text = match data.open(limit).into_string().await {
            Ok(text) if text.is_complete() => text.into_inner(),
            Ok(_) => {
                return Outcome::Error((Status::PayloadTooLarge, ApiError::MissingRequiredFields))
            }
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };

        match serde_json::from_str::<Map<String, Value>>(&text) {
            Ok(map) => Outcome::Success(JsonBody(map)),
            Err(_) => Outcome::Error((Status::BadRequest, ApiError::MissingRequiredFields)),
        }
    }
}
