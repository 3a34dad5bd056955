use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::content::RawJson;
use rocket::response::{self, Responder, Response};
use serde::Serializer;
use serde_json::{self, Value};
use crate::types::{ApiError, Resource};

pub fn try_respond<'r>(
    req: &'r Request<'_>,
    json: &Value,
    status: Status,
) -> response::Result<'static> {
    let as_json = serde_json::to_string(&json);
    match as_json {
        Ok(json) => {
            let resp = RawJson(json).respond_to(req)?;
            Response::build_from(resp).status(status).ok()
        }

        Err(_) => Err(Status::InternalServerError),
    }
}

/// Stored timestamps are UTC without a zone; render them as `...Z` with millis.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let date = DateTime::<Utc>::from_naive_utc_and_offset(*date, Utc);
    let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Parses a numeric path segment. Ids are serial, so zero and negatives are
/// rejected along with non-numbers.
pub fn parse_id(raw: &str, resource: Resource) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidIdentifier(resource)),
    }
}

/// The stored vote counts for which adding `delta` stays within `i32`.
pub fn vote_bounds(delta: i32) -> (i32, i32) {
    if delta >= 0 {
        (i32::MIN, i32::MAX - delta)
    } else {
        (i32::MIN - delta, i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Serialize)]
    struct Stamp {
        #[serde(serialize_with = "serialize_date")]
        at: NaiveDateTime,
    }

    #[test]
    fn dates_render_as_utc_millis() {
        let at = NaiveDate::from_ymd_opt(2020, 7, 9)
            .and_then(|d| d.and_hms_milli_opt(20, 11, 0, 0))
            .unwrap();
        let json = serde_json::to_string(&Stamp { at }).unwrap();
        assert_eq!(json, r#"{"at":"2020-07-09T20:11:00.000Z"}"#);
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("12", Resource::Article).unwrap(), 12);
        for raw in &["invalid_id", "", "1.5", "0", "-3", "99999999999"] {
            match parse_id(raw, Resource::Comment) {
                Err(ApiError::InvalidIdentifier(Resource::Comment)) => {}
                other => panic!("{:?} gave {:?}", raw, other),
            }
        }
    }

    #[test]
    fn vote_bounds_keep_the_sum_in_range() {
        assert_eq!(vote_bounds(0), (i32::MIN, i32::MAX));
        assert_eq!(vote_bounds(1), (i32::MIN, i32::MAX - 1));
        assert_eq!(vote_bounds(i32::MAX), (i32::MIN, 0));
        assert_eq!(vote_bounds(-100), (i32::MIN + 100, i32::MAX));
        assert_eq!(vote_bounds(i32::MIN), (0, i32::MAX));
    }
}
