use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamp};
use diesel::{insert_into, select, sql_query, update};
use super::query::ArticleQuery;
use crate::db::schema::articles;
use crate::types::{ApiError, JsonBody, Resource};
use crate::utils::{serialize_date, vote_bounds};

pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

static SELECT_ARTICLE: &str = "SELECT articles.article_id,
       articles.title,
       articles.author,
       articles.topic,
       articles.body,
       articles.created_at,
       articles.votes,
       articles.article_img_url,
       COUNT(comments.comment_id) AS comment_count
  FROM articles
  LEFT JOIN comments ON comments.article_id = articles.article_id
 WHERE articles.article_id = $1
 GROUP BY articles.article_id";

#[derive(Debug, Queryable, PartialEq)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub votes: i32,
    pub article_img_url: String,
}

/// An article without its body, as listed.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

/// A full article with its live comment count.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl From<Article> for ArticleDetail {
    fn from(article: Article) -> Self {
        ArticleDetail {
            article_id: article.article_id,
            title: article.title,
            author: article.author,
            topic: article.topic,
            body: article.body,
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url,
            // A row that was just inserted has nothing referencing it yet.
            comment_count: 0,
        }
    }
}

#[derive(Debug)]
pub struct ArticlePage {
    pub articles: Vec<ArticleSummary>,
    pub total_count: i64,
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub body: String,
    pub topic: String,
    pub article_img_url: String,
}

impl NewArticle {
    /// Requires string `author`, `title`, `body` and `topic`; `article_img_url`
    /// is optional. Unknown keys are ignored.
    pub fn from_body(body: &JsonBody) -> Result<NewArticle, ApiError> {
        let field = |key: &str| {
            body.str_field(key)
                .map(str::to_string)
                .ok_or(ApiError::MissingRequiredFields)
        };
        let article_img_url = match body.0.get("article_img_url") {
            None => DEFAULT_ARTICLE_IMG_URL.to_string(),
            Some(_) => field("article_img_url")?,
        };

        Ok(NewArticle {
            author: field("author")?,
            title: field("title")?,
            body: field("body")?,
            topic: field("topic")?,
            article_img_url,
        })
    }
}

/// One page of the listing plus the unpaginated count of matching articles.
///
/// A topic filter that matches nothing is reported as an unknown topic; a
/// topic that exists but has no articles looks the same.
pub fn fetch_articles(
    connection: &mut PgConnection,
    query: &ArticleQuery,
) -> Result<ArticlePage, ApiError> {
    let mut statement = sql_query(query.listing_sql()).into_boxed::<Pg>();
    if let Some(ref topic) = query.topic {
        statement = statement.bind::<Text, _>(topic.clone());
    }
    let articles = statement
        .bind::<BigInt, _>(query.page.limit)
        .bind::<BigInt, _>(query.page.offset())
        .load::<ArticleSummary>(connection)?;

    let total_count: i64 = match query.topic {
        Some(ref topic) => articles::table
            .filter(articles::topic.eq(topic.as_str()))
            .count()
            .get_result(connection)?,
        None => articles::table.count().get_result(connection)?,
    };

    if query.topic.is_some() && total_count == 0 {
        return Err(ApiError::NotFound(Resource::Topic));
    }

    Ok(ArticlePage {
        articles,
        total_count,
    })
}

pub fn fetch_article_by_id(
    connection: &mut PgConnection,
    id: i32,
) -> Result<ArticleDetail, ApiError> {
    sql_query(SELECT_ARTICLE)
        .bind::<Integer, _>(id)
        .get_result::<ArticleDetail>(connection)
        .optional()?
        .ok_or(ApiError::NotFound(Resource::Article))
}

pub fn check_article_exists(connection: &mut PgConnection, id: i32) -> Result<(), ApiError> {
    let found = select(exists(articles::table.find(id))).get_result::<bool>(connection)?;
    if found {
        Ok(())
    } else {
        Err(ApiError::NotFound(Resource::Article))
    }
}

/// Adds `delta` to the stored count in one statement so concurrent deltas add up.
/// A delta that would take the count outside `i32` leaves the row untouched.
pub fn update_votes(
    connection: &mut PgConnection,
    id: i32,
    delta: i32,
) -> Result<ArticleDetail, ApiError> {
    let (low, high) = vote_bounds(delta);
    let updated = update(
        articles::table
            .filter(articles::article_id.eq(id))
            .filter(articles::votes.between(low, high)),
    )
    .set(articles::votes.eq(articles::votes + delta))
    .execute(connection)?;
    if updated == 0 {
        check_article_exists(connection, id)?;
        return Err(ApiError::InvalidVote);
    }
    fetch_article_by_id(connection, id)
}

pub fn insert_article(
    connection: &mut PgConnection,
    new_article: &NewArticle,
) -> Result<ArticleDetail, ApiError> {
    let article = insert_into(articles::table)
        .values(new_article)
        .get_result::<Article>(connection)?;
    Ok(article.into())
}
