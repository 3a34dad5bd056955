//! Validation and SQL composition for the article listing.
//!
//! Raw query-string values only ever reach the SQL text through the closed
//! tables below: `sort_by` and `order` are looked up, and the statement is
//! written from the matched entries. Everything else is a bind parameter.

use crate::types::{ApiError, Validate};

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_PAGE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    ArticleId,
    Title,
    Author,
    Topic,
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

// Accepted `sort_by` values.
const SORT_COLUMNS: &[(&str, SortColumn)] = &[
    ("article_id", SortColumn::ArticleId),
    ("title", SortColumn::Title),
    ("author", SortColumn::Author),
    ("topic", SortColumn::Topic),
    ("created_at", SortColumn::CreatedAt),
    ("votes", SortColumn::Votes),
    ("article_img_url", SortColumn::ArticleImgUrl),
    ("comment_count", SortColumn::CommentCount),
];

impl SortColumn {
    pub fn from_param(value: &str) -> Option<SortColumn> {
        SORT_COLUMNS
            .iter()
            .find(|(name, _)| *name == value)
            .map(|&(_, column)| column)
    }

    /// The ORDER BY expression. `comment_count` is the aggregate's alias.
    pub fn column(self) -> &'static str {
        match self {
            SortColumn::ArticleId => "articles.article_id",
            SortColumn::Title => "articles.title",
            SortColumn::Author => "articles.author",
            SortColumn::Topic => "articles.topic",
            SortColumn::CreatedAt => "articles.created_at",
            SortColumn::Votes => "articles.votes",
            SortColumn::ArticleImgUrl => "articles.article_img_url",
            SortColumn::CommentCount => "comment_count",
        }
    }
}

impl Default for SortColumn {
    fn default() -> Self {
        SortColumn::CreatedAt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Case-sensitive: only `ASC` and `DESC` are accepted.
    pub fn from_param(value: &str) -> Option<Order> {
        match value {
            "ASC" => Some(Order::Asc),
            "DESC" => Some(Order::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

/// A 1-indexed page of `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

impl Pagination {
    /// Limit is checked before page.
    pub fn parse(limit: Option<&str>, page: Option<&str>) -> Result<Pagination, ApiError> {
        let limit = match limit {
            Some(raw) => positive(raw).ok_or(ApiError::InvalidLimit)?,
            None => DEFAULT_LIMIT,
        };
        let page = match page {
            Some(raw) => positive(raw).ok_or(ApiError::InvalidPage)?,
            None => DEFAULT_PAGE,
        };
        Ok(Pagination { limit, page })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn positive(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|n| *n >= 1)
}

/// Query string of `GET /api/articles`, as received.
#[derive(Debug, Default, FromForm)]
pub struct ArticleParams {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub topic: Option<String>,
    pub limit: Option<String>,
    pub p: Option<String>,
}

/// Query string of `GET /api/articles/<id>/comments`, as received.
#[derive(Debug, Default, FromForm)]
pub struct PageParams {
    pub limit: Option<String>,
    pub p: Option<String>,
}

/// A validated listing request. Only produced by validating [`ArticleParams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub sort_by: SortColumn,
    pub order: Order,
    pub topic: Option<String>,
    pub page: Pagination,
}

impl Validate for ArticleParams {
    type Output = ArticleQuery;
    type Error = ApiError;

    fn validate(self) -> Result<ArticleQuery, ApiError> {
        let sort_by = match self.sort_by {
            Some(ref raw) => SortColumn::from_param(raw).ok_or(ApiError::InvalidSortColumn)?,
            None => SortColumn::default(),
        };
        let order = match self.order {
            Some(ref raw) => Order::from_param(raw).ok_or(ApiError::InvalidOrder)?,
            None => Order::default(),
        };
        let page = Pagination::parse(self.limit.as_deref(), self.p.as_deref())?;

        Ok(ArticleQuery {
            sort_by,
            order,
            topic: self.topic,
            page,
        })
    }
}

impl Validate for PageParams {
    type Output = Pagination;
    type Error = ApiError;

    fn validate(self) -> Result<Pagination, ApiError> {
        Pagination::parse(self.limit.as_deref(), self.p.as_deref())
    }
}

const SELECT_ARTICLES: &str = "SELECT articles.article_id,
       articles.title,
       articles.author,
       articles.topic,
       articles.created_at,
       articles.votes,
       articles.article_img_url,
       COUNT(comments.comment_id) AS comment_count
  FROM articles
  LEFT JOIN comments ON comments.article_id = articles.article_id";

impl ArticleQuery {
    /// The page statement. Binds, in order: topic (when filtered), limit, offset.
    pub fn listing_sql(&self) -> String {
        let mut sql = String::from(SELECT_ARTICLES);
        let mut param = 1;
        if self.topic.is_some() {
            sql.push_str("\n WHERE articles.topic = $1");
            param += 1;
        }
        sql.push_str(&format!(
            "\n GROUP BY articles.article_id\n ORDER BY {} {}, articles.article_id ASC\n LIMIT ${} OFFSET ${}",
            self.sort_by.column(),
            self.order.keyword(),
            param,
            param + 1
        ));
        sql
    }
}
