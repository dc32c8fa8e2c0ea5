//! Page/sort primitives shared by every listing query.
//!
//! A listing is always: filter, sort, then skip/limit. The total is counted
//! with the same filter but without skip/limit, so callers can derive the
//! number of pages.

use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("limit must be a positive integer")]
    InvalidLimit,
    #[error("cannot sort by '{0}'")]
    UnknownSortField(String),
    #[error("sortType must be 'asc' or 'desc', got '{0}'")]
    UnknownSortType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Absent values take the defaults; `limit` is clamped to [`MAX_LIMIT`].
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, QueryError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// `LIMIT .. OFFSET ..` clause. Both values are integers, never user text.
    pub fn sql(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.limit, self.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(QueryError::UnknownSortType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "v.created_at",
            Self::UpdatedAt => "v.updated_at",
            Self::Views => "v.views",
            Self::Duration => "v.duration",
            Self::Title => "v.title",
        }
    }
}

impl FromStr for VideoSortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "views" => Ok(Self::Views),
            "duration" => Ok(Self::Duration),
            "title" => Ok(Self::Title),
            _ => Err(QueryError::UnknownSortField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoSort {
    pub field: VideoSortField,
    pub direction: SortDirection,
}

impl VideoSort {
    pub fn parse(sort_by: Option<&str>, sort_type: Option<&str>) -> Result<Self, QueryError> {
        let field = sort_by.map(str::parse::<VideoSortField>).transpose()?.unwrap_or_default();
        let direction = sort_type.map(str::parse::<SortDirection>).transpose()?.unwrap_or_default();
        Ok(Self { field, direction })
    }

    /// Ties fall back to insertion order in the same direction.
    pub fn sql(&self) -> String {
        let dir = self.direction.sql();
        format!("ORDER BY {} {dir}, v.rowid {dir}", self.field.column())
    }
}

/// One page of results plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
}
