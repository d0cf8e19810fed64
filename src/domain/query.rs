//! Storage-neutral listing specifications.
//!
//! Each listing endpoint resolves its raw parameters into a filter, an
//! ordered list of sort keys and an optional limit. The Postgres backend
//! renders these to SQL; the in-memory backend evaluates them directly.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::{
    entities::{
        blog_post::{BlogPostRecord, Priority},
        project::ProjectRecord,
    },
    errors::AppError,
};

pub const DEFAULT_MIN_LIKES: i32 = 10;
pub const TRENDING_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A sortable column of record type `R`.
pub trait SortField<R>: Copy {
    fn column(&self) -> &'static str;
    fn compare(&self, a: &R, b: &R) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortKey<F> {
    pub fn asc(field: F) -> Self {
        SortKey { field, direction: SortDirection::Asc }
    }

    pub fn desc(field: F) -> Self {
        SortKey { field, direction: SortDirection::Desc }
    }
}

/// Compares two records by each key in turn until one differs.
pub fn compare_by<R, F: SortField<R>>(keys: &[SortKey<F>], a: &R, b: &R) -> Ordering {
    keys.iter()
        .map(|key| key.direction.apply(key.field.compare(a, b)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

// ───── Projects ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortField {
    DisplayOrder,
    CreatedAt,
}

impl SortField<ProjectRecord> for ProjectSortField {
    fn column(&self) -> &'static str {
        match self {
            ProjectSortField::DisplayOrder => "display_order",
            ProjectSortField::CreatedAt => "created_at",
        }
    }

    fn compare(&self, a: &ProjectRecord, b: &ProjectRecord) -> Ordering {
        match self {
            ProjectSortField::DisplayOrder => a.display_order.cmp(&b.display_order),
            ProjectSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

impl ProjectFilter {
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.published.is_none_or(|p| record.published == p)
            && self.featured.is_none_or(|f| record.featured == f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectQuery {
    pub filter: ProjectFilter,
    pub sort: Vec<SortKey<ProjectSortField>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub published: Option<String>,
    pub featured: Option<String>,
}

/// Present and `"true"` is true; any other present value is false.
fn tri_state(raw: Option<&str>) -> Option<bool> {
    raw.map(|value| value == "true")
}

impl ProjectListParams {
    pub fn into_query(self) -> ProjectQuery {
        ProjectQuery {
            filter: ProjectFilter {
                published: tri_state(self.published.as_deref()),
                featured: tri_state(self.featured.as_deref()),
            },
            sort: vec![
                SortKey::asc(ProjectSortField::DisplayOrder),
                SortKey::desc(ProjectSortField::CreatedAt),
            ],
        }
    }
}

// ───── Blog posts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogSortField {
    CreatedAt,
    ViewCount,
    Likes,
}

impl SortField<BlogPostRecord> for BlogSortField {
    fn column(&self) -> &'static str {
        match self {
            BlogSortField::CreatedAt => "created_at",
            BlogSortField::ViewCount => "view_count",
            BlogSortField::Likes => "likes",
        }
    }

    fn compare(&self, a: &BlogPostRecord, b: &BlogPostRecord) -> Ordering {
        match self {
            BlogSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            BlogSortField::ViewCount => a.view_count.cmp(&b.view_count),
            BlogSortField::Likes => a.likes.cmp(&b.likes),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPostFilter {
    pub published: Option<bool>,
    pub is_trending: Option<bool>,
    pub priority: Option<Priority>,
    pub min_likes: Option<i32>,
}

impl BlogPostFilter {
    pub fn matches(&self, record: &BlogPostRecord) -> bool {
        self.published.is_none_or(|p| record.published == p)
            && self.is_trending.is_none_or(|t| record.is_trending == t)
            && self.priority.is_none_or(|p| record.priority == p.as_str())
            && self.min_likes.is_none_or(|min| record.likes >= min)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPostQuery {
    pub filter: BlogPostFilter,
    pub sort: Vec<SortKey<BlogSortField>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogVisibility {
    All,
    UnpublishedOnly,
    PublishedOnly,
}

impl BlogVisibility {
    /// Anything beyond the public view needs an admin session.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, BlogVisibility::PublishedOnly)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogListParams {
    pub admin: Option<String>,
    pub unpublished: Option<String>,
    pub published: Option<String>,
}

impl BlogListParams {
    pub fn visibility(&self) -> BlogVisibility {
        if self.admin.as_deref() == Some("true") {
            BlogVisibility::All
        } else if self.unpublished.as_deref() == Some("true") {
            BlogVisibility::UnpublishedOnly
        } else if self.published.as_deref() == Some("false") {
            BlogVisibility::UnpublishedOnly
        } else {
            BlogVisibility::PublishedOnly
        }
    }
}

impl BlogVisibility {
    pub fn into_query(self) -> BlogPostQuery {
        let published = match self {
            BlogVisibility::All => None,
            BlogVisibility::UnpublishedOnly => Some(false),
            BlogVisibility::PublishedOnly => Some(true),
        };

        BlogPostQuery {
            filter: BlogPostFilter { published, ..Default::default() },
            sort: vec![SortKey::desc(BlogSortField::CreatedAt)],
            limit: None,
        }
    }
}

/// Resolves a priority path segment. Unknown labels are rejected before any
/// storage access.
pub fn priority_query(raw: &str) -> Result<(Priority, BlogPostQuery), AppError> {
    let priority = raw
        .parse::<Priority>()
        .map_err(|message| AppError::invalid_field("priority", "invalid_choice", &message))?;

    let query = BlogPostQuery {
        filter: BlogPostFilter {
            published: Some(true),
            priority: Some(priority),
            ..Default::default()
        },
        sort: vec![
            SortKey::desc(BlogSortField::ViewCount),
            SortKey::desc(BlogSortField::CreatedAt),
        ],
        limit: None,
    };

    Ok((priority, query))
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    #[serde(rename = "minLikes")]
    pub min_likes: Option<String>,
}

impl TrendingParams {
    pub fn min_likes(&self) -> i32 {
        self.min_likes
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(DEFAULT_MIN_LIKES)
    }

    pub fn into_query(self) -> BlogPostQuery {
        BlogPostQuery {
            filter: BlogPostFilter {
                published: Some(true),
                is_trending: Some(true),
                min_likes: Some(self.min_likes()),
                ..Default::default()
            },
            sort: vec![
                SortKey::desc(BlogSortField::Likes),
                SortKey::desc(BlogSortField::ViewCount),
                SortKey::desc(BlogSortField::CreatedAt),
            ],
            limit: Some(TRENDING_LIMIT),
        }
    }
}
