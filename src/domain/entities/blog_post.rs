use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    codec::{ArrayCodec, ArrayFieldInput, CodecError},
    entities::{
        option_fields::OptionField,
        project::{encode_field, new_validation_error, validate_required},
    },
    errors::AppError,
    text::{derive_slug, estimate_read_time},
    utils::markdown::safe_markdown_to_html,
};

// ───── Constants ──────────────────────────────────────────────────────
pub const DEFAULT_AUTHOR: &str = "Admin";

// ───── Priority ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Case-sensitive: only the exact labels are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: \"{s}\". Must be High, Medium, or Low")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub author: String,
    pub tags: Option<String>,
    pub read_time: i32,
    pub priority: String,
    pub view_count: i32,
    pub likes: i32,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostInsert {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub author: String,
    pub tags: String,
    pub read_time: i32,
    pub priority: String,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogPostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: OptionField<String>,
    pub image_url: OptionField<String>,
    pub published: Option<bool>,
    pub author: Option<String>,
    pub tags: OptionField<String>,
    pub read_time: Option<i32>,
    pub priority: Option<String>,
    pub is_trending: Option<bool>,
}

/// Counters bumped by public engagement endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementCounter {
    Views,
    Likes,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub author: String,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub priority: String,
    pub view_count: i32,
    pub likes: i32,
    pub is_trending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostDetail {
    #[serde(flatten)]
    pub post: BlogPost,
    pub content_html: String,
}

#[derive(Debug, Serialize)]
pub struct PriorityListing {
    pub priority: String,
    pub count: usize,
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Serialize)]
pub struct TrendingListing {
    pub count: usize,
    pub posts: Vec<BlogPost>,
}

#[derive(Debug, Serialize)]
pub struct BlogPostDeletedResponse {
    pub message: String,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewBlogPostRequest {
    #[validate(custom(function = "validate_required"))]
    pub title: String,

    #[validate(custom(function = "validate_required"))]
    pub content: String,

    pub excerpt: Option<String>,

    #[validate(custom(function = "validate_image_url"))]
    pub image_url: Option<String>,

    pub published: bool,
    pub author: Option<String>,
    pub tags: Option<ArrayFieldInput>,

    #[validate(range(min = 1, message = "Read time must be at least one minute"))]
    pub read_time: Option<i32>,

    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    pub is_trending: Option<bool>,

    /// Editor scratch input, accepted and discarded.
    pub tag_input: Option<IgnoredAny>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateBlogPostRequest {
    #[validate(custom(function = "validate_required"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_required"))]
    pub content: Option<String>,

    pub excerpt: OptionField<String>,

    #[validate(custom(function = "validate_optional_image_url"))]
    pub image_url: OptionField<String>,

    pub published: Option<bool>,
    pub author: Option<String>,
    pub tags: OptionField<ArrayFieldInput>,

    #[validate(range(min = 1, message = "Read time must be at least one minute"))]
    pub read_time: Option<i32>,

    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    pub is_trending: Option<bool>,

    pub tag_input: Option<IgnoredAny>,
}

// ───── Validation Helpers ───────────────────────────────────────────

/// Empty, or an absolute http(s) URL.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        Ok(_) => Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://")),
        Err(_) => Err(new_validation_error("invalid_url", "Must be a valid URL or empty")),
    }
}

pub fn validate_optional_image_url(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let Some(image_url) = value.value_ref() {
        validate_image_url(image_url)?;
    }
    Ok(())
}

pub fn validate_priority(priority: &str) -> Result<(), ValidationError> {
    priority
        .parse::<Priority>()
        .map(|_| ())
        .map_err(|_| new_validation_error("invalid_choice", "Priority must be High, Medium, or Low"))
}

fn slug_for(title: &str) -> Result<String, AppError> {
    let slug = derive_slug(title);
    if slug.is_empty() {
        return Err(AppError::invalid_field(
            "title",
            "slug_empty",
            "Title must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

// ───── Conversions ──────────────────────────────────────────────────

impl NewBlogPostRequest {
    /// Validates the request and derives the stored row: slug from title,
    /// read time from content (unless supplied), encoded tags, defaults.
    pub fn prepare_for_insert(self, codec: &ArrayCodec) -> Result<BlogPostInsert, AppError> {
        self.validate()?;

        let slug = slug_for(&self.title)?;
        let read_time = self
            .read_time
            .unwrap_or_else(|| estimate_read_time(&self.content));
        let tags = encode_field(codec, "tags", self.tags.as_ref().unwrap_or(&ArrayFieldInput::default()))?;

        Ok(BlogPostInsert {
            title: self.title,
            slug,
            content: self.content,
            excerpt: self.excerpt,
            image_url: self.image_url,
            published: self.published,
            author: self.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            tags,
            read_time,
            priority: self.priority.unwrap_or_else(|| Priority::default().to_string()),
            is_trending: self.is_trending.unwrap_or(false),
            created_at: Utc::now(),
        })
    }
}

impl UpdateBlogPostRequest {
    /// Slug and read time are recomputed only when their source field is in
    /// the payload.
    pub fn prepare_for_update(self, codec: &ArrayCodec) -> Result<BlogPostChanges, AppError> {
        self.validate()?;

        let slug = self.title.as_deref().map(slug_for).transpose()?;
        let read_time = self
            .read_time
            .or_else(|| self.content.as_deref().map(estimate_read_time));
        let tags = self
            .tags
            .try_map_value(|input| encode_field(codec, "tags", &input))?;

        Ok(BlogPostChanges {
            title: self.title,
            slug,
            content: self.content,
            excerpt: self.excerpt,
            image_url: self.image_url,
            published: self.published,
            author: self.author,
            tags,
            read_time,
            priority: self.priority,
            is_trending: self.is_trending,
        })
    }
}

impl BlogPostInsert {
    pub fn into_record(self, id: Uuid) -> BlogPostRecord {
        BlogPostRecord {
            id,
            title: self.title,
            slug: self.slug,
            content: self.content,
            excerpt: self.excerpt,
            image_url: self.image_url,
            published: self.published,
            author: self.author,
            tags: Some(self.tags),
            read_time: self.read_time,
            priority: self.priority,
            view_count: 0,
            likes: 0,
            is_trending: self.is_trending,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl BlogPostChanges {
    pub fn apply_to(self, record: &mut BlogPostRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(slug) = self.slug {
            record.slug = slug;
        }
        if let Some(content) = self.content {
            record.content = content;
        }
        self.excerpt.apply_to(&mut record.excerpt);
        self.image_url.apply_to(&mut record.image_url);
        if let Some(published) = self.published {
            record.published = published;
        }
        if let Some(author) = self.author {
            record.author = author;
        }
        self.tags.apply_to(&mut record.tags);
        if let Some(read_time) = self.read_time {
            record.read_time = read_time;
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(is_trending) = self.is_trending {
            record.is_trending = is_trending;
        }
        record.updated_at = Utc::now();
    }
}

impl EngagementCounter {
    pub fn column(&self) -> &'static str {
        match self {
            EngagementCounter::Views => "view_count",
            EngagementCounter::Likes => "likes",
        }
    }

    pub fn bump(&self, record: &mut BlogPostRecord) {
        match self {
            EngagementCounter::Views => record.view_count = record.view_count.saturating_add(1),
            EngagementCounter::Likes => record.likes = record.likes.saturating_add(1),
        }
    }
}

impl BlogPost {
    pub fn from_record(record: BlogPostRecord, codec: &ArrayCodec) -> Result<Self, CodecError> {
        let tags = codec.decode(record.tags.as_deref())?;

        Ok(BlogPost {
            id: record.id,
            title: record.title,
            slug: record.slug,
            content: record.content,
            excerpt: record.excerpt,
            image_url: record.image_url,
            published: record.published,
            author: record.author,
            tags,
            read_time: record.read_time,
            priority: record.priority,
            view_count: record.view_count,
            likes: record.likes,
            is_trending: record.is_trending,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn into_detail(self) -> BlogPostDetail {
        let content_html = safe_markdown_to_html(&self.content);
        BlogPostDetail {
            post: self,
            content_html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_request(body: serde_json::Value) -> NewBlogPostRequest {
        serde_json::from_value(body).expect("request should deserialize")
    }

    fn update_request(body: serde_json::Value) -> UpdateBlogPostRequest {
        serde_json::from_value(body).expect("request should deserialize")
    }

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    #[test]
    fn priority_labels_are_case_sensitive() {
        assert_eq!("High".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("Low".parse::<Priority>(), Ok(Priority::Low));
        assert!("high".parse::<Priority>().is_err());
        assert!("Urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default().as_str(), "Medium");
    }

    #[test]
    fn insert_derives_slug_read_time_and_defaults() {
        let insert = new_request(json!({
            "title": "Getting Started: Next.js 14!",
            "content": words(401),
            "tags": ["nextjs", "react"],
            "tagInput": "typing..."
        }))
        .prepare_for_insert(&ArrayCodec::default())
        .unwrap();

        assert_eq!(insert.slug, "getting-started-next-js-14");
        assert_eq!(insert.read_time, 3);
        assert_eq!(insert.tags, r#"["nextjs","react"]"#);
        assert_eq!(insert.author, DEFAULT_AUTHOR);
        assert_eq!(insert.priority, "Medium");
        assert!(!insert.published);
        assert!(!insert.is_trending);
    }

    #[test]
    fn explicit_read_time_wins() {
        let insert = new_request(json!({ "title": "Hi", "content": words(1000), "readTime": 4 }))
            .prepare_for_insert(&ArrayCodec::default())
            .unwrap();
        assert_eq!(insert.read_time, 4);
    }

    #[test]
    fn image_url_may_be_empty_but_not_malformed() {
        let ok = new_request(json!({ "title": "Hi", "content": "Body", "imageUrl": "" }))
            .prepare_for_insert(&ArrayCodec::default());
        assert!(ok.is_ok());

        let err = new_request(json!({ "title": "Hi", "content": "Body", "imageUrl": "not a url" }))
            .prepare_for_insert(&ArrayCodec::default())
            .unwrap_err();
        match err {
            AppError::ValidationError(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].rule, "invalid_url");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn title_without_alphanumerics_is_rejected() {
        let err = new_request(json!({ "title": "???", "content": "Body" }))
            .prepare_for_insert(&ArrayCodec::default())
            .unwrap_err();
        match err {
            AppError::ValidationError(details) => {
                assert_eq!(details[0].field, "title");
                assert_eq!(details[0].rule, "slug_empty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn update_without_title_or_content_leaves_derived_fields_alone() {
        let changes = update_request(json!({ "published": true }))
            .prepare_for_update(&ArrayCodec::default())
            .unwrap();
        assert_eq!(changes, BlogPostChanges { published: Some(true), ..Default::default() });
    }

    #[test]
    fn update_recomputes_from_supplied_sources() {
        let changes = update_request(json!({ "title": "New Title", "content": words(400) }))
            .prepare_for_update(&ArrayCodec::default())
            .unwrap();
        assert_eq!(changes.slug.as_deref(), Some("new-title"));
        assert_eq!(changes.read_time, Some(2));
        assert!(changes.tags.is_unchanged());
    }

    #[test]
    fn update_rejects_bad_priority_and_url() {
        let err = update_request(json!({ "priority": "Urgent", "imageUrl": "ftp://x" }))
            .prepare_for_update(&ArrayCodec::default())
            .unwrap_err();
        match err {
            AppError::ValidationError(details) => {
                let rules: Vec<_> = details.iter().map(|d| d.rule.as_str()).collect();
                assert!(rules.contains(&"invalid_choice"));
                assert!(rules.contains(&"invalid_url_scheme"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detail_renders_sanitized_html() {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4(),
            title: "T".into(),
            slug: "t".into(),
            content: "# Hello\n\n<script>alert(1)</script>".into(),
            excerpt: None,
            image_url: None,
            published: true,
            author: DEFAULT_AUTHOR.into(),
            tags: vec![],
            read_time: 1,
            priority: "Medium".into(),
            view_count: 0,
            likes: 0,
            is_trending: false,
            created_at: now,
            updated_at: now,
        };

        let detail = post.into_detail();
        assert!(detail.content_html.contains("<h1>Hello</h1>"));
        assert!(!detail.content_html.contains("<script>"));

        let wire = serde_json::to_value(&detail).unwrap();
        assert!(wire.get("contentHtml").is_some());
        assert!(wire.get("readTime").is_some());
    }
}
