use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    codec::{ArrayCodec, ArrayFieldInput, CodecError},
    entities::option_fields::OptionField,
    errors::AppError,
};

// ───── Constants ──────────────────────────────────────────────────────
pub const PROJECT_CATEGORIES: [&str; 4] = ["Web Application", "Mobile App", "Website", "Dashboard"];
pub const DIFFICULTIES: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];
pub const DEFAULT_DIFFICULTY: &str = "Intermediate";

// ───── Database Models ───────────────────────────────────────────────

/// A project row as stored. Array columns hold codec text.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub technologies: Option<String>,
    pub features: Option<String>,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub display_order: i32,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInsert {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub technologies: String,
    pub features: String,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub display_order: i32,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
}

/// Column-level changes for a partial update. `None` and `Unchanged` leave
/// the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: OptionField<String>,
    pub category: Option<String>,
    pub technologies: OptionField<String>,
    pub features: OptionField<String>,
    pub image_url: OptionField<String>,
    pub live_url: OptionField<String>,
    pub github_url: OptionField<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub display_order: Option<i32>,
    pub difficulty: Option<String>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub technologies: Vec<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDeletedResponse {
    pub success: bool,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProjectRequest {
    #[validate(custom(function = "validate_required"))]
    pub title: String,

    #[validate(custom(function = "validate_required"))]
    pub description: String,

    pub long_description: Option<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: String,

    pub technologies: Option<ArrayFieldInput>,
    pub features: Option<ArrayFieldInput>,

    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,

    pub published: bool,
    pub featured: bool,

    #[serde(rename = "order")]
    pub display_order: i32,

    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,

    /// Editor scratch input, accepted and discarded.
    pub tech_input: Option<IgnoredAny>,
    /// Editor scratch input, accepted and discarded.
    pub feature_input: Option<IgnoredAny>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "validate_required"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_required"))]
    pub description: Option<String>,

    pub long_description: OptionField<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,

    pub technologies: OptionField<ArrayFieldInput>,
    pub features: OptionField<ArrayFieldInput>,

    pub image_url: OptionField<String>,
    pub live_url: OptionField<String>,
    pub github_url: OptionField<String>,

    pub published: Option<bool>,
    pub featured: Option<bool>,

    #[serde(rename = "order")]
    pub display_order: Option<i32>,

    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,

    pub tech_input: Option<IgnoredAny>,
    pub feature_input: Option<IgnoredAny>,
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("required", "This field is required"));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    validate_required(category)?;
    if !PROJECT_CATEGORIES.contains(&category) {
        return Err(new_validation_error(
            "invalid_choice",
            "Category must be one of: Web Application, Mobile App, Website, Dashboard",
        ));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: &str) -> Result<(), ValidationError> {
    if !DIFFICULTIES.contains(&difficulty) {
        return Err(new_validation_error(
            "invalid_choice",
            "Difficulty must be one of: Beginner, Intermediate, Advanced",
        ));
    }
    Ok(())
}

pub(crate) fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

pub(crate) fn encode_field(
    codec: &ArrayCodec,
    field: &str,
    input: &ArrayFieldInput,
) -> Result<String, AppError> {
    codec
        .encode(input)
        .map_err(|e| AppError::invalid_field(field, "array_encoding", e.to_string()))
}

// ───── Conversions ──────────────────────────────────────────────────

impl NewProjectRequest {
    /// Validates the request and reconciles it into a storable row: scratch
    /// inputs are dropped and array fields are encoded.
    pub fn prepare_for_insert(self, codec: &ArrayCodec) -> Result<ProjectInsert, AppError> {
        self.validate()?;

        let empty = ArrayFieldInput::default();
        let technologies = encode_field(codec, "technologies", self.technologies.as_ref().unwrap_or(&empty))?;
        let features = encode_field(codec, "features", self.features.as_ref().unwrap_or(&empty))?;

        Ok(ProjectInsert {
            title: self.title,
            description: self.description,
            long_description: self.long_description,
            category: self.category,
            technologies,
            features,
            image_url: self.image_url,
            live_url: self.live_url,
            github_url: self.github_url,
            published: self.published,
            featured: self.featured,
            display_order: self.display_order,
            difficulty: self.difficulty.unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            created_at: Utc::now(),
        })
    }
}

impl UpdateProjectRequest {
    /// Validates the supplied fields and encodes only the array fields that
    /// are present in the payload.
    pub fn prepare_for_update(self, codec: &ArrayCodec) -> Result<ProjectChanges, AppError> {
        self.validate()?;

        let technologies = self
            .technologies
            .try_map_value(|input| encode_field(codec, "technologies", &input))?;
        let features = self
            .features
            .try_map_value(|input| encode_field(codec, "features", &input))?;

        Ok(ProjectChanges {
            title: self.title,
            description: self.description,
            long_description: self.long_description,
            category: self.category,
            technologies,
            features,
            image_url: self.image_url,
            live_url: self.live_url,
            github_url: self.github_url,
            published: self.published,
            featured: self.featured,
            display_order: self.display_order,
            difficulty: self.difficulty,
        })
    }
}

impl ProjectInsert {
    pub fn into_record(self, id: Uuid) -> ProjectRecord {
        ProjectRecord {
            id,
            title: self.title,
            description: self.description,
            long_description: self.long_description,
            category: self.category,
            technologies: Some(self.technologies),
            features: Some(self.features),
            image_url: self.image_url,
            live_url: self.live_url,
            github_url: self.github_url,
            published: self.published,
            featured: self.featured,
            display_order: self.display_order,
            difficulty: self.difficulty,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl ProjectChanges {
    pub fn apply_to(self, record: &mut ProjectRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        self.long_description.apply_to(&mut record.long_description);
        if let Some(category) = self.category {
            record.category = category;
        }
        self.technologies.apply_to(&mut record.technologies);
        self.features.apply_to(&mut record.features);
        self.image_url.apply_to(&mut record.image_url);
        self.live_url.apply_to(&mut record.live_url);
        self.github_url.apply_to(&mut record.github_url);
        if let Some(published) = self.published {
            record.published = published;
        }
        if let Some(featured) = self.featured {
            record.featured = featured;
        }
        if let Some(order) = self.display_order {
            record.display_order = order;
        }
        if let Some(difficulty) = self.difficulty {
            record.difficulty = difficulty;
        }
        record.updated_at = Utc::now();
    }
}

impl Project {
    pub fn from_record(record: ProjectRecord, codec: &ArrayCodec) -> Result<Self, CodecError> {
        let technologies = codec.decode(record.technologies.as_deref())?;
        let features = codec.decode(record.features.as_deref())?;

        Ok(Project {
            id: record.id,
            title: record.title,
            description: record.description,
            long_description: record.long_description,
            category: record.category,
            technologies,
            features,
            image_url: record.image_url,
            live_url: record.live_url,
            github_url: record.github_url,
            published: record.published,
            featured: record.featured,
            display_order: record.display_order,
            difficulty: record.difficulty,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
