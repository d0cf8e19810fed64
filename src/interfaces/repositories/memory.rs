//! In-process storage backend, selected with `storage_backend = "memory"`.
//!
//! Rows live behind a `parking_lot::RwLock`; the lock is never held across
//! an `.await`. Every successful mutation bumps a write counter so tests can
//! assert how many writes an operation issued.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    entities::{
        blog_post::{BlogPostChanges, BlogPostInsert, BlogPostRecord, EngagementCounter},
        project::{ProjectChanges, ProjectInsert, ProjectRecord},
    },
    errors::AppError,
    query::{compare_by, BlogPostQuery, ProjectQuery},
    repositories::{blog_post::BlogPostRepository, project::ProjectRepository},
};

fn not_found() -> AppError {
    AppError::NotFound("Record not found".into())
}

#[derive(Default)]
pub struct InMemoryProjectRepo {
    rows: RwLock<Vec<ProjectRecord>>,
    writes: AtomicUsize,
}

impl InMemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row as-is, bypassing the write counter.
    pub fn seed(&self, record: ProjectRecord) {
        self.rows.write().push(record);
    }

    pub fn snapshot(&self, id: &Uuid) -> Option<ProjectRecord> {
        self.rows.read().iter().find(|r| r.id == *id).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn create(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError> {
        let record = project.into_record(Uuid::new_v4());
        self.rows.write().push(record.clone());
        self.record_write();
        Ok(record)
    }

    async fn find_many(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, AppError> {
        let mut records: Vec<_> = self
            .rows
            .read()
            .iter()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| compare_by(&query.sort, a, b));
        Ok(records)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<ProjectRecord, AppError> {
        self.snapshot(id).ok_or_else(not_found)
    }

    async fn update(&self, id: &Uuid, changes: ProjectChanges) -> Result<ProjectRecord, AppError> {
        let updated = {
            let mut rows = self.rows.write();
            let record = rows.iter_mut().find(|r| r.id == *id).ok_or_else(not_found)?;
            changes.apply_to(record);
            record.clone()
        };
        self.record_write();
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        {
            let mut rows = self.rows.write();
            let index = rows.iter().position(|r| r.id == *id).ok_or_else(not_found)?;
            rows.remove(index);
        }
        self.record_write();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBlogPostRepo {
    rows: RwLock<Vec<BlogPostRecord>>,
    writes: AtomicUsize,
}

impl InMemoryBlogPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: BlogPostRecord) {
        self.rows.write().push(record);
    }

    pub fn snapshot(&self, id: &Uuid) -> Option<BlogPostRecord> {
        self.rows.read().iter().find(|r| r.id == *id).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mirrors the unique index on `blog_posts.slug`.
fn slug_taken(rows: &[BlogPostRecord], slug: &str, except: Option<&Uuid>) -> bool {
    rows.iter()
        .any(|r| r.slug == slug && Some(&r.id) != except)
}

fn duplicate_slug(slug: &str) -> AppError {
    tracing::error!(slug, "Unique constraint violated on blog_posts.slug");
    AppError::StorageFailure("Database operation failed".into())
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepo {
    async fn create(&self, post: BlogPostInsert) -> Result<BlogPostRecord, AppError> {
        let record = {
            let mut rows = self.rows.write();
            if slug_taken(&rows, &post.slug, None) {
                return Err(duplicate_slug(&post.slug));
            }
            let record = post.into_record(Uuid::new_v4());
            rows.push(record.clone());
            record
        };
        self.record_write();
        Ok(record)
    }

    async fn find_many(&self, query: &BlogPostQuery) -> Result<Vec<BlogPostRecord>, AppError> {
        let mut records: Vec<_> = self
            .rows
            .read()
            .iter()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| compare_by(&query.sort, a, b));
        if let Some(limit) = query.limit {
            records.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(records)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<BlogPostRecord, AppError> {
        self.snapshot(id).ok_or_else(not_found)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPostRecord, AppError> {
        self.rows
            .read()
            .iter()
            .find(|r| r.slug == slug)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn update(&self, id: &Uuid, changes: BlogPostChanges) -> Result<BlogPostRecord, AppError> {
        let updated = {
            let mut rows = self.rows.write();
            if let Some(slug) = changes.slug.as_deref() {
                if slug_taken(&rows, slug, Some(id)) {
                    return Err(duplicate_slug(slug));
                }
            }
            let record = rows.iter_mut().find(|r| r.id == *id).ok_or_else(not_found)?;
            changes.apply_to(record);
            record.clone()
        };
        self.record_write();
        Ok(updated)
    }

    async fn increment_counter(&self, id: &Uuid, counter: EngagementCounter) -> Result<BlogPostRecord, AppError> {
        let updated = {
            let mut rows = self.rows.write();
            let record = rows.iter_mut().find(|r| r.id == *id).ok_or_else(not_found)?;
            counter.bump(record);
            record.clone()
        };
        self.record_write();
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        {
            let mut rows = self.rows.write();
            let index = rows.iter().position(|r| r.id == *id).ok_or_else(not_found)?;
            rows.remove(index);
        }
        self.record_write();
        Ok(())
    }
}
