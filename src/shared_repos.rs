use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    errors::AppError,
    repositories::{
        blog_post::BlogPostRepository,
        memory::{InMemoryBlogPostRepo, InMemoryProjectRepo},
        project::ProjectRepository,
        sqlx_repo::{SqlxBlogPostRepo, SqlxProjectRepo},
    },
};

/// Both repositories behind trait objects, plus what is needed to probe the
/// backing store.
#[derive(Clone)]
pub struct SharedRepositories {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub blog_post_repo: Arc<dyn BlogPostRepository>,
    pool: Option<PgPool>,
}

impl SharedRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        SharedRepositories {
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            blog_post_repo: Arc::new(SqlxBlogPostRepo::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn in_memory(
        project_repo: Arc<InMemoryProjectRepo>,
        blog_post_repo: Arc<InMemoryBlogPostRepo>,
    ) -> Self {
        SharedRepositories {
            project_repo,
            blog_post_repo,
            pool: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Round-trips a trivial query; the in-memory backend is always up.
    pub async fn check_connection(&self) -> Result<(), AppError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
