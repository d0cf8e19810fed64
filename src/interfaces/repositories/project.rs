use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::project::{ProjectChanges, ProjectInsert, ProjectRecord},
    errors::AppError,
    query::ProjectQuery,
    repositories::sqlx_repo::{push_order_by, push_set, push_set_nullable, SqlxProjectRepo},
};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError>;
    async fn find_many(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, AppError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<ProjectRecord, AppError>;
    async fn update(&self, id: &Uuid, changes: ProjectChanges) -> Result<ProjectRecord, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl<T: ProjectRepository + ?Sized> ProjectRepository for Arc<T> {
    async fn create(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError> {
        (**self).create(project).await
    }

    async fn find_many(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, AppError> {
        (**self).find_many(query).await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<ProjectRecord, AppError> {
        (**self).find_by_id(id).await
    }

    async fn update(&self, id: &Uuid, changes: ProjectChanges) -> Result<ProjectRecord, AppError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        (**self).delete(id).await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create(&self, project: ProjectInsert) -> Result<ProjectRecord, AppError> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            r#"
            INSERT INTO projects (
                id, title, description, long_description, category, technologies, features,
                image_url, live_url, github_url, published, featured, display_order, difficulty,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project.title)
        .bind(project.description)
        .bind(project.long_description)
        .bind(project.category)
        .bind(project.technologies)
        .bind(project.features)
        .bind(project.image_url)
        .bind(project.live_url)
        .bind(project.github_url)
        .bind(project.published)
        .bind(project.featured)
        .bind(project.display_order)
        .bind(project.difficulty)
        .bind(project.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_many(&self, query: &ProjectQuery) -> Result<Vec<ProjectRecord>, AppError> {
        let mut builder = select_query(query);

        let records = builder
            .build_query_as::<ProjectRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<ProjectRecord, AppError> {
        let record = sqlx::query_as::<_, ProjectRecord>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn update(&self, id: &Uuid, changes: ProjectChanges) -> Result<ProjectRecord, AppError> {
        let mut builder = update_query(id, changes);

        let record = builder
            .build_query_as::<ProjectRecord>()
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Record not found".into()));
        }

        Ok(())
    }
}

fn select_query(query: &ProjectQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM projects WHERE TRUE");

    if let Some(published) = query.filter.published {
        builder.push(" AND published = ").push_bind(published);
    }
    if let Some(featured) = query.filter.featured {
        builder.push(" AND featured = ").push_bind(featured);
    }

    push_order_by(&mut builder, &query.sort);

    builder
}

fn update_query(id: &Uuid, changes: ProjectChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE projects SET ");

    let mut set = builder.separated(", ");
    push_set(&mut set, "title", changes.title);
    push_set(&mut set, "description", changes.description);
    push_set_nullable(&mut set, "long_description", changes.long_description);
    push_set(&mut set, "category", changes.category);
    push_set_nullable(&mut set, "technologies", changes.technologies);
    push_set_nullable(&mut set, "features", changes.features);
    push_set_nullable(&mut set, "image_url", changes.image_url);
    push_set_nullable(&mut set, "live_url", changes.live_url);
    push_set_nullable(&mut set, "github_url", changes.github_url);
    push_set(&mut set, "published", changes.published);
    push_set(&mut set, "featured", changes.featured);
    push_set(&mut set, "display_order", changes.display_order);
    push_set(&mut set, "difficulty", changes.difficulty);
    set.push("updated_at = NOW()");

    builder.push(" WHERE id = ").push_bind(*id);
    builder.push(" RETURNING *");

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::option_fields::OptionField, query::ProjectListParams};

    #[test]
    fn listing_filters_on_supplied_flags_in_display_order() {
        let params = ProjectListParams { published: Some("true".into()), featured: None };
        let builder = select_query(&params.into_query());
        assert_eq!(
            builder.sql(),
            "SELECT * FROM projects WHERE TRUE AND published = $1 \
             ORDER BY display_order ASC, created_at DESC"
        );
    }

    #[test]
    fn update_sets_only_supplied_columns() {
        let changes = ProjectChanges {
            featured: Some(true),
            technologies: OptionField::SetToValue(r#"["Rust"]"#.into()),
            ..Default::default()
        };
        let builder = update_query(&Uuid::new_v4(), changes);
        assert_eq!(
            builder.sql(),
            "UPDATE projects SET technologies = $1, featured = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING *"
        );
    }
}
