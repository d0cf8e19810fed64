use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::blog_post::{BlogPostChanges, BlogPostInsert, BlogPostRecord, EngagementCounter},
    errors::AppError,
    query::BlogPostQuery,
    repositories::sqlx_repo::{push_order_by, push_set, push_set_nullable, SqlxBlogPostRepo},
};

#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    async fn create(&self, post: BlogPostInsert) -> Result<BlogPostRecord, AppError>;
    async fn find_many(&self, query: &BlogPostQuery) -> Result<Vec<BlogPostRecord>, AppError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<BlogPostRecord, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<BlogPostRecord, AppError>;
    async fn update(&self, id: &Uuid, changes: BlogPostChanges) -> Result<BlogPostRecord, AppError>;
    async fn increment_counter(&self, id: &Uuid, counter: EngagementCounter) -> Result<BlogPostRecord, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl<T: BlogPostRepository + ?Sized> BlogPostRepository for Arc<T> {
    async fn create(&self, post: BlogPostInsert) -> Result<BlogPostRecord, AppError> {
        (**self).create(post).await
    }

    async fn find_many(&self, query: &BlogPostQuery) -> Result<Vec<BlogPostRecord>, AppError> {
        (**self).find_many(query).await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<BlogPostRecord, AppError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPostRecord, AppError> {
        (**self).find_by_slug(slug).await
    }

    async fn update(&self, id: &Uuid, changes: BlogPostChanges) -> Result<BlogPostRecord, AppError> {
        (**self).update(id, changes).await
    }

    async fn increment_counter(&self, id: &Uuid, counter: EngagementCounter) -> Result<BlogPostRecord, AppError> {
        (**self).increment_counter(id, counter).await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        (**self).delete(id).await
    }
}

impl SqlxBlogPostRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxBlogPostRepo { pool }
    }
}

#[async_trait]
impl BlogPostRepository for SqlxBlogPostRepo {
    async fn create(&self, post: BlogPostInsert) -> Result<BlogPostRecord, AppError> {
        let record = sqlx::query_as::<_, BlogPostRecord>(
            r#"
            INSERT INTO blog_posts (
                id, title, slug, content, excerpt, image_url, published, author, tags,
                read_time, priority, view_count, likes, is_trending, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, $12, $13, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.title)
        .bind(post.slug)
        .bind(post.content)
        .bind(post.excerpt)
        .bind(post.image_url)
        .bind(post.published)
        .bind(post.author)
        .bind(post.tags)
        .bind(post.read_time)
        .bind(post.priority)
        .bind(post.is_trending)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_many(&self, query: &BlogPostQuery) -> Result<Vec<BlogPostRecord>, AppError> {
        let mut builder = select_query(query);

        let records = builder
            .build_query_as::<BlogPostRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<BlogPostRecord, AppError> {
        let record = sqlx::query_as::<_, BlogPostRecord>("SELECT * FROM blog_posts WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<BlogPostRecord, AppError> {
        let record = sqlx::query_as::<_, BlogPostRecord>("SELECT * FROM blog_posts WHERE slug = $1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn update(&self, id: &Uuid, changes: BlogPostChanges) -> Result<BlogPostRecord, AppError> {
        let mut builder = update_query(id, changes);

        let record = builder
            .build_query_as::<BlogPostRecord>()
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn increment_counter(&self, id: &Uuid, counter: EngagementCounter) -> Result<BlogPostRecord, AppError> {
        let column = counter.column();
        let sql = format!("UPDATE blog_posts SET {column} = {column} + 1 WHERE id = $1 RETURNING *");

        let record = sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Record not found".into()));
        }

        Ok(())
    }
}

fn select_query(query: &BlogPostQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM blog_posts WHERE TRUE");
    let filter = &query.filter;

    if let Some(published) = filter.published {
        builder.push(" AND published = ").push_bind(published);
    }
    if let Some(is_trending) = filter.is_trending {
        builder.push(" AND is_trending = ").push_bind(is_trending);
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ").push_bind(priority.as_str());
    }
    if let Some(min_likes) = filter.min_likes {
        builder.push(" AND likes >= ").push_bind(min_likes);
    }

    push_order_by(&mut builder, &query.sort);

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }

    builder
}

/// Only supplied columns appear in the SET list.
fn update_query(id: &Uuid, changes: BlogPostChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE blog_posts SET ");

    let mut set = builder.separated(", ");
    push_set(&mut set, "title", changes.title);
    push_set(&mut set, "slug", changes.slug);
    push_set(&mut set, "content", changes.content);
    push_set_nullable(&mut set, "excerpt", changes.excerpt);
    push_set_nullable(&mut set, "image_url", changes.image_url);
    push_set(&mut set, "published", changes.published);
    push_set(&mut set, "author", changes.author);
    push_set_nullable(&mut set, "tags", changes.tags);
    push_set(&mut set, "read_time", changes.read_time);
    push_set(&mut set, "priority", changes.priority);
    push_set(&mut set, "is_trending", changes.is_trending);
    set.push("updated_at = NOW()");

    builder.push(" WHERE id = ").push_bind(*id);
    builder.push(" RETURNING *");

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::option_fields::OptionField, query::{BlogVisibility, TrendingParams}};

    #[test]
    fn trending_query_filters_sorts_and_limits() {
        let builder = select_query(&TrendingParams::default().into_query());
        assert_eq!(
            builder.sql(),
            "SELECT * FROM blog_posts WHERE TRUE AND published = $1 AND is_trending = $2 \
             AND likes >= $3 ORDER BY likes DESC, view_count DESC, created_at DESC LIMIT $4"
        );
    }

    #[test]
    fn listing_all_posts_has_no_filter_or_limit() {
        let builder = select_query(&BlogVisibility::All.into_query());
        assert_eq!(builder.sql(), "SELECT * FROM blog_posts WHERE TRUE ORDER BY created_at DESC");
    }

    #[test]
    fn update_sets_only_supplied_columns() {
        let changes = BlogPostChanges { published: Some(true), ..Default::default() };
        let builder = update_query(&Uuid::new_v4(), changes);
        assert_eq!(
            builder.sql(),
            "UPDATE blog_posts SET published = $1, updated_at = NOW() WHERE id = $2 RETURNING *"
        );
    }

    #[test]
    fn update_clears_nullable_columns_without_binding() {
        let changes = BlogPostChanges {
            title: Some("New".into()),
            slug: Some("new".into()),
            excerpt: OptionField::SetToNull,
            ..Default::default()
        };
        let builder = update_query(&Uuid::new_v4(), changes);
        assert_eq!(
            builder.sql(),
            "UPDATE blog_posts SET title = $1, slug = $2, excerpt = NULL, updated_at = NOW() \
             WHERE id = $3 RETURNING *"
        );
    }
}
