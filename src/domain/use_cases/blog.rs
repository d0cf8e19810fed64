use tracing::info;

use crate::{
    codec::ArrayCodec,
    entities::blog_post::{
        BlogPost, BlogPostDeletedResponse, BlogPostDetail, BlogPostRecord, EngagementCounter,
        NewBlogPostRequest, PriorityListing, TrendingListing, UpdateBlogPostRequest,
    },
    errors::AppError,
    query::{priority_query, BlogPostQuery, BlogVisibility, TrendingParams},
    repositories::blog_post::BlogPostRepository,
    utils::valid_uuid::valid_uuid,
};

const NOT_FOUND: &str = "Blog post not found";

pub struct BlogPostHandler<R>
where
    R: BlogPostRepository,
{
    pub blog_post_repo: R,
    codec: ArrayCodec,
}

impl<R> BlogPostHandler<R>
where
    R: BlogPostRepository,
{
    pub fn new(blog_post_repo: R, codec: ArrayCodec) -> Self {
        BlogPostHandler { blog_post_repo, codec }
    }

    async fn fetch(&self, query: &BlogPostQuery) -> Result<Vec<BlogPost>, AppError> {
        let records = self
            .blog_post_repo
            .find_many(query)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch blog posts"))?;

        self.decode_all(records)
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch blog posts"))
    }

    fn decode_all(&self, records: Vec<BlogPostRecord>) -> Result<Vec<BlogPost>, AppError> {
        records
            .into_iter()
            .map(|record| BlogPost::from_record(record, &self.codec).map_err(AppError::from))
            .collect()
    }

    fn decode(&self, record: BlogPostRecord) -> Result<BlogPost, AppError> {
        Ok(BlogPost::from_record(record, &self.codec)?)
    }

    /// Newest first. Visibility is resolved (and gated) by the caller.
    pub async fn list_blog_posts(&self, visibility: BlogVisibility) -> Result<Vec<BlogPost>, AppError> {
        self.fetch(&visibility.into_query()).await
    }

    /// Published posts of one priority, most viewed first. Unknown priorities
    /// are rejected before storage is touched.
    pub async fn list_by_priority(&self, priority: &str) -> Result<PriorityListing, AppError> {
        let (priority, query) = priority_query(priority)?;
        let posts = self.fetch(&query).await?;

        Ok(PriorityListing {
            priority: priority.to_string(),
            count: posts.len(),
            posts,
        })
    }

    pub async fn list_trending(&self, params: TrendingParams) -> Result<TrendingListing, AppError> {
        let posts = self.fetch(&params.into_query()).await?;

        Ok(TrendingListing {
            count: posts.len(),
            posts,
        })
    }

    pub async fn get_blog_post(&self, id: &str) -> Result<BlogPostDetail, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;

        let record = self
            .blog_post_repo
            .find_by_id(&id)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch blog post"))?;

        Ok(self.decode(record)?.into_detail())
    }

    pub async fn get_blog_post_by_slug(&self, slug: &str) -> Result<BlogPostDetail, AppError> {
        let record = self
            .blog_post_repo
            .find_by_slug(slug)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to fetch blog post"))?;

        Ok(self.decode(record)?.into_detail())
    }

    /// Derives slug and read time, applies defaults and stores the post in a
    /// single write.
    pub async fn create_blog_post(&self, request: NewBlogPostRequest) -> Result<BlogPost, AppError> {
        let insert = request.prepare_for_insert(&self.codec)?;

        let record = self
            .blog_post_repo
            .create(insert)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to create blog post"))?;

        info!(post_id = %record.id, slug = %record.slug, "Blog post created");
        self.decode(record)
    }

    pub async fn update_blog_post(&self, id: &str, request: UpdateBlogPostRequest) -> Result<BlogPost, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let changes = request.prepare_for_update(&self.codec)?;

        let record = self
            .blog_post_repo
            .update(&id, changes)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to update blog post"))?;

        info!(post_id = %record.id, "Blog post updated");
        self.decode(record)
    }

    pub async fn delete_blog_post(&self, id: &str) -> Result<BlogPostDeletedResponse, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;

        self.blog_post_repo
            .delete(&id)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to delete blog post"))?;

        info!(post_id = %id, "Blog post deleted");
        Ok(BlogPostDeletedResponse {
            message: "Blog post deleted successfully".to_string(),
        })
    }

    pub async fn record_view(&self, id: &str) -> Result<BlogPost, AppError> {
        self.bump(id, EngagementCounter::Views).await
    }

    pub async fn record_like(&self, id: &str) -> Result<BlogPost, AppError> {
        self.bump(id, EngagementCounter::Likes).await
    }

    async fn bump(&self, id: &str, counter: EngagementCounter) -> Result<BlogPost, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;

        let record = self
            .blog_post_repo
            .increment_counter(&id, counter)
            .await
            .map_err(|e| e.in_context(NOT_FOUND, "Failed to update blog post"))?;

        self.decode(record)
    }
}
