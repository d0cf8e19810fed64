#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use chrono::{Duration, Utc};
use portfolio_api::{
    auth::admin_token::AdminGate,
    codec::{ArrayCodec, DecodePolicy},
    entities::{blog_post::BlogPostRecord, project::ProjectRecord},
    repositories::memory::{InMemoryBlogPostRepo, InMemoryProjectRepo},
    shared_repos::SharedRepositories,
    AppState,
};
use uuid::Uuid;
use zeroize::Zeroizing;

pub const ADMIN_TOKEN: &str = "integration-admin-secret";

pub struct TestContext {
    pub projects: Arc<InMemoryProjectRepo>,
    pub blog: Arc<InMemoryBlogPostRepo>,
    pub state: web::Data<AppState>,
    pub gate: web::Data<AdminGate>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(DecodePolicy::Lenient)
    }

    pub fn with_policy(policy: DecodePolicy) -> Self {
        let projects = Arc::new(InMemoryProjectRepo::new());
        let blog = Arc::new(InMemoryBlogPostRepo::new());
        let repos = SharedRepositories::in_memory(projects.clone(), blog.clone());

        TestContext {
            projects,
            blog,
            state: web::Data::new(AppState::new(repos, ArrayCodec::new(policy))),
            gate: web::Data::new(AdminGate::new(Zeroizing::new(ADMIN_TOKEN.to_string()))),
        }
    }
}

pub fn admin_header() -> (&'static str, String) {
    ("Authorization", format!("Bearer {ADMIN_TOKEN}"))
}

/// Builds the full route table over a `TestContext`.
macro_rules! spawn_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.gate.clone())
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(portfolio_api::routes::configure_routes),
        )
        .await
    };
}

pub fn project_record(title: &str, order: i32, published: bool, featured: bool) -> ProjectRecord {
    let now = Utc::now();
    ProjectRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{title} description"),
        long_description: None,
        category: "Web Application".to_string(),
        technologies: Some(r#"["React", "Node.js"]"#.to_string()),
        features: Some(r#"["Auth","Dashboard"]"#.to_string()),
        image_url: None,
        live_url: None,
        github_url: None,
        published,
        featured,
        display_order: order,
        difficulty: "Intermediate".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn blog_record(title: &str, published: bool, likes: i32, is_trending: bool, age_minutes: i64) -> BlogPostRecord {
    let created = Utc::now() - Duration::minutes(age_minutes);
    BlogPostRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        slug: portfolio_api::text::derive_slug(title),
        content: format!("# {title}\n\nBody text."),
        excerpt: None,
        image_url: None,
        published,
        author: "Admin".to_string(),
        tags: Some(r#"["rust"]"#.to_string()),
        read_time: 1,
        priority: "Medium".to_string(),
        view_count: 0,
        likes,
        is_trending,
        created_at: created,
        updated_at: created,
    }
}
