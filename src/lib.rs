use std::sync::Arc;

mod domain;
mod infrastructure;
mod interfaces;
pub mod constants;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;
pub mod shared_repos;
pub mod telemetry;

pub use domain::{codec, entities, query, text, use_cases};
pub use infrastructure::{auth, db, utils, web};
pub use interfaces::{handlers, repositories, routes};

use codec::ArrayCodec;
use repositories::{blog_post::BlogPostRepository, project::ProjectRepository};
use shared_repos::SharedRepositories;
use use_cases::{blog::BlogPostHandler, projects::ProjectHandler};

pub type AppProjectHandler = ProjectHandler<Arc<dyn ProjectRepository>>;
pub type AppBlogPostHandler = BlogPostHandler<Arc<dyn BlogPostRepository>>;

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub blog_handler: AppBlogPostHandler,
    pub repos: SharedRepositories,
}

impl AppState {
    pub fn new(repos: SharedRepositories, codec: ArrayCodec) -> Self {
        AppState {
            project_handler: ProjectHandler::new(repos.project_repo.clone(), codec),
            blog_handler: BlogPostHandler::new(repos.blog_post_repo.clone(), codec),
            repos,
        }
    }
}
