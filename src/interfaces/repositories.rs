pub mod blog_post;
pub mod memory;
pub mod project;
pub mod sqlx_repo;
