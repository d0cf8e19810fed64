pub mod admin;
pub mod blog_posts;
pub mod home;
pub mod projects;
pub mod system;
