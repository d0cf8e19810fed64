pub mod blog;
pub mod extractors;
pub mod projects;
