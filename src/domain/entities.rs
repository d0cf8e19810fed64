pub mod blog_post;
pub mod option_fields;
pub mod project;
