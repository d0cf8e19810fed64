pub mod codec;
pub mod entities;
pub mod query;
pub mod text;
pub mod use_cases;
