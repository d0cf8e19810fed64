pub mod admin_token;
