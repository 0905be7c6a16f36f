pub mod auth_handlers;
pub mod poll_handlers;
pub mod user_handlers;
