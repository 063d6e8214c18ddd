pub mod auth;
pub mod category;
pub mod moderation;
pub mod reply;
pub mod topic;
