pub mod database;
pub mod jwt;
