pub mod database;
pub mod http;
