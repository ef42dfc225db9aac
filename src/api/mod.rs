// JSON API module
pub mod handlers;
pub mod models;
pub mod routes;
