pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;
