pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod forms;
pub mod models;
pub mod pages;
pub mod router;

#[cfg(test)]
mod test_support;
