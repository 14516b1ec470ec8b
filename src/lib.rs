pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod image_processing;
pub mod mcp_server;
pub mod openai;
pub mod profile;
pub mod session;
pub mod store;
pub mod story;
pub mod tools;

#[cfg(test)]
mod testing;
