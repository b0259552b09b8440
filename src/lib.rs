// Core modules
pub mod client;
pub mod config;
pub mod error;
pub mod services;
pub mod sse;
pub mod state;
pub mod types;
pub mod upstream;
pub mod web;

// Re-exports
pub use client::ChatClient;
pub use services::session::SessionStore;
pub use state::AppState;
