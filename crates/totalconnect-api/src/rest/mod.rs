// Newer protocol generation: JSON REST endpoints with bearer-token auth.

pub mod client;
pub mod models;

pub use client::{DEFAULT_TOKEN_URL, RestClient};
