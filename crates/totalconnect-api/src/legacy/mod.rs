// Legacy protocol generation: XML-bodied form-POST endpoints with
// session-id auth.

pub mod client;
pub mod models;

pub use client::LegacyClient;
