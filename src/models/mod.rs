// Data models for server documents
pub mod command;
pub mod server;
pub mod welcome;
