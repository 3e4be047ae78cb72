// External stores and services
pub mod discord_cdn;
pub mod server_store;
