pub mod catalog;
pub mod common;
pub mod configs;
pub mod party;
pub mod server;
pub mod store;
pub mod transport;
