pub mod health;
pub mod party;
