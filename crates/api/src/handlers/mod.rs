pub mod admin;
pub mod contacts;
pub mod emails;
pub mod health;
