pub mod error;
pub mod extract;
pub mod health;
pub mod holdings;
pub mod jobs;
