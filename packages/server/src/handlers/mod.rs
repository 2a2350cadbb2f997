pub mod assignment;
pub mod health;
pub mod submission;
