pub mod account;
pub mod assignment;
pub mod submission;
