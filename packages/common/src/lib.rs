pub mod config;
pub mod notification;

pub use config::NotificationConfig;
pub use notification::SubmissionNotification;
