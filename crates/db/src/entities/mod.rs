pub mod crm_entry;
pub mod meeting;
pub mod password_otp;
pub mod task;
pub mod task_assignee;
pub mod user;
