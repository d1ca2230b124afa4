pub mod auth;
pub mod config;
pub mod crm;
pub mod email;
pub mod google;
pub mod meetings;
pub mod password;
pub mod tasks;
pub mod users;
