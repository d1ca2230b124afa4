pub mod auth;
pub mod crm;
pub mod health;
pub mod meetings;
pub mod tasks;
pub mod users;
