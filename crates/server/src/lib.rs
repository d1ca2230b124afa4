pub mod app_state;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

pub use app_state::AppState;
