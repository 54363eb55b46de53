pub mod app;
pub mod health;
pub mod webhook;

pub use app::{add_routes, app, AppState};
