pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
mod state;
pub use state::AppState;

pub type SharedState = std::sync::Arc<AppState>;
