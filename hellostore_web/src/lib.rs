//! HelloStore web layer: routers, pages and the access-gate middleware over
//! the hellostore-auth core.

mod admin;
mod error;
mod extract;
mod middleware;
mod pages;
mod static_files;

pub mod router;
pub mod server;
pub mod state;

pub use router::app_router;
pub use state::AppState;
