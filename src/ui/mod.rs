//! Ratatui front end: a catalog grid and a loans screen over [`crate::Library`].

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
