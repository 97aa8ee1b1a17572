mod app;
mod config;
mod console;
mod effects;
mod snapshot;

pub use app::run_app;
