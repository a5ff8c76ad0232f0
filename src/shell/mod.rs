//! Interactive terminal shell

pub mod app;
pub mod clipboard;
pub mod commands;
pub mod events;
pub mod state;

pub use app::Shell;
