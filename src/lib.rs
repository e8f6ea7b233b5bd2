pub mod cli;
pub mod components;
pub mod config;
pub mod infrastructure;
pub mod internationalization;
pub mod messaging;
pub mod network;
pub mod ui;

pub use cli::args;
