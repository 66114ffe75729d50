//! CLI command implementations

pub mod config;
pub mod inspect;
pub mod pack;

pub use config::ConfigAction;
pub use inspect::InspectCommand;
pub use pack::PackCommand;
