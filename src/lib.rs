pub mod bootstrap;
pub mod config;
pub mod deploy;
pub mod error;
pub mod interrupt;
pub mod manifest;
pub mod names;
pub mod paths;
pub mod store;
pub mod term;
pub mod workspace;

// Re-export commonly used types
pub use bootstrap::{Bootstrap, BootstrapRequest, DeployIntent, Summary};
pub use config::Config;
