//! # Container
//!
//! Node configuration and the wired subsystem services.

pub mod config;
pub mod managers;

pub use config::NodeConfig;
pub use managers::{Managers, ManagersBuilder};
