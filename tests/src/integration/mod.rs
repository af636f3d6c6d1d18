//! Cross-subsystem integration tests.

pub mod flows;
pub mod properties;
pub mod runtime;
pub mod scenarios;
