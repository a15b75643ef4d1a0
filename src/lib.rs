pub mod config;

pub use config::{ConfSet, ConfigError, Field, SectionName, Value, ValueError};
