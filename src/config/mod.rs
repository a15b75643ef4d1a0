//! Typed INI configuration: registration, parsing and extraction.

mod duration;
mod error;
mod extract;
mod parser;
mod registry;
mod section;
mod value;

pub use duration::{format_duration, parse_duration};
pub use error::{ConfigError, ValueError};
pub use registry::{ConfSet, Field};
pub use section::{Item, Section, SectionName};
pub use value::{Scalar, Slot, Value};
