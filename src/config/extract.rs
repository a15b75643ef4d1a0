//! Conversion of registered values into TOML and serde types.

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::warn;

use super::registry::ConfSet;
use super::section::SectionName;
use super::ConfigError;

impl ConfSet {
    /// Builds a TOML table of the current values.
    ///
    /// Global fields sit at the root and every named section becomes a
    /// sub-table. A section whose name equals a global field replaces it.
    pub fn to_table(&self) -> Table {
        let mut root = Table::new();

        for section in self.sections() {
            let values: Table = section
                .items()
                .map(|item| (item.name().to_string(), item.value().to_toml()))
                .collect();

            match section.name() {
                SectionName::Global => {
                    for (key, value) in values {
                        root.insert(key, value);
                    }
                }
                SectionName::Named(name) => {
                    if let Some(previous) = root.insert(name.clone(), Value::Table(values)) {
                        warn!(
                            section = %name,
                            replaced = %previous,
                            "section shadows a global field of the same name"
                        );
                    }
                }
            }
        }

        root
    }

    /// Deserializes the current values into `T`.
    ///
    /// Intended to be called after [`parse`](Self::parse), so a whole typed
    /// config struct can be handed around instead of individual fields.
    ///
    /// ```no_run
    /// use ini_conf::{ConfSet, SectionName};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Db {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct AppConfig {
    ///     name: String,
    ///     db: Db,
    /// }
    ///
    /// let mut conf = ConfSet::new("app.ini");
    /// conf.string(SectionName::Global, "name", "app");
    /// conf.string("db", "host", "localhost");
    /// conf.uint("db", "port", 5432);
    /// conf.parse()?;
    ///
    /// let config: AppConfig = conf.extract()?;
    /// # Ok::<(), ini_conf::ConfigError>(())
    /// ```
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = Value::Table(self.to_table());
        value.try_into().map_err(ConfigError::Deserialize)
    }
}
