use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::section::{Item, Section, SectionName};
use super::value::{Scalar, Slot, Value};
use super::ConfigError;

/// Registry of typed config fields bound to an INI-style file.
///
/// Fields are registered per section before the file is parsed. Parsing
/// scans the file once and stores every `key = value` line whose section and
/// key were registered; everything else is ignored. Values are read back
/// through the [`Field`] handles returned at registration.
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use ini_conf::{ConfSet, SectionName};
///
/// let mut conf = ConfSet::new("app.ini");
/// let retries = conf.int(SectionName::Global, "retries", 3);
/// let host = conf.string("db", "host", "localhost");
/// let timeout = conf.duration("db", "timeout", Duration::from_secs(30));
///
/// conf.parse()?;
///
/// println!("{:?} {:?} {:?}", conf.get(&retries), conf.get(&host), conf.get(&timeout));
/// # Ok::<(), ini_conf::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ConfSet {
    path: PathBuf,
    parsed: bool,
    sections: BTreeMap<SectionName, Section>,
}

/// Typed handle to a registered field.
///
/// Returned by the registration methods of [`ConfSet`] and passed back to
/// [`ConfSet::get`] to read the current value.
#[derive(Debug)]
pub struct Field<T> {
    section: SectionName,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub fn section(&self) -> &SectionName {
        &self.section
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            section: self.section.clone(),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl ConfSet {
    /// Creates an empty registry for the file at `path`.
    ///
    /// The file is not touched until [`parse`](Self::parse) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            parsed: false,
            sections: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a parse has been started on this registry.
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub(crate) fn mark_parsed(&mut self) {
        self.parsed = true;
    }

    /// Registers `value` under `section`/`name`.
    ///
    /// # Panics
    ///
    /// Panics if the field is already registered. Registering a field twice
    /// is a programming error; use [`try_var`](Self::try_var) to handle it.
    pub fn var(&mut self, section: impl Into<SectionName>, name: &str, value: Box<dyn Value>) {
        if let Err(e) = self.try_var(section, name, value) {
            panic!("{e}");
        }
    }

    /// Registers `value` under `section`/`name`, failing if the field exists.
    pub fn try_var(
        &mut self,
        section: impl Into<SectionName>,
        name: &str,
        value: Box<dyn Value>,
    ) -> Result<(), ConfigError> {
        let section = section.into();
        let entry = self
            .sections
            .entry(section.clone())
            .or_insert_with(|| Section::new(section.clone()));

        match entry.items.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ConfigError::DuplicateField {
                section,
                field: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Item {
                    section,
                    name: name.to_string(),
                    value,
                });
                Ok(())
            }
        }
    }

    /// Registers a field of type `T` initialized to `default`.
    ///
    /// # Panics
    ///
    /// Panics if the field is already registered.
    pub fn register<T: Scalar>(
        &mut self,
        section: impl Into<SectionName>,
        name: &str,
        default: T,
    ) -> Field<T> {
        match self.try_register(section, name, default) {
            Ok(field) => field,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`register`](Self::register), but reports duplicates as an error.
    pub fn try_register<T: Scalar>(
        &mut self,
        section: impl Into<SectionName>,
        name: &str,
        default: T,
    ) -> Result<Field<T>, ConfigError> {
        let section = section.into();
        self.try_var(&section, name, Box::new(Slot::new(default)))?;
        Ok(Field {
            section,
            name: name.to_string(),
            _marker: PhantomData,
        })
    }

    pub fn bool(&mut self, section: impl Into<SectionName>, name: &str, default: bool) -> Field<bool> {
        self.register(section, name, default)
    }

    pub fn int(&mut self, section: impl Into<SectionName>, name: &str, default: isize) -> Field<isize> {
        self.register(section, name, default)
    }

    pub fn int64(&mut self, section: impl Into<SectionName>, name: &str, default: i64) -> Field<i64> {
        self.register(section, name, default)
    }

    pub fn uint(&mut self, section: impl Into<SectionName>, name: &str, default: usize) -> Field<usize> {
        self.register(section, name, default)
    }

    pub fn uint64(&mut self, section: impl Into<SectionName>, name: &str, default: u64) -> Field<u64> {
        self.register(section, name, default)
    }

    pub fn float64(&mut self, section: impl Into<SectionName>, name: &str, default: f64) -> Field<f64> {
        self.register(section, name, default)
    }

    pub fn string(
        &mut self,
        section: impl Into<SectionName>,
        name: &str,
        default: impl Into<String>,
    ) -> Field<String> {
        self.register(section, name, default.into())
    }

    pub fn duration(
        &mut self,
        section: impl Into<SectionName>,
        name: &str,
        default: Duration,
    ) -> Field<Duration> {
        self.register(section, name, default)
    }

    /// Returns the current value of a field registered on this set.
    ///
    /// Returns `None` if the handle belongs to a different registry.
    pub fn get<T: Scalar>(&self, field: &Field<T>) -> Option<&T> {
        self.lookup(&field.section, &field.name)?
            .as_any()
            .downcast_ref::<Slot<T>>()
            .map(Slot::get)
    }

    /// Looks up the value bound to `section`/`name`.
    pub fn lookup(&self, section: &SectionName, name: &str) -> Option<&dyn Value> {
        self.sections
            .get(section)?
            .get(name)
            .map(Item::value)
    }

    pub(crate) fn item_mut(&mut self, section: &SectionName, name: &str) -> Option<&mut Item> {
        self.sections.get_mut(section)?.items.get_mut(name)
    }

    pub(crate) fn has_section(&self, section: &SectionName) -> bool {
        self.sections.contains_key(section)
    }

    pub fn section(&self, name: &SectionName) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Sections ordered by name, global first.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Every registered item, in section then field order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.sections.values().flat_map(Section::items)
    }
}
