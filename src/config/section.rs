use std::collections::BTreeMap;
use std::fmt;

use super::value::Value;

/// Identifies a section of the config file.
///
/// Keys that appear before the first `[header]` line belong to
/// [`SectionName::Global`]. Strings convert into [`SectionName::Named`], so
/// registration calls can pass `"db"` directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionName {
    Global,
    Named(String),
}

impl SectionName {
    pub fn as_named(&self) -> Option<&str> {
        match self {
            SectionName::Global => None,
            SectionName::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionName::Global => f.write_str("<global>"),
            SectionName::Named(name) => write!(f, "[{name}]"),
        }
    }
}

impl From<&str> for SectionName {
    fn from(name: &str) -> Self {
        SectionName::Named(name.to_string())
    }
}

impl From<String> for SectionName {
    fn from(name: String) -> Self {
        SectionName::Named(name)
    }
}

impl From<&SectionName> for SectionName {
    fn from(name: &SectionName) -> Self {
        name.clone()
    }
}

/// One registered field and the value it is bound to.
#[derive(Debug)]
pub struct Item {
    pub(crate) section: SectionName,
    pub(crate) name: String,
    pub(crate) value: Box<dyn Value>,
}

impl Item {
    pub fn section(&self) -> &SectionName {
        &self.section
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }
}

/// A named group of registered fields.
#[derive(Debug)]
pub struct Section {
    pub(crate) name: SectionName,
    pub(crate) items: BTreeMap<String, Item>,
}

impl Section {
    pub(crate) fn new(name: SectionName) -> Self {
        Self {
            name,
            items: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &SectionName {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Item> {
        self.items.get(field)
    }

    /// Items ordered by field name.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_sorts_first() {
        let mut names = vec![
            SectionName::from("b"),
            SectionName::Global,
            SectionName::from("a"),
        ];
        names.sort();
        assert_eq!(names[0], SectionName::Global);
        assert_eq!(names[1].as_named(), Some("a"));
    }

    #[test]
    fn test_display() {
        assert_eq!(SectionName::Global.to_string(), "<global>");
        assert_eq!(SectionName::from(" db ").to_string(), "[ db ]");
    }
}
