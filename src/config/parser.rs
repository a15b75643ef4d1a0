//! Single-pass scanner for INI-style config files.
//!
//! ```text
//! file           := line*
//! line           := section-header | item | blank
//! section-header := "[" text "]"
//! item           := key "=" value
//! ```
//!
//! There is no comment, quoting or continuation syntax.

use std::fs::File;
use std::io::{BufRead, BufReader};

use tracing::{debug, trace};

use super::registry::ConfSet;
use super::section::SectionName;
use super::value::Value;
use super::ConfigError;

/// Classification of a single non-blank, trimmed line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Header(&'a str),
    Item { name: &'a str, value: &'a str },
}

fn classify(trimmed: &str) -> Option<Line<'_>> {
    if let Some(rest) = trimmed.strip_prefix('[') {
        // Bracket contents are used verbatim, whitespace included
        return rest.strip_suffix(']').map(Line::Header);
    }
    let (name, value) = trimmed.split_once('=')?;
    Some(Line::Item {
        name: name.trim(),
        value: value.trim(),
    })
}

impl ConfSet {
    /// Opens the configured file and applies it to the registered fields.
    ///
    /// The scan stops at the first error. Fields updated by earlier lines keep
    /// their new values. Parsing again re-reads the file from the start.
    pub fn parse(&mut self) -> Result<(), ConfigError> {
        self.mark_parsed();
        let path = self.path().to_path_buf();
        debug!(path = %path.display(), "parsing config file");

        let file = File::open(&path).map_err(|e| ConfigError::Open {
            path: path.clone(),
            source: e,
        })?;
        self.parse_reader(BufReader::new(file))
    }

    /// Applies config text to the registered fields.
    pub fn parse_str(&mut self, text: &str) -> Result<(), ConfigError> {
        self.parse_reader(text.as_bytes())
    }

    /// Applies config lines read from `reader` to the registered fields.
    ///
    /// Read failures are reported against this set's path.
    pub fn parse_reader<R: BufRead>(&mut self, mut reader: R) -> Result<(), ConfigError> {
        self.mark_parsed();
        let mut current = SectionName::Global;
        let mut buf = String::new();
        let mut line_no = 0;
        let mut applied = 0usize;

        loop {
            buf.clear();
            let read = reader.read_line(&mut buf).map_err(|e| ConfigError::Read {
                path: self.path().to_path_buf(),
                source: e,
            })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            match classify(trimmed) {
                Some(Line::Header(name)) => {
                    trace!(line = line_no, section = name, "entering section");
                    current = SectionName::Named(name.to_string());
                }
                Some(Line::Item { name, value }) => {
                    if self.apply(&current, name, value, line_no)? {
                        applied += 1;
                    }
                }
                None => {
                    return Err(ConfigError::MalformedLine {
                        line: line_no,
                        text: buf.trim_end_matches(['\r', '\n']).to_string(),
                    });
                }
            }
        }

        debug!(lines = line_no, applied, "config parsed");
        Ok(())
    }

    /// Stores `value` into `section`/`name` if registered.
    ///
    /// Returns whether the line matched a registered field.
    fn apply(
        &mut self,
        section: &SectionName,
        name: &str,
        value: &str,
        line: usize,
    ) -> Result<bool, ConfigError> {
        if !self.has_section(section) {
            trace!(line, %section, key = name, "ignoring key in unregistered section");
            return Ok(false);
        }
        let Some(item) = self.item_mut(section, name) else {
            trace!(line, %section, key = name, "ignoring unregistered key");
            return Ok(false);
        };

        item.value
            .set(value)
            .map_err(|source| ConfigError::TypeConversion {
                section: section.clone(),
                field: name.to_string(),
                line,
                source,
            })?;
        Ok(true)
    }
}
