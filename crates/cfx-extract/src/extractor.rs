//! The extractor contract shared by every source.

use cfx_model::{RawRecord, column_manifest};

use crate::error::Result;

/// Records pulled from one source, plus the column manifest describing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<RawRecord>,
    /// Declared fields of the source followed by any extra keys seen in
    /// `records`, in first-seen order.
    pub columns: Vec<String>,
}

impl Extraction {
    /// Build an extraction whose manifest starts with `declared`.
    pub fn new(declared: &[&str], records: Vec<RawRecord>) -> Self {
        let columns = column_manifest(declared, &records);
        Self { records, columns }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A source of raw records.
///
/// Implementations perform all of their I/O inside [`Extractor::extract`];
/// an empty result is valid, any failure is an
/// [`ExtractionError`](crate::ExtractionError).
pub trait Extractor {
    /// Short source name used in logs and errors.
    fn name(&self) -> &str;

    fn extract(&self) -> Result<Extraction>;
}

/// Serves records held in memory.
#[derive(Debug, Clone)]
pub struct StaticExtractor {
    name: String,
    declared: Vec<String>,
    records: Vec<RawRecord>,
}

impl StaticExtractor {
    pub fn new(name: impl Into<String>, declared: &[&str], records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            declared: declared.iter().map(|field| (*field).to_string()).collect(),
            records,
        }
    }
}

impl Extractor for StaticExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self) -> Result<Extraction> {
        let declared: Vec<&str> = self.declared.iter().map(String::as_str).collect();
        Ok(Extraction::new(&declared, self.records.clone()))
    }
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self) -> Result<Extraction> {
        (**self).extract()
    }
}
