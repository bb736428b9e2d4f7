//! Checksum index of the cache directory

use std::collections::HashMap;

/// Mapping from checksum to file extension for every cached entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheIndex {
    entries: HashMap<String, String>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, checksum: String, extension: String) {
        self.entries.insert(checksum, extension);
    }

    pub fn contains(&self, checksum: &str) -> bool {
        self.entries.contains_key(checksum)
    }

    /// Extension (with leading `.`) of the entry cached under `checksum`
    pub fn extension(&self, checksum: &str) -> Option<&str> {
        self.entries.get(checksum).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a file name at its first `.` into base and extension
///
/// The extension keeps the leading `.`; a name without one has an empty extension.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(i) => name.split_at(i),
        None => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("abc123.jpg"), ("abc123", ".jpg"));
        assert_eq!(split_file_name("abc.tar.gz"), ("abc", ".tar.gz"));
        assert_eq!(split_file_name("README"), ("README", ""));
        assert_eq!(split_file_name("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_index_lookup() {
        let mut index = CacheIndex::new();
        assert!(index.is_empty());

        index.insert("abc123".to_string(), ".jpg".to_string());
        assert!(index.contains("abc123"));
        assert!(!index.contains("abc"));
        assert_eq!(index.extension("abc123"), Some(".jpg"));
        assert_eq!(index.len(), 1);

        // Re-inserting a checksum keeps one entry
        index.insert("abc123".to_string(), ".jpeg".to_string());
        assert_eq!(index.len(), 1);
        assert_eq!(index.extension("abc123"), Some(".jpeg"));
    }
}
