//! Filename-derived content hints
//!
//! The mapping is data: three tables (exact basename, suffix, extension)
//! consulted in that order. Anything not listed is [`TypeHint::Generic`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Coarse content category guessed from a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TypeHint {
    /// No useful hint
    #[default]
    Generic = 0,
    /// Text-like content (source, markup, prose)
    Text = 1,
    /// Media or already-compressed containers
    Media = 2,
}

impl TypeHint {
    /// Integer encoding used in the feature vector
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode the feature-vector encoding
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Generic),
            1 => Some(Self::Text),
            2 => Some(Self::Media),
            _ => None,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Text => "text",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeHint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "text" => Ok(Self::Text),
            "media" => Ok(Self::Media),
            _ => Err(Error::UnknownHint(s.to_string())),
        }
    }
}

/// Extensions of text-like files
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "log", "json", "xml", "yaml", "yml", "toml", "md", "rst", "csv", "tsv", "html", "htm",
    "css", "js", "ts", "rs", "c", "cpp", "h", "py", "rb", "go", "java", "sql", "sh", "svg",
];

/// Extensions of media and already-compressed files
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "heic", "mp4", "mkv", "avi", "mov", "webm",
    "mp3", "flac", "ogg", "opus", "aac", "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst",
    "br", "lz4",
];

/// Extension-less corpus files known to be text-like (Silesia corpus)
pub const TEXT_BASENAMES: &[&str] = &["dickens", "samba", "webster", "xml"];

/// Extension-less corpus files known to be dense media (Silesia corpus)
pub const MEDIA_BASENAMES: &[&str] = &["mr"];

/// Multi-part suffixes of compressed archives
pub const MEDIA_SUFFIXES: &[&str] = &[".tar.gz", ".tar.xz", ".tar.zst", ".tar.bz2"];

/// Lookup tables from filenames to [`TypeHint`]
#[derive(Debug, Clone, Default)]
pub struct HintTable {
    basenames: HashMap<String, TypeHint>,
    suffixes: Vec<(String, TypeHint)>,
    extensions: HashMap<String, TypeHint>,
}

impl HintTable {
    /// Table with no entries; everything classifies as `Generic`
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the built-in extension, basename and suffix lists
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for ext in TEXT_EXTENSIONS {
            table.insert_extension(ext, TypeHint::Text);
        }
        for ext in MEDIA_EXTENSIONS {
            table.insert_extension(ext, TypeHint::Media);
        }
        for name in TEXT_BASENAMES {
            table.insert_basename(name, TypeHint::Text);
        }
        for name in MEDIA_BASENAMES {
            table.insert_basename(name, TypeHint::Media);
        }
        for suffix in MEDIA_SUFFIXES {
            table.insert_suffix(suffix, TypeHint::Media);
        }
        table
    }

    /// Add or replace an extension mapping (leading dot optional)
    #[must_use]
    pub fn with_extension(mut self, ext: &str, hint: TypeHint) -> Self {
        self.insert_extension(ext, hint);
        self
    }

    /// Add or replace an exact basename mapping
    #[must_use]
    pub fn with_basename(mut self, name: &str, hint: TypeHint) -> Self {
        self.insert_basename(name, hint);
        self
    }

    /// Add or replace a suffix mapping
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str, hint: TypeHint) -> Self {
        self.insert_suffix(suffix, hint);
        self
    }

    /// Add or replace an extension mapping in place
    pub fn insert_extension(&mut self, ext: &str, hint: TypeHint) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.extensions.insert(ext, hint);
    }

    /// Add or replace an exact basename mapping in place
    pub fn insert_basename(&mut self, name: &str, hint: TypeHint) {
        self.basenames.insert(name.to_lowercase(), hint);
    }

    /// Add or replace a suffix mapping in place.
    ///
    /// Longer suffixes are tried first so `.tar.gz` wins over `.gz`.
    pub fn insert_suffix(&mut self, suffix: &str, hint: TypeHint) {
        let suffix = suffix.to_lowercase();
        match self.suffixes.iter_mut().find(|(s, _)| *s == suffix) {
            Some(entry) => entry.1 = hint,
            None => self.suffixes.push((suffix, hint)),
        }
        self.suffixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Classify a bare filename (case-insensitive)
    #[must_use]
    pub fn classify(&self, name: &str) -> TypeHint {
        let name = name.to_lowercase();

        if let Some(&hint) = self.basenames.get(&name) {
            return hint;
        }

        if let Some((_, hint)) = self
            .suffixes
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
        {
            return *hint;
        }

        Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.extensions.get(ext))
            .copied()
            .unwrap_or_default()
    }

    /// Classify the final component of `path`
    #[must_use]
    pub fn classify_path(&self, path: &Path) -> TypeHint {
        path.file_name()
            .map(|name| self.classify(&name.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Number of entries across all tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.basenames.len() + self.suffixes.len() + self.extensions.len()
    }

    /// True if the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_codes() {
        assert_eq!(TypeHint::Generic.code(), 0);
        assert_eq!(TypeHint::Text.code(), 1);
        assert_eq!(TypeHint::Media.code(), 2);
        for hint in [TypeHint::Generic, TypeHint::Text, TypeHint::Media] {
            assert_eq!(TypeHint::from_code(hint.code()), Some(hint));
        }
        assert_eq!(TypeHint::from_code(3), None);
    }

    #[test]
    fn test_hint_from_str() {
        assert_eq!("TEXT".parse::<TypeHint>().unwrap(), TypeHint::Text);
        assert_eq!("media".parse::<TypeHint>().unwrap(), TypeHint::Media);
        assert_eq!("generic".parse::<TypeHint>().unwrap(), TypeHint::Generic);
        assert!(matches!("video".parse::<TypeHint>(), Err(Error::UnknownHint(_))));
    }

    #[test]
    fn test_extension_lookup() {
        let table = HintTable::standard();
        assert_eq!(table.classify("notes.txt"), TypeHint::Text);
        assert_eq!(table.classify("data.CSV"), TypeHint::Text);
        assert_eq!(table.classify("app.min.js"), TypeHint::Text);
        assert_eq!(table.classify("photo.JPG"), TypeHint::Media);
        assert_eq!(table.classify("clip.mp4"), TypeHint::Media);
        assert_eq!(table.classify("bundle.zip"), TypeHint::Media);
    }

    #[test]
    fn test_basename_lookup() {
        let table = HintTable::standard();
        assert_eq!(table.classify("dickens"), TypeHint::Text);
        assert_eq!(table.classify("Webster"), TypeHint::Text);
        assert_eq!(table.classify("mr"), TypeHint::Media);
        assert_eq!(table.classify("dickens.zst"), TypeHint::Media);
    }

    #[test]
    fn test_suffix_lookup() {
        let table = HintTable::empty()
            .with_suffix(".gz", TypeHint::Text)
            .with_suffix(".tar.gz", TypeHint::Media);
        assert_eq!(table.classify("backup.tar.gz"), TypeHint::Media);
        assert_eq!(table.classify("log.gz"), TypeHint::Text);
        // The suffix alone is not a match
        assert_eq!(table.classify(".gz"), TypeHint::Generic);
    }

    #[test]
    fn test_unknown_defaults_to_generic() {
        let table = HintTable::standard();
        assert_eq!(table.classify("ooffice"), TypeHint::Generic);
        assert_eq!(table.classify("binary.dat"), TypeHint::Generic);
        assert_eq!(table.classify(""), TypeHint::Generic);
        assert_eq!(table.classify(".bashrc"), TypeHint::Generic);
        assert_eq!(HintTable::empty().classify("notes.txt"), TypeHint::Generic);
    }

    #[test]
    fn test_table_is_extensible() {
        let table = HintTable::standard()
            .with_extension(".parquet", TypeHint::Media)
            .with_basename("nci", TypeHint::Text)
            .with_extension("txt", TypeHint::Generic);
        assert_eq!(table.classify("rows.parquet"), TypeHint::Media);
        assert_eq!(table.classify("NCI"), TypeHint::Text);
        assert_eq!(table.classify("notes.txt"), TypeHint::Generic);
    }

    #[test]
    fn test_basename_wins_over_extension() {
        let table = HintTable::empty()
            .with_extension("bin", TypeHint::Media)
            .with_basename("firmware.bin", TypeHint::Generic);
        assert_eq!(table.classify("firmware.bin"), TypeHint::Generic);
        assert_eq!(table.classify("other.bin"), TypeHint::Media);
    }

    #[test]
    fn test_classify_path_uses_file_name() {
        let table = HintTable::standard();
        assert_eq!(table.classify_path(Path::new("/data/silesia/xml")), TypeHint::Text);
        assert_eq!(table.classify_path(Path::new("/data/text.d/blob")), TypeHint::Generic);
        assert_eq!(table.classify_path(Path::new("/")), TypeHint::Generic);
    }

    #[test]
    fn test_len() {
        assert!(HintTable::empty().is_empty());
        let table = HintTable::empty().with_suffix(".a", TypeHint::Text).with_suffix(".A", TypeHint::Media);
        assert_eq!(table.len(), 1);
    }
}
