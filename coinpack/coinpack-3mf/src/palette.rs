//! Color palette shared by every part in a package.
//!
//! A palette is an ordered list of named colors. Parts refer to entries by
//! index; the package writes the whole palette as one 3MF color group.

use std::fs;
use std::path::Path;

use coinpack_types::Rgb;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PackageError, PackageResult};

/// A named palette color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Filament or display name (e.g. `"red"`).
    pub name: String,
    /// Display color, serialized as `#RRGGBB`.
    #[serde(rename = "hex")]
    pub color: Rgb,
}

impl PaletteEntry {
    /// Create a palette entry.
    #[must_use]
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// An ordered color palette.
///
/// # Example
///
/// ```
/// use coinpack_3mf::Palette;
///
/// let palette = Palette::coin_default();
/// assert_eq!(palette.len(), 4);
/// assert_eq!(palette.get(2).unwrap().color.to_string(), "#D40000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(rename = "palette")]
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Create a palette from entries in index order.
    #[must_use]
    pub const fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    /// The four filament colors of the coin print: black base, white, red
    /// and wood inlays.
    #[must_use]
    pub fn coin_default() -> Self {
        Self::new(vec![
            PaletteEntry::new("black", Rgb::BLACK),
            PaletteEntry::new("white", Rgb::WHITE),
            PaletteEntry::new("red", Rgb::new(0xD4, 0x00, 0x00)),
            PaletteEntry::new("wood", Rgb::new(0xC8, 0xA0, 0x6A)),
        ])
    }

    /// Parse a palette document: `{"palette": [{"name": .., "hex": ..}, ..]}`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the document does not match the schema or a
    /// color is not a 6-digit hex value.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a palette document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::MissingInput`] if the file does not exist,
    /// [`PackageError::Io`] if it cannot be read, or
    /// [`PackageError::Palette`] if it does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> PackageResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PackageError::MissingInput {
                    paths: vec![path.to_path_buf()],
                }
            } else {
                PackageError::io(path, e)
            }
        })?;
        let palette = Self::from_json_str(&text).map_err(|source| PackageError::Palette {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), entries = palette.len(), "Loaded palette");
        Ok(palette)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if any.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&PaletteEntry> {
        self.entries.get(index as usize)
    }

    /// Entries in index order.
    pub fn entries(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// Check that `index` names an entry of this palette.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidPaletteIndex`] naming `part`.
    pub fn check_index(&self, part: &str, index: u32) -> PackageResult<()> {
        if self.get(index).is_some() {
            Ok(())
        } else {
            Err(PackageError::InvalidPaletteIndex {
                part: part.to_string(),
                index,
                len: self.len(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_document() {
        let json = r##"{"palette": [
            {"name": "black", "hex": "#000000"},
            {"name": "gold", "hex": "d4af37"}
        ]}"##;
        let palette = Palette::from_json_str(json).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(1).unwrap().name, "gold");
        assert_eq!(palette.get(1).unwrap().color, Rgb::new(0xD4, 0xAF, 0x37));
        assert!(palette.get(2).is_none());
    }

    #[test]
    fn rejects_bad_hex_and_schema() {
        assert!(Palette::from_json_str(r#"{"palette": [{"name": "x", "hex": "red"}]}"#).is_err());
        assert!(Palette::from_json_str(r##"[{"name": "x", "hex": "#000000"}]"##).is_err());
        assert!(Palette::from_json_str(r#"{"colors": []}"#).is_err());
    }

    #[test]
    fn serializes_in_document_schema() {
        let json = serde_json::to_string(&Palette::coin_default()).unwrap();
        assert!(json.starts_with(r##"{"palette":[{"name":"black","hex":"#000000"}"##), "{json}");
        assert_eq!(Palette::from_json_str(&json).unwrap(), Palette::coin_default());
    }

    #[test]
    fn check_index_bounds() {
        let palette = Palette::coin_default();
        assert!(palette.check_index("base", 3).is_ok());
        let err = palette.check_index("base", 4).unwrap_err();
        assert!(matches!(
            err,
            PackageError::InvalidPaletteIndex {
                index: 4,
                len: 4,
                ..
            }
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.json");
        match Palette::load(&path) {
            Err(PackageError::MissingInput { paths }) => assert_eq!(paths, vec![path]),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn load_reports_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Palette::load(&path).unwrap_err();
        assert!(err.to_string().contains("palette.json"));
    }
}
