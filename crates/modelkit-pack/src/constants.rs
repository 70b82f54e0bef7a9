//! Format identifiers and shared limits.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Deepest nesting of stores/sequences a decoder accepts.
pub const MAX_DEPTH: usize = 512;

/// Wire format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Structured text (JSON).
    Json = 0,
    /// Tagged-property format (XML property list).
    Plist = 1,
    /// Opaque binary layout.
    Binary = 2,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Plist, Format::Binary];

    pub fn id(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Plist => "plist",
            Format::Binary => "binary",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Plist => "plist",
            Format::Binary => "bin",
        }
    }

    /// Whether encoded output is UTF-8 text.
    pub fn is_text(&self) -> bool {
        !matches!(self, Format::Binary)
    }

    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "plist" | "xml" => Some(Format::Plist),
            "bin" | "mkb" => Some(Format::Binary),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format `{0}`")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "plist" => Ok(Format::Plist),
            "binary" | "bin" => Ok(Format::Binary),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection() {
        assert_eq!(Format::from_path(Path::new("a/b.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("player.plist")), Some(Format::Plist));
        assert_eq!(Format::from_path(Path::new("blob.bin")), Some(Format::Binary));
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn parse_and_display() {
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
        assert!("yaml".parse::<Format>().is_err());
    }
}
