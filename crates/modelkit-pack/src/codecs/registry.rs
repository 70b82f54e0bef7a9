//! Aggregate codec holder and per-format lookup.

use crate::Format;

use super::{BinaryCodec, FormatCodec, JsonCodec, PlistCodec};

/// One instance of every codec.
#[derive(Default)]
pub struct Codecs {
    pub json: JsonCodec,
    pub plist: PlistCodec,
    pub binary: BinaryCodec,
}

impl Codecs {
    pub fn new() -> Self {
        Self {
            json: JsonCodec::new(),
            plist: PlistCodec::new(),
            binary: BinaryCodec::new(),
        }
    }

    pub fn get_mut(&mut self, format: Format) -> &mut dyn FormatCodec {
        match format {
            Format::Json => &mut self.json,
            Format::Plist => &mut self.plist,
            Format::Binary => &mut self.binary,
        }
    }
}

impl Format {
    /// A fresh codec for this format.
    pub fn codec(&self) -> Box<dyn FormatCodec> {
        match self {
            Format::Json => Box::new(JsonCodec::new()),
            Format::Plist => Box::new(PlistCodec::new()),
            Format::Binary => Box::new(BinaryCodec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_format() {
        let mut codecs = Codecs::new();
        for format in Format::ALL {
            assert_eq!(codecs.get_mut(format).format(), format);
            assert_eq!(format.codec().id(), format.id());
        }
    }
}
