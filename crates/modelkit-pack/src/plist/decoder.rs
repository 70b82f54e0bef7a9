//! Property-list XML → Store.
//!
//! A small stack machine over `quick_xml` events. Whitespace between
//! elements is ignored; text inside a leaf is kept verbatim.

use std::str;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::text::{binary_from_text, date_from_text};
use crate::{Mapping, Store, Value, MAX_DEPTH};

use super::error::PlistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    Key,
    String,
    Integer,
    Real,
    Date,
    Data,
}

impl Leaf {
    fn tag(self) -> &'static str {
        match self {
            Leaf::Key => "key",
            Leaf::String => "string",
            Leaf::Integer => "integer",
            Leaf::Real => "real",
            Leaf::Date => "date",
            Leaf::Data => "data",
        }
    }
}

enum Frame {
    Plist,
    Array(Vec<Value>),
    Dict { entries: Mapping, key: Option<String> },
    Leaf { leaf: Leaf, text: String },
    Bool(bool),
}

impl Frame {
    fn tag(&self) -> &'static str {
        match self {
            Frame::Plist => "plist",
            Frame::Array(_) => "array",
            Frame::Dict { .. } => "dict",
            Frame::Leaf { leaf, .. } => leaf.tag(),
            Frame::Bool(true) => "true",
            Frame::Bool(false) => "false",
        }
    }
}

/// What a finished element contributes to its parent.
enum Completed {
    Value(Value),
    Key(String),
    Nothing,
}

/// Reads a `<plist>` document whose root is a `<dict>`.
#[derive(Debug, Default, Clone)]
pub struct PlistDecoder;

impl PlistDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, PlistError> {
        let mut parser = Parser::default();
        let mut reader = Reader::from_reader(bytes);
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    let frame = open(str::from_utf8(name.as_ref())?)?;
                    parser.push(frame)?;
                }
                Event::Empty(e) => {
                    let name = e.name();
                    let frame = open(str::from_utf8(name.as_ref())?)?;
                    parser.check_depth()?;
                    let completed = close(frame)?;
                    parser.attach(completed)?;
                }
                Event::End(e) => {
                    let name = e.name();
                    parser.end(str::from_utf8(name.as_ref())?)?;
                }
                Event::Text(e) => {
                    let raw = str::from_utf8(&e)?;
                    parser.text(&unescape(raw)?)?;
                }
                Event::CData(e) => {
                    parser.text(str::from_utf8(&e)?)?;
                }
                Event::GeneralRef(e) => {
                    let name = str::from_utf8(&e)?;
                    let mut buf = [0u8; 4];
                    parser.text(resolve_entity(name)?.encode_utf8(&mut buf))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        parser.finish()
    }
}

fn open(tag: &str) -> Result<Frame, PlistError> {
    Ok(match tag {
        "plist" => Frame::Plist,
        "array" => Frame::Array(Vec::new()),
        "dict" => Frame::Dict {
            entries: Mapping::new(),
            key: None,
        },
        "key" => leaf(Leaf::Key),
        "string" => leaf(Leaf::String),
        "integer" => leaf(Leaf::Integer),
        "real" => leaf(Leaf::Real),
        "date" => leaf(Leaf::Date),
        "data" => leaf(Leaf::Data),
        "true" => Frame::Bool(true),
        "false" => Frame::Bool(false),
        other => return Err(PlistError::UnknownTag(other.to_owned())),
    })
}

fn leaf(leaf: Leaf) -> Frame {
    Frame::Leaf {
        leaf,
        text: String::new(),
    }
}

fn close(frame: Frame) -> Result<Completed, PlistError> {
    Ok(match frame {
        Frame::Plist => Completed::Nothing,
        Frame::Array(items) => Completed::Value(Value::Sequence(items)),
        Frame::Dict { entries, key } => {
            if let Some(key) = key {
                return Err(PlistError::DanglingKey(key));
            }
            Completed::Value(Value::Store(Store::from(entries)))
        }
        Frame::Bool(b) => Completed::Value(Value::Bool(b)),
        Frame::Leaf { leaf, text } => match leaf {
            Leaf::Key => Completed::Key(text),
            Leaf::String => Completed::Value(Value::Text(text)),
            _ => Completed::Value(parse_leaf(leaf, text)?),
        },
    })
}

fn parse_leaf(leaf: Leaf, text: String) -> Result<Value, PlistError> {
    let trimmed = text.trim();
    let parsed = match leaf {
        Leaf::Integer => trimmed.parse::<i64>().ok().map(Value::Int),
        Leaf::Real => parse_real(trimmed).map(Value::Float),
        Leaf::Date => date_from_text(trimmed).map(Value::Date),
        Leaf::Data => binary_from_text(trimmed).map(Value::Binary),
        Leaf::Key | Leaf::String => Some(Value::Text(text.clone())),
    };
    parsed.ok_or_else(|| PlistError::InvalidLeaf {
        tag: leaf.tag(),
        text,
    })
}

fn parse_real(text: &str) -> Option<f64> {
    match text.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "+infinity" | "infinity" | "+inf" | "inf" => Some(f64::INFINITY),
        "-infinity" | "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

fn resolve_entity(name: &str) -> Result<char, PlistError> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                name.strip_prefix('#').and_then(|dec| dec.parse().ok())
            };
            code.and_then(char::from_u32)
        }
    };
    resolved.ok_or_else(|| PlistError::UnknownEntity(name.to_owned()))
}

/// Resolves entity references left inside a text run.
fn unescape(raw: &str) -> Result<String, PlistError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        let tail = &rest[at + 1..];
        let end = tail
            .find(';')
            .ok_or_else(|| PlistError::UnknownEntity(tail.to_owned()))?;
        out.push(resolve_entity(&tail[..end])?);
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Default)]
struct Parser {
    stack: Vec<Frame>,
    root: Option<Value>,
    /// Open `<dict>`/`<array>` frames; `<plist>` and leaves do not count.
    containers: usize,
}

fn is_container(frame: &Frame) -> bool {
    matches!(frame, Frame::Array(_) | Frame::Dict { .. })
}

impl Parser {
    /// Entries of the root dict are at depth 1, as in the encoder.
    fn check_depth(&self) -> Result<(), PlistError> {
        if self.containers > MAX_DEPTH {
            return Err(PlistError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn push(&mut self, frame: Frame) -> Result<(), PlistError> {
        self.check_depth()?;
        match (self.stack.last(), &frame) {
            (Some(Frame::Leaf { .. } | Frame::Bool(_)), _) => {
                return Err(PlistError::Misplaced(frame.tag()))
            }
            (Some(Frame::Dict { key: None, .. }), Frame::Leaf { leaf: Leaf::Key, .. }) => {}
            (Some(Frame::Dict { key: None, .. }), _) => return Err(PlistError::MissingKey),
            (Some(Frame::Dict { key: Some(_), .. }), Frame::Leaf { leaf: Leaf::Key, .. }) => {
                return Err(PlistError::Misplaced("key"))
            }
            (Some(Frame::Array(_) | Frame::Plist) | None, Frame::Leaf { leaf: Leaf::Key, .. }) => {
                return Err(PlistError::Misplaced("key"))
            }
            _ => {}
        }
        if is_container(&frame) {
            self.containers += 1;
        }
        self.stack.push(frame);
        Ok(())
    }

    fn end(&mut self, tag: &str) -> Result<(), PlistError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| PlistError::UnknownTag(format!("/{tag}")))?;
        if is_container(&frame) {
            self.containers -= 1;
        }
        if frame.tag() != tag {
            return Err(PlistError::MismatchedEnd {
                expected: frame.tag(),
                found: tag.to_owned(),
            });
        }
        let completed = close(frame)?;
        self.attach(completed)
    }

    fn attach(&mut self, completed: Completed) -> Result<(), PlistError> {
        match completed {
            Completed::Nothing => Ok(()),
            Completed::Key(name) => match self.stack.last_mut() {
                Some(Frame::Dict { key, .. }) if key.is_none() => {
                    *key = Some(name);
                    Ok(())
                }
                _ => Err(PlistError::Misplaced("key")),
            },
            Completed::Value(value) => match self.stack.last_mut() {
                Some(Frame::Array(items)) => {
                    items.push(value);
                    Ok(())
                }
                Some(Frame::Dict { entries, key }) => {
                    let name = key.take().ok_or(PlistError::MissingKey)?;
                    entries.insert(name, value);
                    Ok(())
                }
                Some(Frame::Plist) | None => {
                    if self.root.is_some() {
                        return Err(PlistError::Misplaced(value.kind().as_str()));
                    }
                    self.root = Some(value);
                    Ok(())
                }
                Some(Frame::Leaf { leaf, .. }) => Err(PlistError::Misplaced(leaf.tag())),
                Some(Frame::Bool(_)) => Err(PlistError::Misplaced("value")),
            },
        }
    }

    fn text(&mut self, text: &str) -> Result<(), PlistError> {
        match self.stack.last_mut() {
            Some(Frame::Leaf { text: buf, .. }) => {
                buf.push_str(text);
                Ok(())
            }
            _ if text.trim().is_empty() => Ok(()),
            _ => Err(PlistError::UnexpectedText(text.to_owned())),
        }
    }

    fn finish(self) -> Result<Store, PlistError> {
        if let Some(open) = self.stack.last() {
            return Err(PlistError::Truncated(open.tag()));
        }
        match self.root {
            Some(Value::Store(store)) => Ok(store),
            Some(other) => Err(PlistError::RootNotDict(other.kind().as_str())),
            None => Err(PlistError::Empty),
        }
    }
}
