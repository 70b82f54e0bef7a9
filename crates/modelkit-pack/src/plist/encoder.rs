//! Store → property-list XML.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::text::{binary_to_text, date_to_text};
use crate::{Mapping, Store, Value, MAX_DEPTH};

use super::error::PlistError;

const DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// Writes a [`Store`] as a `<plist>` document whose root is a `<dict>`.
#[derive(Debug, Default, Clone)]
pub struct PlistEncoder;

impl PlistEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, PlistError> {
        let mut xml = if pretty {
            Writer::new_with_indent(Vec::new(), b'\t', 1)
        } else {
            Writer::new(Vec::new())
        };
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        xml.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
        let mut plist = BytesStart::new("plist");
        plist.push_attribute(("version", "1.0"));
        xml.write_event(Event::Start(plist))?;
        write_dict(&mut xml, store.as_map(), 0)?;
        xml.write_event(Event::End(BytesEnd::new("plist")))?;
        let mut bytes = xml.into_inner();
        if pretty {
            bytes.push(b'\n');
        }
        Ok(bytes)
    }
}

fn write_leaf(xml: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), PlistError> {
    if text.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_dict(xml: &mut Writer<Vec<u8>>, entries: &Mapping, depth: usize) -> Result<(), PlistError> {
    if entries.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new("dict")))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("dict")))?;
    for (key, value) in entries {
        write_leaf(xml, "key", key)?;
        write_value(xml, value, depth + 1)?;
    }
    xml.write_event(Event::End(BytesEnd::new("dict")))?;
    Ok(())
}

fn format_real(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "+infinity" } else { "-infinity" }.to_owned()
    } else {
        format!("{value:?}")
    }
}

fn write_value(xml: &mut Writer<Vec<u8>>, value: &Value, depth: usize) -> Result<(), PlistError> {
    if depth > MAX_DEPTH {
        return Err(PlistError::TooDeep(MAX_DEPTH));
    }
    match value {
        Value::Null => return Err(PlistError::NullUnsupported),
        Value::Bool(b) => {
            let tag = if *b { "true" } else { "false" };
            xml.write_event(Event::Empty(BytesStart::new(tag)))?;
        }
        Value::Int(i) => write_leaf(xml, "integer", &i.to_string())?,
        Value::Float(f) => write_leaf(xml, "real", &format_real(*f))?,
        Value::Text(s) => write_leaf(xml, "string", s)?,
        Value::Binary(bytes) => write_leaf(xml, "data", &binary_to_text(bytes))?,
        Value::Date(date) => write_leaf(xml, "date", &date_to_text(date))?,
        Value::Decimal(decimal) => write_leaf(xml, "string", decimal.as_str())?,
        Value::Store(store) => write_dict(xml, store.as_map(), depth)?,
        Value::Mapping(map) => write_dict(xml, map, depth)?,
        Value::Sequence(items) => {
            if items.is_empty() {
                xml.write_event(Event::Empty(BytesStart::new("array")))?;
            } else {
                xml.write_event(Event::Start(BytesStart::new("array")))?;
                for item in items {
                    write_value(xml, item, depth + 1)?;
                }
                xml.write_event(Event::End(BytesEnd::new("array")))?;
            }
        }
    }
    Ok(())
}
