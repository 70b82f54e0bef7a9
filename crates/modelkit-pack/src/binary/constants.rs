//! Binary layout constants.

pub const MAGIC: &[u8; 3] = b"MKB";
pub const VERSION: u8 = 0x01;

pub const TAG_NULL: u8 = 0x00;
pub const TAG_FALSE: u8 = 0x01;
pub const TAG_TRUE: u8 = 0x02;
pub const TAG_INT: u8 = 0x03;
pub const TAG_FLOAT: u8 = 0x04;
pub const TAG_TEXT: u8 = 0x05;
pub const TAG_BINARY: u8 = 0x06;
pub const TAG_DATE: u8 = 0x07;
pub const TAG_DECIMAL: u8 = 0x08;
pub const TAG_STORE: u8 = 0x09;
pub const TAG_SEQUENCE: u8 = 0x0a;
pub const TAG_MAPPING: u8 = 0x0b;
