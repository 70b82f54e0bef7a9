//! Whole-model conversions to bytes, text and files.
//!
//! Compositions of [`encode_model`] / [`try_decode_model`] with a
//! [`FormatCodec`](modelkit_pack::FormatCodec) and the file system.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use modelkit_pack::text::{binary_from_text, binary_to_text};
use modelkit_pack::{Format, Store};
use tracing::debug;

use crate::decoder::try_decode_model;
use crate::encoder::encode_model;
use crate::error::{ModelIoError, Result};
use crate::model::Model;

/// How [`write_model_with`] and [`write_bytes`] put data on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Indented output for text formats.
    pub pretty: bool,
    /// Write to a sibling temp file, then rename over the target.
    pub atomic: bool,
    /// Create missing parent directories.
    pub create_dirs: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            atomic: true,
            create_dirs: true,
        }
    }
}

impl WriteOptions {
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> ModelIoError {
    let path = path.to_path_buf();
    move |source| ModelIoError::Io {
        operation,
        path,
        source,
    }
}

/// Encodes a store with `format`'s codec.
pub fn store_to_bytes(store: &Store, format: Format, pretty: bool) -> Result<Vec<u8>> {
    format
        .codec()
        .encode(store, pretty)
        .map_err(|source| ModelIoError::Codec { format, source })
}

/// Decodes a store with `format`'s codec.
pub fn store_from_bytes(bytes: &[u8], format: Format) -> Result<Store> {
    format
        .codec()
        .decode(bytes)
        .map_err(|source| ModelIoError::Codec { format, source })
}

pub fn model_to_bytes<M: Model>(model: &M, format: Format, pretty: bool) -> Result<Vec<u8>> {
    store_to_bytes(&encode_model(model), format, pretty)
}

pub fn model_from_bytes<M: Model>(bytes: &[u8], format: Format) -> Result<M> {
    let store = store_from_bytes(bytes, format)?;
    Ok(try_decode_model(&store)?)
}

/// Text form of an encoded store: the document itself for text formats,
/// base64 of the bytes for the binary format.
fn render(bytes: Vec<u8>, format: Format) -> Result<String> {
    if format.is_text() {
        text_from_bytes(bytes)
    } else {
        Ok(binary_to_text(&bytes))
    }
}

/// Pretty text of a model in `format` (base64 for [`Format::Binary`]).
pub fn model_to_string<M: Model>(model: &M, format: Format) -> Result<String> {
    render(model_to_bytes(model, format, true)?, format)
}

/// Reverse of [`model_to_string`].
pub fn model_from_str<M: Model>(text: &str, format: Format) -> Result<M> {
    if format.is_text() {
        model_from_bytes(&bytes_from_text(text), format)
    } else {
        let bytes = binary_from_text(text).ok_or(ModelIoError::InvalidBase64 { format })?;
        model_from_bytes(&bytes, format)
    }
}

/// Pretty rendering of a store for debugging output.
pub fn inspect(store: &Store, format: Format) -> Result<String> {
    render(store_to_bytes(store, format, true)?, format)
}

pub fn bytes_from_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

pub fn text_from_bytes(bytes: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(bytes)?)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(io_error("read", path))
}

/// Writes `bytes` to `path` according to `options`.
pub fn write_bytes(bytes: &[u8], path: &Path, options: &WriteOptions) -> Result<()> {
    if options.create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
        }
    }

    if !options.atomic {
        fs::write(path, bytes).map_err(io_error("write", path))?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
        return Ok(());
    }

    // Each write gets its own uniquely named hidden sibling, so concurrent
    // writers to one target never share a temp file. It is removed on drop
    // if anything below fails.
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_error("create temp file in", dir))?;
    temp.write_all(bytes).map_err(io_error("write", temp.path()))?;
    temp.as_file().sync_all().map_err(io_error("sync", temp.path()))?;
    temp.persist(path)
        .map_err(|err| ModelIoError::AtomicWriteFailed {
            temp_path: err.file.path().to_path_buf(),
            target_path: path.to_path_buf(),
            source: err.error,
        })?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file atomically");
    Ok(())
}

/// Encodes `model` and writes it to `path` with the default
/// [`WriteOptions`].
pub fn write_model<M: Model>(model: &M, path: &Path, format: Format) -> Result<()> {
    write_model_with(model, path, format, &WriteOptions::default())
}

pub fn write_model_with<M: Model>(
    model: &M,
    path: &Path,
    format: Format,
    options: &WriteOptions,
) -> Result<()> {
    let bytes = model_to_bytes(model, format, options.pretty)?;
    debug!(path = %path.display(), %format, "writing model");
    write_bytes(&bytes, path, options)
}

/// Reads and decodes a model stored at `path`.
pub fn read_model<M: Model>(path: &Path, format: Format) -> Result<M> {
    let bytes = read_bytes(path)?;
    debug!(path = %path.display(), %format, bytes = bytes.len(), "read model file");
    model_from_bytes(&bytes, format)
}

fn format_of(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| ModelIoError::UnknownFormat {
        path: path.to_path_buf(),
    })
}

/// [`read_model`] with the format taken from the file extension.
pub fn read_model_auto<M: Model>(path: &Path) -> Result<M> {
    read_model(path, format_of(path)?)
}

/// [`write_model`] with the format taken from the file extension.
pub fn write_model_auto<M: Model>(model: &M, path: &Path) -> Result<()> {
    write_model(model, path, format_of(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_creates_dirs_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.bin");
        write_bytes(b"payload", &path, &WriteOptions::default()).unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"payload");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, [OsString::from("out.bin")]);
    }

    #[test]
    fn concurrent_atomic_writers_do_not_collide() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.json");
        std::thread::scope(|scope| {
            for writer in 0..4u8 {
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..16 {
                        write_bytes(&[b'0' + writer; 64], path, &WriteOptions::default()).unwrap();
                    }
                });
            }
        });
        let contents = read_bytes(&path).unwrap();
        assert_eq!(contents.len(), 64);
        assert!(contents.iter().all(|b| *b == contents[0]));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, [OsString::from("shared.json")]);
    }

    #[test]
    fn atomic_write_into_missing_dir_without_create_dirs_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent/out.json");
        let options = WriteOptions::default().with_create_dirs(false);
        assert!(matches!(
            write_bytes(b"{}", &path, &options),
            Err(ModelIoError::Io { operation: "create temp file in", .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn missing_parent_without_create_dirs_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent/out.json");
        let options = WriteOptions::default().with_create_dirs(false).with_atomic(false);
        assert!(matches!(
            write_bytes(b"{}", &path, &options),
            Err(ModelIoError::Io { operation: "write", .. })
        ));
    }

    #[test]
    fn read_of_missing_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = read_bytes(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn text_helpers() {
        assert_eq!(bytes_from_text("héllo"), "héllo".as_bytes());
        assert_eq!(text_from_bytes(b"ok".to_vec()).unwrap(), "ok");
        assert!(matches!(
            text_from_bytes(vec![0xff]),
            Err(ModelIoError::Utf8(_))
        ));
    }

    #[test]
    fn inspect_renders_every_format() {
        let mut store = Store::new();
        store.set("id", 7i64);
        assert!(inspect(&store, Format::Json).unwrap().contains("\"id\": 7"));
        assert!(inspect(&store, Format::Plist).unwrap().contains("<integer>7</integer>"));
        let encoded = inspect(&store, Format::Binary).unwrap();
        assert!(binary_from_text(&encoded).unwrap().starts_with(b"MKB"));
    }
}
