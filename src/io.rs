//! Reader/Writer traits and format dispatch
//!
//! Readers load the market graph payload; writers serialize a computed layout
//! (together with the view transform it should be drawn with) to an output
//! format. The registry picks both by file extension.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::camera::ViewTransform;
use crate::graph::MarketGraphData;
use crate::layout::LayoutSnapshot;
use crate::scene::Scene;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader parses an input file into market graph data
pub trait Reader {
    /// Parse the input file
    fn read(&self, input: &Path) -> IoResult<MarketGraphData>;

    /// File extensions this reader can handle (e.g., ["yaml", "yml"])
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A writer outputs a layout and its view transform in one format
pub trait Writer {
    /// Render to an in-memory document
    fn render(&self, snapshot: &LayoutSnapshot, view: &ViewTransform) -> IoResult<String>;

    /// Identifier for this output format, also its file extension
    fn format_id(&self) -> &str;

    /// Write the rendered document to the output path
    fn write(&self, snapshot: &LayoutSnapshot, view: &ViewTransform, output: &Path) -> IoResult<()> {
        let document = self.render(snapshot, view)?;
        std::fs::write(output, document)?;
        Ok(())
    }
}

/// Reads the JSON payload
#[derive(Debug, Default)]
pub struct JsonReader;

impl JsonReader {
    pub fn new() -> Self {
        Self
    }
}

impl Reader for JsonReader {
    fn read(&self, input: &Path) -> IoResult<MarketGraphData> {
        let text = std::fs::read_to_string(input)?;
        serde_json::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Reads the same payload written as YAML
#[derive(Debug, Default)]
pub struct YamlReader;

impl YamlReader {
    pub fn new() -> Self {
        Self
    }
}

impl Reader for YamlReader {
    fn read(&self, input: &Path) -> IoResult<MarketGraphData> {
        let text = std::fs::read_to_string(input)?;
        serde_yaml::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// View transform as written next to the snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewDocument {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

#[derive(Debug, Serialize)]
struct SnapshotDocument<'a> {
    #[serde(flatten)]
    snapshot: &'a LayoutSnapshot,
    view: ViewDocument,
}

/// Writes the snapshot and view transform as pretty JSON
#[derive(Debug, Default)]
pub struct SnapshotJsonWriter;

impl SnapshotJsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Writer for SnapshotJsonWriter {
    fn render(&self, snapshot: &LayoutSnapshot, view: &ViewTransform) -> IoResult<String> {
        let document = SnapshotDocument {
            snapshot,
            view: ViewDocument {
                scale: view.scale,
                translate_x: view.translate_x,
                translate_y: view.translate_y,
            },
        };
        serde_json::to_string_pretty(&document).map_err(|e| IoError::Write(e.to_string()))
    }

    fn format_id(&self) -> &str {
        "json"
    }
}

/// Draws the map as an SVG document
#[derive(Debug, Default)]
pub struct SvgWriter;

impl SvgWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Writer for SvgWriter {
    fn render(&self, snapshot: &LayoutSnapshot, view: &ViewTransform) -> IoResult<String> {
        Scene::build(snapshot, view)
            .to_svg()
            .map_err(|e| IoError::Write(e.to_string()))
    }

    fn format_id(&self) -> &str {
        "svg"
    }
}

/// Registry of available readers and writers
pub struct FormatRegistry {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Create a registry with all default readers and writers registered
    ///
    /// Currently registers:
    /// - Readers: `JsonReader` (json), `YamlReader` (yaml, yml)
    /// - Writers: `SnapshotJsonWriter` (json), `SvgWriter` (svg)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(JsonReader::new()));
        registry.register_reader(Box::new(YamlReader::new()));
        registry.register_writer(Box::new(SnapshotJsonWriter::new()));
        registry.register_writer(Box::new(SvgWriter::new()));
        registry
    }

    /// Register a reader
    pub fn register_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    /// Register a writer
    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn Writer> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn Reader> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Find a writer for the given path based on its extension
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&dyn Writer> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writer_for_format(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }
}
