//! The ZIP container of a DOCX package
//!
//! Every entry is unpacked into memory. Parts the editor never touches
//! (media, numbering, theme, settings) are written back byte for byte.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Entries under this prefix are already compressed and are stored as is
const MEDIA_PREFIX: &str = "word/media/";

/// An unpacked OOXML package, entries keyed by part name
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Unpack every file entry of a ZIP stream
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            parts.insert(entry.name().to_string(), bytes);
        }
        tracing::debug!(parts = parts.len(), "unpacked archive");
        Ok(Self { parts })
    }

    pub fn get(&self, part: &str) -> Option<&[u8]> {
        self.parts.get(part).map(Vec::as_slice)
    }

    /// Part decoded as UTF-8 (lossy)
    pub fn get_string(&self, part: &str) -> Option<String> {
        self.get(part)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// A part the package cannot do without
    pub fn require(&self, part: &str) -> Result<&[u8]> {
        self.get(part)
            .ok_or_else(|| OoxmlError::MissingFile(part.to_string()))
    }

    pub fn contains(&self, part: &str) -> bool {
        self.parts.contains_key(part)
    }

    /// Part names in sorted order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Lowest `N` with no `word/footerN.xml` part
    pub fn next_footer_index(&self) -> u32 {
        (1..)
            .find(|n| !self.contains(&format!("word/footer{}.xml", n)))
            .unwrap_or(1)
    }

    pub fn set(&mut self, part: impl Into<String>, bytes: Vec<u8>) {
        self.parts.insert(part.into(), bytes);
    }

    pub fn set_string(&mut self, part: impl Into<String>, text: impl Into<String>) {
        self.set(part, text.into().into_bytes());
    }

    pub fn remove(&mut self, part: &str) -> Option<Vec<u8>> {
        self.parts.remove(part)
    }

    /// Pack into a new ZIP buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Pack into `writer`; `[Content_Types].xml` is always the first entry
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let content_types = self.parts.get_key_value(CONTENT_TYPES_PART);
        let rest = self
            .parts
            .iter()
            .filter(|(part, _)| part.as_str() != CONTENT_TYPES_PART);

        for (part, bytes) in content_types.into_iter().chain(rest) {
            let method = if part.starts_with(MEDIA_PREFIX) {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            zip.start_file(part.as_str(), SimpleFileOptions::default().compression_method(method))?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(())
    }
}
