/// Whole-file decoding: header, junk block, then fixes to the end of the buffer.
use std::path::Path;

use tracing::debug;

use crate::{
    cursor::{ByteCursor, ByteWriter},
    protocol::{
        fix::Fix,
        header::{Header, Junk},
        GdfRecord, FIX_LEN,
    },
    Error, GdfResult,
};

/// A fully decoded GDF file. Fix order is file order.
#[derive(Debug, Clone, PartialEq)]
pub struct GdfDocument {
    header: Header,
    junk: Junk,
    fixes: Vec<Fix>,
}

enum DecodeState {
    AwaitingHeader,
    AwaitingFixes(GdfDocument),
    Done(GdfDocument),
}

impl GdfDocument {
    pub fn new(header: Header, junk: Junk, fixes: Vec<Fix>) -> Self {
        Self {
            header,
            junk,
            fixes,
        }
    }

    /// Decode a complete file image. Any structural problem fails the whole document; a
    /// trailing fragment shorter than one fix is [`Error::TruncatedRecord`].
    pub fn decode(bytes: &[u8]) -> GdfResult<Self> {
        let mut cur = ByteCursor::new(bytes);
        let mut state = DecodeState::AwaitingHeader;
        loop {
            state = match state {
                DecodeState::AwaitingHeader => {
                    let header = Header::decode(&mut cur)?;
                    let junk = Junk::decode(&mut cur)?;
                    let fixes = Vec::with_capacity(cur.remaining() / FIX_LEN);
                    DecodeState::AwaitingFixes(GdfDocument::new(header, junk, fixes))
                }
                DecodeState::AwaitingFixes(mut doc) => match cur.remaining() {
                    0 => DecodeState::Done(doc),
                    remaining if remaining < FIX_LEN => {
                        return Err(Error::TruncatedRecord {
                            offset: cur.position(),
                            remaining,
                        });
                    }
                    _ => {
                        doc.fixes.push(Fix::decode(&mut cur)?);
                        DecodeState::AwaitingFixes(doc)
                    }
                },
                DecodeState::Done(doc) => {
                    debug!(
                        "collar {}: decoded {} fixes",
                        doc.header.collar_id,
                        doc.fixes.len()
                    );
                    return Ok(doc);
                }
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> GdfResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
        Self::decode(&bytes)
    }

    pub fn encode(&self) -> GdfResult<Vec<u8>> {
        let mut w = ByteWriter::new();
        self.header.encode(&mut w)?;
        self.junk.encode(&mut w)?;
        for fix in &self.fixes {
            fix.encode(&mut w)?;
        }
        Ok(w.into_bytes())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn junk(&self) -> &Junk {
        &self.junk
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn collar_id(&self) -> u32 {
        self.header.collar_id
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}
