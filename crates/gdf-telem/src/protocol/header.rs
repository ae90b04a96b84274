use tracing::debug;

use super::GdfRecord;
use crate::{
    cursor::{ByteCursor, ByteWriter, Endian},
    Error, GdfResult,
};

/// Marker that terminates every valid header.
pub const VALID_POSTFIX: [u8; 3] = [0x01, 0x03, 0x03];

/// File header, once per file at offset zero.
///
/// The collar id is little-endian. `prefix` and `msg` are carried verbatim; only the postfix is
/// checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub collar_id: u32,
    pub prefix: [u8; 4],
    pub msg: [u8; 16],
    pub postfix: [u8; 3],
}

impl Header {
    pub fn new(collar_id: u32, prefix: [u8; 4], msg: [u8; 16]) -> Self {
        Self {
            collar_id,
            prefix,
            msg,
            postfix: VALID_POSTFIX,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.postfix == VALID_POSTFIX
    }

    /// Message text with trailing NULs and whitespace removed.
    pub fn message(&self) -> String {
        String::from_utf8_lossy(&self.msg)
            .trim_end_matches(['\0', ' '])
            .to_string()
    }
}

impl GdfRecord for Header {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        let header = Header {
            collar_id: cur.read_u32(Endian::Little)?,
            prefix: cur.read_array()?,
            msg: cur.read_array()?,
            postfix: cur.read_array()?,
        };
        if !header.is_valid() {
            return Err(Error::InvalidHeader {
                postfix: header.postfix,
            });
        }
        debug!(
            "header: collar {} msg {:?}",
            header.collar_id,
            header.message()
        );
        Ok(header)
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_u32(self.collar_id, Endian::Little);
        w.write_bytes(&self.prefix);
        w.write_bytes(&self.msg);
        w.write_bytes(&self.postfix);
        Ok(())
    }
}

/// Opaque block after the header. Kept verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junk {
    pub raw: [u8; super::JUNK_LEN],
}

impl Default for Junk {
    fn default() -> Self {
        Self {
            raw: [0; super::JUNK_LEN],
        }
    }
}

impl GdfRecord for Junk {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Junk {
            raw: cur.read_array()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_bytes(&self.raw);
        Ok(())
    }
}
