pub mod fix;
pub mod header;

use crate::{
    cursor::{ByteCursor, ByteWriter},
    GdfResult,
};

/// Size of the file header in bytes.
pub const HEADER_LEN: usize = 27;
/// Size of the opaque block that follows the header.
pub const JUNK_LEN: usize = 51;
/// Size of one encoded fix record.
pub const FIX_LEN: usize = 33;

/// Trait implemented by every GDF record and sub-record. Decoding consumes fields in wire order
/// from the cursor; encoding appends the same layout.
pub trait GdfRecord: Sized {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self>;
    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()>;

    fn to_bytes(&self) -> GdfResult<Vec<u8>> {
        let mut w = ByteWriter::new();
        self.encode(&mut w)?;
        Ok(w.into_bytes())
    }
}
