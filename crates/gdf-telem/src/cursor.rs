/// Sequential byte and bit-field access over an in-memory buffer.
///
/// [`ByteCursor`] is the read side: fixed-width integers and spans are parsed with `nom`, and
/// sub-byte fields are read MSB-first with a bit offset that persists between calls. A byte-wide
/// read that follows a partially consumed byte skips the remaining bits of that byte first.
/// [`ByteWriter`] mirrors the same layout rules for encoding.
use nom::{
    bits::complete::take as take_bits,
    bytes::complete::take,
    number::complete::{be_i32, be_u32, le_i32, le_u32, u8 as take_u8},
    IResult,
};

use crate::{Error, GdfResult};

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

type BitInput<'a> = (&'a [u8], usize);

/// Forward-only reader. Position never moves backwards.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    bit_offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            bit_offset: 0,
        }
    }

    /// Index of the byte the next read starts in.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits already consumed from the byte at [`Self::position`].
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    /// Whole bytes not yet touched by any read.
    pub fn remaining(&self) -> usize {
        let partial = usize::from(self.bit_offset != 0);
        self.buf.len().saturating_sub(self.pos + partial)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn align(&mut self) {
        if self.bit_offset != 0 {
            self.pos += 1;
            self.bit_offset = 0;
        }
    }

    fn parse<T>(
        &mut self,
        width: usize,
        parser: impl FnOnce(&'a [u8]) -> IResult<&'a [u8], T>,
    ) -> GdfResult<T> {
        self.align();
        let buf = self.buf;
        let input = &buf[self.pos..];
        match parser(input) {
            Ok((rest, value)) => {
                self.pos = self.buf.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(Error::UnexpectedEndOfInput {
                offset: self.pos,
                needed: width.saturating_sub(input.len()).max(1),
            }),
        }
    }

    pub fn read_u8(&mut self) -> GdfResult<u8> {
        self.parse(1, take_u8)
    }

    pub fn read_u32(&mut self, endian: Endian) -> GdfResult<u32> {
        match endian {
            Endian::Big => self.parse(4, be_u32),
            Endian::Little => self.parse(4, le_u32),
        }
    }

    pub fn read_i32(&mut self, endian: Endian) -> GdfResult<i32> {
        match endian {
            Endian::Big => self.parse(4, be_i32),
            Endian::Little => self.parse(4, le_i32),
        }
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> GdfResult<&'a [u8]> {
        self.parse(len, take(len))
    }

    /// Read a fixed-length span into an owned array.
    pub fn read_array<const N: usize>(&mut self) -> GdfResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read an unsigned field of `count` bits (1..=8), most significant bit first.
    pub fn read_bits(&mut self, count: usize) -> GdfResult<u8> {
        if !(1..=8).contains(&count) {
            return Err(Error::OutOfRange(format!("bit field width {count}")));
        }
        let buf = self.buf;
        let input: BitInput<'a> = (&buf[self.pos..], self.bit_offset);
        let res: IResult<BitInput<'a>, u8, nom::error::Error<BitInput<'a>>> =
            take_bits(count)(input);
        match res {
            Ok(((rest, bit_offset), value)) => {
                self.pos = self.buf.len() - rest.len();
                self.bit_offset = bit_offset;
                Ok(value)
            }
            Err(_) => Err(Error::UnexpectedEndOfInput {
                offset: self.pos,
                needed: 1,
            }),
        }
    }
}

/// Append-only writer producing the layout [`ByteCursor`] reads.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
    bit_offset: usize,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bit_offset = 0;
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32, endian: Endian) {
        let bytes = match endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes);
    }

    pub fn write_i32(&mut self, value: i32, endian: Endian) {
        let bytes = match endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bit_offset = 0;
        self.buf.extend_from_slice(bytes);
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u8, count: usize) -> GdfResult<()> {
        if !(1..=8).contains(&count) {
            return Err(Error::OutOfRange(format!("bit field width {count}")));
        }
        if count < 8 && value >> count != 0 {
            return Err(Error::OutOfRange(format!(
                "{value} does not fit in {count} bits"
            )));
        }
        for i in (0..count).rev() {
            if self.bit_offset == 0 {
                self.buf.push(0);
            }
            let bit = (value >> i) & 1;
            if let Some(last) = self.buf.last_mut() {
                *last |= bit << (7 - self.bit_offset);
            }
            self.bit_offset = (self.bit_offset + 1) % 8;
        }
        Ok(())
    }
}
