//! Binary field encoding shared by trees, forests and the pluggable types
//!
//! Every field the engine writes is fixed width and **little-endian**:
//! counts and tags are `i32`, thresholds and other scalars are `f64`.
//! Implementations of [`BinaryCodec`] for feature responses, statistics and
//! leaf payloads are free to choose their own layout, but the helpers below
//! keep them consistent with the engine's framing.

use std::io::{self, Read, Write};

/// Types that can be written to and read back from a binary stream.
pub trait BinaryCodec: Sized {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()>;
    fn decode<R: Read>(reader: &mut R) -> io::Result<Self>;
}

pub fn write_i32<W: Write>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn write_f64<W: Write>(writer: &mut W, value: f64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub fn read_f64<R: Read>(reader: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Write a length or count as `i32`, rejecting values that do not fit.
pub fn write_len<W: Write>(writer: &mut W, len: usize) -> io::Result<()> {
    let value = i32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {len} does not fit in an i32 field"),
        )
    })?;
    write_i32(writer, value)
}

/// Read an `i32` length or count, rejecting negative values.
pub fn read_len<R: Read>(reader: &mut R) -> io::Result<usize> {
    let value = read_i32(reader)?;
    usize::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("negative length {value} in stream"),
        )
    })
}

impl BinaryCodec for () {
    fn encode<W: Write>(&self, _writer: &mut W) -> io::Result<()> {
        Ok(())
    }

    fn decode<R: Read>(_reader: &mut R) -> io::Result<Self> {
        Ok(())
    }
}
