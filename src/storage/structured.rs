//! Structured binary I/O for index data.
//!
//! Little-endian primitives, LEB128 varints, and length-prefixed strings,
//! with a running crc32 so a segment file can be verified end to end on
//! open. All index persistence goes through [`StructWriter`] and
//! [`StructReader`].

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{BantamError, Result};
use crate::storage::traits::{StorageInput, StorageOutput};

/// Encode a u64 as a LEB128 varint.
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// A structured writer that tracks a running checksum.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: Hasher,
}

impl<W: StorageOutput> StructWriter<W> {
    /// Create a new structured writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: Hasher::new(),
        }
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a little-endian u64.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(value)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write an LEB128 varint.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let encoded = encode_varint(value);
        self.writer.write_all(&encoded)?;
        self.hasher.update(&encoded);
        Ok(())
    }

    /// Write raw bytes without a length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }

    /// Write a string with a varint length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as u64)?;
        self.write_bytes(bytes)
    }

    /// Write the accumulated checksum, then flush and sync the output.
    ///
    /// Must be the last write: the checksum itself is not checksummed.
    pub fn finish(mut self) -> Result<()> {
        let checksum = self.hasher.clone().finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.close()
    }
}

/// A structured reader that verifies the checksum written by [`StructWriter`].
///
/// Length and count fields in a corrupt file can claim arbitrary values, so
/// the reader tracks how many bytes it has consumed and rejects any declared
/// length larger than what is left in the file before allocating for it.
pub struct StructReader<R: StorageInput> {
    reader: R,
    hasher: Hasher,
    consumed: u64,
}

impl<R: StorageInput> StructReader<R> {
    /// Create a new structured reader.
    pub fn new(reader: R) -> Self {
        StructReader {
            reader,
            hasher: Hasher::new(),
            consumed: 0,
        }
    }

    fn remaining(&self) -> Result<u64> {
        Ok(self.reader.size()?.saturating_sub(self.consumed))
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        self.consumed += 4;
        Ok(value)
    }

    /// Read a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        let value = self.reader.read_u64::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        self.consumed += 8;
        Ok(value)
    }

    /// Read an LEB128 varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.reader.read_u8()?;
            self.hasher.update(&[byte]);
            self.consumed += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 64 {
                return Err(BantamError::index("varint overflows u64"));
            }
        }
    }

    /// Read a varint declaring a byte length or element count.
    ///
    /// Every element occupies at least one byte, so a value exceeding the
    /// bytes left in the file marks the file corrupt. Checking here keeps
    /// an oversized claim from ever reaching an allocation.
    pub fn read_len(&mut self) -> Result<usize> {
        let value = self.read_varint()?;
        let remaining = self.remaining()?;
        if value > remaining {
            return Err(BantamError::index(format!(
                "declared length {value} exceeds {remaining} bytes left in file"
            )));
        }
        Ok(value as usize)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let remaining = self.remaining()?;
        if len as u64 > remaining {
            return Err(BantamError::index(format!(
                "declared length {len} exceeds {remaining} bytes left in file"
            )));
        }
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        self.hasher.update(&buf);
        self.consumed += len as u64;
        Ok(buf)
    }

    /// Read a string with a varint length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| BantamError::index(format!("invalid utf-8: {e}")))
    }

    /// Read the trailing checksum and verify it against everything read so
    /// far. Fails with an index error on mismatch.
    pub fn verify_checksum(mut self) -> Result<()> {
        let expected = self.hasher.finalize();
        let actual = self.reader.read_u32::<LittleEndian>()?;
        if expected != actual {
            return Err(BantamError::index(format!(
                "checksum mismatch: expected {expected:#010x}, found {actual:#010x}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::traits::Storage;

    #[test]
    fn test_varint_encoding() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(127), vec![0x7f]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xac, 0x02]);
    }

    #[test]
    fn test_struct_round_trip() {
        let storage = MemoryStorage::new();

        {
            let output = storage.create_output("test.bin").unwrap();
            let mut writer = StructWriter::new(output);
            writer.write_u32(0x424e544d).unwrap();
            writer.write_varint(1).unwrap();
            writer.write_varint(300).unwrap();
            writer.write_u64(u64::MAX).unwrap();
            writer.write_string("electronics").unwrap();
            writer.finish().unwrap();
        }

        {
            let input = storage.open_input("test.bin").unwrap();
            let mut reader = StructReader::new(input);
            assert_eq!(reader.read_u32().unwrap(), 0x424e544d);
            assert_eq!(reader.read_varint().unwrap(), 1);
            assert_eq!(reader.read_varint().unwrap(), 300);
            assert_eq!(reader.read_u64().unwrap(), u64::MAX);
            assert_eq!(reader.read_string().unwrap(), "electronics");
            reader.verify_checksum().unwrap();
        }
    }

    #[test]
    fn test_oversized_length_is_rejected_before_allocation() {
        let storage = MemoryStorage::new();

        {
            let output = storage.create_output("test.bin").unwrap();
            let mut writer = StructWriter::new(output);
            // A length claiming far more bytes than the file holds.
            writer.write_varint(1 << 62).unwrap();
            writer.finish().unwrap();
        }

        let input = storage.open_input("test.bin").unwrap();
        let mut reader = StructReader::new(input);
        assert!(matches!(reader.read_len(), Err(BantamError::Index(_))));

        let input = storage.open_input("test.bin").unwrap();
        let mut reader = StructReader::new(input);
        assert!(matches!(reader.read_string(), Err(BantamError::Index(_))));
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let storage = MemoryStorage::new();

        {
            let output = storage.create_output("test.bin").unwrap();
            let mut writer = StructWriter::new(output);
            writer.write_string("hello").unwrap();
            writer.finish().unwrap();
        }

        // Flip a byte in the payload.
        let mut data = {
            use std::io::Read;
            let mut input = storage.open_input("test.bin").unwrap();
            let mut buf = Vec::new();
            input.read_to_end(&mut buf).unwrap();
            buf
        };
        data[1] ^= 0xff;
        {
            use std::io::Write;
            let mut output = storage.create_output("test.bin").unwrap();
            output.write_all(&data).unwrap();
            output.close().unwrap();
        }

        let input = storage.open_input("test.bin").unwrap();
        let mut reader = StructReader::new(input);
        let _ = reader.read_string();
        assert!(reader.verify_checksum().is_err());
    }
}
