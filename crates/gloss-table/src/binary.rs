//! Binary table format.
//!
//! ```text
//! Header (16 bytes):
//!   magic: [u8; 4]     b"GLST"
//!   version: u32       format version
//!   checksum: u32      CRC32 of the payload
//!   payload_len: u32
//! Payload:
//!   postcard-encoded table data
//! ```

use crate::table::{GrammarTable, TableData};
use crate::TableFormatError;

pub const MAGIC: [u8; 4] = *b"GLST";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 16;

impl GrammarTable {
    pub fn to_binary(&self) -> Result<Vec<u8>, TableFormatError> {
        let payload = postcard::to_allocvec(&self.data)?;

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, TableFormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(TableFormatError::FileTooSmall(bytes.len()));
        }
        if bytes[0..4] != MAGIC {
            return Err(TableFormatError::InvalidMagic);
        }

        let version = read_u32(bytes, 4);
        if version != FORMAT_VERSION {
            return Err(TableFormatError::UnsupportedVersion(version));
        }

        let checksum = read_u32(bytes, 8);
        let payload_len = read_u32(bytes, 12);
        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != payload_len as usize {
            return Err(TableFormatError::SizeMismatch {
                header: payload_len,
                actual: payload.len(),
            });
        }

        let computed = crc32fast::hash(payload);
        if computed != checksum {
            return Err(TableFormatError::ChecksumMismatch {
                expected: checksum,
                found: computed,
            });
        }

        let data: TableData = postcard::from_bytes(payload)?;
        Self::from_data(data)
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}
