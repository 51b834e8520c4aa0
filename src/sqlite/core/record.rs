//! SQLite Record Format Implementation
//!
//! This module handles parsing SQLite records (rows) according to the SQLite file format.
//!
//! ## Record Format
//!
//! A record in SQLite represents a single row of data and consists of:
//!
//! - A header containing:
//!   - Header size (varint), counting itself
//!   - Serial type codes (sequence of varints), one per column
//! - The column values, concatenated in declaration order
//!
//! The serial type codes in the header describe the data type and size of each field:
//!
//! - 0: NULL
//! - 1: 8-bit signed int
//! - 2: 16-bit signed int
//! - 3: 24-bit signed int
//! - 4: 32-bit signed int
//! - 5: 48-bit signed int
//! - 6: 64-bit signed int
//! - 7: IEEE 754 64-bit float
//! - 8: 0 (legacy)
//! - 9: 1 (legacy)
//! - 10,11: Internal use
//! - N >= 12 and even: BLOB of (N-12)/2 bytes
//! - N >= 13 and odd: Text of (N-13)/2 bytes

use super::header::TextEncoding;
use super::varint::Varint;
use crate::sqlite::error::DecodeError;
use std::ops::Range;
use tracing::trace;

/// Column of a schema record holding the table name (`tbl_name`)
///
/// Schema table columns are, in order: type, name, tbl_name, rootpage, sql.
pub const TABLE_NAME_COLUMN: usize = 2;

/// Byte length of a column value with the given serial type
pub fn serial_type_size(serial_type: u64) -> Result<usize, DecodeError> {
    let size = match serial_type {
        0 | 8 | 9 => 0,
        1..=4 => serial_type,
        5 => 6,
        6 | 7 => 8,
        10 | 11 => return Err(DecodeError::ReservedSerialType { serial_type }),
        n if n % 2 == 0 => (n - 12) / 2,
        n => (n - 13) / 2,
    };
    Ok(size as usize)
}

fn is_text(serial_type: u64) -> bool {
    serial_type >= 13 && serial_type % 2 == 1
}

/// Parser for SQLite records (table/index rows)
#[derive(Debug)]
pub struct Record<'a> {
    data: &'a [u8],
    header_size: usize,
    serial_types: Vec<u64>,
}

impl<'a> Record<'a> {
    /// Reads the record header; column values are decoded on demand
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        let (header_size, mut position) = data.read_varint(0)?;
        let header_size = header_size as usize;
        if header_size > data.len() || header_size < position {
            return Err(DecodeError::HeaderOutOfBounds {
                header_size,
                len: data.len(),
            });
        }

        let header = &data[..header_size];
        let mut serial_types = Vec::new();
        while position < header_size {
            let (serial_type, len) = header.read_varint(position)?;
            serial_types.push(serial_type);
            position += len;
        }
        trace!("Record serial types: {:?}", serial_types);

        Ok(Self {
            data,
            header_size,
            serial_types,
        })
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn serial_types(&self) -> &[u64] {
        &self.serial_types
    }

    /// Byte range of column `index` within the record
    fn column_range(&self, index: usize) -> Result<Range<usize>, DecodeError> {
        if index >= self.serial_types.len() {
            return Err(DecodeError::MissingColumn {
                index,
                found: self.serial_types.len(),
            });
        }

        let mut start = self.header_size;
        for &serial_type in &self.serial_types[..index] {
            start = start.saturating_add(serial_type_size(serial_type)?);
        }
        let end = start.saturating_add(serial_type_size(self.serial_types[index])?);

        if end > self.data.len() {
            return Err(DecodeError::ColumnOutOfBounds {
                index,
                start,
                end,
                len: self.data.len(),
            });
        }
        Ok(start..end)
    }

    /// Decodes column `index` as text in the database's encoding
    pub fn text(&self, index: usize, encoding: TextEncoding) -> Result<String, DecodeError> {
        let range = self.column_range(index)?;
        let serial_type = self.serial_types[index];
        if !is_text(serial_type) {
            return Err(DecodeError::NotText { index, serial_type });
        }

        let bytes = &self.data[range];
        let decoded = match encoding {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            TextEncoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        };
        decoded.ok_or(DecodeError::InvalidUtf8 { index })
    }

    /// The `tbl_name` column of a schema table record
    pub fn table_name(&self, encoding: TextEncoding) -> Result<String, DecodeError> {
        self.text(TABLE_NAME_COLUMN, encoding)
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}
