//! SQLite Database Header Implementation
//!
//! Handles parsing of the SQLite database header (first 100 bytes of the file)
//! according to the SQLite file format.
//!
//! ## Database Header Format (First 100 bytes)
//!
//! - Bytes 0-15: Header string "SQLite format 3\0"
//! - Bytes 16-17: Page size in bytes (big-endian), 1 meaning 65536
//! - Byte 18: File format write version
//! - Byte 19: File format read version
//! - Byte 20: Reserved space at end of each page
//! - Bytes 21-23: Maximum embedded payload fraction, minimum embedded payload fraction, leaf payload fraction
//! - Bytes 24-27: File change counter
//! - Bytes 28-31: Size of database file in pages
//! - Bytes 32-55: Freelist, schema cookie/format, cache size, vacuum root
//! - Bytes 56-59: Database text encoding (1:UTF-8, 2:UTF-16le, 3:UTF-16be)
//! - Bytes 60-99: User version, vacuum mode, application ID, reserved, version numbers
//!
//! Only the fields the page reader consumes are kept.

use crate::sqlite::error::{DecodeError, Result};
use crate::sqlite::source::ByteSource;
use nom::bytes::complete::{tag, take};
use nom::error::ErrorKind;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::IResult;
use tracing::debug;

/// Text encoding declared for every string in the database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Maps the header code to an encoding; unknown codes fall back to UTF-8
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => TextEncoding::Utf16Le,
            3 => TextEncoding::Utf16Be,
            _ => TextEncoding::Utf8,
        }
    }
}

/// Represents the SQLite database header (first 100 bytes)
#[derive(Debug, Clone, Copy)]
pub struct DatabaseHeader {
    /// Page size as stored (bytes 16-17)
    pub page_size: u16,
    /// Reserved space at end of each page (byte 20)
    pub reserved_space: u8,
    /// Size of database file in pages (bytes 28-31)
    pub database_size: u32,
    /// Database text encoding (bytes 56-59)
    pub text_encoding: TextEncoding,
}

impl DatabaseHeader {
    /// Size of the SQLite database header in bytes
    pub const HEADER_SIZE: usize = 100;

    /// Magic string that should appear at the start of every SQLite file
    const MAGIC_STRING: &'static [u8] = b"SQLite format 3\0";

    /// Smallest usable page area the cell layout rules are defined for
    const MIN_USABLE_SIZE: u64 = 480;

    /// Reads the header from the start of `source`
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let bytes = source.read_vec_at(0, Self::HEADER_SIZE)?;
        Ok(Self::parse(&bytes)?)
    }

    /// Parses a database header from raw bytes
    pub fn parse(header_bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        let (_, header) = parse_header(header_bytes).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) if e.code == ErrorKind::Tag => {
                DecodeError::BadMagic
            }
            _ => DecodeError::MalformedHeader { what: "database" },
        })?;

        debug!("Parsed database header: {:?}", header);
        Ok(header)
    }

    /// Page size in bytes, resolving the 65536 encoding
    pub fn page_size_bytes(&self) -> u64 {
        match self.page_size {
            1 => 65536,
            size => size as u64,
        }
    }

    /// Bytes of each page available to b-tree content
    pub fn usable_size(&self) -> std::result::Result<u64, DecodeError> {
        let usable = self
            .page_size_bytes()
            .saturating_sub(self.reserved_space as u64);
        if usable < Self::MIN_USABLE_SIZE {
            return Err(DecodeError::MalformedHeader { what: "database" });
        }
        Ok(usable)
    }
}

fn parse_header(input: &[u8]) -> IResult<&[u8], DatabaseHeader> {
    let (input, _) = tag(DatabaseHeader::MAGIC_STRING)(input)?;
    let (input, page_size) = be_u16(input)?;
    // write/read versions
    let (input, _) = take(2usize)(input)?;
    let (input, reserved_space) = be_u8(input)?;
    // payload fractions, file change counter
    let (input, _) = take(7usize)(input)?;
    let (input, database_size) = be_u32(input)?;
    // freelist through the vacuum root page
    let (input, _) = take(24usize)(input)?;
    let (input, text_encoding) = be_u32(input)?;
    let (input, _) = take(40usize)(input)?;

    Ok((
        input,
        DatabaseHeader {
            page_size,
            reserved_space,
            database_size,
            text_encoding: TextEncoding::from_code(text_encoding),
        },
    ))
}
