//! Errors produced while decoding a database file.
//!
//! Every operation on [`super::db::SQLiteDatabase`] either returns its complete
//! result or one of these errors; nothing is reported partially.

use thiserror::Error;

/// Result alias used throughout the decoding core
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The requested byte range could not be read from the source
    #[error("failed to read {len} bytes at offset {offset}")]
    Io {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Only a single leaf table b-tree page can be walked
    #[error("unsupported page type {page_type:#04x}: only a leaf table b-tree root page (0x0d) can be read")]
    UnsupportedPage { page_type: u8 },
}

/// A structural problem in bytes that were read successfully
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a database file: bad header string")]
    BadMagic,

    #[error("malformed {what} header")]
    MalformedHeader { what: &'static str },

    #[error("varint at offset {offset} runs past the end of the buffer")]
    TruncatedVarint { offset: usize },

    #[error("cell pointer array of {count} entries ends at {end}, past the page end {page_end}")]
    PointerArrayOverflow {
        count: u16,
        end: u64,
        page_end: u64,
    },

    #[error("cell pointer {pointer} lies outside the usable page area (ends at {usable_end})")]
    PointerOutOfPage { pointer: u16, usable_end: u64 },

    #[error("cell at {pointer} ends at {end}, past the usable page area (ends at {usable_end})")]
    CellOutOfPage {
        pointer: u16,
        end: u64,
        usable_end: u64,
    },

    #[error("record header size {header_size} exceeds record length {len}")]
    HeaderOutOfBounds { header_size: usize, len: usize },

    #[error("record has {found} columns, column {index} was requested")]
    MissingColumn { index: usize, found: usize },

    #[error("column {index} has serial type {serial_type}, expected text")]
    NotText { index: usize, serial_type: u64 },

    #[error("reserved serial type {serial_type} in record header")]
    ReservedSerialType { serial_type: u64 },

    #[error("column {index} spans {start}..{end}, past the record length {len}")]
    ColumnOutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("column {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
}
