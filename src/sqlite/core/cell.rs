//! Table b-tree leaf cells
//!
//! A leaf cell holds, in order: the payload size (varint), the row id (varint),
//! and the payload itself. Payloads too large for the page spill into overflow
//! pages; only the part stored on the page is materialized here.

use super::record::Record;
use super::varint::{Varint, MAX_VARINT_LEN};
use crate::sqlite::error::{DecodeError, Result};
use crate::sqlite::source::ByteSource;
use tracing::trace;

/// Page bounds a cell must be decoded within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    /// Absolute offset one past the last usable byte, before the reserved region
    pub usable_end: u64,
    /// Page size minus the reserved region
    pub usable_size: u64,
}

impl CellLayout {
    /// Bytes of a payload of `payload_size` that are stored on a table leaf page
    pub fn local_payload_size(&self, payload_size: u64) -> u64 {
        let usable = self.usable_size;
        let max_local = usable - 35;
        if payload_size <= max_local {
            return payload_size;
        }

        let min_local = (usable - 12) * 32 / 255 - 23;
        let local = min_local + (payload_size - min_local) % (usable - 4);
        if local <= max_local {
            local
        } else {
            min_local
        }
    }
}

/// A single row of a table b-tree leaf page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    payload_size: u64,
    row_id: i64,
    payload: Vec<u8>,
}

impl Cell {
    /// Reads the cell starting at absolute offset `pointer`
    pub fn read<S: ByteSource + ?Sized>(
        source: &mut S,
        pointer: u16,
        layout: &CellLayout,
    ) -> Result<Self> {
        let start = pointer as u64;
        if start >= layout.usable_end {
            return Err(DecodeError::PointerOutOfPage {
                pointer,
                usable_end: layout.usable_end,
            }
            .into());
        }

        let (payload_size, size_len) = read_varint_at(source, start, layout.usable_end)?;
        let (row_id, row_id_len) =
            read_varint_at(source, start + size_len as u64, layout.usable_end)?;
        let header_len = (size_len + row_id_len) as u64;

        let local = layout.local_payload_size(payload_size);
        let payload_start = start + header_len;
        let end = payload_start + local;
        if end > layout.usable_end {
            return Err(DecodeError::CellOutOfPage {
                pointer,
                end,
                usable_end: layout.usable_end,
            }
            .into());
        }

        let payload = source.read_vec_at(payload_start, local as usize)?;
        trace!(
            "Cell at {}: payload size {}, row id {}, {} bytes on page",
            pointer,
            payload_size,
            row_id,
            local
        );

        Ok(Self {
            payload_size,
            row_id: row_id as i64,
            payload,
        })
    }

    /// Declared size of the whole payload, including any overflow
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    pub fn row_id(&self) -> i64 {
        self.row_id
    }

    /// True if part of the payload lives on overflow pages
    pub fn has_overflow(&self) -> bool {
        (self.payload.len() as u64) < self.payload_size
    }

    /// Parses the on-page payload as a record
    pub fn record(&self) -> std::result::Result<Record<'_>, DecodeError> {
        Record::parse(&self.payload)
    }
}

/// Reads the varint at `offset` one byte at a time, never past `end`
fn read_varint_at<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: u64,
    end: u64,
) -> Result<(u64, usize)> {
    let mut bytes = Vec::with_capacity(MAX_VARINT_LEN);
    let mut byte = [0u8; 1];
    while bytes.len() < MAX_VARINT_LEN && offset + (bytes.len() as u64) < end {
        source.read_exact_at(offset + bytes.len() as u64, &mut byte)?;
        bytes.push(byte[0]);
        if byte[0] & 0x80 == 0 {
            break;
        }
    }

    let varint = bytes
        .read_varint(0)
        .map_err(|_| DecodeError::TruncatedVarint {
            offset: offset as usize,
        })?;
    Ok(varint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::error::Error;
    use crate::sqlite::testing::{encode_varint, schema_cell, schema_record, PageBuilder};
    use std::io::Cursor;

    const LAYOUT: CellLayout = CellLayout {
        usable_end: 4096,
        usable_size: 4096,
    };

    #[test]
    fn test_local_payload_size() {
        assert_eq!(LAYOUT.local_payload_size(100), 100);
        assert_eq!(LAYOUT.local_payload_size(4061), 4061);
        assert_eq!(LAYOUT.local_payload_size(5000), 908);
        assert_eq!(LAYOUT.local_payload_size(4089), 489);
    }

    #[test]
    fn test_read_cell() -> anyhow::Result<()> {
        let page = PageBuilder::new(4096)
            .cell_at(2000, schema_cell(7, "users"))
            .build();
        let cell = Cell::read(&mut Cursor::new(page), 2000, &LAYOUT)?;

        assert_eq!(cell.row_id(), 7);
        assert_eq!(cell.payload_size(), schema_record("users").len() as u64);
        assert!(!cell.has_overflow());
        assert_eq!(cell.record()?.table_name(Default::default())?, "users");

        Ok(())
    }

    #[test]
    fn test_read_cell_with_multi_byte_row_id() -> anyhow::Result<()> {
        let record = schema_record("events");
        let mut bytes = encode_varint(record.len() as u64);
        bytes.extend(encode_varint(300));
        bytes.extend(&record);

        let page = PageBuilder::new(4096).cell_at(1000, bytes).build();
        let cell = Cell::read(&mut Cursor::new(page), 1000, &LAYOUT)?;

        assert_eq!(cell.row_id(), 300);
        assert_eq!(cell.record()?.table_name(Default::default())?, "events");

        Ok(())
    }

    #[test]
    fn test_pointer_outside_page() {
        let page = PageBuilder::new(4096).build();

        assert!(matches!(
            Cell::read(&mut Cursor::new(page), 5000, &LAYOUT),
            Err(Error::Decode(DecodeError::PointerOutOfPage { pointer: 5000, .. }))
        ));
    }

    #[test]
    fn test_cell_running_past_page_end() {
        let page = PageBuilder::new(4096)
            .cell_at(4090, schema_cell(1, "users"))
            .build();

        assert!(matches!(
            Cell::read(&mut Cursor::new(page), 4090, &LAYOUT),
            Err(Error::Decode(DecodeError::CellOutOfPage { pointer: 4090, .. }))
        ));
    }

    #[test]
    fn test_cell_running_into_reserved_region() -> anyhow::Result<()> {
        let layout = CellLayout {
            usable_end: 4064,
            usable_size: 4064,
        };
        let cell = schema_cell(1, "users");
        let cell_len = cell.len() as u64;
        let page = PageBuilder::new(4096).cell_at(4000, cell).build();

        // Fits the page but not its usable area
        assert!(4000 + cell_len <= 4096);
        match Cell::read(&mut Cursor::new(page.clone()), 4000, &layout) {
            Err(Error::Decode(DecodeError::CellOutOfPage {
                pointer,
                end,
                usable_end,
            })) => {
                assert_eq!(pointer, 4000);
                assert_eq!(end, 4000 + cell_len);
                assert_eq!(usable_end, 4064);
            }
            other => panic!("Expected CellOutOfPage, got {:?}", other),
        }

        assert!(matches!(
            Cell::read(&mut Cursor::new(page), 4070, &layout),
            Err(Error::Decode(DecodeError::PointerOutOfPage { pointer: 4070, .. }))
        ));

        Ok(())
    }

    #[test]
    fn test_cell_ending_at_end_of_file() -> anyhow::Result<()> {
        let cell = schema_cell(3, "a");
        let end = 1000 + cell.len();
        let mut page = PageBuilder::new(4096).cell_at(1000, cell).build();
        page.truncate(end);

        let cell = Cell::read(&mut Cursor::new(page), 1000, &LAYOUT)?;
        assert_eq!(cell.row_id(), 3);
        assert_eq!(cell.record()?.table_name(Default::default())?, "a");

        Ok(())
    }

    #[test]
    fn test_varint_cut_by_usable_end() {
        let page = PageBuilder::new(4096).cell_at(4095, vec![0x81]).build();

        assert!(matches!(
            Cell::read(&mut Cursor::new(page), 4095, &LAYOUT),
            Err(Error::Decode(DecodeError::TruncatedVarint { offset: 4095 }))
        ));
    }

    #[test]
    fn test_truncated_source_is_io_error() {
        let mut page = PageBuilder::new(4096)
            .cell_at(2000, schema_cell(1, "users"))
            .build();
        page.truncate(2010);

        assert!(matches!(
            Cell::read(&mut Cursor::new(page), 2000, &LAYOUT),
            Err(Error::Io { offset: 2002, .. })
        ));
    }
}
