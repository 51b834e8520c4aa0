use super::cell::CellLayout;
use super::header::DatabaseHeader;
use crate::sqlite::error::{DecodeError, Result};
use crate::sqlite::source::ByteSource;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::IResult;
use tracing::debug;

/// Page type byte of an interior index b-tree page
pub const INDEX_INTERIOR: u8 = 0x02;
/// Page type byte of an interior table b-tree page
pub const TABLE_INTERIOR: u8 = 0x05;
/// Page type byte of a leaf table b-tree page
pub const TABLE_LEAF: u8 = 0x0d;

/// Represents a B-tree page header
///
/// ## B-tree Page Header Format
///
/// - Byte 0: Page type
/// - Bytes 1-2: First freeblock offset
/// - Bytes 3-4: Number of cells
/// - Bytes 5-6: Cell content offset
/// - Byte 7: Number of fragmented free bytes
/// - Bytes 8-11: Right-most child page (interior pages only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreePageHeader {
    /// Page type (leaf=13, interior=5)
    pub page_type: u8,
    /// Offset to first freeblock
    pub first_freeblock: u16,
    /// Number of cells in page
    pub num_cells: u16,
    /// Offset to cell content area
    pub content_offset: u16,
    /// Number of fragmented free bytes
    pub fragmented_free_bytes: u8,
    /// Right-most child page number, present on interior pages
    pub right_most_pointer: Option<u32>,
}

impl BTreePageHeader {
    /// Bytes read for the header regardless of page type
    pub const READ_SIZE: usize = 12;

    /// Parse a B-tree page header from a byte slice
    pub fn parse(data: &[u8]) -> std::result::Result<Self, DecodeError> {
        parse_page_header(data)
            .map(|(_, header)| header)
            .map_err(|_| DecodeError::MalformedHeader { what: "b-tree page" })
    }

    /// Number of cells on the page
    pub fn cell_count(&self) -> u16 {
        self.num_cells
    }

    /// Start of the cell content area
    pub fn content_area_start(&self) -> u16 {
        self.content_offset
    }

    pub fn is_interior(&self) -> bool {
        matches!(self.page_type, INDEX_INTERIOR | TABLE_INTERIOR)
    }

    pub fn is_table_leaf(&self) -> bool {
        self.page_type == TABLE_LEAF
    }

    /// Length of the header on disk: 12 bytes for interior pages, 8 otherwise
    pub fn size(&self) -> usize {
        if self.is_interior() {
            12
        } else {
            8
        }
    }
}

fn parse_page_header(input: &[u8]) -> IResult<&[u8], BTreePageHeader> {
    let (input, page_type) = be_u8(input)?;
    let (input, first_freeblock) = be_u16(input)?;
    let (input, num_cells) = be_u16(input)?;
    let (input, content_offset) = be_u16(input)?;
    let (input, fragmented_free_bytes) = be_u8(input)?;

    let (input, right_most_pointer) = if matches!(page_type, INDEX_INTERIOR | TABLE_INTERIOR) {
        let (input, pointer) = be_u32(input)?;
        (input, Some(pointer))
    } else {
        (input, None)
    };

    Ok((
        input,
        BTreePageHeader {
            page_type,
            first_freeblock,
            num_cells,
            content_offset,
            fragmented_free_bytes,
            right_most_pointer,
        },
    ))
}

/// Page 1 of the database: the file header followed by the schema table's root page header
#[derive(Debug, Clone, Copy)]
pub struct RootPage {
    pub database_header: DatabaseHeader,
    pub header: BTreePageHeader,
}

impl RootPage {
    /// Reads both headers from the start of `source`
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let database_header = DatabaseHeader::read(source)?;

        let bytes = source.read_vec_at(
            DatabaseHeader::HEADER_SIZE as u64,
            BTreePageHeader::READ_SIZE,
        )?;
        let header = BTreePageHeader::parse(&bytes)?;
        debug!("Parsed root page header: {:?}", header);

        Ok(Self {
            database_header,
            header,
        })
    }

    /// Absolute offset where the cell pointer array starts
    pub fn cell_pointer_array_offset(&self) -> u64 {
        (DatabaseHeader::HEADER_SIZE + self.header.size()) as u64
    }

    /// Absolute offset one past the last byte of page 1
    pub fn page_end(&self) -> u64 {
        self.database_header.page_size_bytes()
    }

    /// Bounds the cells on this page are decoded within
    pub fn cell_layout(&self) -> std::result::Result<CellLayout, DecodeError> {
        let usable_size = self.database_header.usable_size()?;
        Ok(CellLayout {
            // Page 1 starts at offset 0
            usable_end: usable_size,
            usable_size,
        })
    }

    /// Reads and returns the cell pointer array, in on-page order
    pub fn read_cell_pointers<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<Vec<u16>> {
        let count = self.header.cell_count();
        let start = self.cell_pointer_array_offset();
        let end = start + count as u64 * 2;

        if end > self.page_end() {
            return Err(DecodeError::PointerArrayOverflow {
                count,
                end,
                page_end: self.page_end(),
            }
            .into());
        }

        let bytes = source.read_vec_at(start, count as usize * 2)?;
        let pointers: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        debug!("Cell pointers: {:?}", pointers);

        Ok(pointers)
    }
}
