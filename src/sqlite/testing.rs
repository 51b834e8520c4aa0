//! Builders for synthetic database images used by the unit tests

use super::core::btree::{INDEX_INTERIOR, TABLE_INTERIOR, TABLE_LEAF};

/// Encodes `value` as a SQLite varint (values below 2^56)
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    assert!(value < 1 << 56, "nine-byte varints are not needed in tests");

    let mut bytes = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        bytes.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    bytes.reverse();
    bytes
}

/// Record whose columns are the given text values, `None` being NULL
pub fn record_with(columns: &[Option<&[u8]>]) -> Vec<u8> {
    let mut types = Vec::new();
    let mut body = Vec::new();
    for column in columns {
        match column {
            Some(text) => {
                types.extend(encode_varint(13 + 2 * text.len() as u64));
                body.extend_from_slice(text);
            }
            None => types.push(0),
        }
    }

    let header_size = 1 + types.len();
    assert!(header_size < 128);

    let mut record = vec![header_size as u8];
    record.extend(types);
    record.extend(body);
    record
}

/// A sqlite_schema row describing table `name`
pub fn schema_record(name: &str) -> Vec<u8> {
    let sql = format!("CREATE TABLE {} (id integer primary key)", name);

    let mut types = vec![];
    for text in ["table", name, name] {
        types.extend(encode_varint(13 + 2 * text.len() as u64));
    }
    // rootpage as a one-byte integer
    types.push(1);
    types.extend(encode_varint(13 + 2 * sql.len() as u64));

    let header_size = 1 + types.len();
    assert!(header_size < 128);

    let mut record = vec![header_size as u8];
    record.extend(types);
    record.extend_from_slice(b"table");
    record.extend_from_slice(name.as_bytes());
    record.extend_from_slice(name.as_bytes());
    record.push(2);
    record.extend_from_slice(sql.as_bytes());
    record
}

/// A table leaf cell holding [`schema_record`] for `name`
pub fn schema_cell(row_id: u64, name: &str) -> Vec<u8> {
    let record = schema_record(name);
    let mut cell = encode_varint(record.len() as u64);
    cell.extend(encode_varint(row_id));
    cell.extend(record);
    cell
}

/// Assembles page 1 of a database: file header, b-tree page header,
/// cell pointer array and cell bodies at caller-chosen offsets
pub struct PageBuilder {
    page_size: u16,
    page_type: u8,
    text_encoding: u32,
    pointers: Vec<u16>,
    cells: Vec<(u16, Vec<u8>)>,
}

impl PageBuilder {
    pub fn new(page_size: u16) -> Self {
        Self {
            page_size,
            page_type: TABLE_LEAF,
            text_encoding: 1,
            pointers: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn page_type(mut self, page_type: u8) -> Self {
        self.page_type = page_type;
        self
    }

    pub fn text_encoding(mut self, code: u32) -> Self {
        self.text_encoding = code;
        self
    }

    /// Places `bytes` at `offset` and appends a pointer to it
    pub fn cell_at(mut self, offset: u16, bytes: Vec<u8>) -> Self {
        self.pointers.push(offset);
        self.cells.push((offset, bytes));
        self
    }

    /// Appends an empty (zero) slot to the pointer array
    pub fn zero_pointer(mut self) -> Self {
        self.pointers.push(0);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut page = vec![0u8; self.page_size as usize];

        page[..16].copy_from_slice(b"SQLite format 3\0");
        page[16..18].copy_from_slice(&self.page_size.to_be_bytes());
        page[18] = 1;
        page[19] = 1;
        page[21..24].copy_from_slice(&[64, 32, 32]);
        page[28..32].copy_from_slice(&1u32.to_be_bytes());
        page[44..48].copy_from_slice(&4u32.to_be_bytes());
        page[56..60].copy_from_slice(&self.text_encoding.to_be_bytes());

        let content_start = self.cells.iter().map(|(offset, _)| *offset).min();
        page[100] = self.page_type;
        page[103..105].copy_from_slice(&(self.pointers.len() as u16).to_be_bytes());
        page[105..107].copy_from_slice(&content_start.unwrap_or(0).to_be_bytes());

        let mut array_start = 108;
        if matches!(self.page_type, INDEX_INTERIOR | TABLE_INTERIOR) {
            page[108..112].copy_from_slice(&2u32.to_be_bytes());
            array_start = 112;
        }
        for (i, pointer) in self.pointers.iter().enumerate() {
            let at = array_start + i * 2;
            page[at..at + 2].copy_from_slice(&pointer.to_be_bytes());
        }

        // Cell bodies are clipped at the page end, like an overflowing payload
        for (offset, bytes) in &self.cells {
            let start = *offset as usize;
            let end = (start + bytes.len()).min(page.len());
            page[start..end].copy_from_slice(&bytes[..end - start]);
        }

        page
    }
}
