use super::core::btree::RootPage;
use super::core::cell::Cell;
use super::error::{Error, Result};
use super::source::ByteSource;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Represents a SQLite database file
pub struct SQLiteDatabase<S = File> {
    /// The underlying byte source
    source: S,
}

/// Contains metadata about a SQLite database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SQLiteDatabaseInfo {
    /// Size of each page in bytes, as stored in the header
    page_size: u16,
    /// Number of cells on the schema table's root page
    num_tables: u16,
}

impl SQLiteDatabaseInfo {
    /// Returns the page size in bytes
    pub fn page_size(&self) -> u16 {
        self.page_size
    }

    /// Returns the number of tables in the database
    pub fn num_tables(&self) -> u16 {
        self.num_tables
    }
}

impl SQLiteDatabase<File> {
    /// Opens a SQLite database file at the given path
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<S: ByteSource> SQLiteDatabase<S> {
    /// Wraps an already opened byte source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Reads the page size and the schema root page's cell count
    pub fn get_info(&mut self) -> Result<SQLiteDatabaseInfo> {
        let root = RootPage::read(&mut self.source)?;
        info!(
            "Read page size {} and {} schema cells",
            root.database_header.page_size,
            root.header.cell_count()
        );

        Ok(SQLiteDatabaseInfo {
            page_size: root.database_header.page_size,
            num_tables: root.header.cell_count(),
        })
    }

    /// Lists the `tbl_name` of every row of the sqlite_schema table, in cell pointer order
    ///
    /// Empty (zero) cell pointers are skipped. Any read or decode failure aborts
    /// the whole listing.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File IO fails or the file is truncated
    /// - Page 1 is not a single leaf table b-tree page
    /// - A cell or record is malformed or a table name is not valid text
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        let root = RootPage::read(&mut self.source)?;
        if !root.header.is_table_leaf() {
            return Err(Error::UnsupportedPage {
                page_type: root.header.page_type,
            });
        }

        let layout = root.cell_layout()?;
        let encoding = root.database_header.text_encoding;
        let pointers = root.read_cell_pointers(&mut self.source)?;

        let tables = pointers
            .into_iter()
            .filter(|&ptr| ptr != 0)
            .map(|ptr| -> Result<String> {
                let cell = Cell::read(&mut self.source, ptr, &layout)?;
                let name = cell.record()?.table_name(encoding)?;
                debug!("Cell at {} (row {}) names table {}", ptr, cell.row_id(), name);
                Ok(name)
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Found {} tables", tables.len());
        Ok(tables)
    }
}
