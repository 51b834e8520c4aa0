//! SQLite File Format Implementation
//!
//! This module implements parsing of the first page of SQLite database files
//! according to the SQLite file format.
//!
//! # SQLite File Structure
//!
//! A SQLite database file consists of one or more pages. The first page (page 1) contains:
//!
//! - Database header (100 bytes)
//! - First page of the sqlite_schema table
//!
//! ## B-tree Page Structure
//!
//! Each page in the database file is a B-tree page that contains:
//!
//! - Page header (8-12 bytes)
//! - Cell pointer array
//! - Unallocated space
//! - Cell content area
//! - Reserved region
//!
//! ### Cell Pointer Array
//!
//! Directly after the page header: one big-endian u16 per cell, giving the
//! offset of the cell from the start of the page. Zero marks an empty slot.
//!
//! ## Scope
//!
//! Only page 1 is decoded, and only when it is a leaf table b-tree page, so the
//! schema table must fit on a single page. Overflow pages are never followed;
//! the leading columns of a schema record live on the page itself.

pub mod core;
pub mod db;
pub mod error;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;
