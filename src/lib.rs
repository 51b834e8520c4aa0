//! Reads page metadata and the table list from the first page of a SQLite database file.
pub mod sqlite;
