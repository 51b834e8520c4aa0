//! Decoders for the on-disk structures of page 1
pub mod btree;
pub mod cell;
pub mod header;
pub mod record;
pub mod varint;
