use super::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Random-access, read-only view of a database image
///
/// Implemented for anything that can seek and read, so both `std::fs::File`
/// and an in-memory `std::io::Cursor` work as a source.
pub trait ByteSource {
    /// Fills `buf` completely with the bytes starting at `offset`
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Reads `len` bytes starting at `offset` into a fresh buffer
    fn read_vec_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }
}

impl<T: Read + Seek> ByteSource for T {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        self.seek(SeekFrom::Start(offset))
            .and_then(|_| self.read_exact(buf))
            .map_err(|source| Error::Io {
                offset,
                len,
                source,
            })
    }
}
