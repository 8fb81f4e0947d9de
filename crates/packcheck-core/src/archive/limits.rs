//! Bounded reader for entry content.

use std::io::Read;

/// A reader that limits the total number of bytes read and fails explicitly on overflow.
///
/// Declared entry sizes are attacker-controlled, so content is always read
/// through this wrapper rather than trusting the header.
pub(crate) struct LimitReader<R> {
    inner: R,
    limit: u64,
    read: u64,
}

impl<R: Read> LimitReader<R> {
    pub(crate) fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            read: 0,
        }
    }
}

impl<R: Read> Read for LimitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.read >= self.limit {
            // One probe byte tells "exactly at limit" apart from "over limit".
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(std::io::Error::other(format!(
                    "content exceeded limit of {} bytes",
                    self.limit
                ))),
            };
        }

        let max_to_read = (self.limit - self.read).min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.read += n as u64;

        Ok(n)
    }
}
