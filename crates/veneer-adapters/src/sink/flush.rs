//! Flush-after-write sink decorator.

use std::io::{self, Write};

/// Wraps a writer so every successful write is immediately flushed through.
///
/// Useful in front of streaming transports where rendered output should
/// reach the client as it is produced rather than on buffer boundaries.
#[derive(Debug)]
pub struct FlushWriter<W: Write> {
    inner: W,
}

impl<W: Write> FlushWriter<W> {
    /// Wrap `inner` so every write flushes.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap back into the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for FlushWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.inner.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that counts flush calls.
    #[derive(Default)]
    struct CountingWriter {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn every_write_flushes() {
        let mut writer = FlushWriter::new(CountingWriter::default());
        writer.write_all(b"a").unwrap();
        writer.write_all(b"b").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, b"ab");
        assert_eq!(inner.flushes, 2);
    }
}
