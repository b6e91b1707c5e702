//! Peekable wrapper over a forward-only byte stream.

use std::io::{self, Read};

/// Maximum lookahead, sized for a 4-byte magic number.
pub const PEEK_WINDOW: usize = 4;

/// Wraps a forward-only byte source with a bounded lookahead window.
///
/// Two read surfaces share one lookahead buffer and one logical position:
/// the normal surface (the [`Read`] impl) drains any buffered lookahead
/// before touching the underlying source and advances the logical position;
/// [`PeekStream::peek`] fills the window from the source on demand and
/// copies out of it without advancing. Bytes observed through `peek` are
/// returned by the next normal reads, in the same order, exactly once.
pub struct PeekStream<R> {
    inner: R,
    lookahead: [u8; PEEK_WINDOW],
    buffered: usize,
    position: u64,
}

impl<R: Read> PeekStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: [0; PEEK_WINDOW],
            buffered: 0,
            position: 0,
        }
    }

    /// Bytes consumed so far through the normal surface.
    ///
    /// Peeked-but-unconsumed bytes do not count.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads `buf.len()` bytes (at most [`PEEK_WINDOW`]) without advancing
    /// the logical position.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the source ends
    /// before the window can be filled.
    pub fn peek(&mut self, buf: &mut [u8]) -> io::Result<()> {
        assert!(buf.len() <= PEEK_WINDOW, "peek beyond lookahead window");

        while self.buffered < buf.len() {
            let n = self.inner.read(&mut self.lookahead[self.buffered..buf.len()])?;
            if n == 0 {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            self.buffered += n;
        }
        buf.copy_from_slice(&self.lookahead[..buf.len()]);
        Ok(())
    }
}

impl<R: Read> Read for PeekStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Buffered lookahead is served first, front to back.
        if self.buffered > 0 {
            let n = self.buffered.min(buf.len());
            buf[..n].copy_from_slice(&self.lookahead[..n]);
            self.lookahead.copy_within(n..self.buffered, 0);
            self.buffered -= n;
            self.position += n as u64;
            return Ok(n);
        }

        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
