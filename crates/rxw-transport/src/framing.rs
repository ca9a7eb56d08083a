//! Line framing over a fragmented byte stream
//!
//! Serial reads deliver whatever the UART had, so a logical line can
//! arrive split across several reads, or several lines can arrive in
//! one. [`LineFramer`] accumulates raw bytes and hands back complete
//! frames, keeping any remainder for the next read.

/// Upper bound on buffered bytes while hunting for a terminator
const MAX_PENDING: usize = 4096;

/// Accumulates raw bytes and extracts terminator-delimited frames
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer {
            pending: Vec::with_capacity(128),
        }
    }

    /// Append bytes from a read
    ///
    /// A stream with no terminator in sight keeps only the newest
    /// `MAX_PENDING` bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_PENDING {
            let excess = self.pending.len() - MAX_PENDING;
            self.pending.drain(..excess);
        }
    }

    /// Remove and return the first complete line, without its terminator
    ///
    /// Returns `None` until a full terminator sequence has been buffered.
    /// An empty terminator never matches.
    pub fn take_line(&mut self, terminator: &[u8]) -> Option<Vec<u8>> {
        if terminator.is_empty() {
            return None;
        }
        let end = self
            .pending
            .windows(terminator.len())
            .position(|window| window == terminator)?;
        let mut line: Vec<u8> = self.pending.drain(..end + terminator.len()).collect();
        line.truncate(end);
        Some(line)
    }

    /// Remove and return the first `n` buffered bytes
    ///
    /// Callers check [`pending_len`](Self::pending_len) first; draining
    /// more than is buffered panics.
    pub fn take_exact(&mut self, n: usize) -> Vec<u8> {
        self.pending.drain(..n).collect()
    }

    /// Number of buffered bytes
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard everything buffered
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
