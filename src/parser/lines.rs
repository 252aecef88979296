use crate::config::LineEnding;

/// Re-joins arbitrarily cut byte chunks into whole lines.
///
/// Chunk boundaries may fall anywhere, including inside the terminator or a
/// multi-byte character. Lines are decoded only once complete, so neither
/// case loses data.
#[derive(Debug)]
pub struct LineSplitter {
    terminator: &'static [u8],
    pending: Vec<u8>,
    // Bytes of `pending` already searched without finding a terminator.
    scanned: usize,
}

impl LineSplitter {
    pub fn new(ending: LineEnding) -> Self {
        Self {
            terminator: ending.as_bytes(),
            pending: Vec::new(),
            scanned: 0,
        }
    }

    /// Feed the next chunk; returns every line it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(pos) = find(&self.pending[from..], self.terminator) {
            let end = from + pos;
            lines.push(decode(&self.pending[start..end]));
            start = end + self.terminator.len();
            from = start;
        }

        self.pending.drain(..start);
        // A terminator may straddle this chunk and the next one.
        self.scanned = self
            .pending
            .len()
            .saturating_sub(self.terminator.len() - 1);
        lines
    }

    /// The unterminated tail, if any. A stream ending on a terminator has
    /// no tail.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(decode(&self.pending))
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ── Tests ──
