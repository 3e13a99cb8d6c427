/*!
 * Batch accumulation of dialogue lines.
 *
 * `BatchAccumulator` is the only mutable state of a document translation:
 * the dialogue lines seen since the last flush. It decides when a batch is
 * full; the pipeline decides what a structural line means.
 */

/// Why a batch left the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// A timing line or blank line ended the run of dialogue
    Marker,
    /// The batch reached the configured size
    BatchFull,
    /// The document ended with dialogue still pending
    EndOfDocument,
}

impl std::fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Marker => "marker",
            Self::BatchFull => "batch full",
            Self::EndOfDocument => "end of document",
        };
        write!(f, "{}", name)
    }
}

/// Bounded buffer of dialogue lines awaiting a single translation call
#[derive(Debug)]
pub struct BatchAccumulator {
    /// Lines appended since the last flush
    pending: Vec<String>,

    /// Size at which the batch flushes itself
    capacity: usize,
}

impl BatchAccumulator {
    /// Create an empty accumulator; a capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a dialogue line.
    ///
    /// Returns the whole batch when this line made it reach capacity, leaving
    /// the accumulator empty. Otherwise returns `None`.
    pub fn append_or_flush(&mut self, text: String) -> Option<Vec<String>> {
        self.pending.push(text);
        if self.pending.len() >= self.capacity {
            self.take()
        } else {
            None
        }
    }

    /// Remove and return the pending lines, or `None` when there are none
    pub fn take(&mut self) -> Option<Vec<String>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::replace(&mut self.pending, Vec::with_capacity(self.capacity)))
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
