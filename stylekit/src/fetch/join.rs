//! Counting join over outstanding fetches.

/// Counts outstanding fetches and fires exactly once when the count
/// returns to zero.
///
/// Once [`try_fire`](Self::try_fire) has returned `true` it never does
/// again, no matter how completions interleave. Each session run gets a
/// fresh join.
#[derive(Debug, Default)]
pub struct FetchJoin {
    outstanding: usize,
    fired: bool,
}

impl FetchJoin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more outstanding fetch.
    pub fn add(&mut self) {
        self.outstanding += 1;
    }

    /// Records that one fetch settled. Returns true if none remain.
    pub fn done(&mut self) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.outstanding == 0
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding == 0
    }

    /// Fires if nothing is outstanding and the latch has not fired yet.
    pub fn try_fire(&mut self) -> bool {
        if self.is_settled() && !self.fired {
            self.fired = true;
            true
        } else {
            false
        }
    }
}
