//! The circulating token.

/// Exclusive right to enter the critical section.
///
/// Not `Clone` and only constructible inside this crate: whoever owns the
/// value holds the token, and moving it through a hand-off channel is the
/// transfer.
#[derive(Debug)]
pub struct Token {
    hand_offs: usize,
}

impl Token {
    pub(crate) fn mint() -> Self {
        Self { hand_offs: 0 }
    }

    /// Record one hand-off to the next holder.
    pub(crate) fn pass(mut self) -> Self {
        self.hand_offs += 1;
        self
    }

    /// Number of hand-offs since the token was minted.
    pub fn hand_offs(&self) -> usize {
        self.hand_offs
    }
}
