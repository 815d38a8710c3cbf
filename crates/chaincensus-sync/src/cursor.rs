//! Stream position tracking.

/// Where the block stream currently is, relative to its configured window.
#[derive(Debug, Clone)]
pub struct ChainCursor {
    since_slot: u64,
    boundary_slot: u64,
    current_slot: u64,
}

impl ChainCursor {
    pub fn new(since_slot: u64, boundary_slot: u64) -> Self {
        Self { since_slot, boundary_slot, current_slot: since_slot }
    }

    /// Move the cursor to a forward block's slot.
    pub fn advance(&mut self, slot: u64) {
        self.current_slot = slot;
    }

    /// Has the stream reached or passed the stop slot?
    pub fn reached_boundary(&self) -> bool {
        self.current_slot >= self.boundary_slot
    }

    pub fn since_slot(&self) -> u64 {
        self.since_slot
    }

    pub fn boundary_slot(&self) -> u64 {
        self.boundary_slot
    }

    pub fn current_slot(&self) -> u64 {
        self.current_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        let mut cursor = ChainCursor::new(100, 200);
        assert!(!cursor.reached_boundary());
        cursor.advance(199);
        assert!(!cursor.reached_boundary());
        cursor.advance(200);
        assert!(cursor.reached_boundary());
    }
}
