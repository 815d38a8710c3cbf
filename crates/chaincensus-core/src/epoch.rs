//! Slot → epoch arithmetic for time-bucketed aggregation.
//!
//! Epochs before Shelley had a different slot length; every slot we ever
//! process is post-Shelley, so the linear formula below is exact.

/// First epoch of the Shelley era.
pub const FIRST_SHELLEY_EPOCH: u64 = 208;

/// First absolute slot of the Shelley era.
pub const FIRST_SHELLEY_SLOT: u64 = 4_492_800;

/// Slots per epoch since Shelley.
pub const EPOCH_LENGTH: u64 = 432_000;

/// The epoch a slot falls in.
pub fn epoch_of_slot(slot: u64) -> u64 {
    FIRST_SHELLEY_EPOCH + slot.saturating_sub(FIRST_SHELLEY_SLOT) / EPOCH_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelley_boundary() {
        assert_eq!(epoch_of_slot(FIRST_SHELLEY_SLOT), 208);
        assert_eq!(epoch_of_slot(FIRST_SHELLEY_SLOT + EPOCH_LENGTH - 1), 208);
        assert_eq!(epoch_of_slot(FIRST_SHELLEY_SLOT + EPOCH_LENGTH), 209);
    }

    #[test]
    fn aiken_alpha_launch_epoch() {
        // Mainnet starting point of the census.
        assert_eq!(epoch_of_slot(89_856_876), 405);
    }
}
