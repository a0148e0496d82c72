//! Derivation of the per-transaction gas budget from the block gas limit

use crate::errors::SeedError;

/// Compute the gas limit attached to every seeding transaction.
///
/// The budget is `max(floor, capacity - margin)`: the margin keeps each
/// transaction clear of the block gas limit, and the floor keeps the budget
/// usable on dev nodes that report a small limit. A floor above the capacity
/// cannot be honored without exceeding the block gas limit, so it is rejected.
pub fn gas_budget(capacity: u64, floor: u64, margin: u64) -> Result<u64, SeedError> {
    if floor > capacity {
        return Err(SeedError::CapacityTooLow { capacity, floor });
    }

    Ok(floor.max(capacity.saturating_sub(margin)))
}
