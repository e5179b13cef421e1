//! Allocation errors reported by the fallible (`try_*`) operations.

/// The slot array could not be (re)allocated. The table is left exactly
/// as it was before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    #[error("slot array capacity overflow")]
    CapacityOverflow,

    #[error("failed to allocate slot array of {capacity} slots")]
    AllocFailed { capacity: usize },
}
