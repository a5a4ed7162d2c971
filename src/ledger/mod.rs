//! Profile ledger module
//!
//! Authoritative player state and the atomic operations that mutate it.

pub mod manager;
pub mod types;

pub use manager::LedgerManager;
pub use types::{
    DriveResult, EquipmentOwnership, PlayerProfile, ProfileDelta, ProfileView,
};
