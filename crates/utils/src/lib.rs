#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod id;
pub mod logger;

// TEAM_211: Re-export spin crate types as our lock API
// Note: spin::Mutex is re-exported as Mutex for API compatibility
pub use spin::Once;
pub use spin::{Mutex, MutexGuard};

// TEAM_212: Re-export hashbrown collections
pub use hashbrown::HashMap;

pub use id::IdAllocator;

// ============================================================================
// Unit Tests
// ============================================================================
