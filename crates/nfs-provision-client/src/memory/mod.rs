//! In-memory backends.
//!
//! These behave like the real control plane and object store closely enough
//! to exercise provisioning end to end: commands are recorded, keys are
//! stable per entity, pools must exist before use, and failures can be
//! injected.

mod auth;
mod objects;

pub use auth::MemoryAuthBackend;
pub use objects::{MemoryIoCtx, MemoryObjectStore};

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `-ENOENT`
pub const ENOENT: i32 = -2;

/// `-EINVAL`
pub const EINVAL: i32 = -22;
