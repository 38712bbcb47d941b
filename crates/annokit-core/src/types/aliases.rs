//! Shared-ownership aliases.
//!
//! Sessions are driven from async tasks, so everything here is `Send + Sync`
//! and built on `parking_lot` locks.

use parking_lot::Mutex;
use std::sync::Arc;

/// Mutex-protected state shared between a tool and its spawned tasks.
///
/// Never hold the guard across an `.await`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A finalizer or hook with no parameters, shareable between owners.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Wrap a value for sharing.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
