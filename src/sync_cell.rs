// Single-slot cell shared between producer threads and the render thread
//
// Producers replace the value wholesale; the render thread reads a clone.
// The lock is never held outside `get`/`set`, so no caller can stall
// another beyond one read or write.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u64,
}

/// Mutex-guarded single value with a write counter
#[derive(Debug)]
pub struct SyncCell<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> SyncCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                generation: 0,
            }),
        }
    }

    /// Read the current value (None until the first `set`)
    pub fn get(&self) -> Option<T> {
        self.lock().value.clone()
    }

    /// Read the value together with the generation it was written at
    pub fn snapshot(&self) -> (Option<T>, u64) {
        let slot = self.lock();
        (slot.value.clone(), slot.generation)
    }

    /// Replace the value and bump the generation
    pub fn set(&self, value: T) {
        let mut slot = self.lock();
        slot.value = Some(value);
        slot.generation += 1;
    }

    /// Number of writes so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    // A panicking writer cannot leave a half-written Option behind, so a
    // poisoned lock still guards a consistent value.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for SyncCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_until_set() {
        let cell: SyncCell<String> = SyncCell::new();
        assert_eq!(cell.get(), None);
        assert_eq!(cell.generation(), 0);

        cell.set("hello".to_string());
        assert_eq!(cell.get().as_deref(), Some("hello"));
        assert_eq!(cell.generation(), 1);
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cell = SyncCell::new();
        cell.set(vec![1, 2, 3]);
        cell.set(vec![9]);

        let (value, generation) = cell.snapshot();
        assert_eq!(value, Some(vec![9]));
        assert_eq!(generation, 2);
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let cell = Arc::new(SyncCell::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..500 {
                        cell.set(vec![w; 16]);
                    }
                })
            })
            .collect();

        for _ in 0..500 {
            if let Some(v) = cell.get() {
                assert_eq!(v.len(), 16);
                assert!(v.iter().all(|x| *x == v[0]));
            }
        }

        for w in writers {
            w.join().unwrap();
        }
        assert_eq!(cell.generation(), 2000);
    }
}
