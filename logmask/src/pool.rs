//! Small free-list pools for scratch buffers.
//!
//! Items are reset before they go back on the list and are returned when the
//! guard drops, on every path including unwinding.

use std::{
    ops::{Deref, DerefMut},
    sync::{Mutex, PoisonError},
};

/// Types that can be cleared for reuse without giving up their allocation.
pub(crate) trait Reset: Default {
    fn reset(&mut self);
}

impl<T> Reset for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// A bounded free list. Items beyond `capacity` are dropped instead of kept.
pub(crate) struct Pool<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T: Reset> Pool<T> {
    pub(crate) const fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub(crate) fn acquire(&self) -> Pooled<'_, T> {
        let item = self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    fn release(&self, mut item: T) {
        item.reset();
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.len() < self.capacity {
            items.push(item);
        }
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Scoped access to a pooled item.
pub(crate) struct Pooled<'a, T: Reset> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T: Reset> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `Drop` takes the item out.
        self.item.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Reset> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Reset> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
