use std::collections::BTreeMap;

use crate::engine::{BodyHandle, JointHandle};
use crate::error::TennisError;
use crate::Result;

/// Handle types the sandbox hands out
pub trait Handle: Copy + Ord + std::fmt::Debug {
    /// Builds a handle from its raw id
    fn from_raw(id: u32) -> Self;
}

impl Handle for BodyHandle {
    fn from_raw(id: u32) -> Self {
        BodyHandle(id)
    }
}

impl Handle for JointHandle {
    fn from_raw(id: u32) -> Self {
        JointHandle(id)
    }
}

/// Handle-keyed storage, iterated in creation order
#[derive(Debug, Clone)]
pub struct Storage<H, T> {
    items: BTreeMap<H, T>,
    next_id: u32,
}

impl<H: Handle, T> Default for Storage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> Storage<H, T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1, // Start at 1, so 0 is never a live handle
        }
    }

    /// Adds an item and returns its handle
    pub fn add(&mut self, item: T) -> H {
        let handle = H::from_raw(self.next_id);
        self.next_id += 1;
        self.items.insert(handle, item);
        handle
    }

    pub fn get(&self, handle: H) -> Result<&T> {
        self.items
            .get(&handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", handle)))
    }

    pub fn get_mut(&mut self, handle: H) -> Result<&mut T> {
        self.items
            .get_mut(&handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", handle)))
    }

    pub fn remove(&mut self, handle: H) -> Result<T> {
        self.items
            .remove(&handle)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("{:?} not found", handle)))
    }

    pub fn contains(&self, handle: H) -> bool {
        self.items.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn handles(&self) -> Vec<H> {
        self.items.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.items.iter().map(|(handle, item)| (*handle, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.items.iter_mut().map(|(handle, item)| (*handle, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_never_reused() {
        let mut storage: Storage<BodyHandle, &str> = Storage::new();
        let first = storage.add("a");
        storage.remove(first).unwrap();
        let second = storage.add("b");
        assert_ne!(first, second);
        assert_eq!(first, BodyHandle(1));
    }

    #[test]
    fn missing_handle_is_not_found() {
        let storage: Storage<JointHandle, u8> = Storage::new();
        assert!(matches!(storage.get(JointHandle(7)), Err(TennisError::ResourceNotFound(_))));
    }
}
