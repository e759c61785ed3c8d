use std::cmp::Ordering;

use crate::game::Handle;

/// Records that can be found again by their entity handle.
pub trait Keyed {
    fn handle(&self) -> Handle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Emptied at the start of every rebuild.
    PerFrame,
    /// Kept until evicted, so per record history survives.
    AcrossFrames,
}

/// Ordered record list used by the snapshot for every entity kind.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    items: Vec<T>,
    retention: Retention,
}

impl<T> Tracked<T> {
    pub fn new(retention: Retention) -> Self {
        Self {
            items: Vec::new(),
            retention,
        }
    }

    pub fn per_frame() -> Self {
        Self::new(Retention::PerFrame)
    }

    pub fn across_frames() -> Self {
        Self::new(Retention::AcrossFrames)
    }

    pub fn begin_frame(&mut self) {
        if self.retention == Retention::PerFrame {
            self.items.clear();
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drops every record for which `evict` returns true, returns how many went.
    pub fn evict(&mut self, mut evict: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !evict(item));
        before - self.items.len()
    }

    pub fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.items.iter_mut().for_each(f);
    }

    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.items.sort_by(compare);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Keyed> Tracked<T> {
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.items.iter().find(|item| item.handle() == handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.handle() == handle)
    }

    /// Updates the record for `handle` in place, or appends the one `create` builds.
    pub fn upsert(
        &mut self,
        handle: Handle,
        update: impl FnOnce(&mut T),
        create: impl FnOnce() -> T,
    ) -> &mut T {
        match self.items.iter().position(|item| item.handle() == handle) {
            Some(index) => {
                let item = &mut self.items[index];
                update(&mut *item);
                item
            }
            None => {
                self.items.push(create());
                let last = self.items.len() - 1;
                &mut self.items[last]
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a Tracked<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
