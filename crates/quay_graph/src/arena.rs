//! Append-only slot storage for projects and targets.
//!
//! Slots are never freed or reordered: an ID returned by [`Arena::alloc`]
//! names the same entry until the arena is dropped.

use std::marker::PhantomData;
use std::ops::Index;

/// An ID newtype backed by a slot number.
pub trait ArenaId: Copy {
    /// Builds the ID naming `slot`.
    fn from_slot(slot: u32) -> Self;

    /// The slot this ID names.
    fn slot(self) -> u32;
}

/// Entries of type `T` addressed by IDs of type `I`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Stores `entry` in the next free slot.
    pub fn alloc(&mut self, entry: T) -> I {
        self.slots.push(entry);
        I::from_slot((self.slots.len() - 1) as u32)
    }

    /// Looks `id` up; `None` for an ID minted by a larger arena.
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.slot() as usize)
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.slot() as usize)
    }

    /// Occupied slot count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` before the first allocation.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every allocated ID, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.slots.len()).map(|slot| I::from_slot(slot as u32))
    }

    /// Every `(ID, entry)` pair, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.ids().zip(self.slots.iter())
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    // Panics on an ID from another, larger arena.
    fn index(&self, id: I) -> &T {
        &self.slots[id.slot() as usize]
    }
}
