//! Generational slot arena.
//!
//! Entries live in a `Vec` of slots and are addressed by [`SlotId`], a pair of
//! slot index and generation. A slot's generation advances every time it is
//! vacated, so an id taken before a removal never resolves to whatever moves
//! into the slot afterwards. A slot whose generation would wrap is retired
//! instead of reused, so no id ever aliases a later occupant.
//!
//! Values never move while they are resident: the backing vector may grow, but
//! an id stays valid until its slot is explicitly removed.

extern crate alloc;

use alloc::vec::Vec;
use log::debug;

/// Stable address of a resident entry: slot index plus slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u32,
}

impl SlotId {
    /// Position of the slot in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }

    /// Generation of the slot at the time this id was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of values addressed by generational [`SlotId`]s.
#[derive(Debug)]
pub(crate) struct Slab<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Slab {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in a free slot, reusing vacated slots first.
    pub(crate) fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return SlotId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Vacates the slot behind `id`. Stale ids return `None` and leave the
    /// arena untouched.
    pub(crate) fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        Self::advance(slot, id.index, &mut self.free);
        self.len -= 1;
        Some(value)
    }

    fn advance(slot: &mut Slot<T>, index: usize, free: &mut Vec<usize>) {
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                free.push(index);
            }
            None => debug!("slab: retiring slot {} after generation wrap", index),
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Drops every value. Generations of occupied slots advance so that ids
    /// handed out before the clear stay stale.
    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                Self::advance(slot, index, &mut self.free);
            }
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut slab = Slab::with_capacity(4);
        let a = slab.insert("a");
        let b = slab.insert("b");

        assert_eq!(slab.len(), 2);
        assert_eq!(slab.get(a), Some(&"a"));
        assert_eq!(slab.get(b), Some(&"b"));

        assert_eq!(slab.remove(a), Some("a"));
        assert_eq!(slab.len(), 1);
        assert!(!slab.contains(a));
        assert_eq!(slab.remove(a), None);
    }

    #[test]
    fn test_reused_slot_rejects_stale_id() {
        let mut slab = Slab::with_capacity(1);
        let first = slab.insert(1);
        slab.remove(first);

        let second = slab.insert(2);
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        assert_eq!(slab.get(first), None);
        assert_eq!(slab.remove(first), None);
        assert_eq!(slab.get(second), Some(&2));
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut slab = Slab::with_capacity(2);
        let old = slab.insert(1);
        slab.slots[old.index()].generation = u32::MAX;
        let last = SlotId {
            index: old.index(),
            generation: u32::MAX,
        };
        assert_eq!(slab.remove(last), Some(1));

        let fresh = slab.insert(2);
        assert_ne!(fresh.index(), last.index());
        assert_eq!(slab.get(last), None);
        assert_eq!(slab.remove(last), None);
        assert_eq!(slab.get(fresh), Some(&2));
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn test_clear_retires_exhausted_slots() {
        let mut slab = Slab::with_capacity(2);
        let a = slab.insert('a');
        slab.slots[a.index()].generation = u32::MAX;
        slab.clear();

        let b = slab.insert('b');
        assert_ne!(b.index(), a.index());
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut slab = Slab::with_capacity(1);
        let id = slab.insert(10);
        *slab.get_mut(id).unwrap() += 5;
        assert_eq!(slab.get(id), Some(&15));
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let mut slab = Slab::with_capacity(2);
        let a = slab.insert('a');
        let b = slab.insert('b');
        slab.clear();

        assert_eq!(slab.len(), 0);
        assert!(!slab.contains(a));
        assert!(!slab.contains(b));

        let c = slab.insert('c');
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(slab.get(c), Some(&'c'));
    }
}
