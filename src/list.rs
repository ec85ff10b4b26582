//! Doubly linked FIFO list threaded through a [`Slab`].
//!
//! The list owns no nodes. Each node lives in the arena and carries its own
//! [`Links`]; the list only records head, tail and length. Moving a node from
//! one list to another is therefore an unlink followed by a push, with no
//! allocation and no relocation of the node's value.
//!
//! Nodes are appended at the tail and consumed from the head, so the head is
//! always the node that has been in the list the longest.

use crate::slab::{Slab, SlotId};

/// Neighbour links stored inside every node that can join a [`List`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl Links {
    #[inline]
    pub(crate) fn is_detached(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

/// Access to the intrusive links of a node.
pub(crate) trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Head/tail bookkeeping for one intrusive list.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct List {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl List {
    pub(crate) fn new() -> Self {
        List::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The oldest node in the list.
    #[inline]
    pub(crate) fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Appends `id` at the tail. Returns `false` if `id` does not resolve in
    /// `slab`; the list is unchanged in that case.
    pub(crate) fn push_back<T: Linked>(&mut self, slab: &mut Slab<T>, id: SlotId) -> bool {
        let old_tail = self.tail;
        match slab.get_mut(id) {
            Some(node) => {
                debug_assert!(node.links().is_detached(), "node already linked");
                *node.links_mut() = Links {
                    prev: old_tail,
                    next: None,
                };
            }
            None => return false,
        }

        match old_tail.and_then(|tail| slab.get_mut(tail)) {
            Some(tail) => tail.links_mut().next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        true
    }

    /// Detaches `id` from this list.
    ///
    /// The caller guarantees that `id` is currently a member of this list;
    /// linking state of other lists is never consulted.
    pub(crate) fn unlink<T: Linked>(&mut self, slab: &mut Slab<T>, id: SlotId) -> bool {
        let links = match slab.get_mut(id) {
            Some(node) => core::mem::take(node.links_mut()),
            None => return false,
        };

        match links.prev.and_then(|prev| slab.get_mut(prev)) {
            Some(prev) => prev.links_mut().next = links.next,
            None => self.head = links.next,
        }
        match links.next.and_then(|next| slab.get_mut(next)) {
            Some(next) => next.links_mut().prev = links.prev,
            None => self.tail = links.prev,
        }
        self.len -= 1;
        true
    }

    /// Detaches and returns the oldest node.
    #[cfg(test)]
    pub(crate) fn pop_front<T: Linked>(&mut self, slab: &mut Slab<T>) -> Option<SlotId> {
        let head = self.head?;
        self.unlink(slab, head).then_some(head)
    }

    /// Iterates nodes from head (oldest) to tail (newest).
    pub(crate) fn iter<'a, T: Linked>(&self, slab: &'a Slab<T>) -> Iter<'a, T> {
        Iter {
            slab,
            cursor: self.head,
            remaining: self.len,
        }
    }
}

/// Head-to-tail iterator over a [`List`].
#[derive(Debug)]
pub(crate) struct Iter<'a, T> {
    slab: &'a Slab<T>,
    cursor: Option<SlotId>,
    remaining: usize,
}

impl<'a, T: Linked> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cursor?;
        let node = self.slab.get(id)?;
        self.cursor = node.links().next;
        self.remaining -= 1;
        Some((id, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
