// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::iter;

/// Handle to a node slot inside an [`Arena`].
pub(crate) type NodeId = usize;

/// The sentinel always lives in the first slot.
pub(crate) const HEAD: NodeId = 0;

/// One slot of the list.
///
/// `next[lane]` is the following node in that lane and `span[lane]` is how
/// many lane-0 positions that link covers. Both vectors are sized to the
/// number of lanes the node was promoted into. `prev` is the lane-0
/// predecessor; the sentinel's `prev` is the last element.
///
/// `element` is only ever `None` for the sentinel and for freed slots.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) element: Option<T>,
    pub(crate) prev: NodeId,
    pub(crate) next: Vec<NodeId>,
    pub(crate) span: Vec<usize>,
}

impl<T> Node<T> {
    /// A sentinel whose lanes all loop back onto itself.
    fn head(levels: usize) -> Self {
        Node {
            element: None,
            prev: HEAD,
            next: iter::repeat(HEAD).take(levels).collect(),
            span: iter::repeat(1).take(levels).collect(),
        }
    }

    fn new(element: T, levels: usize) -> Self {
        Node {
            element: Some(element),
            prev: HEAD,
            next: iter::repeat(HEAD).take(levels).collect(),
            span: iter::repeat(1).take(levels).collect(),
        }
    }

    /// The number of lanes this node occupies.
    #[inline]
    pub(crate) fn level(&self) -> usize {
        self.next.len()
    }
}

/// Owner of every node of a list. Links between nodes are plain slot indices,
/// and removed slots are recycled through a free list.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) fn new(levels: usize) -> Self {
        Arena {
            nodes: vec![Node::head(levels)],
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(levels: usize, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node::head(levels));
        Arena {
            nodes,
            free: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id]
    }

    /// The element held by `id`. Callers never pass the sentinel or a freed
    /// slot, so a missing element is an internal bug.
    #[inline]
    pub(crate) fn element(&self, id: NodeId) -> &T {
        match self.nodes[id].element {
            | Some(ref element) => element,
            | None => unreachable!("node {} holds no element", id),
        }
    }

    pub(crate) fn alloc(&mut self, element: T, levels: usize) -> NodeId {
        let node = Node::new(element, levels);
        match self.free.pop() {
            | Some(id) => {
                self.nodes[id] = node;
                id
            },
            | None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            },
        }
    }

    /// Release a slot, handing back its element. The slot must already be
    /// unlinked from every lane.
    pub(crate) fn release(&mut self, id: NodeId) -> T {
        let node = &mut self.nodes[id];
        node.next = Vec::new();
        node.span = Vec::new();
        self.free.push(id);
        match node.element.take() {
            | Some(element) => element,
            | None => unreachable!("node {} released twice", id),
        }
    }

    /// Move the element out of a live slot without unlinking it. Only used
    /// when the whole arena is being consumed.
    pub(crate) fn take(&mut self, id: NodeId) -> Option<T> {
        self.nodes[id].element.take()
    }

    /// Drop every element and put the sentinel back into its empty state.
    pub(crate) fn reset(&mut self, levels: usize) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Node::head(levels));
    }

    /// Slots in use, sentinel included.
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_is_circular() {
        let arena: Arena<u32> = Arena::new(4);
        let head = arena.get(HEAD);
        assert!(head.element.is_none());
        assert_eq!(head.prev, HEAD);
        assert_eq!(head.level(), 4);
        assert!(head.next.iter().all(|&n| n == HEAD));
        assert!(head.span.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_alloc_sizes_to_level() {
        let mut arena = Arena::new(4);
        let id = arena.alloc("a", 3);
        assert_ne!(id, HEAD);
        assert_eq!(arena.get(id).level(), 3);
        assert_eq!(arena.element(id), &"a");
    }

    #[test]
    fn test_release_recycles_slots() {
        let mut arena = Arena::new(4);
        let a = arena.alloc(1, 1);
        let _b = arena.alloc(2, 2);
        assert_eq!(arena.live(), 3);

        assert_eq!(arena.release(a), 1);
        assert_eq!(arena.live(), 2);

        let c = arena.alloc(3, 2);
        assert_eq!(c, a);
        assert_eq!(arena.element(c), &3);
        assert_eq!(arena.live(), 3);
    }

    #[test]
    fn test_reset() {
        let mut arena = Arena::with_capacity(4, 8);
        arena.alloc(1, 1);
        arena.alloc(2, 1);
        arena.reset(4);
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.get(HEAD).level(), 4);
    }
}
