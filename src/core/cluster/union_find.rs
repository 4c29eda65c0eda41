//! Disjoint-set forest over arbitrary hashable elements.

use std::collections::HashMap;
use std::hash::Hash;

/// Union-Find with path compression and union by rank.
///
/// Elements are registered lazily the first time they are seen by
/// [`find`](UnionFind::find) or [`union`](UnionFind::union).
#[derive(Debug, Clone)]
pub struct UnionFind<T> {
    index: HashMap<T, usize>,
    elements: Vec<T>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl<T: Eq + Hash + Clone> UnionFind<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            elements: Vec::new(),
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }

    /// Number of registered elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn register(&mut self, element: &T) -> usize {
        if let Some(&idx) = self.index.get(element) {
            return idx;
        }
        let idx = self.elements.len();
        self.index.insert(element.clone(), idx);
        self.elements.push(element.clone());
        self.parent.push(idx);
        self.rank.push(0);
        idx
    }

    fn root(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = idx;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Representative of `element`'s class, registering it if new
    pub fn find(&mut self, element: &T) -> T {
        let idx = self.register(element);
        let root = self.root(idx);
        self.elements[root].clone()
    }

    /// Merge the classes of `a` and `b`
    pub fn union(&mut self, a: &T, b: &T) {
        let ia = self.register(a);
        let ib = self.register(b);
        let ra = self.root(ia);
        let rb = self.root(ib);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    pub fn connected(&mut self, a: &T, b: &T) -> bool {
        let ia = self.register(a);
        let ib = self.register(b);
        self.root(ia) == self.root(ib)
    }

    /// Classes with at least two members.
    ///
    /// Classes are ordered by their earliest-registered member; members
    /// keep registration order.
    pub fn groups(&mut self) -> Vec<Vec<T>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut classes: Vec<Vec<T>> = Vec::new();

        for idx in 0..self.elements.len() {
            let root = self.root(idx);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                classes.push(Vec::new());
                classes.len() - 1
            });
            classes[slot].push(self.elements[idx].clone());
        }

        classes.retain(|class| class.len() >= 2);
        classes
    }
}

impl<T: Eq + Hash + Clone> Default for UnionFind<T> {
    fn default() -> Self {
        Self::new()
    }
}
