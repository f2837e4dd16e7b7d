//! Unbalanced binary search tree keyed by device name
//!
//! Nodes live in a single arena and refer to their children by index, so
//! each node has exactly one owner (the arena) and exactly one parent link.
//! Lookup, insertion, and traversal are all iterative: a tree that degenerates
//! into a chain under sorted insertion never grows the call stack.

use core::cmp::Ordering;

use tracing::debug;

/// A keyed node holding one payload value
#[derive(Clone, Debug)]
pub struct TreeNode<V> {
    key: String,
    sequence: u64,
    value: V,
    left: Option<usize>,
    right: Option<usize>,
}

impl<V> TreeNode<V> {
    /// The node's key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Creation order, starting at 1 (diagnostic only)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The payload
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The payload, mutably
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

/// Ordered map from string keys to lazily created payloads
///
/// The shape of the tree depends only on the order in which keys first
/// arrive; nothing is ever rebalanced, removed, or re-keyed.
///
/// # Example
///
/// ```
/// use snrstats::tree::KeyedTree;
///
/// let mut tree: KeyedTree<u32> = KeyedTree::new();
///
/// for key in ["b", "a", "c", "a"] {
///     *tree.find_or_insert(key).value_mut() += 1;
/// }
///
/// let keys: Vec<&str> = tree.iter().map(|node| node.key()).collect();
/// assert_eq!(keys, ["a", "b", "c"]);
/// assert_eq!(*tree.get("a").unwrap().value(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct KeyedTree<V> {
    nodes: Vec<TreeNode<V>>,
    root: Option<usize>,
}

impl<V> Default for KeyedTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a search for a key ended
enum Slot {
    Found(usize),
    Vacant(Link),
}

/// The empty link a new node would hang from
enum Link {
    Root,
    Left(usize),
    Right(usize),
}

impl<V> KeyedTree<V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no key has been inserted
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn search(&self, key: &str) -> Slot {
        let mut current = match self.root {
            Some(idx) => idx,
            None => return Slot::Vacant(Link::Root),
        };

        loop {
            let node = &self.nodes[current];
            match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Slot::Found(current),
                Ordering::Less => match node.left {
                    Some(idx) => current = idx,
                    None => return Slot::Vacant(Link::Left(current)),
                },
                Ordering::Greater => match node.right {
                    Some(idx) => current = idx,
                    None => return Slot::Vacant(Link::Right(current)),
                },
            }
        }
    }

    /// Look up a key without inserting
    pub fn get(&self, key: &str) -> Option<&TreeNode<V>> {
        match self.search(key) {
            Slot::Found(idx) => Some(&self.nodes[idx]),
            _ => None,
        }
    }

    /// Look up a key mutably without inserting
    pub fn get_mut(&mut self, key: &str) -> Option<&mut TreeNode<V>> {
        match self.search(key) {
            Slot::Found(idx) => Some(&mut self.nodes[idx]),
            _ => None,
        }
    }

    /// Height of the tree: 0 when empty, number of nodes on the longest
    /// root-to-leaf path otherwise
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[idx];
            if let Some(left) = node.left {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1));
            }
        }

        deepest
    }

    /// Visit every node in strictly increasing key order
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&TreeNode<V>),
    {
        for node in self.iter() {
            visit(node);
        }
    }

    /// Iterate over nodes in strictly increasing key order
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }
}

impl<V: Default> KeyedTree<V> {
    /// Return the node for `key`, creating it with a default payload if the
    /// key has not been seen before
    pub fn find_or_insert(&mut self, key: &str) -> &mut TreeNode<V> {
        let link = match self.search(key) {
            Slot::Found(idx) => return &mut self.nodes[idx],
            Slot::Vacant(link) => link,
        };

        let idx = self.nodes.len();
        let sequence = idx as u64 + 1;
        debug!(key, sequence, "creating device node");
        self.nodes.push(TreeNode {
            key: key.to_owned(),
            sequence,
            value: V::default(),
            left: None,
            right: None,
        });

        match link {
            Link::Root => self.root = Some(idx),
            Link::Left(parent) => self.nodes[parent].left = Some(idx),
            Link::Right(parent) => self.nodes[parent].right = Some(idx),
        }

        &mut self.nodes[idx]
    }
}

impl<V> IntoIterator for KeyedTree<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    /// Consume the tree, yielding `(key, value)` pairs in key order
    fn into_iter(self) -> IntoIter<V> {
        let root = self.root;
        let mut iter = IntoIter {
            slots: self.nodes.into_iter().map(Some).collect(),
            stack: Vec::new(),
        };
        iter.push_left_spine(root);
        iter
    }
}

impl<'a, V> IntoIterator for &'a KeyedTree<V> {
    type Item = &'a TreeNode<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

/// Borrowing in-order iterator over a [`KeyedTree`]
pub struct Iter<'a, V> {
    nodes: &'a [TreeNode<V>],
    stack: Vec<usize>,
}

impl<V> Iter<'_, V> {
    fn push_left_spine(&mut self, mut next: Option<usize>) {
        while let Some(idx) = next {
            self.stack.push(idx);
            next = self.nodes[idx].left;
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a TreeNode<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[idx];
        self.push_left_spine(node.right);
        Some(node)
    }
}

/// Consuming in-order iterator over a [`KeyedTree`]
pub struct IntoIter<V> {
    slots: Vec<Option<TreeNode<V>>>,
    stack: Vec<usize>,
}

impl<V> IntoIter<V> {
    fn push_left_spine(&mut self, mut next: Option<usize>) {
        while let Some(idx) = next {
            self.stack.push(idx);
            next = self.slots[idx].as_ref().and_then(|node| node.left);
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.slots[idx].take()?;
        self.push_left_spine(node.right);
        Some((node.key, node.value))
    }
}
