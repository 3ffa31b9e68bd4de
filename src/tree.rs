#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Independent recursive checker for the red-black shape: black root,
    /// no red node with a red child, equal black count on every path to a
    /// sentinel, and parent links that invert the child links.
    fn assert_invariants(tree: &RbTree) {
        if let Some(root) = tree.root() {
            assert_eq!(tree.color(root), Color::Black, "root must be black");
            assert_eq!(tree.parent(root), None, "root has no parent");
            black_height(tree, root);
        }
        let keys: Vec<i64> = tree.iter().collect();
        assert!(
            keys.windows(2).all(|pair| pair[0] <= pair[1]),
            "in-order keys must be non-decreasing: {:?}",
            keys
        );
        assert_eq!(keys.len(), tree.len());
    }

    fn black_height(tree: &RbTree, node: NodeId) -> usize {
        let mut heights = [0usize; 2];
        let children = [tree.left(node), tree.right(node)];
        for (height, child) in heights.iter_mut().zip(children) {
            if let Some(child) = child {
                assert_eq!(
                    tree.parent(child),
                    Some(node),
                    "child's parent link must point back"
                );
                if tree.color(node) == Color::Red {
                    assert_eq!(
                        tree.color(child),
                        Color::Black,
                        "red node with a red child"
                    );
                }
                *height = black_height(tree, child)
                    + usize::from(tree.color(child) == Color::Black);
            }
        }
        assert_eq!(heights[0], heights[1], "black-height mismatch");
        heights[0]
    }

    #[test]
    fn test_insert_and_find() {
        let mut rng = rand::thread_rng();
        let sample_vec: Vec<i64> = (0..64).map(|_| rng.gen_range(-1000..1000)).collect();

        let mut tree = RbTree::new();
        for &key in &sample_vec {
            tree.insert(key);
        }

        for &key in &sample_vec {
            let node = tree.find(key).unwrap_or_else(|| panic!("did not find key: {}", key));
            assert_eq!(tree.key(node), Some(key));
        }
    }

    #[test]
    fn test_find_absent_key() {
        let mut tree = RbTree::new();
        for key in [4, 8, 15, 16, 23, 42] {
            tree.insert(key);
        }
        assert_eq!(tree.find(7), None);
        assert_eq!(tree.find(-1), None);
    }

    #[test]
    fn test_tree_order() {
        let mut rng = rand::thread_rng();
        let mut sample_vec: Vec<i64> = (0..100).map(|_| rng.gen_range(-500..500)).collect();

        let mut tree = RbTree::new();
        for &key in &sample_vec {
            tree.insert(key);
        }

        sample_vec.sort_unstable();
        let tree_vec: Vec<i64> = tree.iter().collect();
        assert_eq!(sample_vec, tree_vec);
    }

    #[test]
    fn test_to_array_round_trip() {
        let mut tree = RbTree::new();
        for key in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            tree.insert(key);
        }
        assert_eq!(
            tree.to_array(10).unwrap(),
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]
        );
    }

    #[test]
    fn test_to_array_capacity_mismatch() {
        let mut tree = RbTree::new();
        tree.insert(1);
        tree.insert(2);
        assert_eq!(
            tree.to_array(3),
            Err(TreeError::CapacityMismatch { capacity: 3, len: 2 })
        );
        assert_eq!(
            tree.to_array(1),
            Err(TreeError::CapacityMismatch { capacity: 1, len: 2 })
        );
    }

    #[test]
    fn test_tree_color_arrangement() {
        let mut tree = RbTree::new();
        assert!(tree.root().is_none());

        tree.insert(2);
        let root = tree.root().unwrap();
        assert_eq!(tree.color(root), Color::Black);

        tree.insert(1);
        let root = tree.root().unwrap();
        assert_eq!(tree.color(root), Color::Black);
        assert_eq!(tree.color(tree.left(root).unwrap()), Color::Red);

        tree.insert(3);
        let root = tree.root().unwrap();
        assert_eq!(tree.color(tree.left(root).unwrap()), Color::Red);
        assert_eq!(tree.color(tree.right(root).unwrap()), Color::Red);

        // Red uncle: recolor, not rotate.
        tree.insert(4);
        let root = tree.root().unwrap();
        assert_eq!(tree.key(root), Some(2));
        assert_eq!(tree.color(tree.left(root).unwrap()), Color::Black);
        assert_eq!(tree.color(tree.right(root).unwrap()), Color::Black);

        // Aligned case: rotation pulls 4 up over 3.
        tree.insert(5);
        let root = tree.root().unwrap();
        let four = tree.right(root).unwrap();
        assert_eq!(tree.key(four), Some(4));
        assert_eq!(tree.color(four), Color::Black);
        assert_eq!(tree.key(tree.left(four).unwrap()), Some(3));
        assert_eq!(tree.color(tree.left(four).unwrap()), Color::Red);
        assert_eq!(tree.key(tree.right(four).unwrap()), Some(5));
        assert_eq!(tree.color(tree.right(four).unwrap()), Color::Red);

        assert_invariants(&tree);
    }

    #[test]
    fn test_duplicate_keys_go_right() {
        let mut tree = RbTree::new();
        let first = tree.insert(5);
        let second = tree.insert(5);
        assert_ne!(first, second);
        assert_eq!(tree.len(), 2);
        // The duplicate lands in the right subtree of the original.
        assert_eq!(tree.right(first), Some(second));
        assert_eq!(tree.to_array(2).unwrap(), vec![5, 5]);
    }

    #[test]
    fn test_min_max() {
        let mut tree = RbTree::new();
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);

        for key in [5, 3, 8, 1, 4, 7, 9, 2, 6, 0] {
            tree.insert(key);
        }
        assert_eq!(tree.key(tree.min().unwrap()), Some(0));
        assert_eq!(tree.key(tree.max().unwrap()), Some(9));
    }

    #[test]
    fn test_erase_even_keys() {
        let mut tree = RbTree::new();
        for key in 0..20 {
            tree.insert(key);
        }
        for key in (0..20).step_by(2) {
            let node = tree.find(key).unwrap();
            tree.erase(node).unwrap();
            assert_invariants(&tree);
        }
        let odds: Vec<i64> = (1..20).step_by(2).collect();
        assert_eq!(tree.to_array(10).unwrap(), odds);
        for key in (0..20).step_by(2) {
            assert_eq!(tree.find(key), None);
        }
    }

    #[test]
    fn test_single_node_lifecycle() {
        let mut tree = RbTree::new();
        let node = tree.insert(42);
        tree.erase(node).unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.find(42), None);
        assert_eq!(tree.to_array(0).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_erase_stale_handle() {
        let mut tree = RbTree::new();
        let node = tree.insert(1);
        tree.insert(2);
        tree.erase(node).unwrap();
        assert_eq!(tree.erase(node), Err(TreeError::ForeignNode));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_erase_root_with_two_children() {
        let mut tree = RbTree::new();
        for key in [2, 1, 3] {
            tree.insert(key);
        }
        let root = tree.root().unwrap();
        tree.erase(root).unwrap();
        assert_invariants(&tree);
        assert_eq!(tree.to_array(2).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_erase_deep_successor() {
        // Successor of the erased node is more than one level down and has
        // no right child, so the fix-up walk starts at a sentinel vacancy.
        let mut tree = RbTree::new();
        for key in [10, 5, 20, 15, 30, 12, 17, 25, 40, 11] {
            tree.insert(key);
        }
        let node = tree.find(10).unwrap();
        tree.erase(node).unwrap();
        assert_invariants(&tree);
        assert_eq!(
            tree.to_array(9).unwrap(),
            vec![5, 11, 12, 15, 17, 20, 25, 30, 40]
        );
    }

    #[test]
    fn test_invariants_random_mix() {
        let mut rng = rand::thread_rng();
        let mut tree = RbTree::new();
        let mut model: Vec<i64> = Vec::new();

        for step in 0..2000 {
            if model.is_empty() || rng.gen_bool(0.6) {
                let key = rng.gen_range(-200..200);
                tree.insert(key);
                model.push(key);
            } else {
                let victim = model.swap_remove(rng.gen_range(0..model.len()));
                let node = tree.find(victim).expect("model key must be present");
                tree.erase(node).unwrap();
            }
            if step % 50 == 0 {
                assert_invariants(&tree);
            }
        }

        assert_invariants(&tree);
        model.sort_unstable();
        assert_eq!(tree.to_array(model.len()).unwrap(), model);
    }

    #[test]
    fn test_slot_reuse_after_erase() {
        let mut tree = RbTree::new();
        let first = tree.insert(1);
        tree.erase(first).unwrap();
        let second = tree.insert(2);
        // The freed slot is recycled; the old handle names the new node now,
        // which is why erase is specified against live handles only.
        assert_eq!(first, second);
        assert_eq!(tree.key(second), Some(2));
    }

    #[test]
    fn test_teardown_empty_tree() {
        let tree = RbTree::new();
        assert!(tree.is_empty());
        drop(tree);
    }
}

use crate::error::{TreeError, TreeResult};
use crate::node::{Color, Direction, Node, NodeId, Slot};

/// A red-black tree over `i64` keys.
///
/// Nodes live in an index-addressed arena; slot 0 is the tree's own sentinel
/// (always black, never handed out), so leaf checks are plain id comparisons
/// and no link is ever an absent value. Equal keys are kept to the right.
#[derive(Debug)]
pub struct RbTree {
    nodes: Vec<Slot>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl Default for RbTree {
    fn default() -> RbTree {
        RbTree::new()
    }
}

impl RbTree {
    /// Creates an empty tree with its own sentinel.
    pub fn new() -> RbTree {
        let sentinel = Node::new(0, Color::Black);
        RbTree {
            nodes: vec![Slot::Occupied(sentinel)],
            free: Vec::new(),
            root: NodeId::NIL,
            len: 0,
        }
    }

    /// Number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Inserts `key` and returns the handle of the new node. Always
    /// succeeds; an equal key goes into the right subtree of the existing
    /// one.
    pub fn insert(&mut self, key: i64) -> NodeId {
        let id = self.alloc(Node::new(key, Color::Red));
        self.len += 1;

        if self.root.is_nil() {
            self.node_mut(id).color = Color::Black;
            self.root = id;
            return id;
        }

        let mut parent = NodeId::NIL;
        let mut side = Direction::Left;
        let mut cur = self.root;
        while !cur.is_nil() {
            parent = cur;
            side = if key < self.node(cur).key {
                Direction::Left
            } else {
                Direction::Right
            };
            cur = self.get_child(cur, side);
        }
        self.set_child(parent, id, side);

        self.insert_fixup(id);
        id
    }

    /// Restores the red-black shape after linking a red leaf. The only
    /// possible violation on entry is a red node with a red parent.
    fn insert_fixup(&mut self, mut cur: NodeId) {
        loop {
            let parent = self.node(cur).parent;
            if self.node(parent).color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent is real.
            let grand = self.node(parent).parent;
            let parent_dir = if self.get_child(grand, Direction::Right) == parent {
                Direction::Right
            } else {
                Direction::Left
            };
            let uncle = self.get_child(grand, !parent_dir);

            if self.node(uncle).color == Color::Red {
                // Red uncle: push the grandparent's black down one level and
                // retry from there; the violation may climb to the root.
                self.node_mut(parent).color = Color::Black;
                self.node_mut(uncle).color = Color::Black;
                self.node_mut(grand).color = Color::Red;
                cur = grand;
                continue;
            }

            let cur_dir = if self.get_child(parent, Direction::Right) == cur {
                Direction::Right
            } else {
                Direction::Left
            };
            if cur_dir != parent_dir {
                // Zig-zag: straighten into the aligned shape first.
                self.rotate(parent, !cur_dir);
            }
            // Aligned: the color-swapping rotation at the grandparent
            // restores the red rule with no further recoloring.
            self.rotate(grand, !parent_dir);
            cur = self.node(grand).parent;
            break;
        }

        // A recolor cascade can leave a red root behind.
        if self.node(cur).parent.is_nil() {
            self.root = cur;
            self.node_mut(cur).color = Color::Black;
        }
    }

    /// Finds the node holding `key`, or `None` if the key is absent.
    pub fn find(&self, key: i64) -> Option<NodeId> {
        let mut cur = self.root;
        while !cur.is_nil() {
            let node = self.node(cur);
            if node.key == key {
                return Some(cur);
            }
            cur = if key < node.key { node.left } else { node.right };
        }
        None
    }

    /// Leftmost node, or `None` on an empty tree.
    pub fn min(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            None
        } else {
            Some(self.subtree_min(self.root))
        }
    }

    /// Rightmost node, or `None` on an empty tree.
    pub fn max(&self) -> Option<NodeId> {
        let mut cur = self.root;
        if cur.is_nil() {
            return None;
        }
        while !self.node(cur).right.is_nil() {
            cur = self.node(cur).right;
        }
        Some(cur)
    }

    /// Removes the node named by `node` and recycles its slot.
    ///
    /// The handle must come from `insert` or `find` on this tree and must
    /// still be live; a stale or foreign handle is rejected with
    /// [`TreeError::ForeignNode`] and the tree is left untouched.
    pub fn erase(&mut self, node: NodeId) -> TreeResult<()> {
        if !self.owns(node) {
            return Err(TreeError::ForeignNode);
        }

        let (left, right, color, parent) = {
            let n = self.node(node);
            (n.left, n.right, n.color, n.parent)
        };
        let node_side = self.side_of(node);

        // Splice selection: the node itself when it has at most one real
        // child, else its in-order successor. The color leaving the tree is
        // the spliced node's color.
        let vacated;
        let mut cur;
        let mut cur_parent;
        if left.is_nil() || right.is_nil() {
            vacated = color;
            let replacer = if left.is_nil() { right } else { left };
            cur = replacer;
            cur_parent = parent;
            self.set_child(parent, replacer, node_side);
            if self.root == node {
                self.root = replacer;
            }
        } else {
            let succ = self.subtree_min(right);
            vacated = self.node(succ).color;
            cur = self.node(succ).right;
            if self.node(succ).parent == node {
                // The successor keeps its own right subtree; the vacancy is
                // directly under the promoted successor.
                cur_parent = succ;
            } else {
                cur_parent = self.node(succ).parent;
                self.set_child(cur_parent, cur, Direction::Left);
                self.set_child(succ, right, Direction::Right);
            }
            // Promote the successor into the node's position with the
            // node's color and both subtrees.
            self.set_child(parent, succ, node_side);
            if self.root == node {
                self.root = succ;
            }
            self.set_child(succ, left, Direction::Left);
            self.node_mut(succ).color = color;
        }

        self.release(node);
        self.len -= 1;

        if vacated == Color::Black {
            self.erase_fixup(cur, cur_parent);
        }
        Ok(())
    }

    /// Double-black fix-up walk. `cur` may be the sentinel; its parent is
    /// tracked here rather than written into the sentinel.
    fn erase_fixup(&mut self, mut cur: NodeId, mut parent: NodeId) {
        while cur != self.root && self.node(cur).color == Color::Black {
            let dir = if self.get_child(parent, Direction::Right) == cur {
                Direction::Right
            } else {
                Direction::Left
            };
            let mut sibling = self.get_child(parent, !dir);

            if self.node(sibling).color == Color::Red {
                // Case 1: the rotation swap turns the sibling black and
                // exposes a black sibling underneath.
                self.rotate(parent, dir);
                sibling = self.get_child(parent, !dir);
            }

            let (sib_left, sib_right) = {
                let s = self.node(sibling);
                (s.left, s.right)
            };
            if self.node(sib_left).color == Color::Black
                && self.node(sib_right).color == Color::Black
            {
                // Case 2: hand the deficiency to the parent and climb.
                self.node_mut(sibling).color = Color::Red;
                cur = parent;
                parent = self.node(cur).parent;
                continue;
            }

            if self.node(self.get_child(sibling, !dir)).color == Color::Black {
                // Case 3: near child red, far child black; fold the near
                // child over the sibling to reach the far-red shape.
                self.rotate(sibling, !dir);
                sibling = self.get_child(parent, !dir);
            }

            // Case 4: far child red resolves the deficiency.
            let far = self.get_child(sibling, !dir);
            self.node_mut(far).color = Color::Black;
            self.rotate(parent, dir);
            break;
        }

        // A red stopping point absorbs the deficiency.
        if self.node(cur).color == Color::Red {
            self.node_mut(cur).color = Color::Black;
        }
        if !self.root.is_nil() {
            let root = self.root;
            self.node_mut(root).color = Color::Black;
        }
    }

    /// In-order export. `capacity` must equal the number of keys in the
    /// tree; anything else is a mismatch, not a truncation request.
    pub fn to_array(&self, capacity: usize) -> TreeResult<Vec<i64>> {
        if capacity != self.len {
            return Err(TreeError::CapacityMismatch {
                capacity,
                len: self.len,
            });
        }
        Ok(self.iter().collect())
    }

    /// In-order key iterator. Walks successor links, so it uses no stack
    /// and no heap beyond the tree itself.
    pub fn iter(&self) -> Iter<'_> {
        let start = if self.root.is_nil() {
            NodeId::NIL
        } else {
            self.subtree_min(self.root)
        };
        Iter { tree: self, next: start }
    }

    // Read-only surface for external consumers (checkers, renderers). They
    // walk root/left/right/color/key and never mutate.

    /// Root node, or `None` on an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        self.live(self.root)
    }

    /// Key of a live node; `None` for a stale handle.
    pub fn key(&self, node: NodeId) -> Option<i64> {
        self.get(node).map(|n| n.key)
    }

    /// Color of a node. The sentinel (and any retired slot) reads black.
    pub fn color(&self, node: NodeId) -> Color {
        self.get(node).map_or(Color::Black, |n| n.color)
    }

    /// Left child, or `None` when the link hits the sentinel.
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| self.live(n.left))
    }

    /// Right child, or `None` when the link hits the sentinel.
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| self.live(n.right))
    }

    /// Parent node, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| self.live(n.parent))
    }

    // Structure primitives shared by both fix-ups.

    /// Links `child` under `parent` on `side`. The child's parent link is
    /// skipped for the sentinel, and the parent's child link is skipped when
    /// operating on the root's "parent".
    fn set_child(&mut self, parent: NodeId, child: NodeId, side: Direction) {
        if !child.is_nil() {
            self.node_mut(child).parent = parent;
        }
        if parent.is_nil() {
            return;
        }
        self.node_mut(parent).set_child_link(side, child);
    }

    fn get_child(&self, parent: NodeId, side: Direction) -> NodeId {
        self.node(parent).child(side)
    }

    /// Single rotation around `pivot` toward `dir`. Swaps the colors of the
    /// pivot and the promoted child so the subtree keeps its outward color;
    /// all other color decisions belong to the fix-ups. Updates the tree
    /// root when the promoted child ends up parentless.
    fn rotate(&mut self, pivot: NodeId, dir: Direction) {
        let grand = self.node(pivot).parent;
        let promoted = self.get_child(pivot, !dir);
        let beta = self.get_child(promoted, dir);

        let pivot_color = self.node(pivot).color;
        let promoted_color = self.node(promoted).color;
        self.node_mut(pivot).color = promoted_color;
        self.node_mut(promoted).color = pivot_color;

        self.set_child(pivot, beta, !dir);
        self.set_child(promoted, pivot, dir);

        let grand_side = if !grand.is_nil() && self.get_child(grand, Direction::Right) == pivot {
            Direction::Right
        } else {
            Direction::Left
        };
        self.set_child(grand, promoted, grand_side);
        if self.node(promoted).parent.is_nil() {
            self.root = promoted;
        }
    }

    fn subtree_min(&self, mut cur: NodeId) -> NodeId {
        while !self.node(cur).left.is_nil() {
            cur = self.node(cur).left;
        }
        cur
    }

    /// Side of `node` under its parent. `Left` for the root, where the
    /// answer is never used.
    fn side_of(&self, node: NodeId) -> Direction {
        let parent = self.node(node).parent;
        if !parent.is_nil() && self.node(parent).right == node {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Defensive membership check: the handle must name an occupied
    /// non-sentinel slot whose parent chain reaches this tree's root.
    fn owns(&self, node: NodeId) -> bool {
        if node.is_nil() || node.0 >= self.nodes.len() {
            return false;
        }
        if !matches!(self.nodes[node.0], Slot::Occupied(_)) {
            return false;
        }
        let mut cur = node;
        loop {
            let parent = self.node(cur).parent;
            if parent.is_nil() {
                return cur == self.root;
            }
            cur = parent;
        }
    }

    // Arena plumbing.

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(Slot::Occupied(node));
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.0] = Slot::Vacant;
        self.free.push(id);
    }

    fn node(&self, id: NodeId) -> &Node {
        let Slot::Occupied(node) = &self.nodes[id.0] else {
            unreachable!("live links never point at a vacant slot")
        };
        node
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let Slot::Occupied(node) = &mut self.nodes[id.0] else {
            unreachable!("live links never point at a vacant slot")
        };
        node
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_nil() {
            return None;
        }
        match self.nodes.get(id.0)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant => None,
        }
    }

    fn live(&self, id: NodeId) -> Option<NodeId> {
        if id.is_nil() {
            None
        } else {
            Some(id)
        }
    }
}

/// In-order iterator over the tree's keys.
///
/// Starts at the leftmost node and steps to each successor: the minimum of
/// the right subtree when there is one, else the first ancestor reached
/// from a left child.
pub struct Iter<'a> {
    tree: &'a RbTree,
    next: NodeId,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.next.is_nil() {
            return None;
        }
        let cur = self.next;
        let node = self.tree.node(cur);
        let key = node.key;

        if !node.right.is_nil() {
            self.next = self.tree.subtree_min(node.right);
        } else {
            let mut child = cur;
            let mut parent = self.tree.node(child).parent;
            while !parent.is_nil() && self.tree.node(parent).right == child {
                child = parent;
                parent = self.tree.node(parent).parent;
            }
            self.next = parent;
        }
        Some(key)
    }
}
