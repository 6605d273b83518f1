use super::id::{Id, MIN};

pub(crate) type NodeIndex = usize;

/// Index of the root node in every [`Nodes`] arena.
pub(crate) const ROOT: NodeIndex = 0;

#[derive(Debug, Clone)]
struct Node {
    id: Id,
    value: Option<char>,
    parent: Option<NodeIndex>,
    /// Sorted by `id`.
    children: Vec<NodeIndex>,
    /// Non-empty nodes in this subtree, this one included.
    size: usize,
    empty: bool,
}

impl Node {
    fn new(id: Id) -> Self {
        Self {
            id,
            value: None,
            parent: None,
            children: Vec::new(),
            size: 1,
            empty: false,
        }
    }
}

/// Arena backing the Logoot trie.
///
/// A node is empty when it has no visible character of its own. Empty
/// leaves are trimmed; empty interior nodes stay as long as they carry
/// descendants.
#[derive(Debug, Clone)]
pub(crate) struct Nodes {
    nodes: Vec<Node>,
    free: Vec<NodeIndex>,
}

impl Nodes {
    pub(crate) fn new() -> Self {
        let mut root = Node::new(Id::anonymous(MIN));
        root.size = 0;
        root.empty = true;
        Self {
            nodes: vec![root],
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, id: Id) -> NodeIndex {
        let node = Node::new(id);
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    pub(crate) fn id(&self, index: NodeIndex) -> Id {
        self.nodes[index].id
    }

    pub(crate) fn value(&self, index: NodeIndex) -> Option<char> {
        self.nodes[index].value
    }

    pub(crate) fn set_value(&mut self, index: NodeIndex, value: char) {
        self.nodes[index].value = Some(value);
    }

    pub(crate) fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index].parent
    }

    pub(crate) fn size(&self, index: NodeIndex) -> usize {
        self.nodes[index].size
    }

    pub(crate) fn is_empty(&self, index: NodeIndex) -> bool {
        self.nodes[index].empty
    }

    fn grow(&mut self, mut index: NodeIndex, by: usize) {
        loop {
            self.nodes[index].size += by;
            match self.nodes[index].parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
    }

    fn shrink(&mut self, mut index: NodeIndex, by: usize) {
        loop {
            let node = &mut self.nodes[index];
            assert!(node.size >= by, "subtree size underflow");
            node.size -= by;
            match node.parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
    }

    fn search(&self, parent: NodeIndex, id: &Id) -> Result<usize, usize> {
        self.nodes[parent]
            .children
            .binary_search_by(|&child| self.nodes[child].id.cmp(id))
    }

    /// Attach a new node under `parent`, keeping siblings sorted.
    pub(crate) fn add_child(&mut self, parent: NodeIndex, id: Id) -> NodeIndex {
        let slot = match self.search(parent, &id) {
            Ok(existing) => return self.nodes[parent].children[existing],
            Err(slot) => slot,
        };
        let child = self.alloc(id);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.insert(slot, child);
        self.grow(parent, 1);
        child
    }

    fn remove_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        let id = self.nodes[child].id;
        if let Ok(slot) = self.search(parent, &id) {
            self.nodes[parent].children.remove(slot);
            let size = self.nodes[child].size;
            if size > 0 {
                self.shrink(parent, size);
            }
            self.free.push(child);
        }
    }

    pub(crate) fn set_empty(&mut self, index: NodeIndex, empty: bool) {
        if self.nodes[index].empty == empty {
            return;
        }
        self.nodes[index].empty = empty;
        if empty {
            self.shrink(index, 1);
        } else {
            self.grow(index, 1);
        }
    }

    /// Remove `index` and its ancestors while they are empty leaves.
    pub(crate) fn trim_empty(&mut self, mut index: NodeIndex) {
        while let Some(parent) = self.nodes[index].parent {
            let node = &self.nodes[index];
            if !node.empty || !node.children.is_empty() {
                break;
            }
            self.remove_child(parent, index);
            index = parent;
        }
    }

    /// Node holding the `order`-th non-empty entry of the subtree in
    /// preorder, counting from zero.
    pub(crate) fn by_order(&self, mut index: NodeIndex, mut order: usize) -> Option<NodeIndex> {
        if order >= self.nodes[index].size {
            return None;
        }
        'descend: loop {
            let node = &self.nodes[index];
            if !node.empty {
                if order == 0 {
                    return Some(index);
                }
                order -= 1;
            }
            for &child in &node.children {
                let size = self.nodes[child].size;
                if order < size {
                    index = child;
                    continue 'descend;
                }
                order -= size;
            }
            return None;
        }
    }

    /// Number of non-empty nodes that precede `index` in preorder.
    pub(crate) fn order_of(&self, mut index: NodeIndex) -> usize {
        let mut order = 0;
        while let Some(parent) = self.nodes[index].parent {
            let node = &self.nodes[parent];
            if !node.empty {
                order += 1;
            }
            for &sibling in &node.children {
                if sibling == index {
                    break;
                }
                order += self.nodes[sibling].size;
            }
            index = parent;
        }
        order
    }

    pub(crate) fn find(&self, position: &[Id]) -> Option<NodeIndex> {
        position.iter().try_fold(ROOT, |index, id| {
            self.search(index, id)
                .ok()
                .map(|slot| self.nodes[index].children[slot])
        })
    }

    /// Walk `position` from the root, creating missing nodes as empty
    /// interior nodes.
    pub(crate) fn build(&mut self, position: &[Id]) -> NodeIndex {
        position.iter().fold(ROOT, |index, id| match self.search(index, id) {
            Ok(slot) => self.nodes[index].children[slot],
            Err(_) => {
                let child = self.add_child(index, *id);
                self.set_empty(child, true);
                child
            }
        })
    }

    pub(crate) fn position_of(&self, mut index: NodeIndex) -> Vec<Id> {
        let mut position = Vec::new();
        while let Some(parent) = self.nodes[index].parent {
            position.push(self.nodes[index].id);
            index = parent;
        }
        position.reverse();
        position
    }

    /// Visible characters in preorder.
    pub(crate) fn values(&self) -> impl Iterator<Item = char> + '_ {
        let mut stack = vec![ROOT];
        core::iter::from_fn(move || loop {
            let index = stack.pop()?;
            let node = &self.nodes[index];
            stack.extend(node.children.iter().rev());
            if !node.empty {
                if let Some(value) = node.value {
                    return Some(value);
                }
            }
        })
    }
}
