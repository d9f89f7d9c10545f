use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{debug, instrument, trace};

use crate::domain::entities::{Member, MemberId, NewMember, Slot};
use crate::domain::error::DomainError;

/// Depth-first visiting order over the two child slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// first subtree, member, second subtree
    InOrder,
    /// member, first subtree, second subtree
    PreOrder,
    /// first subtree, second subtree, member
    PostOrder,
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalOrder::InOrder => "Inorden",
            TraversalOrder::PreOrder => "Preorden",
            TraversalOrder::PostOrder => "Postorden",
        };
        f.write_str(name)
    }
}

/// Arena-based family tree with at most one root and two child slots per member.
///
/// Members live in a generational arena; child slots and the parent
/// back-reference are arena indices, so nothing is owned twice.
/// `ids` mirrors the arena for O(1) uniqueness checks and shares its lifecycle.
#[derive(Debug)]
pub struct FamilyTree {
    /// Arena storage for all members
    arena: Arena<Member>,
    /// Index of the root member, None for empty trees
    root: Option<Index>,
    /// id -> arena index of every member in the tree
    ids: HashMap<MemberId, Index>,
}

impl Default for FamilyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            ids: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Member> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    fn node(&self, idx: Index) -> Option<&Member> {
        self.arena.get(idx)
    }

    /// Installs the single root of this tree.
    #[instrument(level = "debug", skip(self))]
    pub fn create_root(&mut self, member: NewMember) -> Result<&Member, DomainError> {
        if self.root.is_some() {
            return Err(DomainError::RootAlreadyExists);
        }
        let id = member.id();
        let idx = self.arena.insert(Member::from_new(member, None));
        self.root = Some(idx);
        self.ids.insert(id, idx);
        debug!(id, "root created");
        Ok(&self.arena[idx])
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: MemberId) -> Option<&Member> {
        self.ids.get(&id).and_then(|&idx| self.node(idx))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn exists(&self, id: MemberId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Attaches a new member to the first free slot of `parent_id`.
    ///
    /// Checks run in order: duplicate id, missing parent, full parent.
    /// Nothing is allocated until all of them pass.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(
        &mut self,
        parent_id: MemberId,
        member: NewMember,
    ) -> Result<&Member, DomainError> {
        let id = member.id();
        if self.exists(id) {
            return Err(DomainError::DuplicateId(id));
        }
        let parent_idx = match self.ids.get(&parent_id) {
            Some(&idx) if self.arena.contains(idx) => idx,
            _ => return Err(DomainError::ParentNotFound(parent_id)),
        };
        if self.arena[parent_idx].is_full() {
            return Err(DomainError::ParentFull(parent_id));
        }

        let child_idx = self.arena.insert(Member::from_new(member, Some(parent_idx)));
        let parent = &mut self.arena[parent_idx];
        if parent.first_child.is_none() {
            parent.first_child = Some(child_idx);
        } else {
            parent.second_child = Some(child_idx);
        }
        self.ids.insert(id, child_idx);
        debug!(id, parent_id, "child attached");
        Ok(&self.arena[child_idx])
    }

    pub fn parent(&self, member: &Member) -> Option<&Member> {
        member.parent.and_then(|idx| self.node(idx))
    }

    pub fn first_child(&self, member: &Member) -> Option<&Member> {
        member.first_child.and_then(|idx| self.node(idx))
    }

    pub fn second_child(&self, member: &Member) -> Option<&Member> {
        member.second_child.and_then(|idx| self.node(idx))
    }

    /// Which slot of its parent `member` occupies, None for the root.
    pub fn slot_of(&self, member: &Member) -> Option<Slot> {
        let parent = self.parent(member)?;
        let own = self.ids.get(&member.id()).copied();
        if parent.first_child.is_some() && parent.first_child == own {
            Some(Slot::First)
        } else if parent.second_child.is_some() && parent.second_child == own {
            Some(Slot::Second)
        } else {
            None
        }
    }

    /// Walks parent links from `member` up to the root, member first.
    pub fn ancestry_chain<'a>(&'a self, member: &'a Member) -> Ancestors<'a> {
        Ancestors {
            tree: self,
            next: Some(member),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn ancestry_chain_by_id(&self, id: MemberId) -> Result<Ancestors<'_>, DomainError> {
        let member = self
            .find_by_id(id)
            .ok_or(DomainError::MemberNotFound(id))?;
        Ok(self.ancestry_chain(member))
    }

    pub fn iter_inorder(&self) -> InOrderIter<'_> {
        InOrderIter::new(self)
    }

    pub fn iter_preorder(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    pub fn traverse(&self, order: TraversalOrder) -> Traversal<'_> {
        match order {
            TraversalOrder::InOrder => Traversal::InOrder(self.iter_inorder()),
            TraversalOrder::PreOrder => Traversal::PreOrder(self.iter_preorder()),
            TraversalOrder::PostOrder => Traversal::PostOrder(self.iter_postorder()),
        }
    }

    /// Number of generations, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        if let Some(node) = self.node(idx) {
            let first = node.first_child.map_or(0, |c| self.calculate_depth(c));
            let second = node.second_child.map_or(0, |c| self.calculate_depth(c));
            1 + first.max(second)
        } else {
            0
        }
    }

    /// Releases every member, children before their parent and the root last.
    #[instrument(level = "debug", skip(self))]
    pub fn teardown(&mut self) {
        let order: Vec<Index> = {
            let mut iter = PostOrderIter::new(self);
            std::iter::from_fn(|| iter.next_entry().map(|(idx, _)| idx)).collect()
        };
        for idx in order {
            if let Some(member) = self.arena.remove(idx) {
                trace!(id = member.id(), "member released");
            }
        }
        self.root = None;
        self.ids.clear();
        self.arena.clear();
        debug!("tree torn down");
    }

    /// Renders the tree shape, first slot above second slot.
    pub fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &FamilyTree, member: &Member) -> Tree<String> {
            let leaves: Vec<_> = [member.first_child, member.second_child]
                .into_iter()
                .flatten()
                .filter_map(|idx| tree.node(idx))
                .map(|child| build_tree(tree, child))
                .collect();
            Tree::new(format!("{} ({})", member.name(), member.id())).with_leaves(leaves)
        }

        match self.root() {
            Some(root) => build_tree(self, root),
            None => Tree::new("(vacío)".to_string()),
        }
    }
}

/// Lazy walk from a member up to the root.
pub struct Ancestors<'a> {
    tree: &'a FamilyTree,
    next: Option<&'a Member>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct InOrderIter<'a> {
    tree: &'a FamilyTree,
    stack: Vec<Index>,
    current: Option<Index>,
}

impl<'a> InOrderIter<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            current: tree.root,
        }
    }
}

impl<'a> Iterator for InOrderIter<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        // Descend along first slots before emitting anything
        while let Some(idx) = self.current {
            self.stack.push(idx);
            self.current = self.tree.node(idx).and_then(|m| m.first_child);
        }
        let idx = self.stack.pop()?;
        let member = self.tree.node(idx)?;
        self.current = member.second_child;
        Some(member)
    }
}

pub struct PreOrderIter<'a> {
    tree: &'a FamilyTree,
    stack: Vec<Index>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        Self {
            tree,
            stack: tree.root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            if let Some(member) = self.tree.node(idx) {
                // Second pushed first so the first slot is visited first
                self.stack.extend(member.second_child);
                self.stack.extend(member.first_child);
                return Some(member);
            }
        }
        None
    }
}

pub struct PostOrderIter<'a> {
    tree: &'a FamilyTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        Self {
            tree,
            stack: tree.root.map(|root| (root, false)).into_iter().collect(),
        }
    }

    fn next_entry(&mut self) -> Option<(Index, &'a Member)> {
        while let Some((idx, visited)) = self.stack.pop() {
            if let Some(member) = self.tree.node(idx) {
                if visited {
                    return Some((idx, member));
                }
                self.stack.push((idx, true));
                if let Some(second) = member.second_child {
                    self.stack.push((second, false));
                }
                if let Some(first) = member.first_child {
                    self.stack.push((first, false));
                }
            }
        }
        None
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|(_, member)| member)
    }
}

/// Any of the three traversals behind one type.
pub enum Traversal<'a> {
    InOrder(InOrderIter<'a>),
    PreOrder(PreOrderIter<'a>),
    PostOrder(PostOrderIter<'a>),
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Traversal::InOrder(iter) => iter.next(),
            Traversal::PreOrder(iter) => iter.next(),
            Traversal::PostOrder(iter) => iter.next(),
        }
    }
}
