//! Genealogy service
//!
//! Owns one `FamilyTree` behind a readers-writer lock. Mutations
//! (`create_root`, `add_child`, `teardown`) take the write lock for their
//! whole duration, so two insertions can never race on the same free slot.
//! Everything else shares the read lock. Members leave the service as
//! `MemberRecord` copies, never as arena-linked `Member`s.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainError, FamilyTree, MemberId, MemberRecord, NewMember, Slot, TraversalOrder,
};

/// Where a newly added child ended up.
#[derive(Debug, Clone)]
pub struct ChildPlacement {
    pub child: MemberRecord,
    pub parent: MemberRecord,
    pub slot: Slot,
}

/// Service for building and querying one family tree.
#[derive(Debug, Default)]
pub struct GenealogyService {
    tree: RwLock<FamilyTree>,
}

impl GenealogyService {
    /// Create a service around an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> ApplicationResult<RwLockReadGuard<'_, FamilyTree>> {
        self.tree
            .read()
            .map_err(|_| ApplicationError::LockPoisoned { operation })
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> ApplicationResult<RwLockWriteGuard<'_, FamilyTree>> {
        self.tree
            .write()
            .map_err(|_| ApplicationError::LockPoisoned { operation })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn create_root(&self, member: NewMember) -> ApplicationResult<MemberRecord> {
        let mut tree = self.write("create_root")?;
        let root = tree.create_root(member)?;
        Ok(MemberRecord::from(root))
    }

    /// Add a child under `parent_id`.
    ///
    /// Self-parenting is rejected here, before the tree is consulted.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(
        &self,
        parent_id: MemberId,
        member: NewMember,
    ) -> ApplicationResult<ChildPlacement> {
        if member.id() == parent_id {
            return Err(DomainError::InvalidSelfParent(parent_id).into());
        }
        let mut tree = self.write("add_child")?;
        let child_id = tree.insert_child(parent_id, member)?.id();
        let child = tree
            .find_by_id(child_id)
            .ok_or(DomainError::MemberNotFound(child_id))?;
        let parent = tree
            .parent(child)
            .ok_or(DomainError::ParentNotFound(parent_id))?;
        let slot = tree
            .slot_of(child)
            .ok_or(DomainError::ParentNotFound(parent_id))?;
        Ok(ChildPlacement {
            child: MemberRecord::from(child),
            parent: MemberRecord::from(parent),
            slot,
        })
    }

    pub fn exists(&self, id: MemberId) -> ApplicationResult<bool> {
        Ok(self.read("exists")?.exists(id))
    }

    pub fn find(&self, id: MemberId) -> ApplicationResult<Option<MemberRecord>> {
        Ok(self.read("find")?.find_by_id(id).map(MemberRecord::from))
    }

    pub fn len(&self) -> ApplicationResult<usize> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> ApplicationResult<bool> {
        Ok(self.read("is_empty")?.is_empty())
    }

    /// Member first, root last.
    #[instrument(level = "debug", skip(self))]
    pub fn ancestry(&self, id: MemberId) -> ApplicationResult<Vec<MemberRecord>> {
        let tree = self.read("ancestry")?;
        let chain = tree
            .ancestry_chain_by_id(id)?
            .map(MemberRecord::from)
            .collect::<Vec<_>>();
        debug!(id, len = chain.len(), "ancestry resolved");
        Ok(chain)
    }

    pub fn traverse(&self, order: TraversalOrder) -> ApplicationResult<Vec<MemberRecord>> {
        Ok(self
            .read("traverse")?
            .traverse(order)
            .map(MemberRecord::from)
            .collect())
    }

    /// Text rendering of the tree shape.
    pub fn render(&self) -> ApplicationResult<String> {
        Ok(self.read("render")?.to_tree_string().to_string())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn teardown(&self) -> ApplicationResult<()> {
        self.write("teardown")?.teardown();
        Ok(())
    }
}
