//! Domain layer: the family tree and its members
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;

pub use arena::{
    Ancestors, FamilyTree, InOrderIter, PostOrderIter, PreOrderIter, Traversal, TraversalOrder,
};
pub use entities::{
    parse_age, parse_id, parse_name, Member, MemberId, MemberRecord, NewMember, Slot, MAX_AGE,
    MIN_AGE,
};
pub use error::DomainError;
