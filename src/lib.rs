//! famtree: a family genealogy modelled as a two-slot tree.
//!
//! Every member has at most two children, filled first slot first, and one
//! parent back-reference used for ancestry lookup. The [`domain::FamilyTree`]
//! holds the invariants; [`application::services::GenealogyService`] shares it
//! behind a readers-writer lock; [`cli`] is the console collaborator.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
