//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod genealogy;

pub use genealogy::{ChildPlacement, GenealogyService};
