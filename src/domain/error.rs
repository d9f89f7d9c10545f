//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::MemberId;

/// Domain errors represent genealogy rule violations.
/// All of them are recoverable: the caller decides whether to re-prompt.
/// Messages are user-facing (Spanish, like the rest of the console output).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("ya existe una raíz; solo se permite una")]
    RootAlreadyExists,

    #[error("el ID {0} ya existe en el árbol")]
    DuplicateId(MemberId),

    #[error("no se encontró el padre con ID {0}")]
    ParentNotFound(MemberId),

    #[error("el miembro {0} ya tiene dos hijos")]
    ParentFull(MemberId),

    #[error("un miembro no puede ser padre de sí mismo (ID {0})")]
    InvalidSelfParent(MemberId),

    #[error("el ID {0} no existe")]
    MemberNotFound(MemberId),

    #[error("ID inválido: '{0}'. Debe ser un número positivo")]
    InvalidId(String),

    #[error("el nombre no puede estar vacío")]
    EmptyName,

    #[error("edad inválida: '{0}'. Debe ser un número entre 1 y 120")]
    InvalidAge(String),
}
