//! Domain entities: members and the validated values that create them

use std::fmt;

use generational_arena::Index;

use crate::domain::error::DomainError;

/// Identifier of a member, unique across the whole tree.
pub type MemberId = u32;

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;

/// Already-validated data for a member that is about to be created.
///
/// The tree only accepts members through this type, so its operations never
/// see a zero id, a blank name or an out-of-range age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    id: MemberId,
    name: String,
    age: u8,
}

impl NewMember {
    pub fn new(id: MemberId, name: impl Into<String>, age: u8) -> Result<Self, DomainError> {
        if id == 0 {
            return Err(DomainError::InvalidId(id.to_string()));
        }
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(DomainError::InvalidAge(age.to_string()));
        }
        Ok(Self { id, name, age })
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }
}

/// One of the two child positions of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => f.write_str("primer hijo"),
            Slot::Second => f.write_str("segundo hijo"),
        }
    }
}

/// One genealogy entry stored in the arena.
///
/// `first_child`/`second_child` own their subtrees; `parent` is a
/// non-owning back-reference.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    name: String,
    age: u8,
    pub(crate) parent: Option<Index>,
    pub(crate) first_child: Option<Index>,
    pub(crate) second_child: Option<Index>,
}

impl Member {
    pub(crate) fn from_new(new: NewMember, parent: Option<Index>) -> Self {
        Self {
            id: new.id,
            name: new.name,
            age: new.age,
            parent,
            first_child: None,
            second_child: None,
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of occupied child slots (0..=2).
    pub fn child_count(&self) -> usize {
        usize::from(self.first_child.is_some()) + usize::from(self.second_child.is_some())
    }

    pub fn is_full(&self) -> bool {
        self.child_count() == 2
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.id, &self.name, self.age)
    }
}

/// Owned copy of a member's data, detached from the tree it came from.
///
/// Carries no arena links, so it stays meaningful after the tree is
/// unlocked, modified or torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    id: MemberId,
    name: String,
    age: u8,
}

impl MemberRecord {
    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }
}

impl From<&Member> for MemberRecord {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            age: member.age,
        }
    }
}

impl fmt::Display for MemberRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.id, &self.name, self.age)
    }
}

fn write_report(f: &mut fmt::Formatter<'_>, id: MemberId, name: &str, age: u8) -> fmt::Result {
    write!(f, "ID: {} - Nombre: {} - Edad: {} anos", id, name, age)
}

/// Parse a raw id: a positive integer.
pub fn parse_id(input: &str) -> Result<MemberId, DomainError> {
    let trimmed = input.trim();
    match trimmed.parse::<MemberId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(DomainError::InvalidId(trimmed.to_string())),
    }
}

/// Parse a raw name: anything but blank.
pub fn parse_name(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Parse a raw age in years, 1 to 120 inclusive.
pub fn parse_age(input: &str) -> Result<u8, DomainError> {
    let trimmed = input.trim();
    match trimmed.parse::<u8>() {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(age),
        _ => Err(DomainError::InvalidAge(trimmed.to_string())),
    }
}
