//! Resolved people.

use kinship_core::{BirthDate, NameKey};

/// Stable identifier of a person, derived from the person's name.
pub type PersonId = String;

/// Upper bound on resolved parents per person.
pub const MAX_PARENTS: usize = 2;

/// A canonical person node in the resolved family forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub birth_date: Option<BirthDate>,
    /// Up to two parents, in the order the survey listed them.
    pub parent_ids: Vec<PersonId>,
    /// Children in resolution order, without duplicates.
    pub child_ids: Vec<PersonId>,
    /// The other members of the couple row this person came from.
    pub spouse_ids: Vec<PersonId>,
    pub key: NameKey,
    pub source_line: usize,
}

impl Person {
    pub fn new(
        id: impl Into<PersonId>,
        name: impl Into<String>,
        key: NameKey,
        source_line: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birth_date: None,
            parent_ids: Vec::new(),
            child_ids: Vec::new(),
            spouse_ids: Vec::new(),
            key,
            source_line,
        }
    }

    pub fn with_birth_date(mut self, birth_date: Option<BirthDate>) -> Self {
        self.birth_date = birth_date;
        self
    }

    /// A root has no resolved parents.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// The first-listed resolved parent; the nested tree view hangs the
    /// person under this parent.
    pub fn primary_parent(&self) -> Option<&PersonId> {
        self.parent_ids.first()
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.map(|d| d.year)
    }
}
