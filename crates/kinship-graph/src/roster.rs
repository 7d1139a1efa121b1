use crate::person::PersonId;
use kinship_core::{normalize, person_id_slug, NameKey, PersonRecord};
use std::collections::{HashMap, HashSet};

/// One person materialized from a record's name field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: PersonId,
    pub name: String,
    pub key: NameKey,
    /// Index of the originating record.
    pub record: usize,
}

/// Every person named in the survey, with a name index for resolution.
///
/// Entries are in input order. The index maps a normalized name to all
/// entries sharing it so that namesakes stay distinct.
/// Example: "Jens" -> [jens, jens-2]
#[derive(Debug, Default, Clone)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    by_key: HashMap<NameKey, Vec<usize>>,
    /// Records whose name field held no usable name.
    unnamed: Vec<usize>,
}

impl Roster {
    /// Materializes one entry per name candidate of every record.
    ///
    /// Ids are slugs of the name; a repeated slug gets `-2`, `-3`, ... in
    /// input order.
    pub fn from_records(records: &[PersonRecord]) -> Self {
        let mut roster = Self::default();
        let mut taken: HashSet<PersonId> = HashSet::new();

        for (record_idx, record) in records.iter().enumerate() {
            let names = record.names();
            if names.is_empty() {
                roster.unnamed.push(record_idx);
                continue;
            }

            for name in names {
                let id = unique_id(&person_id_slug(&name), &mut taken);
                let key = normalize(&name);
                roster.insert(RosterEntry {
                    id,
                    name,
                    key,
                    record: record_idx,
                });
            }
        }

        roster
    }

    fn insert(&mut self, entry: RosterEntry) {
        let position = self.entries.len();
        self.by_key.entry(entry.key.clone()).or_default().push(position);
        self.entries.push(entry);
    }

    /// All entries sharing `key`, in input order.
    pub fn lookup(&self, key: &NameKey) -> Vec<&RosterEntry> {
        self.by_key
            .get(key)
            .map(|positions| positions.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Entries that came from the same record as `entry` (its couple partners).
    pub fn partners_of<'a>(&'a self, entry: &'a RosterEntry) -> impl Iterator<Item = &'a RosterEntry> {
        self.entries
            .iter()
            .filter(move |other| other.record == entry.record && other.id != entry.id)
    }

    pub fn unnamed_records(&self) -> &[usize] {
        &self.unnamed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unique_id(base: &str, taken: &mut HashSet<PersonId>) -> PersonId {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
