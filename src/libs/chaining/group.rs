use crate::libs::hsp::{Hsp, Strand};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Fragments sharing a key are chain candidates; different keys never mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub source_id: String,
    pub strand: Strand,
}

impl GroupKey {
    pub fn of(hsp: &Hsp) -> Self {
        GroupKey {
            source_id: hsp.source_id.clone(),
            strand: hsp.strand,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.source_id, self.strand)
    }
}

/// Partitions fragments by `(source_id, strand)`.
///
/// Groups keep the order in which their keys first appear. Inside a group, fragments
/// are sorted by `(q_start, q_end, s_start, s_end)`; the sort is stable, so identical
/// coordinates keep their input order.
pub fn group_hsps(hsps: Vec<Hsp>) -> IndexMap<GroupKey, Vec<Hsp>> {
    let mut groups: IndexMap<GroupKey, Vec<Hsp>> = IndexMap::new();

    for hsp in hsps {
        groups.entry(GroupKey::of(&hsp)).or_default().push(hsp);
    }

    for members in groups.values_mut() {
        members.sort_by_key(|h| h.sort_key());
    }

    groups
}
