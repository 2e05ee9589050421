//! In-memory visitor registry.
//!
//! Keeps at most one record per visitor id, ordered most-recent-first:
//! newly seen visitors are prepended, known visitors are updated in place
//! so the list does not reshuffle on every minor change.

use std::collections::HashSet;

use crate::protocol::{Visitor, VisitorStatus};

/// Result of [`VisitorRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The visitor was new and now sits at the front.
    Inserted,
    /// An existing record at this index was replaced.
    Updated { index: usize },
}

/// Ordered collection of visitor records.
#[derive(Debug, Clone, Default)]
pub struct VisitorRegistry {
    visitors: Vec<Visitor>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with `list`, keeping its order.
    ///
    /// Records absent from `list` are dropped. If `list` repeats an id, the
    /// first occurrence wins.
    pub fn replace_all(&mut self, list: Vec<Visitor>) {
        let mut seen = HashSet::with_capacity(list.len());
        self.visitors = list
            .into_iter()
            .filter(|v| seen.insert(v.visitor_id.clone()))
            .collect();
    }

    /// Replace the record with the same id in place, or prepend a new one.
    pub fn upsert(&mut self, visitor: Visitor) -> UpsertOutcome {
        match self.position(&visitor.visitor_id) {
            Some(index) => {
                self.visitors[index] = visitor;
                UpsertOutcome::Updated { index }
            }
            None => {
                self.visitors.insert(0, visitor);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Mark a visitor as invited and attach the guest url.
    ///
    /// Returns `false` without changing anything if the id is unknown; the
    /// acknowledgement can legitimately race the visitor leaving.
    pub fn mark_invited(&mut self, visitor_id: &str, guest_url: &str) -> bool {
        match self.visitors.iter_mut().find(|v| v.visitor_id == visitor_id) {
            Some(visitor) => {
                visitor.status = VisitorStatus::VideoInvited;
                visitor.guest_url = Some(guest_url.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, visitor_id: &str) -> Option<&Visitor> {
        self.visitors.iter().find(|v| v.visitor_id == visitor_id)
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Visitor> {
        self.visitors.iter()
    }

    /// Owned copy of the current records in display order.
    pub fn snapshot(&self) -> Vec<Visitor> {
        self.visitors.clone()
    }

    fn position(&self, visitor_id: &str) -> Option<usize> {
        self.visitors.iter().position(|v| v.visitor_id == visitor_id)
    }
}
