//! Track Table carried between sampled frames, and the identity generator.

use std::collections::BTreeMap;

use crate::tracker::rect::BBox;

/// Run-scoped source of track identities.
///
/// Identities start at 1 and only ever increase.
#[derive(Debug, Clone)]
pub struct TrackIdGenerator {
    next: u64,
}

impl Default for TrackIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Get the next unique track ID.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The identity the next call to `next_id` will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Number of identities issued so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// Last known state of one tracked vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEntry {
    /// Box from the most recent detection claiming this identity
    pub bbox: BBox,
    /// Consecutive sampled frames in which the track went unclaimed
    pub missed_frames: u32,
}

impl TrackEntry {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            missed_frames: 0,
        }
    }
}

/// Identity to last-known-box mapping.
///
/// Keyed by identity so an identity can never appear twice; iteration is in
/// ascending identity order, i.e. track creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTable {
    entries: BTreeMap<u64, TrackEntry>,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TrackEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Insert or overwrite the entry for `id`.
    pub fn insert(&mut self, id: u64, entry: TrackEntry) {
        self.entries.insert(id, entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &TrackEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }
}

impl FromIterator<(u64, BBox)> for TrackTable {
    fn from_iter<I: IntoIterator<Item = (u64, BBox)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, bbox)| (id, TrackEntry::new(bbox)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = TrackIdGenerator::new();
        assert_eq!(ids.peek(), 1);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_insert_overwrites_same_identity() {
        let mut table = TrackTable::new();
        table.insert(4, TrackEntry::new(BBox::new(0.0, 0.0, 1.0, 1.0)));
        table.insert(4, TrackEntry::new(BBox::new(5.0, 5.0, 6.0, 6.0)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(4).unwrap().bbox, BBox::new(5.0, 5.0, 6.0, 6.0));
    }

    #[test]
    fn test_iteration_in_identity_order() {
        let table: TrackTable = [
            (9, BBox::default()),
            (2, BBox::default()),
            (5, BBox::default()),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![2, 5, 9]);
    }
}
