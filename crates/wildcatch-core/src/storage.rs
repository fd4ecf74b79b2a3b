//! Party and box storage for caught creatures.
//!
//! Captured records leave the world and are handed to a [`CreatureStorage`].
//! [`PartyStorage`] is the reference implementation: a compacted six-slot
//! party that overflows into numbered boxes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::creature::{CreatureId, CreatureRecord};
use crate::error::StorageError;

/// Party size.
pub const PARTY_SIZE: usize = 6;
/// Default number of overflow boxes.
pub const DEFAULT_BOX_COUNT: usize = 8;
/// Default slots per box.
pub const DEFAULT_BOX_CAPACITY: usize = 30;

/// Where a stored creature ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoragePlacement {
    /// Party slot index.
    Party(usize),
    /// Box index and slot within the box.
    Box {
        /// Box index.
        index: usize,
        /// Slot within the box.
        slot: usize,
    },
}

/// Receives creatures leaving the world through capture.
pub trait CreatureStorage {
    /// Stores a newly captured creature.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Full`] carrying the record when there is no room.
    fn add_captured(&mut self, record: CreatureRecord) -> Result<StoragePlacement, StorageError>;

    /// True when [`add_captured`](Self::add_captured) would accept a record.
    fn has_room(&self) -> bool {
        true
    }
}

/// Six-slot party with overflow boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyStorage {
    party: Vec<CreatureRecord>,
    boxes: Vec<Vec<Option<CreatureRecord>>>,
    has_caught_first: bool,
}

impl Default for PartyStorage {
    fn default() -> Self {
        Self::with_boxes(DEFAULT_BOX_COUNT, DEFAULT_BOX_CAPACITY)
    }
}

impl PartyStorage {
    /// Empty storage with the default box layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty storage with `count` boxes of `capacity` slots.
    #[must_use]
    pub fn with_boxes(count: usize, capacity: usize) -> Self {
        Self {
            party: Vec::with_capacity(PARTY_SIZE),
            boxes: vec![vec![None; capacity]; count],
            has_caught_first: false,
        }
    }

    /// Creatures in the party, in slot order.
    #[must_use]
    pub fn party(&self) -> &[CreatureRecord] {
        &self.party
    }

    /// Mutable access to a party member.
    pub fn party_member_mut(&mut self, slot: usize) -> Option<&mut CreatureRecord> {
        self.party.get_mut(slot)
    }

    /// The creature at a box slot, if any.
    #[must_use]
    pub fn box_slot(&self, index: usize, slot: usize) -> Option<&CreatureRecord> {
        self.boxes.get(index)?.get(slot)?.as_ref()
    }

    /// True once any creature has been stored.
    #[must_use]
    pub const fn has_caught_first(&self) -> bool {
        self.has_caught_first
    }

    /// Total creatures held in party and boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.party.len() + self.boxes.iter().flatten().flatten().count()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a creature by id in party or boxes.
    #[must_use]
    pub fn find(&self, id: CreatureId) -> Option<&CreatureRecord> {
        self.party
            .iter()
            .chain(self.boxes.iter().flatten().flatten())
            .find(|record| record.id() == id)
    }

    /// Removes a party member; later members shift up.
    pub fn release_from_party(&mut self, slot: usize) -> Option<CreatureRecord> {
        (slot < self.party.len()).then(|| self.party.remove(slot))
    }

    /// Heals every party member fully.
    pub fn restore_party(&mut self) {
        for record in &mut self.party {
            record.restore_all();
        }
    }

    fn first_free_box_slot(&self) -> Option<(usize, usize)> {
        self.boxes.iter().enumerate().find_map(|(index, slots)| {
            slots
                .iter()
                .position(Option::is_none)
                .map(|slot| (index, slot))
        })
    }
}

impl CreatureStorage for PartyStorage {
    fn has_room(&self) -> bool {
        self.party.len() < PARTY_SIZE || self.first_free_box_slot().is_some()
    }

    fn add_captured(&mut self, record: CreatureRecord) -> Result<StoragePlacement, StorageError> {
        let placement = if self.party.len() < PARTY_SIZE {
            self.party.push(record);
            StoragePlacement::Party(self.party.len() - 1)
        } else if let Some((index, slot)) = self.first_free_box_slot() {
            self.boxes[index][slot] = Some(record);
            StoragePlacement::Box { index, slot }
        } else {
            warn!(
                creature = %record.id(),
                species = %record.species().name,
                "storage full, captured creature not stored"
            );
            return Err(StorageError::Full(Box::new(record)));
        };

        self.has_caught_first = true;
        info!(?placement, "creature stored");
        Ok(placement)
    }
}
