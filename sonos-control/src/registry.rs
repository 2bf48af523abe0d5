//! Registered group coordinators, keyed by serial number.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::zone_player::ZonePlayer;

/// Concurrent map from serial number to zone player.
///
/// Entries are never replaced or removed. Reads never touch the network, so
/// event handlers can look players up while discovery is inserting.
#[derive(Debug, Default)]
pub struct Registry {
    players: RwLock<HashMap<String, Arc<ZonePlayer>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `player` unless its serial number is already present.
    ///
    /// Returns `true` when this call inserted it. Check and insert happen
    /// under one write lock.
    pub fn insert_if_absent(&self, player: Arc<ZonePlayer>) -> bool {
        match self.players.write().entry(player.serial_number().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                tracing::debug!(
                    serial_number = player.serial_number(),
                    room = player.room_name(),
                    "zone player registered"
                );
                slot.insert(player);
                true
            }
        }
    }

    pub fn get(&self, serial_number: &str) -> Option<Arc<ZonePlayer>> {
        self.players.read().get(serial_number).cloned()
    }

    pub fn contains(&self, serial_number: &str) -> bool {
        self.players.read().contains_key(serial_number)
    }

    /// Snapshot of every registered player, in no particular order.
    pub fn players(&self) -> Vec<Arc<ZonePlayer>> {
        self.players.read().values().cloned().collect()
    }

    pub fn find_by_room(&self, room_name: &str) -> Option<Arc<ZonePlayer>> {
        self.players
            .read()
            .values()
            .find(|player| player.room_name() == room_name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty()
    }
}
