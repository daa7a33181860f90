//! One character slot: the parsed record and its codec.
//!
//! The wire format is a strictly ordered field sequence defined once
//! in [`schema`] and walked by both the parser and the rebuilder, so
//! the two directions cannot drift apart.

pub mod rebuild;
pub(crate) mod schema;

use tracing::debug;

use crate::error::ParseError;
use crate::reader::SliceReader;

pub const NAME_BYTES: usize = 0x22;
pub const FACE_DATA_SIZE: usize = 0x118;
pub const ATTRIBUTE_COUNT: usize = 8;

pub const MAX_INVENTORY_ENTRIES: usize = 5120;
pub const MAX_UNLOCKED_REGIONS: usize = 1024;
pub const MAX_WORLD_STATE: usize = 0x2_0000;
pub const MAX_WEATHER_STATE: usize = 0x1_0000;

/// `version == 0` marks an unused slot; no other field is meaningful.
pub const VERSION_EMPTY: u32 = 0;
/// Oldest slot format the game still writes.
pub const VERSION_MIN: u32 = 0x51;
/// Patch that embedded the owner's steam id in each slot.
pub const VERSION_STEAM_ID: u32 = 0x52;
/// Patch that added the per-slot weather cache.
pub const VERSION_WEATHER: u32 = 0x53;
pub const VERSION_CURRENT: u32 = 0x54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    pub vigor: u32,
    pub mind: u32,
    pub endurance: u32,
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub faith: u32,
    pub arcane: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vitals {
    pub hp: u32,
    pub max_hp: u32,
    pub fp: u32,
    pub max_fp: u32,
    pub stamina: u32,
    pub max_stamina: u32,
}

/// Equipped item IDs, 18 in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquipmentBlock {
    pub weapon_left: [u32; 3],
    pub weapon_right: [u32; 3],
    pub arrows: [u32; 2],
    pub bolts: [u32; 2],
    pub armor: [u32; 4],
    pub talismans: [u32; 4],
}

impl EquipmentBlock {
    /// Flattened wire/profile-mirror order.
    pub fn ids(&self) -> [u32; 18] {
        let mut out = [0u32; 18];
        let mut i = 0;
        for group in [
            &self.weapon_left[..],
            &self.weapon_right[..],
            &self.arrows[..],
            &self.bolts[..],
            &self.armor[..],
            &self.talismans[..],
        ] {
            out[i..i + group.len()].copy_from_slice(group);
            i += group.len();
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryEntry {
    pub item_id: u32,
    pub quantity: u32,
}

/// In-memory record for one slot. Mutated in place by editors,
/// replaced wholesale by import, reset to [`CharacterSlot::empty`] by
/// delete. The container re-serializes it through
/// [`rebuild::rebuild`] after any change.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSlot {
    pub version: u32,
    pub map_id: [u8; 4],
    pub name: String,
    pub level: u32,
    pub runes: u32,
    pub rune_memory: u32,
    pub playtime_seconds: u32,
    pub archetype: u32,
    pub gender: u8,
    pub attributes: Attributes,
    pub vitals: Vitals,
    pub face_data: [u8; FACE_DATA_SIZE],
    pub equipment: EquipmentBlock,
    pub inventory: Vec<InventoryEntry>,
    pub unlocked_regions: Vec<u32>,
    /// Platform account id; present on the wire from
    /// [`VERSION_STEAM_ID`] onward. Must match the container's global
    /// owner id or the game misattributes the character.
    pub steam_id: u64,
    /// Opaque world/geometry cache, length-prefixed on the wire.
    pub world_state: Vec<u8>,
    /// Opaque weather cache; on the wire from [`VERSION_WEATHER`].
    pub weather_state: Vec<u8>,
}

impl CharacterSlot {
    /// The empty sentinel an unused slot parses to.
    pub fn empty() -> Self {
        Self {
            version: VERSION_EMPTY,
            map_id: [0; 4],
            name: String::new(),
            level: 0,
            runes: 0,
            rune_memory: 0,
            playtime_seconds: 0,
            archetype: 0,
            gender: 0,
            attributes: Attributes::default(),
            vitals: Vitals::default(),
            face_data: [0; FACE_DATA_SIZE],
            equipment: EquipmentBlock::default(),
            inventory: Vec::new(),
            unlocked_regions: Vec::new(),
            steam_id: 0,
            world_state: Vec::new(),
            weather_state: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version == VERSION_EMPTY
    }

    /// Parse one slot from its fixed-size data region.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut r = SliceReader::new(data);
        let version = r.read_u32()?;
        if version == VERSION_EMPTY {
            return Ok(Self::empty());
        }
        if !(VERSION_MIN..=VERSION_CURRENT).contains(&version) {
            return Err(ParseError::UnsupportedVersion(version));
        }

        let mut slot = Self::empty();
        slot.version = version;
        for field in schema::SLOT_FIELDS {
            if version < field.min_version {
                continue;
            }
            (field.read)(&mut r, &mut slot)?;
        }
        debug!(
            version,
            name = %slot.name,
            level = slot.level,
            consumed = r.position(),
            "slot parsed"
        );
        Ok(slot)
    }
}
