//! The global "common" section: account identity, settings, the
//! active-slot bitmap, and the ten compact profile summaries the game
//! shows on its load screen.
//!
//! The profile summaries are redundant mirrors of slot data. They are
//! always regenerated from the authoritative [`CharacterSlot`], never
//! copied byte-for-byte between containers whose owner ids differ.

use tracing::debug;

use crate::error::ParseError;
use crate::layout::{Platform, COMMON_SIZE, SLOT_COUNT};
use crate::reader::SliceReader;
use crate::slot::{CharacterSlot, FACE_DATA_SIZE, NAME_BYTES};
use crate::writer::SectionWriter;

pub const SETTINGS_SIZE: usize = 0x140;
pub const MENU_BLOB_SIZE: usize = 0x8000;
pub const OPTIONS_SIZE: usize = 0x200;
pub const MAX_KEY_CONFIG: usize = 0x2000;

pub const PROFILE_ENTRY_SIZE: usize = 0x24C;
pub const PROFILE_EQUIP_SLOTS: usize = 40;

/// Fixed 0x24C-byte mirror of one slot's display-relevant fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummaryEntry {
    pub name: String,
    pub level: u32,
    pub playtime_seconds: u32,
    pub archetype: u32,
    pub gender: u8,
    pub face_data: [u8; FACE_DATA_SIZE],
    pub equipment: [u32; PROFILE_EQUIP_SLOTS],
}

impl ProfileSummaryEntry {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            level: 0,
            playtime_seconds: 0,
            archetype: 0,
            gender: 0,
            face_data: [0; FACE_DATA_SIZE],
            equipment: [0; PROFILE_EQUIP_SLOTS],
        }
    }

    /// Build the mirror from the authoritative slot record.
    pub fn regenerate_from(slot: &CharacterSlot) -> Self {
        if slot.is_empty() {
            return Self::empty();
        }
        let mut equipment = [0u32; PROFILE_EQUIP_SLOTS];
        let ids = slot.equipment.ids();
        equipment[..ids.len()].copy_from_slice(&ids);
        Self {
            name: slot.name.clone(),
            level: slot.level,
            playtime_seconds: slot.playtime_seconds,
            archetype: slot.archetype,
            gender: slot.gender,
            face_data: slot.face_data,
            equipment,
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut r = SliceReader::new(data);
        let name = r.read_fixed_utf16(NAME_BYTES)?;
        r.skip(2)?; // alignment padding after the name field
        let level = r.read_u32()?;
        let playtime_seconds = r.read_u32()?;
        let archetype = r.read_u32()?;
        let gender = r.read_u8()?;
        r.skip(3)?;
        let face_data = r.read_array::<FACE_DATA_SIZE>()?;
        let equipment = r.read_u32_array::<PROFILE_EQUIP_SLOTS>()?;
        // 0x60 reserved bytes complete the fixed entry size.
        Ok(Self {
            name,
            level,
            playtime_seconds,
            archetype,
            gender,
            face_data,
            equipment,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = SectionWriter::with_capacity(PROFILE_ENTRY_SIZE);
        w.put_fixed_utf16(&self.name, NAME_BYTES);
        w.put_u16(0);
        w.put_u32(self.level);
        w.put_u32(self.playtime_seconds);
        w.put_u32(self.archetype);
        w.put_u8(self.gender);
        w.put_bytes(&[0; 3]);
        w.put_bytes(&self.face_data);
        for id in self.equipment {
            w.put_u32(id);
        }
        w.pad_to(PROFILE_ENTRY_SIZE);
        w.finish().0
    }
}

/// Parsed common section. Total region size is fixed; whatever the
/// known fields do not cover is zero-filled on rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonSection {
    pub version: u32,
    /// Global owner id; every non-empty slot must embed the same id.
    pub steam_id: u64,
    pub settings: [u8; SETTINGS_SIZE],
    pub menu_data: Vec<u8>,
    /// `active[i]` iff `CharacterSlot[i].version != 0`.
    pub active: [bool; SLOT_COUNT],
    pub profiles: Vec<ProfileSummaryEntry>,
    pub last_active_slot: u32,
    pub total_playtime: u32,
    /// Graphics/display options; PC files only.
    pub options: Vec<u8>,
    pub key_config: Vec<u8>,
}

impl CommonSection {
    pub fn new(platform: Platform) -> Self {
        Self {
            version: crate::slot::VERSION_CURRENT,
            steam_id: 0,
            settings: [0; SETTINGS_SIZE],
            menu_data: vec![0; MENU_BLOB_SIZE],
            active: [false; SLOT_COUNT],
            profiles: vec![ProfileSummaryEntry::empty(); SLOT_COUNT],
            last_active_slot: 0,
            total_playtime: 0,
            options: match platform {
                Platform::Pc => vec![0; OPTIONS_SIZE],
                Platform::Console => Vec::new(),
            },
            key_config: Vec::new(),
        }
    }

    pub fn parse(data: &[u8], platform: Platform) -> Result<Self, ParseError> {
        let mut r = SliceReader::new(data);
        let version = r.read_u32()?;
        let steam_id = r.read_u64()?;
        let settings = r.read_array::<SETTINGS_SIZE>()?;
        let menu_data = r.read_bytes(MENU_BLOB_SIZE)?;

        let mut active = [false; SLOT_COUNT];
        for flag in &mut active {
            *flag = r.read_u8()? != 0;
        }
        let mut profiles = Vec::with_capacity(SLOT_COUNT);
        for _ in 0..SLOT_COUNT {
            let entry_bytes = r.read_bytes(PROFILE_ENTRY_SIZE)?;
            profiles.push(ProfileSummaryEntry::parse(&entry_bytes)?);
        }

        let last_active_slot = r.read_u32()?;
        let total_playtime = r.read_u32()?;
        let options = match platform {
            Platform::Pc => r.read_bytes(OPTIONS_SIZE)?,
            Platform::Console => Vec::new(),
        };

        let key_len = r.read_u32()? as usize;
        let key_config = if key_len > MAX_KEY_CONFIG || key_len > r.remaining() {
            tracing::warn!(len = key_len, "implausible key-config length, treating as empty");
            Vec::new()
        } else {
            r.read_bytes(key_len)?
        };

        // The remainder of the fixed region is explicitly skipped.
        debug!(version, steam_id, tail = r.remaining(), "common section parsed");

        Ok(Self {
            version,
            steam_id,
            settings,
            menu_data,
            active,
            profiles,
            last_active_slot,
            total_playtime,
            options,
            key_config,
        })
    }

    /// Serialize back to exactly [`COMMON_SIZE`] bytes.
    pub fn rebuild(&self, platform: Platform) -> Vec<u8> {
        let mut w = SectionWriter::with_capacity(COMMON_SIZE);
        w.put_u32(self.version);
        w.put_u64(self.steam_id);
        w.put_bytes(&self.settings);

        if self.menu_data.len() == MENU_BLOB_SIZE {
            w.put_bytes(&self.menu_data);
        } else {
            // Fixed-size block: a wrong-sized in-memory copy must not
            // shift every later field.
            tracing::warn!(len = self.menu_data.len(), "menu blob has wrong size, writing zeros");
            w.put_bytes(&vec![0u8; MENU_BLOB_SIZE]);
        }

        for i in 0..SLOT_COUNT {
            w.put_u8(self.active[i] as u8);
        }
        for i in 0..SLOT_COUNT {
            let entry = self
                .profiles
                .get(i)
                .cloned()
                .unwrap_or_else(ProfileSummaryEntry::empty);
            w.put_bytes(&entry.to_bytes());
        }

        w.put_u32(self.last_active_slot);
        w.put_u32(self.total_playtime);
        if platform == Platform::Pc {
            if self.options.len() == OPTIONS_SIZE {
                w.put_bytes(&self.options);
            } else {
                w.put_bytes(&vec![0u8; OPTIONS_SIZE]);
            }
        }

        if self.key_config.len() > MAX_KEY_CONFIG {
            w.put_u32(0);
        } else {
            w.put_u32(self.key_config.len() as u32);
            w.put_bytes(&self.key_config);
        }

        w.pad_to(COMMON_SIZE);
        w.finish().0
    }
}
