//! The slot wire schema: one ordered table of fields, consumed by
//! both [`CharacterSlot::parse`] and [`super::rebuild::rebuild`].
//!
//! The order of `SLOT_FIELDS` *is* the format. Gated fields carry the
//! minimum slot version that includes them; there is no other
//! versioning mechanism. Keeping read and write as paired entries in
//! a single table is what guarantees the two directions never
//! enumerate the fields differently.

use tracing::warn;

use super::{
    Attributes, CharacterSlot, EquipmentBlock, InventoryEntry, Vitals, FACE_DATA_SIZE,
    MAX_INVENTORY_ENTRIES, MAX_UNLOCKED_REGIONS, MAX_WEATHER_STATE, MAX_WORLD_STATE, NAME_BYTES,
    VERSION_MIN, VERSION_STEAM_ID, VERSION_WEATHER,
};
use crate::error::ParseError;
use crate::reader::SliceReader;
use crate::writer::SectionWriter;

pub(crate) struct FieldDef {
    pub name: &'static str,
    pub min_version: u32,
    pub read: fn(&mut SliceReader<'_>, &mut CharacterSlot) -> Result<(), ParseError>,
    pub write: fn(&CharacterSlot, &mut SectionWriter),
}

pub(crate) const SLOT_FIELDS: &[FieldDef] = &[
    FieldDef {
        name: "map_id",
        min_version: VERSION_MIN,
        read: read_map_id,
        write: write_map_id,
    },
    FieldDef {
        name: "name",
        min_version: VERSION_MIN,
        read: read_name,
        write: write_name,
    },
    FieldDef {
        name: "progression",
        min_version: VERSION_MIN,
        read: read_progression,
        write: write_progression,
    },
    FieldDef {
        name: "attributes",
        min_version: VERSION_MIN,
        read: read_attributes,
        write: write_attributes,
    },
    FieldDef {
        name: "vitals",
        min_version: VERSION_MIN,
        read: read_vitals,
        write: write_vitals,
    },
    FieldDef {
        name: "face_data",
        min_version: VERSION_MIN,
        read: read_face_data,
        write: write_face_data,
    },
    FieldDef {
        name: "equipment",
        min_version: VERSION_MIN,
        read: read_equipment,
        write: write_equipment,
    },
    FieldDef {
        name: "inventory",
        min_version: VERSION_MIN,
        read: read_inventory,
        write: write_inventory,
    },
    FieldDef {
        name: "unlocked_regions",
        min_version: VERSION_MIN,
        read: read_unlocked_regions,
        write: write_unlocked_regions,
    },
    FieldDef {
        name: "steam_id",
        min_version: VERSION_STEAM_ID,
        read: read_steam_id,
        write: write_steam_id,
    },
    FieldDef {
        name: "world_state",
        min_version: VERSION_MIN,
        read: read_world_state,
        write: write_world_state,
    },
    FieldDef {
        name: "weather_state",
        min_version: VERSION_WEATHER,
        read: read_weather_state,
        write: write_weather_state,
    },
];

fn read_map_id(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.map_id = r.read_array::<4>()?;
    Ok(())
}

fn write_map_id(s: &CharacterSlot, w: &mut SectionWriter) {
    w.put_bytes(&s.map_id);
}

fn read_name(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.name = r.read_fixed_utf16(NAME_BYTES)?;
    Ok(())
}

fn write_name(s: &CharacterSlot, w: &mut SectionWriter) {
    w.put_fixed_utf16(&s.name, NAME_BYTES);
}

// level, runes, rune memory, playtime, archetype, gender
fn read_progression(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.level = r.read_u32()?;
    s.runes = r.read_u32()?;
    s.rune_memory = r.read_u32()?;
    s.playtime_seconds = r.read_u32()?;
    s.archetype = r.read_u32()?;
    s.gender = r.read_u8()?;
    Ok(())
}

fn write_progression(s: &CharacterSlot, w: &mut SectionWriter) {
    w.put_u32(s.level);
    w.put_u32(s.runes);
    w.put_u32(s.rune_memory);
    w.put_u32(s.playtime_seconds);
    w.put_u32(s.archetype);
    w.put_u8(s.gender);
}

fn read_attributes(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    let [vigor, mind, endurance, strength, dexterity, intelligence, faith, arcane] =
        r.read_u32_array::<8>()?;
    s.attributes = Attributes {
        vigor,
        mind,
        endurance,
        strength,
        dexterity,
        intelligence,
        faith,
        arcane,
    };
    Ok(())
}

fn write_attributes(s: &CharacterSlot, w: &mut SectionWriter) {
    let a = &s.attributes;
    for v in [
        a.vigor,
        a.mind,
        a.endurance,
        a.strength,
        a.dexterity,
        a.intelligence,
        a.faith,
        a.arcane,
    ] {
        w.put_u32(v);
    }
}

fn read_vitals(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    let [hp, max_hp, fp, max_fp, stamina, max_stamina] = r.read_u32_array::<6>()?;
    s.vitals = Vitals {
        hp,
        max_hp,
        fp,
        max_fp,
        stamina,
        max_stamina,
    };
    Ok(())
}

fn write_vitals(s: &CharacterSlot, w: &mut SectionWriter) {
    let v = &s.vitals;
    for x in [v.hp, v.max_hp, v.fp, v.max_fp, v.stamina, v.max_stamina] {
        w.put_u32(x);
    }
}

fn read_face_data(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.face_data = r.read_array::<FACE_DATA_SIZE>()?;
    Ok(())
}

fn write_face_data(s: &CharacterSlot, w: &mut SectionWriter) {
    w.put_bytes(&s.face_data);
}

fn read_equipment(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.equipment = EquipmentBlock {
        weapon_left: r.read_u32_array::<3>()?,
        weapon_right: r.read_u32_array::<3>()?,
        arrows: r.read_u32_array::<2>()?,
        bolts: r.read_u32_array::<2>()?,
        armor: r.read_u32_array::<4>()?,
        talismans: r.read_u32_array::<4>()?,
    };
    Ok(())
}

fn write_equipment(s: &CharacterSlot, w: &mut SectionWriter) {
    for id in s.equipment.ids() {
        w.put_u32(id);
    }
}

fn read_inventory(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    let count = r.read_u32()? as usize;
    if count > MAX_INVENTORY_ENTRIES || count * 8 > r.remaining() {
        warn!(count, "implausible inventory count, treating as empty");
        s.inventory = Vec::new();
        return Ok(());
    }
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(InventoryEntry {
            item_id: r.read_u32()?,
            quantity: r.read_u32()?,
        });
    }
    s.inventory = entries;
    Ok(())
}

fn write_inventory(s: &CharacterSlot, w: &mut SectionWriter) {
    if s.inventory.len() > MAX_INVENTORY_ENTRIES {
        warn!(
            count = s.inventory.len(),
            "implausible in-memory inventory, writing empty"
        );
        w.put_u32(0);
        return;
    }
    w.put_u32(s.inventory.len() as u32);
    for entry in &s.inventory {
        w.put_u32(entry.item_id);
        w.put_u32(entry.quantity);
    }
}

fn read_unlocked_regions(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    let count = r.read_u32()? as usize;
    if count > MAX_UNLOCKED_REGIONS || count * 4 > r.remaining() {
        warn!(count, "implausible unlocked-region count, treating as empty");
        s.unlocked_regions = Vec::new();
        return Ok(());
    }
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(r.read_u32()?);
    }
    s.unlocked_regions = ids;
    Ok(())
}

fn write_unlocked_regions(s: &CharacterSlot, w: &mut SectionWriter) {
    if s.unlocked_regions.len() > MAX_UNLOCKED_REGIONS {
        warn!(
            count = s.unlocked_regions.len(),
            "implausible in-memory region list, writing empty"
        );
        w.put_u32(0);
        return;
    }
    w.put_u32(s.unlocked_regions.len() as u32);
    for id in &s.unlocked_regions {
        w.put_u32(*id);
    }
}

fn read_steam_id(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.steam_id = r.read_u64()?;
    Ok(())
}

fn write_steam_id(s: &CharacterSlot, w: &mut SectionWriter) {
    w.put_u64(s.steam_id);
}

fn read_world_state(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.world_state = read_clamped_blob(r, MAX_WORLD_STATE, "world_state")?;
    Ok(())
}

fn write_world_state(s: &CharacterSlot, w: &mut SectionWriter) {
    write_clamped_blob(w, &s.world_state, MAX_WORLD_STATE, "world_state");
}

fn read_weather_state(r: &mut SliceReader<'_>, s: &mut CharacterSlot) -> Result<(), ParseError> {
    s.weather_state = read_clamped_blob(r, MAX_WEATHER_STATE, "weather_state")?;
    Ok(())
}

fn write_weather_state(s: &CharacterSlot, w: &mut SectionWriter) {
    write_clamped_blob(w, &s.weather_state, MAX_WEATHER_STATE, "weather_state");
}

/// Length-prefixed opaque blob. A declared length outside the sane
/// range (or past the end of the region) is not trusted: the blob
/// degrades to empty instead of aborting the slot or reading out of
/// bounds.
fn read_clamped_blob(
    r: &mut SliceReader<'_>,
    max: usize,
    label: &'static str,
) -> Result<Vec<u8>, ParseError> {
    let len = r.read_u32()? as usize;
    if len > max || len > r.remaining() {
        warn!(field = label, len, max, "implausible blob length, treating as absent");
        return Ok(Vec::new());
    }
    r.read_bytes(len)
}

fn write_clamped_blob(w: &mut SectionWriter, blob: &[u8], max: usize, label: &'static str) {
    if blob.len() > max {
        warn!(field = label, len = blob.len(), max, "implausible in-memory blob, writing empty");
        w.put_u32(0);
        return;
    }
    w.put_u32(blob.len() as u32);
    w.put_bytes(blob);
}
