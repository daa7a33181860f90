//! Slot re-serialization.
//!
//! Rebuilding writes the *current* contents of every variable-length
//! substructure, so structural edits (a new inventory entry, a newly
//! unlocked region) need no offset arithmetic: every field after the
//! edit simply lands where the schema walk puts it.

use tracing::debug;

use super::schema::SLOT_FIELDS;
use super::CharacterSlot;
use crate::layout::{FieldSpan, SLOT_SIZE};
use crate::writer::SectionWriter;

/// Serialize a slot back to exactly [`SLOT_SIZE`] bytes, in the same
/// field order the parser reads, zero-padded to the fixed stride the
/// game seeks by. Also returns a diagnostic span per field.
///
/// An empty slot rebuilds to an all-zero region (`version == 0` is the
/// entire encoding of "unused").
pub fn rebuild(slot: &CharacterSlot) -> (Vec<u8>, Vec<FieldSpan>) {
    if slot.is_empty() {
        return (vec![0u8; SLOT_SIZE], Vec::new());
    }

    let mut w = SectionWriter::with_capacity(SLOT_SIZE);
    let start = w.len();
    w.put_u32(slot.version);
    w.record_span("version", start);

    for field in SLOT_FIELDS {
        if slot.version < field.min_version {
            continue;
        }
        let start = w.len();
        (field.write)(slot, &mut w);
        w.record_span(field.name, start);
    }

    debug!(
        name = %slot.name,
        logical_len = w.len(),
        "slot rebuilt"
    );
    w.pad_to(SLOT_SIZE);
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{InventoryEntry, VERSION_CURRENT, VERSION_MIN};

    fn sample_slot() -> CharacterSlot {
        let mut slot = CharacterSlot::empty();
        slot.version = VERSION_CURRENT;
        slot.name = "Radahn".to_string();
        slot.level = 120;
        slot.runes = 48_000;
        slot.steam_id = 0x0110_0001_DEAD_BEEF;
        slot.attributes.vigor = 40;
        slot.inventory = vec![InventoryEntry {
            item_id: 0x4000_03E8,
            quantity: 3,
        }];
        slot.unlocked_regions = vec![100, 101, 230];
        slot.world_state = vec![7u8; 64];
        slot.weather_state = vec![9u8; 16];
        slot
    }

    #[test]
    fn rebuild_is_fixed_stride_and_reparses_identically() {
        let slot = sample_slot();
        let (bytes, spans) = rebuild(&slot);
        assert_eq!(bytes.len(), SLOT_SIZE);
        assert!(!spans.is_empty());
        let reparsed = CharacterSlot::parse(&bytes).expect("rebuilt slot must parse");
        assert_eq!(reparsed, slot);
    }

    #[test]
    fn spans_are_contiguous_from_zero() {
        let (_, spans) = rebuild(&sample_slot());
        let mut expected = 0usize;
        for span in &spans {
            assert_eq!(span.start, expected, "gap before {}", span.name);
            expected = span.end;
        }
    }

    #[test]
    fn gated_fields_stay_off_the_wire_for_old_versions() {
        let mut slot = sample_slot();
        slot.version = VERSION_MIN;
        let (bytes, spans) = rebuild(&slot);
        assert!(spans.iter().all(|s| s.name != "steam_id" && s.name != "weather_state"));

        let reparsed = CharacterSlot::parse(&bytes).unwrap();
        assert_eq!(reparsed.steam_id, 0);
        assert!(reparsed.weather_state.is_empty());
        assert_eq!(reparsed.name, slot.name);
    }

    #[test]
    fn appending_a_region_id_shifts_later_fields_cleanly() {
        let mut slot = sample_slot();
        let (before, _) = rebuild(&slot);
        slot.unlocked_regions.push(999);
        let (after, _) = rebuild(&slot);
        assert_eq!(before.len(), after.len());
        let reparsed = CharacterSlot::parse(&after).unwrap();
        assert_eq!(reparsed.unlocked_regions.last(), Some(&999));
        assert_eq!(reparsed.world_state, slot.world_state);
    }

    #[test]
    fn implausible_in_memory_lengths_are_written_as_empty() {
        let mut slot = sample_slot();
        // Force a record that claims more regions than the format allows.
        slot.unlocked_regions = vec![1; crate::slot::MAX_UNLOCKED_REGIONS + 1];
        let (bytes, _) = rebuild(&slot);
        let reparsed = CharacterSlot::parse(&bytes).unwrap();
        assert!(reparsed.unlocked_regions.is_empty());
        // Everything after the clamped field still round-trips.
        assert_eq!(reparsed.world_state, slot.world_state);
    }

    #[test]
    fn implausible_world_state_length_parses_as_empty() {
        let slot = sample_slot();
        let (mut bytes, spans) = rebuild(&slot);
        let span = spans
            .iter()
            .find(|s| s.name == "world_state")
            .expect("world_state span missing");
        // Corrupt the length prefix far past the per-field maximum.
        bytes[span.start..span.start + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        let reparsed = CharacterSlot::parse(&bytes).expect("slot must still parse");
        assert!(reparsed.world_state.is_empty());
        // Fields before the corrupted prefix are untouched.
        assert_eq!(reparsed.name, slot.name);
        assert_eq!(reparsed.steam_id, slot.steam_id);
    }

    #[test]
    fn implausible_inventory_count_parses_as_empty() {
        let slot = sample_slot();
        let (mut bytes, spans) = rebuild(&slot);
        let span = spans
            .iter()
            .find(|s| s.name == "inventory")
            .expect("inventory span missing");
        bytes[span.start..span.start + 4]
            .copy_from_slice(&((crate::slot::MAX_INVENTORY_ENTRIES as u32 + 1).to_le_bytes()));

        let reparsed = CharacterSlot::parse(&bytes).expect("slot must still parse");
        assert!(reparsed.inventory.is_empty());
        assert_eq!(reparsed.level, slot.level);
    }

    #[test]
    fn empty_slot_rebuilds_to_zeroed_region() {
        let (bytes, spans) = rebuild(&CharacterSlot::empty());
        assert_eq!(bytes.len(), SLOT_SIZE);
        assert!(bytes.iter().all(|&b| b == 0));
        assert!(spans.is_empty());
    }
}
