//! Transactional slot operations: copy, swap, delete, cross-container
//! transfer, and standalone export/import.
//!
//! Every entry point works entirely on in-memory buffers and leaves
//! each touched container fully consistent (slot bytes, profile
//! mirror, occupancy bitmap, checksums) or returns an error before
//! mutating anything observable on disk; persistence is the caller's
//! separate explicit step. All failure modes are deterministic
//! data-integrity errors, never retried.

use tracing::info;

use crate::common::ProfileSummaryEntry;
use crate::container::SaveContainer;
use crate::error::OpError;
use crate::layout::RegionId;
use crate::package::CharacterPackage;
use crate::slot::CharacterSlot;

/// Copy the whole fixed region `from` into `to` within one container,
/// mirror the profile entry, and mark `to` occupied.
pub fn copy_slot(save: &mut SaveContainer, from: usize, to: usize) -> Result<(), OpError> {
    SaveContainer::check_index(from)?;
    SaveContainer::check_index(to)?;
    if from == to {
        return Err(OpError::SameSlot { index: from });
    }
    if save.slot(from).is_empty() {
        return Err(OpError::SourceSlotEmpty { index: from });
    }

    let src = save.layout().region(RegionId::Slot(from));
    let dst = save.layout().region(RegionId::Slot(to));
    save.buf_mut().copy_within(src.start..src.end, dst.start);
    save.reparse_slot(to)?;

    let entry = save.common().profiles[from].clone();
    let common = save.common_mut();
    common.profiles[to] = entry;
    common.active[to] = true;
    save.write_common_region();

    info!(from, to, "slot copied");
    Ok(())
}

/// Exchange two slots wholesale: regions, profile entries, occupancy
/// flags. Applied twice this is the identity operation.
pub fn swap_slots(save: &mut SaveContainer, a: usize, b: usize) -> Result<(), OpError> {
    SaveContainer::check_index(a)?;
    SaveContainer::check_index(b)?;
    if a == b {
        return Err(OpError::SameSlot { index: a });
    }

    let ra = save.layout().region(RegionId::Slot(a));
    let rb = save.layout().region(RegionId::Slot(b));
    let buf = save.buf_mut();
    let tmp = buf[ra.start..ra.end].to_vec();
    buf.copy_within(rb.start..rb.end, ra.start);
    buf[rb.start..rb.end].copy_from_slice(&tmp);
    save.reparse_slot(a)?;
    save.reparse_slot(b)?;

    let common = save.common_mut();
    common.profiles.swap(a, b);
    common.active.swap(a, b);
    save.write_common_region();

    info!(a, b, "slots swapped");
    Ok(())
}

/// Zero slot `i`'s whole region, clear its profile mirror and
/// occupancy flag, and replace the in-memory record with the empty
/// sentinel. Idempotent.
pub fn delete_slot(save: &mut SaveContainer, index: usize) -> Result<(), OpError> {
    SaveContainer::check_index(index)?;

    save.set_slot(index, CharacterSlot::empty());
    save.write_slot_region(index);

    let common = save.common_mut();
    common.profiles[index] = ProfileSummaryEntry::empty();
    common.active[index] = false;
    save.write_common_region();

    info!(index, "slot deleted");
    Ok(())
}

/// Move a character between two containers.
///
/// The destination copy's embedded owner id is patched to the
/// destination's global owner id before the profile mirror is
/// regenerated; a foreign id would make the game reject or
/// misattribute the character. Callers holding several containers must
/// acquire them in a fixed order of their own choosing; this function
/// simply requires both exclusively for its whole duration.
pub fn transfer_slot(
    src: &SaveContainer,
    from: usize,
    dst: &mut SaveContainer,
    to: usize,
) -> Result<(), OpError> {
    SaveContainer::check_index(from)?;
    SaveContainer::check_index(to)?;
    if src.slot(from).is_empty() {
        return Err(OpError::SourceSlotEmpty { index: from });
    }

    let src_data = src.layout().data(RegionId::Slot(from));
    let dst_data = dst.layout().data(RegionId::Slot(to));
    let payload = src.buf()[src_data.start..src_data.end].to_vec();
    dst.buf_mut()[dst_data.start..dst_data.end].copy_from_slice(&payload);
    dst.reparse_slot(to)?;

    // Owner-id patch must precede profile regeneration: downstream
    // consumers assume slot, profile, and owner id are mutually
    // consistent the moment the operation returns.
    let owner = dst.common().steam_id;
    dst.slot_mut(to).steam_id = owner;
    dst.write_slot_region(to);

    let profile = ProfileSummaryEntry::regenerate_from(dst.slot(to));
    let common = dst.common_mut();
    common.profiles[to] = profile;
    common.active[to] = true;
    dst.write_common_region();

    info!(from, to, owner, "slot transferred across containers");
    Ok(())
}

/// Export slot `i` as a standalone package: the current slot region
/// bytes plus a profile entry regenerated from the live record (never
/// the possibly stale mirror in the common section).
pub fn export_character(save: &SaveContainer, index: usize) -> Result<CharacterPackage, OpError> {
    SaveContainer::check_index(index)?;
    if save.slot(index).is_empty() {
        return Err(OpError::SourceSlotEmpty { index });
    }

    let package = CharacterPackage {
        active: true,
        slot_data: save.slot_bytes(index).to_vec(),
        profile: ProfileSummaryEntry::regenerate_from(save.slot(index)).to_bytes(),
    };
    info!(index, "character exported");
    Ok(package)
}

/// Import a validated package into slot `i`, replacing whatever was
/// there.
///
/// The destination region is zeroed before the payload is written:
/// a previous, larger character's bytes must not bleed into the unused
/// tail structures of the new one.
pub fn import_character(
    save: &mut SaveContainer,
    index: usize,
    package: &CharacterPackage,
) -> Result<(), OpError> {
    SaveContainer::check_index(index)?;
    if package.slot_data.len() > crate::layout::SLOT_SIZE {
        return Err(OpError::CorruptPackage {
            reason: format!(
                "slot data length {} exceeds slot size {}",
                package.slot_data.len(),
                crate::layout::SLOT_SIZE
            ),
        });
    }

    let data = save.layout().data(RegionId::Slot(index));
    let buf = save.buf_mut();
    buf[data.start..data.end].fill(0);
    buf[data.start..data.start + package.slot_data.len()].copy_from_slice(&package.slot_data);
    save.reparse_slot(index)?;

    let owner = save.common().steam_id;
    save.slot_mut(index).steam_id = owner;
    save.write_slot_region(index);

    let profile = ProfileSummaryEntry::parse(&package.profile)?;
    // A payload that parses to the empty sentinel must not leave the
    // occupancy flag or profile mirror claiming a character exists.
    let occupied = !save.slot(index).is_empty();
    let common = save.common_mut();
    common.profiles[index] = if occupied {
        profile
    } else {
        ProfileSummaryEntry::empty()
    };
    common.active[index] = occupied;
    save.write_common_region();

    info!(index, owner, occupied, "character imported");
    Ok(())
}
