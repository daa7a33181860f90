//! Core codec for the Elden Ring save container.
//!
//! A save file holds ten fixed-size character slots plus one global
//! "common" section carrying account-wide data and a compact profile
//! summary of every slot. This crate parses the container into typed
//! records, rebuilds mutated records back to the exact byte layout the
//! game expects (including the redundant profile mirrors, the
//! occupancy bitmap, and the per-region MD5 headers), and composes the
//! slot-level operations built on top: copy, swap, delete, cross-file
//! transfer, and standalone character export/import (.erc packages).
//!
//! All work happens on an in-memory byte buffer; writing the result
//! back to disk is an explicit, separate step.

pub mod checksum;
pub mod common;
pub mod container;
pub mod error;
pub mod layout;
pub mod listing;
pub mod ops;
pub mod package;
pub mod reader;
pub mod slot;
pub mod writer;

pub use common::{CommonSection, ProfileSummaryEntry};
pub use container::SaveContainer;
pub use error::{OpError, ParseError};
pub use layout::{FieldSpan, FileLayout, Platform, RegionId};
pub use listing::CharacterListing;
pub use package::CharacterPackage;
pub use slot::CharacterSlot;
