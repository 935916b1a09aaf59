//! Read-modify-write operations on a user's progress

pub mod sightings;

pub use sightings::{record_sighting, undo_sighting, NewSighting, RecordOutcome, UndoOutcome};
