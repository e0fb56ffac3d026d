//! Deterministic reconstruction of world state from an event log.
//!
//! Both paths share [`apply_all`]: the live engine records and applies
//! events as it runs, and [`replay`] folds a persisted log over the initial
//! snapshot. Because every mutation flows through [`Event::apply`], the two
//! paths produce byte-identical serialized state for the same log.

use commons_types::WorldState;
use tracing::debug;

use crate::{ApplyError, Event, EventLog};

/// Apply a batch of events to a state, recording each into the log.
///
/// On error the failing event is neither applied nor recorded; events
/// before it in the batch remain applied and recorded.
///
/// # Errors
///
/// Propagates the first [`ApplyError`] encountered.
pub fn apply_all(
    state: &mut WorldState,
    log: &mut EventLog,
    events: Vec<Event>,
) -> Result<(), ApplyError> {
    for event in events {
        event.apply(state)?;
        log.append(event);
    }
    Ok(())
}

/// Rebuild the final world state by folding a log over an initial snapshot.
///
/// Returns the reconstructed state together with a fresh log of the events
/// applied, which equals the input slice when replay succeeds.
///
/// # Errors
///
/// Returns the first [`ApplyError`] if the log is inconsistent with the
/// snapshot, which indicates a corrupted or mismatched artifact pair.
pub fn replay(initial: &WorldState, events: &[Event]) -> Result<(WorldState, EventLog), ApplyError> {
    debug!(event_count = events.len(), "replaying event log");
    let mut state = initial.clone();
    let mut log = EventLog::new();
    apply_all(&mut state, &mut log, events.to_vec())?;
    Ok((state, log))
}
