//! Observed subject state.
//!
//! Subject state (`Unregistered -> Registered -> CheckedIn -> CheckedOut`,
//! then back to `CheckedIn` on a new visit) is owned by the remote authority.
//! The checkpoint only mirrors what the authority reported, so every reported
//! state is accepted. Transitions the lifecycle does not expect are kept in
//! the history with `expected = false` and logged at `warn`.
//!
//! The ledger tracks at most [`DEFAULT_MAX_SUBJECTS`] subjects by default.
//! When a new subject arrives at the bound, the least recently seen subject
//! that is not on site is forgotten. Subjects reported `CheckedIn` are never
//! evicted, so the bound can be exceeded while that many are on site.
//!
//! # Examples
//!
//! ```
//! use gatepass_checkpoint::observed::{ObservedState, ObservedStateLedger, SubjectKey};
//! use gatepass_core::SubjectType;
//!
//! let ledger = ObservedStateLedger::new();
//! let key = SubjectKey::new(SubjectType::Visitor, 17);
//!
//! let transition = ledger.observe(key, ObservedState::CheckedIn);
//! assert_eq!(transition.from, ObservedState::Registered);
//! assert!(transition.expected);
//! assert_eq!(ledger.state_of(&key), Some(ObservedState::CheckedIn));
//! ```

use chrono::{Local, NaiveDateTime};
use gatepass_core::{Direction, SubjectType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Maximum number of transitions kept per subject.
const MAX_HISTORY_SIZE: usize = 100;

/// Default bound on tracked subjects.
pub const DEFAULT_MAX_SUBJECTS: usize = 4096;

/// Lifecycle state of a subject as last reported by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedState {
    /// No credential issued.
    Unregistered,
    /// Credential issued, not on site.
    Registered,
    /// On site.
    CheckedIn,
    /// Left the site.
    CheckedOut,
}

impl ObservedState {
    /// Check if the lifecycle expects a transition to `target`.
    pub fn can_transition_to(&self, target: &ObservedState) -> bool {
        matches!(
            (self, target),
            (ObservedState::Unregistered, ObservedState::Registered)
                | (ObservedState::Registered, ObservedState::CheckedIn)
                | (ObservedState::CheckedIn, ObservedState::CheckedOut)
                | (ObservedState::CheckedOut, ObservedState::CheckedIn)
        )
    }
}

impl From<Direction> for ObservedState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => ObservedState::CheckedIn,
            Direction::Out => ObservedState::CheckedOut,
        }
    }
}

impl fmt::Display for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ObservedState::Unregistered => "Unregistered",
            ObservedState::Registered => "Registered",
            ObservedState::CheckedIn => "CheckedIn",
            ObservedState::CheckedOut => "CheckedOut",
        };
        write!(f, "{state_str}")
    }
}

/// Identity of a tracked subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectKey {
    pub subject_type: SubjectType,
    pub id: u64,
}

impl SubjectKey {
    pub fn new(subject_type: SubjectType, id: u64) -> Self {
        Self { subject_type, id }
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.subject_type, self.id)
    }
}

/// One recorded state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTransition {
    pub from: ObservedState,
    pub to: ObservedState,
    /// Local wall-clock time the change was observed.
    pub observed_at: NaiveDateTime,
    /// Whether the lifecycle allows this change.
    pub expected: bool,
}

#[derive(Debug)]
struct SubjectRecord {
    state: ObservedState,
    history: VecDeque<ObservedTransition>,
    last_seen: u64,
}

#[derive(Debug, Default)]
struct Subjects {
    records: HashMap<SubjectKey, SubjectRecord>,
    /// Observation counter, orders records for eviction.
    seq: u64,
}

impl Subjects {
    fn evict_stale(&mut self) -> Option<SubjectKey> {
        let key = self
            .records
            .iter()
            .filter(|(_, record)| record.state != ObservedState::CheckedIn)
            .min_by_key(|(_, record)| record.last_seen)
            .map(|(key, _)| *key)?;
        self.records.remove(&key);
        Some(key)
    }
}

/// Per-subject mirror of authority-reported state.
///
/// Interior mutability lets a shared controller record outcomes through `&self`.
#[derive(Debug)]
pub struct ObservedStateLedger {
    subjects: Mutex<Subjects>,
    max_subjects: usize,
}

impl Default for ObservedStateLedger {
    fn default() -> Self {
        Self::with_max_subjects(DEFAULT_MAX_SUBJECTS)
    }
}

impl ObservedStateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that starts forgetting off-site subjects past `max_subjects`.
    pub fn with_max_subjects(max_subjects: usize) -> Self {
        Self {
            subjects: Mutex::new(Subjects::default()),
            max_subjects: max_subjects.max(1),
        }
    }

    /// Record that the authority reported `state` for `key`.
    ///
    /// A subject seen for the first time is assumed to be `Registered`,
    /// since the authority just accepted its credential.
    pub fn observe(&self, key: SubjectKey, state: ObservedState) -> ObservedTransition {
        let mut subjects = self.lock();
        if !subjects.records.contains_key(&key)
            && subjects.records.len() >= self.max_subjects
            && let Some(evicted) = subjects.evict_stale()
        {
            debug!(subject = %evicted, "Ledger full, forgot off-site subject");
        }

        subjects.seq += 1;
        let seq = subjects.seq;
        let record = subjects.records.entry(key).or_insert_with(|| SubjectRecord {
            state: ObservedState::Registered,
            history: VecDeque::with_capacity(4),
            last_seen: seq,
        });
        record.last_seen = seq;

        let transition = ObservedTransition {
            from: record.state,
            to: state,
            observed_at: Local::now().naive_local(),
            expected: record.state.can_transition_to(&state),
        };

        if transition.expected {
            debug!(subject = %key, from = %transition.from, to = %state, "Observed state change");
        } else {
            warn!(
                subject = %key,
                from = %transition.from,
                to = %state,
                "Authority reported an out-of-order state change"
            );
        }

        record.state = state;
        record.history.push_back(transition.clone());
        if record.history.len() > MAX_HISTORY_SIZE {
            record.history.pop_front();
        }

        transition
    }

    /// Last reported state, if the subject has been seen.
    pub fn state_of(&self, key: &SubjectKey) -> Option<ObservedState> {
        self.lock().records.get(key).map(|record| record.state)
    }

    /// Transition history for a subject, oldest first.
    pub fn history(&self, key: &SubjectKey) -> Vec<ObservedTransition> {
        self.lock()
            .records
            .get(key)
            .map(|record| record.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Subjects currently reported as on site.
    pub fn checked_in(&self) -> Vec<SubjectKey> {
        self.lock()
            .records
            .iter()
            .filter(|(_, record)| record.state == ObservedState::CheckedIn)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Number of tracked subjects.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Subjects> {
        // A panic mid-update cannot leave a record half-written.
        self.subjects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
