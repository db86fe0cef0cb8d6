//! Roster Store
//!
//! The authoritative, ordered list of participants for a round, and the
//! sources it is (re)loaded from. Membership is fixed once loaded; only
//! health and alive flags change in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::game::state::{Participant, ShootoutError};

/// Errors raised while loading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Roster file could not be read.
    #[error("failed to read roster file {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Roster file is not a JSON participant list.
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
    /// Roster has no participants.
    #[error("roster is empty")]
    Empty,
    /// A participant has an empty name.
    #[error("participant at position {0} has an empty name")]
    EmptyName(usize),
    /// Two participants share a name.
    #[error("duplicate participant name: {0}")]
    DuplicateName(String),
    /// A participant's alive flag disagrees with its health.
    #[error("participant {0} has is_alive inconsistent with health")]
    Inconsistent(String),
    /// Nobody in the roster is alive.
    #[error("roster has no living participant")]
    NoneAlive,
}

// =============================================================================
// ROSTER SOURCE
// =============================================================================

/// Static roster configuration, read at startup and on every reset.
pub trait RosterSource: Send + Sync {
    /// Read the participant tuples in declaration order.
    fn load(&self) -> Result<Vec<Participant>, RosterError>;
}

/// Roster stored as a JSON array of `{name, health, damage, is_alive}`.
#[derive(Clone, Debug)]
pub struct FileRosterSource {
    path: PathBuf,
}

impl FileRosterSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterSource for FileRosterSource {
    fn load(&self) -> Result<Vec<Participant>, RosterError> {
        let bytes = std::fs::read(&self.path).map_err(|source| RosterError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// In-memory roster.
#[derive(Clone, Debug, Default)]
pub struct StaticRosterSource {
    participants: Vec<Participant>,
}

impl StaticRosterSource {
    /// Create a source that always yields `participants`.
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }
}

impl RosterSource for StaticRosterSource {
    fn load(&self) -> Result<Vec<Participant>, RosterError> {
        Ok(self.participants.clone())
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// Ordered participants of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Load and validate a roster from `source`.
    pub fn load(source: &dyn RosterSource) -> Result<Self, RosterError> {
        Self::from_participants(source.load()?)
    }

    /// Validate `participants` and build a roster, keeping declaration order.
    pub fn from_participants(participants: Vec<Participant>) -> Result<Self, RosterError> {
        if participants.is_empty() {
            return Err(RosterError::Empty);
        }

        let mut seen = BTreeSet::new();
        for (i, p) in participants.iter().enumerate() {
            if p.name.is_empty() {
                return Err(RosterError::EmptyName(i));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(RosterError::DuplicateName(p.name.clone()));
            }
            if !p.is_consistent() {
                return Err(RosterError::Inconsistent(p.name.clone()));
            }
        }
        if !participants.iter().any(|p| p.alive) {
            return Err(RosterError::NoneAlive);
        }

        Ok(Self { participants })
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always false for a validated roster.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Look up a participant by name.
    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    /// Position of `name` in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.name == name)
    }

    /// Participant at `index`.
    pub(crate) fn at(&self, index: usize) -> &Participant {
        &self.participants[index]
    }

    /// Alive participants in declaration order.
    pub fn alive(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.alive)
    }

    /// Copies of alive participants other than `excluding`.
    pub fn list_alive(&self, excluding: &str) -> Vec<Participant> {
        self.alive()
            .filter(|p| p.name != excluding)
            .cloned()
            .collect()
    }

    /// Count alive participants.
    pub fn count_alive(&self) -> usize {
        self.alive().count()
    }

    /// Overwrite a participant's health and alive flag.
    ///
    /// Both fields are written together; callers hold the state lock so no
    /// reader sees half of the pair.
    pub fn apply_shot_result(&mut self, name: &str, health: u32, alive: bool) -> Result<(), ShootoutError> {
        let index = self.position(name)
            .ok_or_else(|| ShootoutError::UnknownParticipant(name.to_string()))?;
        self.apply_at(index, health, alive);
        Ok(())
    }

    pub(crate) fn apply_at(&mut self, index: usize, health: u32, alive: bool) {
        let participant = &mut self.participants[index];
        participant.health = health;
        participant.alive = alive;
    }
}

// =============================================================================
// TESTS
// =============================================================================
