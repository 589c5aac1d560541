use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrimError};

/// Stable identity of a scrim: the SQLite rowid of its `scrims` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrimId(pub i64);

impl std::fmt::Display for ScrimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled scrim as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrim {
    pub id: ScrimId,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub contact: Option<String>,
    pub note: Option<String>,
}

impl Scrim {
    /// Contact line content, treating a blank string as absent.
    pub fn contact(&self) -> Option<&str> {
        non_blank(self.contact.as_deref())
    }

    /// Note line content, treating a blank string as absent.
    pub fn note(&self) -> Option<&str> {
        non_blank(self.note.as_deref())
    }
}

/// Field values for creating or replacing a scrim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrimDraft {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub contact: Option<String>,
    pub note: Option<String>,
}

impl ScrimDraft {
    /// Build a draft, trimming the name and dropping blank optional fields.
    pub fn new(
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        contact: Option<&str>,
        note: Option<&str>,
    ) -> Result<Self> {
        let draft = Self {
            name: name.trim().to_string(),
            start,
            end,
            contact: non_blank(contact).map(str::to_string),
            note: non_blank(note).map(str::to_string),
        };
        draft.validate()?;
        Ok(draft)
    }

    /// A scrim needs a name and must end after it starts.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScrimError::InvalidScrim("name cannot be empty".into()));
        }
        if self.end <= self.start {
            return Err(ScrimError::InvalidScrim(
                "end time must be after start time".into(),
            ));
        }
        Ok(())
    }
}

/// A roster slot shown on the availability form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

/// New value for one availability slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Remove any stored status for the slot.
    Clear,
    /// Store this status (e.g. `"available"`), replacing any previous one.
    Set(String),
}

impl SlotStatus {
    /// `"none"` (the form's reset value) clears the slot; anything else is stored.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            SlotStatus::Clear
        } else {
            SlotStatus::Set(s.to_string())
        }
    }
}

/// Request to republish the board outside the regular tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRefresh {
    /// What triggered the refresh, for logging.
    pub reason: &'static str,
}

impl BoardRefresh {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
