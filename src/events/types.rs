//! Change notification types shared by the admin emitter and the public-site receivers

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Well-known slot name shared by emitters and receivers.
///
/// Both sides must agree on this exact string for cross-context delivery.
pub const CHANGE_CHANNEL_KEY: &str = "portfolio_data_change";

/// The content area that changed
///
/// Closed set: adding a content category means adding a variant here, which
/// the compiler then forces through every exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    About,
    Highlights,
    Experiences,
    Projects,
    Skills,
    Contact,
    /// Wildcard: matches every subscriber
    All,
}

impl ChangeType {
    /// Every variant, wildcard last
    pub const VARIANTS: [ChangeType; 7] = [
        ChangeType::About,
        ChangeType::Highlights,
        ChangeType::Experiences,
        ChangeType::Projects,
        ChangeType::Skills,
        ChangeType::Contact,
        ChangeType::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::About => "about",
            ChangeType::Highlights => "highlights",
            ChangeType::Experiences => "experiences",
            ChangeType::Projects => "projects",
            ChangeType::Skills => "skills",
            ChangeType::Contact => "contact",
            ChangeType::All => "all",
        }
    }

    /// Parse a comma-separated list such as `"projects, skills"`.
    ///
    /// Empty segments are skipped; any unknown name fails the whole list.
    pub fn parse_list(raw: &str) -> Result<Vec<ChangeType>, UnknownChangeType> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`ChangeType`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown change type '{0}' (expected one of about, highlights, experiences, projects, skills, contact, all)")]
pub struct UnknownChangeType(pub String);

impl FromStr for ChangeType {
    type Err = UnknownChangeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeType::VARIANTS
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownChangeType(s.to_string()))
    }
}

/// Failure to read a notification payload off the shared slot
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty notification payload")]
    Empty,
    #[error("malformed notification payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Last timestamp handed out, so emissions within one process strictly increase
static LAST_TIMESTAMP_MS: AtomicI64 = AtomicI64::new(0);

fn next_timestamp_ms() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let prev = LAST_TIMESTAMP_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(prev + 1)
}

/// A "data changed" notification.
///
/// Ephemeral: it lives only as the latest value of the shared slot and as the
/// argument of an in-process dispatch. Delivery is at-most-once and
/// best-effort; nothing keeps a history of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub change_type: ChangeType,
    /// Unix milliseconds at creation
    pub timestamp: i64,
}

impl ChangeNotification {
    /// Create a notification stamped with the current time
    pub fn new(change_type: ChangeType) -> Self {
        Self {
            change_type,
            timestamp: next_timestamp_ms(),
        }
    }

    /// Serialize to the wire payload stored in the shared slot
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a payload read from the shared slot
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        if raw.trim().is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// The set of categories a subscriber cares about
///
/// An empty interest still matches [`ChangeType::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interest(BTreeSet<ChangeType>);

impl Interest {
    /// Interest in nothing but the wildcard
    pub fn none() -> Self {
        Self::default()
    }

    /// Interest in every category
    pub fn everything() -> Self {
        Self::from(ChangeType::All)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = ChangeType> + '_ {
        self.0.iter().copied()
    }

    /// The matching rule used by every delivery path
    pub fn matches(&self, change_type: ChangeType) -> bool {
        match change_type {
            ChangeType::All => true,
            ChangeType::About
            | ChangeType::Highlights
            | ChangeType::Experiences
            | ChangeType::Projects
            | ChangeType::Skills
            | ChangeType::Contact => {
                self.0.contains(&ChangeType::All) || self.0.contains(&change_type)
            }
        }
    }
}

impl From<ChangeType> for Interest {
    fn from(change_type: ChangeType) -> Self {
        Self(BTreeSet::from([change_type]))
    }
}

impl From<&[ChangeType]> for Interest {
    fn from(types: &[ChangeType]) -> Self {
        types.iter().copied().collect()
    }
}

impl From<Vec<ChangeType>> for Interest {
    fn from(types: Vec<ChangeType>) -> Self {
        types.into_iter().collect()
    }
}

impl<const N: usize> From<[ChangeType; N]> for Interest {
    fn from(types: [ChangeType; N]) -> Self {
        types.into_iter().collect()
    }
}

impl FromIterator<ChangeType> for Interest {
    fn from_iter<I: IntoIterator<Item = ChangeType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Publishes change notifications after a successful write.
///
/// Implementations must never block or fail the caller: notification is not
/// part of the save's transaction.
pub trait ChangeEmitter: Send + Sync {
    fn notify(&self, change_type: ChangeType);
}
