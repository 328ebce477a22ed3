//! Barcode decode confidence filtering.
//!
//! Camera-side decoders sporadically emit corrupted single-frame reads. The
//! filter accepts a code only after it repeats identically on three
//! consecutive decode events, and accepts at most once per session.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Consecutive identical frames required before a code is accepted.
pub const REQUIRED_STREAK: u32 = 3;

/// Outcome of feeding one decode event into the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Detection {
    /// Still buffering; `streak` frames of the current candidate seen so far.
    Pending { candidate: String, streak: u32 },
    /// The code was accepted by this event. Reported exactly once.
    Accepted { code: String },
    /// A code was already accepted earlier in this session.
    AlreadyAccepted { code: String },
}

/// Per-session filter state: the last candidate, its streak, and the
/// accepted value once emitted.
#[derive(Debug, Default)]
pub struct ConfidenceFilter {
    last_code: Option<String>,
    streak: u32,
    accepted: Option<String>,
}

impl ConfidenceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw decode event through the filter.
    pub fn observe(&mut self, code: &str) -> Detection {
        if let Some(accepted) = &self.accepted {
            return Detection::AlreadyAccepted {
                code: accepted.clone(),
            };
        }

        match &self.last_code {
            Some(last) if last == code => self.streak += 1,
            _ => {
                self.last_code = Some(code.to_string());
                self.streak = 1;
            }
        }

        if self.streak >= REQUIRED_STREAK {
            self.accepted = Some(code.to_string());
            Detection::Accepted {
                code: code.to_string(),
            }
        } else {
            Detection::Pending {
                candidate: code.to_string(),
                streak: self.streak,
            }
        }
    }

    pub fn accepted(&self) -> Option<&str> {
        self.accepted.as_deref()
    }
}

struct ScanSession {
    filter: ConfidenceFilter,
    opened_at: DateTime<Utc>,
}

/// In-memory registry of open scan sessions, keyed by session id. A session
/// models one open lifetime of the scanner modal; deleting and recreating it
/// is the retry surface after camera failures.
pub struct ScanSessionRegistry {
    sessions: DashMap<Uuid, ScanSession>,
}

impl Default for ScanSessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            ScanSession {
                filter: ConfidenceFilter::new(),
                opened_at: Utc::now(),
            },
        );
        id
    }

    pub fn observe(&self, id: Uuid, code: &str) -> Result<Detection, ServiceError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("scan session {id} not found")))?;
        Ok(session.filter.observe(code))
    }

    pub fn close(&self, id: Uuid) -> Result<(), ServiceError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("scan session {id} not found")))
    }

    /// Drops sessions older than `max_age_secs`. Called opportunistically on
    /// open; scanner modals live for seconds, not hours.
    pub fn evict_stale(&self, max_age_secs: i64) {
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_secs);
        self.sessions.retain(|_, s| s.opened_at > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_after_three_consecutive_identical_frames() {
        let mut filter = ConfidenceFilter::new();
        assert_eq!(
            filter.observe("A"),
            Detection::Pending {
                candidate: "A".into(),
                streak: 1
            }
        );
        assert_eq!(
            filter.observe("B"),
            Detection::Pending {
                candidate: "B".into(),
                streak: 1
            }
        );
        assert_eq!(
            filter.observe("B"),
            Detection::Pending {
                candidate: "B".into(),
                streak: 2
            }
        );
        assert_eq!(filter.observe("B"), Detection::Accepted { code: "B".into() });
        // Further frames never re-emit, regardless of their value.
        assert_eq!(
            filter.observe("C"),
            Detection::AlreadyAccepted { code: "B".into() }
        );
        assert_eq!(
            filter.observe("B"),
            Detection::AlreadyAccepted { code: "B".into() }
        );
        assert_eq!(filter.accepted(), Some("B"));
    }

    #[test]
    fn differing_codes_reset_the_streak() {
        let mut filter = ConfidenceFilter::new();
        filter.observe("X");
        filter.observe("X");
        // User re-aims the camera: streak resets, no false emission.
        assert_eq!(
            filter.observe("Y"),
            Detection::Pending {
                candidate: "Y".into(),
                streak: 1
            }
        );
        assert_eq!(filter.accepted(), None);
    }

    #[test]
    fn alternating_codes_never_emit() {
        let mut filter = ConfidenceFilter::new();
        for _ in 0..10 {
            filter.observe("A");
            filter.observe("B");
        }
        assert_eq!(filter.accepted(), None);
    }

    #[test]
    fn registry_round_trip() {
        let registry = ScanSessionRegistry::new();
        let id = registry.open();

        for _ in 0..2 {
            assert!(matches!(
                registry.observe(id, "U0101A").unwrap(),
                Detection::Pending { .. }
            ));
        }
        assert_eq!(
            registry.observe(id, "U0101A").unwrap(),
            Detection::Accepted {
                code: "U0101A".into()
            }
        );

        registry.close(id).unwrap();
        assert!(registry.observe(id, "U0101A").is_err());
    }

    #[test]
    fn unknown_session_is_not_found() {
        let registry = ScanSessionRegistry::new();
        assert!(matches!(
            registry.observe(Uuid::new_v4(), "A"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
