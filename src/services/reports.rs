use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::domain::SlotSize;
use crate::entities::{movement_log, user_profile, warehouse_slot};
use crate::errors::ServiceError;
use crate::services::movements::MovementService;
use crate::services::profiles::ProfileService;
use crate::services::slots::SlotService;

/// Inter-scan gaps at or above this are treated as breaks and excluded from
/// the average.
const GAP_CUTOFF_SECS: i64 = 20 * 60;

/// Characters of the slot code forming the zone key.
const ZONE_PREFIX_LEN: usize = 3;
/// Characters after the zone forming the street key.
const STREET_KEY_LEN: usize = 2;

/// Per-operator activity summary for a date range.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OperatorStats {
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub total_actions: usize,
    /// `"{m}m {s}s"`, or `"---"` with fewer than two qualifying deltas.
    pub avg_time_per_cart: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SizeCounts {
    pub pequeno: usize,
    pub mediano: usize,
    pub grande: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StreetReport {
    pub street: String,
    pub total: usize,
    pub verified: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ZoneReport {
    pub zone: String,
    pub total: usize,
    pub verified: usize,
    pub verified_percent: i32,
    pub by_size: SizeCounts,
    pub streets: Vec<StreetReport>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HeatmapReport {
    pub zones: Vec<ZoneReport>,
    pub total_slots: usize,
    pub verified_slots: usize,
    pub verified_percent: i32,
}

/// Admin report aggregation over movement logs and slots. All grouping is
/// done in memory; the backing queries only filter and order.
#[derive(Clone)]
pub struct ReportService {
    movements: Arc<MovementService>,
    profiles: Arc<ProfileService>,
    slots: Arc<SlotService>,
}

impl ReportService {
    pub fn new(
        movements: Arc<MovementService>,
        profiles: Arc<ProfileService>,
        slots: Arc<SlotService>,
    ) -> Self {
        Self {
            movements,
            profiles,
            slots,
        }
    }

    #[instrument(skip(self))]
    pub async fn operator_stats(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OperatorStats>, ServiceError> {
        let logs = self.movements.find_range(from, to).await?;
        let profiles = self.profiles.list().await?;
        Ok(compute_operator_stats(&profiles, &logs))
    }

    #[instrument(skip(self))]
    pub async fn heatmap(&self) -> Result<HeatmapReport, ServiceError> {
        // Page through everything; zone grouping needs the full slot set.
        let mut slots = Vec::new();
        let mut page = 1;
        loop {
            let (batch, _total) = self.slots.list(page, 500, None, None).await?;
            let len = batch.len();
            slots.extend(batch);
            if len < 500 {
                break;
            }
            page += 1;
        }
        Ok(build_heatmap(&slots))
    }
}

/// Groups logs per profile (matching operator email or name) and computes
/// the bounded-window average time between consecutive actions.
pub fn compute_operator_stats(
    profiles: &[user_profile::Model],
    logs: &[movement_log::Model],
) -> Vec<OperatorStats> {
    profiles
        .iter()
        .map(|profile| {
            let own: Vec<&movement_log::Model> = logs
                .iter()
                .filter(|log| {
                    log.operator_email.eq_ignore_ascii_case(&profile.email)
                        || log.operator_name == profile.full_name
                })
                .collect();

            let deltas: Vec<i64> = own
                .windows(2)
                .map(|pair| (pair[1].created_at - pair[0].created_at).num_seconds())
                .collect();

            OperatorStats {
                email: profile.email.clone(),
                full_name: profile.full_name.clone(),
                role: profile.role.clone(),
                total_actions: own.len(),
                avg_time_per_cart: format_avg_delta(&deltas),
            }
        })
        .collect()
}

/// Averages the deltas inside the open interval (0, 20 minutes). Gaps at or
/// beyond the cutoff are breaks, not work; zero or negative deltas are clock
/// noise. Fewer than two qualifying deltas yields `"---"`.
pub fn format_avg_delta(deltas_secs: &[i64]) -> String {
    let qualifying: Vec<i64> = deltas_secs
        .iter()
        .copied()
        .filter(|d| *d > 0 && *d < GAP_CUTOFF_SECS)
        .collect();
    if qualifying.len() < 2 {
        return "---".to_string();
    }
    let avg = qualifying.iter().sum::<i64>() / qualifying.len() as i64;
    format!("{}m {}s", avg / 60, avg % 60)
}

/// Zone key: first three characters of the slot code.
pub fn zone_of(code: &str) -> Option<&str> {
    code.get(..ZONE_PREFIX_LEN)
}

/// Street key: the two characters after the zone prefix.
pub fn street_of(code: &str) -> Option<&str> {
    code.get(ZONE_PREFIX_LEN..ZONE_PREFIX_LEN + STREET_KEY_LEN)
}

fn percent(verified: usize, total: usize) -> i32 {
    if total == 0 {
        0
    } else {
        ((verified as f64 / total as f64) * 100.0).round() as i32
    }
}

/// Groups slots by zone prefix, then by street key, counting size classes
/// and verification per group. Codes too short for a zone key are skipped.
pub fn build_heatmap(slots: &[warehouse_slot::Model]) -> HeatmapReport {
    let mut zones: BTreeMap<String, (Vec<&warehouse_slot::Model>, BTreeMap<String, (usize, usize)>)> =
        BTreeMap::new();

    for slot in slots {
        let Some(zone) = zone_of(&slot.code) else {
            continue;
        };
        let entry = zones.entry(zone.to_string()).or_default();
        entry.0.push(slot);
        if let Some(street) = street_of(&slot.code) {
            let counts = entry.1.entry(street.to_string()).or_default();
            counts.0 += 1;
            if slot.is_scanned_once {
                counts.1 += 1;
            }
        }
    }

    let total_slots = slots.len();
    let verified_slots = slots.iter().filter(|s| s.is_scanned_once).count();

    let zones = zones
        .into_iter()
        .map(|(zone, (members, streets))| {
            let verified = members.iter().filter(|s| s.is_scanned_once).count();
            let mut by_size = SizeCounts::default();
            for slot in &members {
                // Imported sizes are raw CSV text; parse leniently.
                match SlotSize::parse_or_default(&slot.size) {
                    SlotSize::Pequeno => by_size.pequeno += 1,
                    SlotSize::Grande => by_size.grande += 1,
                    SlotSize::Mediano => by_size.mediano += 1,
                }
            }
            ZoneReport {
                verified_percent: percent(verified, members.len()),
                total: members.len(),
                verified,
                by_size,
                streets: streets
                    .into_iter()
                    .map(|(street, (total, verified))| StreetReport {
                        street,
                        total,
                        verified,
                    })
                    .collect(),
                zone,
            }
        })
        .collect();

    HeatmapReport {
        zones,
        total_slots,
        verified_slots,
        verified_percent: percent(verified_slots, total_slots),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn profile(email: &str, name: &str) -> user_profile::Model {
        user_profile::Model {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: name.to_string(),
            role: "operator".to_string(),
            created_at: Utc::now(),
        }
    }

    fn log_at(email: &str, minutes: i64) -> movement_log::Model {
        movement_log::Model {
            id: Uuid::new_v4(),
            operator_name: "Ana".to_string(),
            operator_email: email.to_string(),
            cart_id: None,
            slot_code: "U0101A".to_string(),
            old_quantity: 0,
            new_quantity: 50,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn slot(code: &str, size: &str, scanned: bool) -> warehouse_slot::Model {
        warehouse_slot::Model {
            id: Uuid::new_v4(),
            code: code.to_string(),
            status: "empty".to_string(),
            size: size.to_string(),
            quantity: 0,
            is_scanned_once: scanned,
            last_updated: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn break_gaps_are_excluded_from_the_average() {
        // Deltas: 5min, 25min (break), 3min -> average of 5 and 3 = 4m 0s.
        assert_eq!(format_avg_delta(&[300, 1500, 180]), "4m 0s");
    }

    #[test]
    fn zero_and_negative_deltas_are_excluded() {
        assert_eq!(format_avg_delta(&[0, -30, 90, 90]), "1m 30s");
    }

    #[test]
    fn exactly_twenty_minutes_is_a_break() {
        assert_eq!(format_avg_delta(&[1200, 60, 60]), "1m 0s");
    }

    #[test]
    fn fewer_than_two_qualifying_deltas_yields_placeholder() {
        assert_eq!(format_avg_delta(&[]), "---");
        assert_eq!(format_avg_delta(&[300]), "---");
        assert_eq!(format_avg_delta(&[300, 1500]), "---");
    }

    #[test]
    fn stats_group_logs_by_email_or_name() {
        let profiles = vec![profile("ana@example.com", "Ana"), profile("bo@example.com", "Bo")];
        let logs = vec![
            log_at("ana@example.com", 0),
            log_at("ana@example.com", 5),
            // Matches Ana by operator_name even under another email.
            log_at("scanner-station@example.com", 8),
        ];

        let stats = compute_operator_stats(&profiles, &logs);
        assert_eq!(stats[0].total_actions, 3);
        assert_eq!(stats[0].avg_time_per_cart, "4m 0s");
        assert_eq!(stats[1].total_actions, 0);
        assert_eq!(stats[1].avg_time_per_cart, "---");
    }

    #[test]
    fn zone_and_street_keys_come_from_the_code_prefix() {
        assert_eq!(zone_of("U0101A"), Some("U01"));
        assert_eq!(zone_of("U0102B"), Some("U01"));
        assert_eq!(street_of("U0101A"), Some("01"));
        assert_eq!(street_of("U0102B"), Some("02"));
        assert_eq!(zone_of("U0"), None);
    }

    #[test]
    fn heatmap_groups_by_zone_and_counts_sizes() {
        let slots = vec![
            slot("U0101A", "Pequeño", true),
            slot("U0102B", "Grande", true),
            slot("U0201A", "Mediano", true),
            slot("V0101A", "Mediano", false),
        ];
        let report = build_heatmap(&slots);

        assert_eq!(report.total_slots, 4);
        assert_eq!(report.verified_slots, 3);
        assert_eq!(report.verified_percent, 75);

        assert_eq!(report.zones.len(), 3);
        let u01 = report.zones.iter().find(|z| z.zone == "U01").unwrap();
        assert_eq!(u01.total, 2);
        assert_eq!(u01.by_size.pequeno, 1);
        assert_eq!(u01.by_size.grande, 1);
        assert_eq!(u01.streets.len(), 2);

        let v01 = report.zones.iter().find(|z| z.zone == "V01").unwrap();
        assert_eq!(v01.verified_percent, 0);
    }

    #[test]
    fn heatmap_classifies_raw_imported_size_labels() {
        // CSV imports keep the size text as typed; counts must not depend on
        // exact casing or accents.
        let slots = vec![
            slot("U0101A", "grande", true),
            slot("U0101B", "pequeno", true),
            slot("U0101C", " PEQUEÑO ", false),
            slot("U0101D", "jumbo", false),
        ];
        let report = build_heatmap(&slots);

        let u01 = report.zones.iter().find(|z| z.zone == "U01").unwrap();
        assert_eq!(u01.by_size.grande, 1);
        assert_eq!(u01.by_size.pequeno, 2);
        assert_eq!(u01.by_size.mediano, 1);
    }

    #[test]
    fn empty_heatmap_reports_zero_percent() {
        let report = build_heatmap(&[]);
        assert_eq!(report.total_slots, 0);
        assert_eq!(report.verified_percent, 0);
    }
}
