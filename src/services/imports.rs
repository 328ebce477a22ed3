use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::warehouse_slot::{self, Entity as WarehouseSlot};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const DEFAULT_SIZE: &str = "Mediano";

/// One parsed CSV row, ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotImportRecord {
    pub code: String,
    pub size: String,
}

/// Outcome of a bulk import. `overwritten` counts codes that already existed
/// and had their occupancy state reset by the import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub created: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

/// CSV-driven slot import. The input format is a header line followed by
/// `code,size` rows; plain comma splitting, no quoting or escaping.
#[derive(Clone)]
pub struct ImportService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ImportService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Parses and upserts the whole file. Existing slots are overwritten,
    /// including their occupancy fields; the summary makes that visible.
    #[instrument(skip(self, text))]
    pub async fn import(&self, text: &str) -> Result<ImportSummary, ServiceError> {
        let db = &*self.db_pool;
        let (records, skipped) = parse_slot_csv(text);
        let total_rows = records.len() + skipped;

        if records.is_empty() {
            return Ok(ImportSummary {
                total_rows,
                imported: 0,
                created: 0,
                overwritten: 0,
                skipped,
            });
        }

        let codes: Vec<String> = records.iter().map(|r| r.code.clone()).collect();
        let existing: HashSet<String> = WarehouseSlot::find()
            .filter(warehouse_slot::Column::Code.is_in(codes.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|s| s.code)
            .collect();
        let overwritten = records
            .iter()
            .filter(|r| existing.contains(&r.code))
            .count();
        let created = records.len() - overwritten;

        let now = Utc::now();
        let models: Vec<warehouse_slot::ActiveModel> = records
            .iter()
            .map(|r| warehouse_slot::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(r.code.clone()),
                status: Set("empty".to_string()),
                size: Set(r.size.clone()),
                quantity: Set(0),
                is_scanned_once: Set(false),
                last_updated: Set(now),
                created_at: Set(now),
            })
            .collect();

        WarehouseSlot::insert_many(models)
            .on_conflict(
                OnConflict::column(warehouse_slot::Column::Code)
                    .update_columns([
                        warehouse_slot::Column::Status,
                        warehouse_slot::Column::Size,
                        warehouse_slot::Column::Quantity,
                        warehouse_slot::Column::IsScannedOnce,
                        warehouse_slot::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await?;

        info!(
            imported = records.len(),
            created, overwritten, skipped, "slot import finished"
        );
        let _ = self
            .event_sender
            .send(Event::SlotsImported {
                created,
                overwritten,
            })
            .await;

        Ok(ImportSummary {
            total_rows,
            imported: records.len(),
            created,
            overwritten,
            skipped,
        })
    }
}

/// Parses the raw CSV text. Skips the header line, trims and uppercases the
/// code, defaults a missing size to `"Mediano"`, and drops rows with an
/// empty code. Returns the parsed records plus the dropped-row count.
pub fn parse_slot_csv(text: &str) -> (Vec<SlotImportRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;
    let mut seen = HashSet::new();

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split(',');
        let code = parts.next().unwrap_or("").trim().to_uppercase();
        if code.is_empty() {
            skipped += 1;
            continue;
        }
        // Later duplicates win, mirroring upsert order.
        if !seen.insert(code.clone()) {
            records.retain(|r: &SlotImportRecord| r.code != code);
        }
        let size = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SIZE)
            .to_string();
        records.push(SlotImportRecord { code, size });
    }

    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_rows_after_the_header() {
        let text = "code,size\nU0101A,Grande\nU0102B,Pequeño\n";
        let (records, skipped) = parse_slot_csv(text);
        assert_eq!(skipped, 0);
        assert_eq!(
            records,
            vec![
                SlotImportRecord {
                    code: "U0101A".into(),
                    size: "Grande".into()
                },
                SlotImportRecord {
                    code: "U0102B".into(),
                    size: "Pequeño".into()
                },
            ]
        );
    }

    #[rstest]
    #[case(" a01 , grande", "A01", "grande")]
    #[case("b02", "B02", "Mediano")]
    #[case("c03,", "C03", "Mediano")]
    #[case("d04 ,  Pequeño ", "D04", "Pequeño")]
    fn normalizes_code_and_defaults_size(
        #[case] row: &str,
        #[case] code: &str,
        #[case] size: &str,
    ) {
        let text = format!("code,size\n{row}\n");
        let (records, _) = parse_slot_csv(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, code);
        assert_eq!(records[0].size, size);
    }

    #[test]
    fn drops_rows_with_empty_code() {
        let text = "code,size\n,Grande\n  ,Mediano\nU0101A,Grande\n";
        let (records, skipped) = parse_slot_csv(text);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn blank_lines_are_ignored_entirely() {
        let text = "code,size\n\nU0101A,Grande\n\n";
        let (records, skipped) = parse_slot_csv(text);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn later_duplicate_codes_replace_earlier_rows() {
        let text = "code,size\nU0101A,Grande\nu0101a,Pequeño\n";
        let (records, _) = parse_slot_csv(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].size, "Pequeño");
    }

    #[test]
    fn header_only_input_yields_nothing() {
        let (records, skipped) = parse_slot_csv("code,size\n");
        assert!(records.is_empty());
        assert_eq!(skipped, 0);
    }
}
