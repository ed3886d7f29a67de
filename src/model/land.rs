use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One land-acquisition stage document. All six stages share this row shape:
/// the stage-specific fields live in the schemaless `data` JSON document and
/// `workflow_history` accumulates free-form transition entries.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct StageRow {
    pub id: u64,
    /// Auto-assigned reference like `LI-2026-0001`.
    pub stage_number: String,
    pub status: String,
    /// Row id of the preceding stage document, absent for the pipeline head.
    #[schema(nullable = true)]
    pub parent_id: Option<u64>,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    #[schema(value_type = Object)]
    pub workflow_history: serde_json::Value,
    pub created_by: Option<u64>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Static configuration driving the generic stage handlers: which table,
/// what the rows are called, the reference-number prefix, which JSON paths
/// free-text search covers, and which stage (if any) must precede this one.
pub struct StageConfig {
    pub table: &'static str,
    pub display_name: &'static str,
    pub number_prefix: &'static str,
    /// JSON paths inside `data` included in free-text search.
    pub search_paths: &'static [&'static str],
    /// Table holding the parent stage rows, if this stage has one.
    pub parent_table: Option<&'static str>,
}

impl StageConfig {
    pub fn format_number(&self, year: i32, seq: u64) -> String {
        format!("{}-{}-{:04}", self.number_prefix, year, seq)
    }

    /// `stage_number LIKE ? OR JSON search over the configured paths`.
    pub fn search_sql(&self) -> String {
        let mut clauses = vec!["stage_number LIKE ?".to_string()];
        for path in self.search_paths {
            clauses.push(format!(
                "JSON_UNQUOTE(JSON_EXTRACT(data, '{path}')) LIKE ?"
            ));
        }
        format!("({})", clauses.join(" OR "))
    }

    /// Number of `?` placeholders `search_sql` expects.
    pub fn search_bind_count(&self) -> usize {
        1 + self.search_paths.len()
    }
}

pub static LAND_IDENTIFICATION: StageConfig = StageConfig {
    table: "land_identifications",
    display_name: "Land Identification",
    number_prefix: "LI",
    search_paths: &[
        "$.mauza_identification.mauza_name",
        "$.patwari_contact.patwari_name",
        "$.owner_details.owner_name",
    ],
    parent_table: None,
};

pub static RECORD_VERIFICATION: StageConfig = StageConfig {
    table: "record_verifications",
    display_name: "Record Verification",
    number_prefix: "RV",
    search_paths: &[
        "$.jamabandi.record_details.owner_name",
        "$.fard.fard_details.mauza_name",
    ],
    parent_table: Some("land_identifications"),
};

pub static KHASRA_MAPPING: StageConfig = StageConfig {
    table: "khasra_mappings",
    display_name: "Khasra Mapping",
    number_prefix: "KM",
    search_paths: &["$.khasras.khasra_number", "$.shajra.shajra_number"],
    parent_table: Some("record_verifications"),
};

pub static DEMARCATION: StageConfig = StageConfig {
    table: "demarcations",
    display_name: "Demarcation",
    number_prefix: "DM",
    search_paths: &["$.survey.surveyor_name", "$.boundary.description"],
    parent_table: Some("khasra_mappings"),
};

pub static OWNER_DUE_DILIGENCE: StageConfig = StageConfig {
    table: "owner_due_diligences",
    display_name: "Owner Due Diligence",
    number_prefix: "ODD",
    search_paths: &["$.owner.owner_name", "$.owner.cnic"],
    parent_table: Some("demarcations"),
};

pub static NEGOTIATION_BAYANA: StageConfig = StageConfig {
    table: "negotiation_bayanas",
    display_name: "Negotiation & Bayana",
    number_prefix: "NB",
    search_paths: &["$.negotiation.negotiator_name", "$.bayana.receipt_number"],
    parent_table: Some("owner_due_diligences"),
};

/// The pipeline in order, for route registration.
pub static ALL_STAGES: [(&str, &StageConfig); 6] = [
    ("land-identification", &LAND_IDENTIFICATION),
    ("record-verification", &RECORD_VERIFICATION),
    ("khasra-mapping", &KHASRA_MAPPING),
    ("demarcation", &DEMARCATION),
    ("owner-due-diligence", &OWNER_DUE_DILIGENCE),
    ("negotiation-bayana", &NEGOTIATION_BAYANA),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_numbers_are_prefixed_and_padded() {
        assert_eq!(LAND_IDENTIFICATION.format_number(2026, 7), "LI-2026-0007");
        assert_eq!(
            NEGOTIATION_BAYANA.format_number(2026, 1234),
            "NB-2026-1234"
        );
    }

    #[test]
    fn search_sql_covers_number_and_json_paths() {
        let sql = KHASRA_MAPPING.search_sql();
        assert!(sql.starts_with("(stage_number LIKE ?"));
        assert!(sql.contains("$.khasras.khasra_number"));
        assert_eq!(KHASRA_MAPPING.search_bind_count(), 3);
    }

    #[test]
    fn pipeline_is_linear() {
        // Each stage's parent is the table of the stage before it.
        for pair in ALL_STAGES.windows(2) {
            assert_eq!(pair[1].1.parent_table, Some(pair[0].1.table));
        }
        assert!(ALL_STAGES[0].1.parent_table.is_none());
    }
}
