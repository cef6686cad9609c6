//! Rendering of scan results: the plain-text field list, the CSV profile
//! table, and a JSON report.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::document::FieldPath;
use crate::scan::{FieldProfile, ProfileSummary, ScanLimit, TypeCounts};

pub const PROFILE_REPORT_VERSION_V1: &str = "profile_report_v1";

pub const CSV_HEADER: [&str; 7] = [
    "field_name",
    "total_docs",
    "present_count",
    "non_null_count",
    "missing_count",
    "missing_pct",
    "types_summary",
];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One path per line, sorted, no trailing newline.
pub fn render_field_list(fields: &[FieldPath]) -> String {
    let mut sorted: Vec<&str> = fields.iter().map(FieldPath::as_str).collect();
    sorted.sort_unstable();
    sorted.join("\n")
}

pub fn write_field_list<W: Write>(mut out: W, fields: &[FieldPath]) -> Result<(), ReportError> {
    out.write_all(render_field_list(fields).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// `missing_pct` as written to the table: two decimals.
pub fn format_missing_pct(profile: &FieldProfile) -> String {
    format!("{:.2}", profile.missing_pct())
}

/// Write the profile table (header plus one row per profile, in the given
/// order).
pub fn write_profile_csv<W: Write>(out: W, profiles: &[FieldProfile]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for p in profiles {
        writer.write_record([
            p.field.to_string(),
            p.total_docs.to_string(),
            p.present_count.to_string(),
            p.non_null_count.to_string(),
            p.missing_count().to_string(),
            format_missing_pct(p),
            p.types_summary(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// JSON report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReportV1 {
    pub version: String,
    pub generated_at_unix_secs: u64,
    pub source: String,
    pub scan_limit: Option<u64>,
    pub total_docs: u64,
    pub fields: Vec<ProfileRowV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRowV1 {
    pub field_name: String,
    pub total_docs: u64,
    pub present_count: u64,
    pub non_null_count: u64,
    pub missing_count: u64,
    /// Rounded to two decimals.
    pub missing_pct: f64,
    pub type_counts: TypeCounts,
}

impl From<&FieldProfile> for ProfileRowV1 {
    fn from(p: &FieldProfile) -> Self {
        Self {
            field_name: p.field.to_string(),
            total_docs: p.total_docs,
            present_count: p.present_count,
            non_null_count: p.non_null_count,
            missing_count: p.missing_count(),
            missing_pct: (p.missing_pct() * 100.0).round() / 100.0,
            type_counts: p.type_counts.clone(),
        }
    }
}

impl ProfileReportV1 {
    pub fn new(
        source: impl Into<String>,
        scan_limit: ScanLimit,
        summary: &ProfileSummary,
        generated_at_unix_secs: u64,
    ) -> Self {
        Self {
            version: PROFILE_REPORT_VERSION_V1.to_string(),
            generated_at_unix_secs,
            source: source.into(),
            scan_limit: scan_limit.max_documents(),
            total_docs: summary.total_docs,
            fields: summary.profiles.iter().map(ProfileRowV1::from).collect(),
        }
    }

    pub fn write_json<W: Write>(&self, mut out: W) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(field: &str, total: u64, present: u64, types: &[(&str, u64)]) -> FieldProfile {
        FieldProfile {
            field: FieldPath::new(field),
            total_docs: total,
            present_count: present,
            non_null_count: present,
            type_counts: types.iter().map(|(t, c)| (*t, *c)).collect(),
        }
    }

    #[test]
    fn field_list_is_sorted_and_newline_joined() {
        let fields = vec![FieldPath::new("tags"), FieldPath::new("id"), FieldPath::new("a.b")];
        assert_eq!(render_field_list(&fields), "a.b\nid\ntags");
        assert_eq!(render_field_list(&[]), "");
    }

    #[test]
    fn csv_rows_carry_derived_columns() {
        let profiles = vec![
            profile("id", 3, 3, &[("int", 3)]),
            profile("tags", 3, 2, &[("string", 1), ("array", 2)]),
        ];
        let mut buf = Vec::new();
        write_profile_csv(&mut buf, &profiles).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "field_name,total_docs,present_count,non_null_count,missing_count,missing_pct,types_summary"
        );
        assert_eq!(lines[1], "id,3,3,3,0,0.00,int=3");
        assert_eq!(lines[2], "tags,3,2,2,1,33.33,array=2; string=1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn missing_pct_is_rendered_with_two_decimals() {
        assert_eq!(format_missing_pct(&profile("f", 100, 0, &[])), "100.00");
        assert_eq!(format_missing_pct(&profile("f", 100, 100, &[])), "0.00");
        assert_eq!(format_missing_pct(&profile("f", 0, 0, &[])), "0.00");
    }

    #[test]
    fn json_report_rounds_and_keeps_order() {
        let summary = ProfileSummary {
            total_docs: 3,
            profiles: vec![
                profile("a", 3, 1, &[("string", 1)]),
                profile("b", 3, 3, &[("bool", 3)]),
            ],
        };
        let report = ProfileReportV1::new("users.jsonl", ScanLimit::from_signed(10), &summary, 42);
        assert_eq!(report.version, PROFILE_REPORT_VERSION_V1);
        assert_eq!(report.scan_limit, Some(10));
        assert_eq!(report.fields[0].missing_pct, 66.67);
        assert_eq!(report.fields[1].field_name, "b");

        let mut buf = Vec::new();
        report.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["fields"][0]["type_counts"]["string"], 1);
        assert_eq!(value["total_docs"], 3);
    }
}
