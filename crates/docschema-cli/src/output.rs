//! Files written by `docschema profile` and `docschema fields --out`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use docschema_profile::{
    write_field_list, write_profile_csv, FieldPath, FieldProfile, ProfileReportV1,
};

pub const FIELDS_FILE: &str = "schema_fields.txt";
pub const PROFILE_FILE: &str = "schema_profile.csv";
pub const REPORT_FILE: &str = "schema_profile.json";

fn create(output_dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = output_dir.join(name);
    let out = create_file(&path)?;
    Ok((path, out))
}

/// Create (or truncate) `path`, creating missing parent directories.
fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// `schema_fields.txt`: one path per line.
pub fn write_schema_fields(fields: &[FieldPath], output_dir: &Path) -> Result<PathBuf> {
    let (path, out) = create(output_dir, FIELDS_FILE)?;
    write_field_list(out, fields).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// The field list written to an arbitrary file (`docschema fields --out`).
pub fn write_fields_to(fields: &[FieldPath], path: &Path) -> Result<()> {
    let out = create_file(path)?;
    write_field_list(out, fields).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// `schema_profile.csv`: one row per profiled path.
pub fn write_schema_profile(profiles: &[FieldProfile], output_dir: &Path) -> Result<PathBuf> {
    let (path, out) = create(output_dir, PROFILE_FILE)?;
    write_profile_csv(out, profiles).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn write_profile_report(report: &ProfileReportV1, output_dir: &Path) -> Result<PathBuf> {
    let (path, out) = create(output_dir, REPORT_FILE)?;
    report
        .write_json(out)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
