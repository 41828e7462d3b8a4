// src/export/logic.rs

use crate::core::AttendanceEngine;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::build_rows;
use crate::storage::KeyValueStore;
use crate::ui::messages::warning;
use chrono::{DateTime, Utc};
use std::path::Path;

/// High-level export logic.
pub struct ExportLogic;

impl ExportLogic {
    /// Export one attendance row per catalog event.
    ///
    /// - `format`: csv | json
    /// - `file`: output path; refused if it exists and `force` is off
    /// - `now`: reference time for the open-session projection
    pub fn export<S: KeyValueStore>(
        engine: &AttendanceEngine<S>,
        format: ExportFormat,
        file: &Path,
        force: bool,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let rows = build_rows(engine, now);

        if rows.is_empty() {
            warning("No events to export.");
            return Ok(0);
        }

        ensure_writable(file, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, file)?,
            ExportFormat::Json => export_json(&rows, file)?,
        }

        Ok(rows.len())
    }
}
