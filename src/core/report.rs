//! Plain-text production report for a single aircraft

use rust_embed::Embed;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::Tera;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::{registry, workflow};
use crate::entities::aircraft::Aircraft;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const REPORT_TEMPLATE: &str = "report.txt.tera";

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("report template missing: {0}")]
    #[diagnostic(code(hangar::report::template_missing))]
    TemplateMissing(String),

    #[error("report rendering failed: {0}")]
    #[diagnostic(code(hangar::report::render))]
    Render(String),

    #[error("cannot name a report after aircraft code '{0}'")]
    #[diagnostic(code(hangar::report::invalid_code))]
    InvalidCode(String),

    #[error("failed to write report {path}: {source}")]
    #[diagnostic(code(hangar::report::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct ReportView<'a> {
    code: &'a str,
    model: &'a str,
    category: String,
    capacity: u32,
    range_km: u32,
    parts: Vec<PartRow<'a>>,
    stages: Vec<StageRow<'a>>,
    tests: Vec<TestRow>,
    release: String,
}

#[derive(Serialize)]
struct PartRow<'a> {
    name: &'a str,
    category: String,
    supplier: &'a str,
    status: String,
}

#[derive(Serialize)]
struct StageRow<'a> {
    name: &'a str,
    deadline_days: u32,
    status: String,
    employees: String,
}

#[derive(Serialize)]
struct TestRow {
    kind: String,
    outcome: String,
}

impl<'a> ReportView<'a> {
    fn of(aircraft: &'a Aircraft) -> Self {
        let gate = workflow::release_gate(&aircraft.tests);
        let release = if gate.is_clear() {
            "ready".to_string()
        } else {
            let kinds: Vec<String> = gate.blocking.iter().map(|k| k.to_string()).collect();
            format!("blocked by {}", kinds.join(", "))
        };

        Self {
            code: &aircraft.code,
            model: &aircraft.model,
            category: aircraft.category.to_string(),
            capacity: aircraft.capacity,
            range_km: aircraft.range_km,
            parts: aircraft
                .parts
                .iter()
                .map(|p| PartRow {
                    name: &p.name,
                    category: p.category.to_string(),
                    supplier: &p.supplier,
                    status: p.status.to_string(),
                })
                .collect(),
            stages: aircraft
                .stages
                .iter()
                .map(|s| StageRow {
                    name: &s.name,
                    deadline_days: s.deadline_days,
                    status: s.status.to_string(),
                    employees: s
                        .employees
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect(),
            tests: aircraft
                .tests
                .iter()
                .map(|t| TestRow {
                    kind: t.kind.to_string(),
                    outcome: t.outcome.to_string(),
                })
                .collect(),
            release,
        }
    }
}

fn engine() -> Result<Tera, ReportError> {
    let mut tera = Tera::default();
    for file in EmbeddedTemplates::iter() {
        let filename = file.as_ref();
        if let Some(content) = EmbeddedTemplates::get(filename) {
            if let Ok(template_str) = std::str::from_utf8(&content.data) {
                tera.add_raw_template(filename, template_str)
                    .map_err(|e| ReportError::Render(e.to_string()))?;
            }
        }
    }
    Ok(tera)
}

/// Render the report text for an aircraft
pub fn render_report(aircraft: &Aircraft) -> Result<String, ReportError> {
    let tera = engine()?;
    if !tera.get_template_names().any(|n| n == REPORT_TEMPLATE) {
        return Err(ReportError::TemplateMissing(REPORT_TEMPLATE.to_string()));
    }

    let context = tera::Context::from_serialize(ReportView::of(aircraft))
        .map_err(|e| ReportError::Render(e.to_string()))?;
    tera.render(REPORT_TEMPLATE, &context)
        .map_err(|e| ReportError::Render(e.to_string()))
}

/// File name a report for `code` is written under
pub fn report_file_name(code: &str) -> String {
    format!("report_{}.txt", code)
}

/// Render and write `report_<CODE>.txt` into `dir`, returning its path
pub fn write_report(dir: &Path, aircraft: &Aircraft) -> Result<PathBuf, ReportError> {
    if registry::validate_code(&aircraft.code).is_err() {
        return Err(ReportError::InvalidCode(aircraft.code.clone()));
    }
    let text = render_report(aircraft)?;

    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(report_file_name(&aircraft.code));
    std::fs::write(&path, text).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(aircraft = %aircraft.code, path = %path.display(), "report written");
    Ok(path)
}
