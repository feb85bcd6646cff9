//! Export writer.
//!
//! Each export is a new pretty-printed JSON file; existing exports are
//! never overwritten.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::types::export::ExportRecord;

/// Directory used when none is configured.
pub const DEFAULT_EXPORT_DIR: &str = "n8n_exports";

/// Upper bound on `_<n>` suffixes tried for one timestamp.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes [`ExportRecord`]s into a directory.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    dir: PathBuf,
}

impl Default for ExportWriter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_DIR)
    }
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the export directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Write `export` to a fresh file and return its path.
    pub fn write(&self, export: &ExportRecord) -> Result<PathBuf, ExportError> {
        self.ensure_dir()?;
        let json = serde_json::to_vec_pretty(export)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = export_file_name(&export.record.company_name, export.exported_at, attempt);
            let path = self.dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Export name taken, trying next suffix");
                    continue;
                }
                Err(source) => return Err(ExportError::Io { path, source }),
            };

            file.write_all(&json)
                .and_then(|_| file.flush())
                .map_err(|source| ExportError::Io {
                    path: path.clone(),
                    source,
                })?;

            info!(
                path = %path.display(),
                company = %export.record.company_name,
                "Export written"
            );
            return Ok(path);
        }

        Err(ExportError::Io {
            path: self.dir.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free export file name for this timestamp",
            ),
        })
    }
}

/// Keep only alphanumerics, space, hyphen and underscore, then trim
/// trailing whitespace.
pub fn sanitize_company_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `export_<company>_<YYYYMMDD_HHMMSS>.json`, with `_<n>` appended for
/// `attempt > 0`.
pub fn export_file_name(company_name: &str, at: DateTime<Utc>, attempt: usize) -> String {
    let mut company = sanitize_company_name(company_name);
    if company.is_empty() {
        company = "unnamed".to_string();
    }
    let stamp = at.format("%Y%m%d_%H%M%S");

    if attempt == 0 {
        format!("export_{company}_{stamp}.json")
    } else {
        format!("export_{company}_{stamp}_{attempt}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::email::{EmailKind, GeneratedEmail};
    use crate::types::record::ProspectRecord;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-17T09:05:03Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn export(company: &str) -> ExportRecord {
        ExportRecord::new(
            ProspectRecord::new(company, "Jo", "jo@acme.com", "https://acme.example", "li"),
            None,
        )
        .with_exported_at(at())
    }

    #[test]
    fn test_sanitize_company_name() {
        assert_eq!(sanitize_company_name("Acme/Corp!"), "AcmeCorp");
        assert_eq!(sanitize_company_name("Acme Corp"), "Acme Corp");
        assert_eq!(sanitize_company_name("Foo-Bar_Baz  "), "Foo-Bar_Baz");
        assert_eq!(sanitize_company_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_company_name("Café Ünïcode"), "Café Ünïcode");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Acme/Corp!", at(), 0),
            "export_AcmeCorp_20261017_090503.json"
        );
        assert_eq!(
            export_file_name("Acme Corp", at(), 2),
            "export_Acme Corp_20261017_090503_2.json"
        );
        assert_eq!(
            export_file_name("!!!", at(), 0),
            "export_unnamed_20261017_090503.json"
        );
    }

    #[test]
    fn test_write_creates_directory_and_json() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(tmp.path().join("nested").join("exports"));

        let record = export("Acme")
            .with_cold_email(Some(GeneratedEmail::new("Hello Jo", EmailKind::Initial)));
        let path = writer.write(&record).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "export_Acme_20261017_090503.json"
        );
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"company_data\""));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["cold_email"], "Hello Jo");
        assert_eq!(json["follow_up_email"], "No follow-up generated");
        assert_eq!(json["company_data"]["head_email"], "jo@acme.com");
    }

    #[test]
    fn test_successive_exports_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(tmp.path());

        let first = writer.write(&export("Acme")).unwrap();
        let second = writer.write(&export("Acme")).unwrap();

        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "export_Acme_20261017_090503_1.json"
        );
    }

    #[test]
    fn test_unwritable_directory_is_export_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let err = ExportWriter::new(&blocker).write(&export("Acme")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
