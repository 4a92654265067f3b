//! Record source over a directory of per-datatype CSV exports.
//!
//! Layout:
//!
//! - `subjects.csv`: `subject_label`, `sub_group`, `gender_text` and an
//!   optional `project` column;
//! - one `<datatype>.csv` per experiment datatype, named after the datatype
//!   with its `:` replaced by `_` (`opex_cantabDMS.csv` holds
//!   `opex:cantabDMS`), with a `subject_label` column and an optional `date`
//!   column. Each row is one experiment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::dates::{find_column, normalize_header, parse_visit_date};
use crate::error::SourceError;
use crate::source::{RecordSource, SubjectCounts, SubjectInfo};

pub const SUBJECTS_FILE: &str = "subjects.csv";

const SUBJECT_ALIASES: &[&str] = &["subject_label", "Subject"];
const GROUP_ALIASES: &[&str] = &["sub_group", "Group"];
const SEX_ALIASES: &[&str] = &["gender_text", "gender", "M/F"];
const PROJECT_ALIASES: &[&str] = &["project"];
const DATE_ALIASES: &[&str] = &["date"];

#[derive(Debug, Clone)]
struct ExportSubject {
    info: SubjectInfo,
    project: Option<String>,
}

/// Export directory loaded into memory.
#[derive(Debug, Clone)]
pub struct ExportDirectory {
    root: PathBuf,
    subjects: Vec<ExportSubject>,
    counts: BTreeMap<String, SubjectCounts>,
}

impl ExportDirectory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::Unreachable(format!(
                "export directory {} not found",
                root.display()
            )));
        }
        let subjects = read_subjects(&root.join(SUBJECTS_FILE))?;

        let mut counts: BTreeMap<String, SubjectCounts> = BTreeMap::new();
        let mut datatypes = 0usize;
        for path in list_datatype_files(&root)? {
            let Some(source_type) = datatype_for_file(&path) else {
                continue;
            };
            read_datatype_file(&path, &source_type, &mut counts)?;
            datatypes += 1;
        }
        info!(
            root = %root.display(),
            subjects = subjects.len(),
            datatypes,
            "opened export directory"
        );
        Ok(Self {
            root,
            subjects,
            counts,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RecordSource for ExportDirectory {
    fn subjects(&self, study_id: &str) -> Result<Vec<SubjectInfo>, SourceError> {
        let subjects: Vec<SubjectInfo> = self
            .subjects
            .iter()
            .filter(|subject| {
                subject
                    .project
                    .as_deref()
                    .is_none_or(|project| project == study_id)
            })
            .map(|subject| subject.info.clone())
            .collect();
        if subjects.is_empty() && !self.subjects.is_empty() {
            warn!(study_id, "no exported subjects belong to this study");
        }
        Ok(subjects)
    }

    fn experiment_counts(
        &self,
        _study_id: &str,
        subject: &SubjectInfo,
    ) -> Result<SubjectCounts, SourceError> {
        Ok(self
            .counts
            .get(&subject.subject_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// `opex_cantabDMS.csv` -> `opex:cantabDMS`.
fn datatype_for_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (namespace, name) = stem.split_once('_')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("{namespace}:{name}"))
}

fn list_datatype_files(root: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let entries = fs::read_dir(root).map_err(|source| SourceError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let is_subjects = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(SUBJECTS_FILE));
        if path.is_file() && is_csv && !is_subjects {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn open_export(path: &Path) -> Result<(Vec<String>, Vec<StringRecord>), SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|error| SourceError::csv(path, error))?;
    let headers = reader
        .headers()
        .map_err(|error| SourceError::csv(path, error))?
        .iter()
        .map(normalize_header)
        .collect();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| SourceError::csv(path, error))?;
    Ok((headers, rows))
}

fn read_subjects(path: &Path) -> Result<Vec<ExportSubject>, SourceError> {
    if !path.is_file() {
        return Err(SourceError::Unreachable(format!(
            "subject listing {} not found",
            path.display()
        )));
    }
    let (headers, rows) = open_export(path)?;
    let subject =
        find_column(&headers, SUBJECT_ALIASES).ok_or_else(|| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: "subject_label",
        })?;
    let group = find_column(&headers, GROUP_ALIASES);
    let sex = find_column(&headers, SEX_ALIASES);
    let project_column = find_column(&headers, PROJECT_ALIASES);
    let optional = |row: &StringRecord, index: Option<usize>| {
        index
            .and_then(|index| row.get(index))
            .unwrap_or("")
            .to_string()
    };

    let mut subjects = Vec::with_capacity(rows.len());
    for row in &rows {
        let subject_id = row.get(subject).unwrap_or("");
        if subject_id.is_empty() {
            continue;
        }
        let project = Some(optional(row, project_column)).filter(|value| !value.is_empty());
        subjects.push(ExportSubject {
            info: SubjectInfo::new(subject_id, optional(row, group), optional(row, sex)),
            project,
        });
    }
    Ok(subjects)
}

fn read_datatype_file(
    path: &Path,
    source_type: &str,
    counts: &mut BTreeMap<String, SubjectCounts>,
) -> Result<(), SourceError> {
    let (headers, rows) = open_export(path)?;
    let subject =
        find_column(&headers, SUBJECT_ALIASES).ok_or_else(|| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: "subject_label",
        })?;
    let date = find_column(&headers, DATE_ALIASES);
    if date.is_none() {
        debug!(path = %path.display(), "export has no date column, first visits ignore it");
    }
    for row in &rows {
        let subject_id = row.get(subject).unwrap_or("");
        if subject_id.is_empty() {
            continue;
        }
        let raw_date = date.and_then(|index| row.get(index)).unwrap_or("");
        let visit = match parse_visit_date(raw_date) {
            Ok(visit) => visit,
            Err(()) => {
                warn!(
                    path = %path.display(),
                    subject_id,
                    value = raw_date,
                    "unreadable experiment date, counted without date"
                );
                None
            }
        };
        counts
            .entry(subject_id.to_string())
            .or_default()
            .record(source_type, visit);
    }
    Ok(())
}
