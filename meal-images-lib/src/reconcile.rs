//! Scanning catalog documents for records without a stored image.
//!
//! A scan walks every record, derives its canonical filename and asks an
//! [`ImageStore`] whether it exists. The result is a list of
//! [`Discrepancy`] values, which can be saved as a JSON report and later fed
//! to [`crate::repair`].

use std::collections::BTreeMap;
use std::path::Path;

use meal_images_core::{CanonicalFilename, CatalogError, Record, folder_name};
use serde::{Deserialize, Serialize};

use crate::availability::{ImageStore, Probe, probe};
use crate::cancel::CancelFlag;
use crate::catalog::CatalogDocument;

/// Why a record was flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscrepancyReason {
    /// Nothing stored under the canonical name or its lowercase variant.
    Missing,
    /// The slot has files, but none with the expected name.
    Mismatched { found: Vec<String> },
}

/// A record whose expected image could not be found.
#[derive(Debug, Clone)]
pub struct Discrepancy {
    /// Document file name, e.g. `maaltijdList.json`.
    pub document: String,
    /// `images_<document base name>`.
    pub folder: String,
    pub position: u32,
    pub record: Record,
    pub expected: CanonicalFilename,
    /// Path or URL that was checked.
    pub location: String,
    pub reason: DiscrepancyReason,
}

impl Discrepancy {
    pub fn report_entry(&self) -> ReportEntry {
        ReportEntry {
            file: self.document.clone(),
            meal: self.record.name.clone(),
            url: self.location.clone(),
        }
    }
}

/// One line of the persisted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub file: String,
    pub meal: String,
    pub url: String,
}

impl ReportEntry {
    /// Image folder and filename this entry refers to.
    ///
    /// The folder comes from the document name, the filename from the last
    /// segment of the checked location (percent-decoded for URLs).
    pub fn target(&self) -> Option<(String, String)> {
        let base = self
            .file
            .strip_suffix(".json")
            .unwrap_or(&self.file)
            .to_string();
        let last = self.url.rsplit(['/', '\\']).next()?;
        if last.is_empty() {
            return None;
        }
        let filename = urlencoding::decode(last)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| last.to_string());
        Some((folder_name(&base), filename))
    }
}

/// Progress updates emitted during a scan.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    Document {
        name: String,
        record_count: usize,
    },
    Checking {
        name: String,
        index: usize,
        total: usize,
    },
    Done,
}

/// Options for [`scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Stop after checking this many records in total.
    pub limit: Option<usize>,
    pub cancel: Option<CancelFlag>,
}

/// Outcome of a scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub discrepancies: Vec<Discrepancy>,
    pub checked: usize,
    pub found: usize,
    /// Records found only under the lowercase variant (also counted in `found`).
    pub found_lowercase: usize,
    /// Records that could not be checked (e.g. a name with no usable characters).
    pub errors: Vec<String>,
    pub cancelled: bool,
}

impl ScanReport {
    pub fn missing(&self) -> usize {
        self.discrepancies
            .iter()
            .filter(|d| d.reason == DiscrepancyReason::Missing)
            .count()
    }

    pub fn mismatched(&self) -> usize {
        self.discrepancies.len() - self.missing()
    }

    pub fn report_entries(&self) -> Vec<ReportEntry> {
        self.discrepancies.iter().map(Discrepancy::report_entry).collect()
    }
}

/// Check every record of every document against `store`.
///
/// Documents are visited in the order given and records in position order, so
/// the discrepancies come out in the same stable order.
pub fn scan(
    documents: &[CatalogDocument],
    store: &dyn ImageStore,
    options: &ScanOptions,
    progress: &dyn Fn(ScanProgress),
) -> ScanReport {
    let mut report = ScanReport::default();

    'documents: for doc in documents {
        let folder = doc.folder_name();
        let total = doc.list.records.len();
        progress(ScanProgress::Document {
            name: doc.file_name(),
            record_count: total,
        });

        for (position, record) in doc.list.positioned() {
            if options.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                report.cancelled = true;
                break 'documents;
            }
            if options.limit.is_some_and(|limit| report.checked >= limit) {
                break 'documents;
            }

            progress(ScanProgress::Checking {
                name: record.name.clone(),
                index: position as usize,
                total,
            });

            let expected = match CanonicalFilename::encode(position, &record.name) {
                Ok(f) => f,
                Err(e) => {
                    report
                        .errors
                        .push(format!("{} record {position}: {e}", doc.file_name()));
                    continue;
                }
            };
            report.checked += 1;

            match probe(store, &folder, &expected) {
                Probe::Exact => report.found += 1,
                Probe::Lowercase => {
                    log::debug!("{}/{} found in lowercase", folder, expected);
                    report.found += 1;
                    report.found_lowercase += 1;
                }
                Probe::Absent => {
                    let reason = match store.slot_occupants(&folder, &expected.prefix()) {
                        Some(found) if !found.is_empty() => {
                            DiscrepancyReason::Mismatched { found }
                        }
                        _ => DiscrepancyReason::Missing,
                    };
                    report.discrepancies.push(Discrepancy {
                        document: doc.file_name(),
                        folder: folder.clone(),
                        position,
                        record: record.clone(),
                        location: store.locate(&folder, &expected.to_string()),
                        expected,
                        reason,
                    });
                }
            }
        }
    }

    progress(ScanProgress::Done);
    report
}

/// Write the report as a pretty JSON array of `{file, meal, url}` objects.
pub fn write_report(path: &Path, entries: &[ReportEntry]) -> Result<(), CatalogError> {
    let mut text = serde_json::to_string_pretty(entries)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<Vec<ReportEntry>, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Expected filenames absent from each image folder, in discovery order.
pub type KnownMissing = BTreeMap<String, Vec<String>>;

/// Group discrepancies by folder.
pub fn known_missing(discrepancies: &[Discrepancy]) -> KnownMissing {
    let mut map = KnownMissing::new();
    for d in discrepancies {
        push_unique(map.entry(d.folder.clone()).or_default(), d.expected.to_string());
    }
    map
}

/// Group persisted report entries by folder. Entries with no usable target are skipped.
pub fn known_missing_from_report(entries: &[ReportEntry]) -> KnownMissing {
    let mut map = KnownMissing::new();
    for entry in entries {
        match entry.target() {
            Some((folder, filename)) => push_unique(map.entry(folder).or_default(), filename),
            None => log::warn!("Report entry for {:?} has no filename", entry.meal),
        }
    }
    map
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
