use super::*;
use std::collections::HashSet;
use std::fs;
use std::sync::Mutex;

use serde_json::json;
use tempfile::TempDir;

use crate::availability::LocalStore;

struct FakeStore(HashSet<String>);

impl ImageStore for FakeStore {
    fn exists(&self, folder: &str, filename: &str) -> bool {
        self.0.contains(&format!("{folder}/{filename}"))
    }

    fn locate(&self, folder: &str, filename: &str) -> String {
        format!("https://host/{}/{}", urlencoding::encode(folder), urlencoding::encode(filename))
    }
}

fn doc(name: &str, meals: &[&str]) -> CatalogDocument {
    let records: Vec<_> = meals.iter().map(|m| json!({"name": m})).collect();
    CatalogDocument::from_value(format!("/catalog/{name}.json"), json!({"meals": records})).unwrap()
}

fn no_progress(_: ScanProgress) {}

#[test]
fn test_scan_reports_missing_in_stable_order() {
    let docs = vec![
        doc("maaltijdList", &["Overnight Oats", "Pizza Rounds"]),
        doc("maaltijdList - Vegan", &["Tofu Bowl"]),
    ];
    let store = FakeStore(
        ["images_maaltijdList/001_Overnight_Oats.jpg".to_string()]
            .into_iter()
            .collect(),
    );

    let report = scan(&docs, &store, &ScanOptions::default(), &no_progress);
    assert_eq!(report.checked, 3);
    assert_eq!(report.found, 1);
    assert_eq!(report.missing(), 2);
    assert_eq!(report.mismatched(), 0);

    let entries = report.report_entries();
    assert_eq!(entries[0].file, "maaltijdList.json");
    assert_eq!(entries[0].meal, "Pizza Rounds");
    assert_eq!(
        entries[0].url,
        "https://host/images_maaltijdList/002_Pizza_Rounds.jpg"
    );
    assert_eq!(entries[1].meal, "Tofu Bowl");
}

#[test]
fn test_scan_counts_lowercase_as_found() {
    let docs = vec![doc("list", &["Pizza Rounds"])];
    let store = FakeStore(
        ["images_list/001_pizza_rounds.jpg".to_string()]
            .into_iter()
            .collect(),
    );
    let report = scan(&docs, &store, &ScanOptions::default(), &no_progress);
    assert!(report.discrepancies.is_empty());
    assert_eq!(report.found_lowercase, 1);
}

#[test]
fn test_scan_respects_limit_and_cancel() {
    let docs = vec![doc("list", &["A", "B", "C"])];
    let store = FakeStore(HashSet::new());

    let limited = scan(
        &docs,
        &store,
        &ScanOptions {
            limit: Some(2),
            cancel: None,
        },
        &no_progress,
    );
    assert_eq!(limited.checked, 2);
    assert!(!limited.cancelled);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let cancelled = scan(
        &docs,
        &store,
        &ScanOptions {
            limit: None,
            cancel: Some(cancel),
        },
        &no_progress,
    );
    assert_eq!(cancelled.checked, 0);
    assert!(cancelled.cancelled);
}

#[test]
fn test_scan_emits_progress() {
    let docs = vec![doc("list", &["A", "B"])];
    let events = Mutex::new(Vec::new());
    scan(
        &docs,
        &FakeStore(HashSet::new()),
        &ScanOptions::default(),
        &|p| {
            let label = match p {
                ScanProgress::Document { record_count, .. } => format!("doc {record_count}"),
                ScanProgress::Checking { index, total, .. } => format!("{index}/{total}"),
                ScanProgress::Done => "done".to_string(),
            };
            events.lock().unwrap().push(label);
        },
    );
    assert_eq!(
        events.into_inner().unwrap(),
        vec!["doc 2", "1/2", "2/2", "done"]
    );
}

#[test]
fn test_scan_local_flags_mismatched_slot() {
    let tmp = TempDir::new().unwrap();
    let folder = tmp.path().join("images_list");
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("001_Old_Name.jpg"), b"x").unwrap();

    let docs = vec![doc("list", &["New Name", "Other"])];
    let report = scan(
        &docs,
        &LocalStore::new(tmp.path()),
        &ScanOptions::default(),
        &no_progress,
    );
    assert_eq!(report.discrepancies.len(), 2);
    assert_eq!(
        report.discrepancies[0].reason,
        DiscrepancyReason::Mismatched {
            found: vec!["001_Old_Name.jpg".to_string()]
        }
    );
    assert_eq!(report.discrepancies[1].reason, DiscrepancyReason::Missing);
}

#[test]
fn test_unusable_name_is_an_error_not_a_panic() {
    let docs = vec![doc("list", &["(!!)", "Toast"])];
    let report = scan(
        &docs,
        &FakeStore(HashSet::new()),
        &ScanOptions::default(),
        &no_progress,
    );
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.checked, 1);
    assert_eq!(report.discrepancies[0].position, 2);
}

#[test]
fn test_report_file_and_known_missing() {
    let tmp = TempDir::new().unwrap();
    let docs = vec![doc("maaltijdList - Vegan", &["Pizza Rounds", "Tofu Bowl"])];
    let report = scan(
        &docs,
        &FakeStore(HashSet::new()),
        &ScanOptions::default(),
        &no_progress,
    );

    let path = tmp.path().join("missing_meal_images.json");
    write_report(&path, &report.report_entries()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {\n    \"file\""));

    let loaded = load_report(&path).unwrap();
    assert_eq!(loaded, report.report_entries());

    let from_scan = known_missing(&report.discrepancies);
    let from_file = known_missing_from_report(&loaded);
    assert_eq!(from_scan, from_file);
    assert_eq!(
        from_file["images_maaltijdList - Vegan"],
        vec!["001_Pizza_Rounds.jpg", "002_Tofu_Bowl.jpg"]
    );
}

#[test]
fn test_report_entry_target_from_local_path() {
    let entry = ReportEntry {
        file: "list.json".to_string(),
        meal: "Toast".to_string(),
        url: "/data/images_list/004_Toast.jpg".to_string(),
    };
    assert_eq!(
        entry.target(),
        Some(("images_list".to_string(), "004_Toast.jpg".to_string()))
    );

    let empty = ReportEntry {
        url: "https://host/".to_string(),
        ..entry
    };
    assert_eq!(empty.target(), None);
}
