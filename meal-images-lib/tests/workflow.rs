use std::fs;
use std::path::Path;

use meal_images_lib::catalog::{discover_documents, load_all};
use meal_images_lib::normalize::{ReplacementRule, apply_replacements, compute_replacements};
use meal_images_lib::reconcile::{known_missing_from_report, load_report, write_report};
use meal_images_lib::repair::{RepairOptions, repair};
use meal_images_lib::{LocalStore, ScanOptions, scan};
use serde_json::json;
use tempfile::TempDir;

fn write_meals(root: &Path, name: &str, meals: &[&str]) {
    let records: Vec<_> = meals.iter().map(|m| json!({"name": m})).collect();
    fs::write(
        root.join(format!("{name}.json")),
        serde_json::to_string_pretty(&json!({ "meals": records })).unwrap(),
    )
    .unwrap();
}

fn filler(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Meal {i}")).collect()
}

#[test]
fn scan_report_repair_rescan() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let mut meals = filler(18);
    meals.push("Pizza Rounds".to_string());
    let refs: Vec<&str> = meals.iter().map(String::as_str).collect();
    write_meals(root, "maaltijdList", &refs);

    let folder = root.join("images_maaltijdList");
    fs::create_dir(&folder).unwrap();
    for i in 1..=18 {
        fs::write(folder.join(format!("{i:03}_Meal_{i}.jpg")), b"img").unwrap();
    }

    let paths = discover_documents(root, None).unwrap();
    let loaded = load_all(&paths);
    assert!(loaded.failures.is_empty());

    let store = LocalStore::new(root);
    let report = scan(&loaded.documents, &store, &ScanOptions::default(), &|_| {});
    assert_eq!(report.discrepancies.len(), 1);
    let missing = &report.discrepancies[0];
    assert_eq!(missing.position, 19);
    assert_eq!(missing.expected.to_string(), "019_Pizza_Rounds.jpg");

    let entries = report.report_entries();
    assert_eq!(entries[0].file, "maaltijdList.json");
    assert_eq!(entries[0].meal, "Pizza Rounds");
    let report_path = root.join("missing_meal_images.json");
    write_report(&report_path, &entries).unwrap();

    let known = known_missing_from_report(&load_report(&report_path).unwrap());
    let summary = repair(root, &known, &RepairOptions::default());
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert_eq!(summary.placeholders_written, 1);
    assert_eq!(fs::read(folder.join("019_Pizza_Rounds.jpg")).unwrap(), b"img");

    let again = repair(root, &known, &RepairOptions::default());
    assert_eq!(again.placeholders_written, 0);
    assert_eq!(again.deleted, 0);

    // report file is not a catalog document
    let paths: Vec<_> = discover_documents(root, None)
        .unwrap()
        .into_iter()
        .filter(|p| p != &report_path)
        .collect();
    let rescanned = scan(&load_all(&paths).documents, &store, &ScanOptions::default(), &|_| {});
    assert!(rescanned.discrepancies.is_empty());
}

#[test]
fn shorten_longest_across_documents() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let long = "Strawberry Ice Cream and Whipped Topping Deluxe";
    write_meals(root, "maaltijdList", &["Toast", long]);
    write_meals(root, "maaltijdList - Vegan", &[long, "Soup"]);
    write_meals(root, "maaltijdList - Keto", &["Eggs", "Bacon", long]);
    write_meals(root, "boodschappen", &["Apples"]);
    let untouched_before = fs::read_to_string(root.join("boodschappen.json")).unwrap();

    let mut docs = load_all(&discover_documents(root, None).unwrap()).documents;
    let rule = ReplacementRule::Longest {
        count: 1,
        replacements: vec!["Berry Ice Cream".to_string()],
    };
    let map = compute_replacements(&docs, &rule).unwrap();
    let summary = apply_replacements(&mut docs, &map);

    assert!(summary.errors.is_empty());
    assert_eq!(summary.records_updated, 3);
    assert_eq!(summary.documents_updated.len(), 3);
    assert_eq!(
        fs::read_to_string(root.join("boodschappen.json")).unwrap(),
        untouched_before
    );

    let reloaded = load_all(&discover_documents(root, None).unwrap()).documents;
    for doc in &reloaded {
        assert!(doc.list.records.iter().all(|r| r.name != long));
    }
    let keto = reloaded
        .iter()
        .find(|d| d.base_name() == "maaltijdList - Keto")
        .unwrap();
    assert_eq!(keto.list.records[2].name, "Berry Ice Cream");
    assert!(summary
        .renamed
        .iter()
        .any(|r| r.new_filename.as_deref() == Some("003_Berry_Ice_Cream.jpg")));
}
