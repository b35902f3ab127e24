use super::*;
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_meals_document() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "maaltijdList.json",
        r#"{"meals": [{"name": "Overnight Oats", "ingredients": ["oats", "milk"]}, {"name": "Toast"}]}"#,
    );

    let doc = load_document(&path).unwrap();
    assert_eq!(doc.key, DocumentKey::Meals);
    assert_eq!(doc.base_name(), "maaltijdList");
    assert_eq!(doc.file_name(), "maaltijdList.json");
    assert_eq!(doc.folder_name(), "images_maaltijdList");
    assert_eq!(doc.list.records.len(), 2);
    assert_eq!(doc.list.records[0].ingredients(), ["oats", "milk"]);
    assert!(doc.list.records[1].ingredients.is_none());
}

#[test]
fn test_load_productlist_document() {
    let doc = CatalogDocument::from_value(
        "/x/boodschappen.json",
        json!({"productlist": [{"name": "Apples"}]}),
    )
    .unwrap();
    assert_eq!(doc.key, DocumentKey::ProductList);
    assert_eq!(doc.list.records[0].name, "Apples");
}

#[test]
fn test_rejects_missing_key() {
    let err = CatalogDocument::from_value("/x/a.json", json!({"items": []})).unwrap_err();
    assert!(matches!(err, CatalogError::Format(_)));
}

#[test]
fn test_rejects_bad_records_with_position() {
    let cases = [
        json!({"meals": [{"name": "Ok"}, {"title": "x"}]}),
        json!({"meals": [{"name": "Ok"}, {"name": "  "}]}),
        json!({"meals": [{"name": "Ok"}, {"name": 12}]}),
        json!({"meals": [{"name": "Ok"}, "just a string"]}),
        json!({"meals": [{"name": "Ok"}, {"name": "Bad", "ingredients": "oats"}]}),
        json!({"meals": [{"name": "Ok"}, {"name": "Bad", "ingredients": [1]}]}),
    ];
    for value in cases {
        let err = CatalogDocument::from_value("/x/list.json", value.clone()).unwrap_err();
        match err {
            CatalogError::Format(msg) => {
                assert!(msg.contains("list: record 2"), "{msg} for {value}");
            }
            other => panic!("unexpected error {other:?} for {value}"),
        }
    }
}

#[test]
fn test_null_ingredients_is_absent() {
    let doc = CatalogDocument::from_value(
        "/x/a.json",
        json!({"meals": [{"name": "Soup", "ingredients": null}]}),
    )
    .unwrap();
    assert!(doc.list.records[0].ingredients.is_none());
}

#[test]
fn test_discover_sorted_and_filtered() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "maaltijdList - Vegan.json", "{}");
    write(tmp.path(), "maaltijdList.json", "{}");
    write(tmp.path(), "boodschappen.json", "{}");
    write(tmp.path(), "notes.txt", "");
    fs::create_dir(tmp.path().join("images_maaltijdList")).unwrap();

    let all = discover_documents(tmp.path(), None).unwrap();
    let names: Vec<_> = all
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "boodschappen.json",
            "maaltijdList - Vegan.json",
            "maaltijdList.json"
        ]
    );

    let filtered = discover_documents(tmp.path(), Some("MAALTIJD")).unwrap();
    assert_eq!(filtered.len(), 2);
}

#[test]
fn test_load_all_isolates_failures() {
    let tmp = TempDir::new().unwrap();
    let good = write(tmp.path(), "a.json", r#"{"meals": [{"name": "Toast"}]}"#);
    let broken = write(tmp.path(), "b.json", "{not json");
    let wrong = write(tmp.path(), "c.json", r#"{"meals": [{}]}"#);

    let outcome = load_all(&[good, broken.clone(), wrong.clone()]);
    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].0, broken);
    assert!(matches!(outcome.failures[0].1, CatalogError::Json(_)));
    assert_eq!(outcome.failures[1].0, wrong);
    assert!(matches!(outcome.failures[1].1, CatalogError::Format(_)));
}

#[test]
fn test_rename_preserves_other_fields_and_order() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        tmp.path(),
        "maaltijdList.json",
        r#"{"version": 3, "meals": [{"name": "Old Name", "kcal": 410, "ingredients": ["Crème"]}]}"#,
    );

    let mut doc = load_document(&path).unwrap();
    doc.rename_record(1, "New Name").unwrap();
    save_document(&doc).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\"Crème\""));
    assert!(text.find("\"version\"").unwrap() < text.find("\"meals\"").unwrap());
    assert!(text.find("\"name\"").unwrap() < text.find("\"kcal\"").unwrap());

    let reloaded = load_document(&path).unwrap();
    assert_eq!(reloaded.list.records[0].name, "New Name");
    let raw: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw["meals"][0]["kcal"], 410);
}

#[test]
fn test_rename_rejects_bad_position() {
    let mut doc =
        CatalogDocument::from_value("/x/a.json", json!({"meals": [{"name": "Toast"}]})).unwrap();
    assert!(doc.rename_record(0, "X").is_err());
    assert!(doc.rename_record(2, "X").is_err());
    assert!(doc.rename_record(1, " ").is_err());
    assert_eq!(doc.list.records[0].name, "Toast");
}
