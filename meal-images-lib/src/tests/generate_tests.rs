use super::*;
use std::cell::RefCell;

use image::{ImageFormat, Rgb, RgbImage};
use serde_json::json;
use tempfile::TempDir;

/// Returns a small PNG and records every prompt it was given.
struct FakeProvider {
    prompts: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            prompts: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }
}

impl ImageProvider for FakeProvider {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, CatalogError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        if self.fail_on.is_some_and(|name| prompt.contains(name)) {
            return Err(CatalogError::transport("provider unavailable"));
        }
        Ok(png(40, 20))
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn doc(name: &str, meals: &[&str]) -> CatalogDocument {
    let records: Vec<_> = meals.iter().map(|m| json!({"name": m})).collect();
    CatalogDocument::from_value(format!("/catalog/{name}.json"), json!({"meals": records})).unwrap()
}

fn fast() -> GenerateOptions {
    GenerateOptions {
        min_interval: Duration::ZERO,
        ..Default::default()
    }
}

fn no_progress(_: GenerateProgress) {}

#[test]
fn test_prompt_with_ingredients() {
    let record = Record::new("Greek Yogurt").with_ingredients(["yogurt", "honey"]);
    let prompt = build_prompt(&record);
    assert!(prompt.starts_with(
        "Ultra-realistic product photography of a single Greek Yogurt containing yogurt, honey on a pure white background. "
    ));
    assert!(prompt.contains("The Greek Yogurt should take up exactly 70% of the frame"));
    assert!(prompt.ends_with("product photography.There should be no text nor people in the image."));
}

#[test]
fn test_prompt_without_ingredients() {
    let prompt = build_prompt(&Record::new("Apple"));
    assert!(prompt.starts_with("Ultra-realistic product photography of a single Apple on a pure"));
    assert!(!prompt.contains("containing"));
}

#[test]
fn test_encode_product_image_is_square_jpeg() {
    let jpeg = encode_product_image(&png(40, 20), 16, 70).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    assert_eq!((decoded.width(), decoded.height()), (16, 16));
}

#[test]
fn test_encode_rejects_garbage() {
    assert!(matches!(
        encode_product_image(b"not an image", 16, 70),
        Err(CatalogError::Image(_))
    ));
}

#[test]
fn test_generate_missing_skips_existing() {
    let tmp = TempDir::new().unwrap();
    let folder = tmp.path().join("images_list");
    std::fs::create_dir(&folder).unwrap();
    std::fs::write(folder.join("001_Toast.jpg"), b"existing").unwrap();

    let docs = vec![doc("list", &["Toast", "Pizza Rounds"])];
    let provider = FakeProvider::new();
    let summary = generate_missing(&docs, tmp.path(), &provider, &fast(), &no_progress);

    assert_eq!(summary.skipped_existing, 1);
    assert_eq!(summary.generated, vec![folder.join("002_Pizza_Rounds.jpg")]);
    assert_eq!(provider.prompts.borrow().len(), 1);
    assert_eq!(std::fs::read(folder.join("001_Toast.jpg")).unwrap(), b"existing");

    let stored = image::open(folder.join("002_Pizza_Rounds.jpg")).unwrap();
    assert_eq!((stored.width(), stored.height()), (384, 384));
}

#[test]
fn test_generate_missing_treats_lowercase_variant_as_present() {
    let tmp = TempDir::new().unwrap();
    let folder = tmp.path().join("images_list");
    std::fs::create_dir(&folder).unwrap();
    std::fs::write(folder.join("001_pizza_rounds.jpg"), b"lower").unwrap();

    let docs = vec![doc("list", &["Pizza Rounds"])];
    let provider = FakeProvider::new();
    let summary = generate_missing(&docs, tmp.path(), &provider, &fast(), &no_progress);

    assert_eq!(summary.skipped_existing, 1);
    assert!(summary.generated.is_empty());
    assert!(provider.prompts.borrow().is_empty());
    assert!(!folder.join("001_Pizza_Rounds.jpg").exists());
}

#[test]
fn test_generate_failure_does_not_stop_batch() {
    let tmp = TempDir::new().unwrap();
    let docs = vec![doc("list", &["Broken Soup", "Toast"])];
    let provider = FakeProvider {
        prompts: RefCell::new(Vec::new()),
        fail_on: Some("Broken Soup"),
    };
    let summary = generate_missing(&docs, tmp.path(), &provider, &fast(), &no_progress);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.generated.len(), 1);
    assert!(tmp.path().join("images_list/002_Toast.jpg").exists());
}

#[test]
fn test_generate_limit_start_and_dry_run() {
    let tmp = TempDir::new().unwrap();
    let docs = vec![doc("list", &["A", "B", "C", "D"])];
    let provider = FakeProvider::new();
    let options = GenerateOptions {
        start_position: 2,
        limit: Some(2),
        dry_run: true,
        ..fast()
    };
    let summary = generate_missing(&docs, tmp.path(), &provider, &options, &no_progress);
    assert!(provider.prompts.borrow().is_empty());
    assert!(summary.generated.is_empty());
    let names: Vec<_> = summary
        .planned
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["002_B.jpg", "003_C.jpg"]);
    assert!(!tmp.path().join("images_list").exists());
}

#[test]
fn test_generate_cancelled() {
    let tmp = TempDir::new().unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let options = GenerateOptions {
        cancel: Some(cancel),
        ..fast()
    };
    let provider = FakeProvider::new();
    let summary = generate_missing(
        &[doc("list", &["A"])],
        tmp.path(),
        &provider,
        &options,
        &no_progress,
    );
    assert!(summary.cancelled);
    assert!(provider.prompts.borrow().is_empty());
}

#[test]
fn test_from_settings_requires_key() {
    let settings = ProviderSettings {
        api_key_env: "MEAL_IMAGES_TEST_KEY_THAT_IS_NOT_SET".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        OpenAiImagesProvider::from_settings(&settings),
        Err(CatalogError::Config(_))
    ));
}

#[test]
fn test_truncate_respects_char_boundaries() {
    assert_eq!(truncate("héllo", 2), "hé");
    assert_eq!(truncate("hi", 10), "hi");
}
