use super::*;

#[test]
fn test_encode_pads_position_and_joins_words() {
    let f = CanonicalFilename::encode(19, "Pizza Rounds").unwrap();
    assert_eq!(f.to_string(), "019_Pizza_Rounds.jpg");
    assert_eq!(f.prefix(), "019");
    assert_eq!(f.lowercase(), "019_pizza_rounds.jpg");
}

#[test]
fn test_encode_strips_punctuation_keeps_hyphen() {
    let f = CanonicalFilename::encode(16, "Cheese-Hummus Rice Cakes (2x), large").unwrap();
    assert_eq!(f.to_string(), "016_Cheese-Hummus_Rice_Cakes_2x_large.jpg");
}

#[test]
fn test_encode_trims_and_keeps_inner_spacing() {
    let f = CanonicalFilename::encode(1, "  Greek  Yogurt ").unwrap();
    // Each inner space becomes its own underscore
    assert_eq!(f.to_string(), "001_Greek__Yogurt.jpg");
}

#[test]
fn test_encode_is_deterministic() {
    let a = CanonicalFilename::encode(7, "Edamame & Rice Cakes").unwrap();
    let b = CanonicalFilename::encode(7, "Edamame & Rice Cakes").unwrap();
    assert_eq!(a.to_string().as_bytes(), b.to_string().as_bytes());
}

#[test]
fn test_encode_keeps_unicode_letters() {
    let f = CanonicalFilename::encode(3, "Crème brûlée").unwrap();
    assert_eq!(f.to_string(), "003_Crème_brûlée.jpg");
}

#[test]
fn test_encode_rejects_bad_input() {
    assert!(matches!(
        CanonicalFilename::encode(0, "Pizza"),
        Err(CatalogError::Format(_))
    ));
    assert!(matches!(
        CanonicalFilename::encode(1, "   "),
        Err(CatalogError::Format(_))
    ));
    assert!(matches!(
        CanonicalFilename::encode(1, "(!!)"),
        Err(CatalogError::Format(_))
    ));
}

#[test]
fn test_slug_ignores_characters_outside_allowed_set() {
    let names = [
        "Chicken Wrap",
        "Chicken, Wrap",
        "(Chicken) Wrap!",
        "Chicken Wrap.",
        "Chicken' Wrap?",
    ];
    for name in names {
        assert_eq!(slugify(name), "Chicken_Wrap", "name: {name}");
    }
}

#[test]
fn test_decode_round_trips_encode() {
    let cases = [
        (1, "Overnight Oats"),
        (19, "Pizza Rounds"),
        (23, "Raspberry Protein Shake"),
        (120, "Tempeh Lettuce Wraps (with Rice Cakes)"),
        (1000, "Late Snack"),
    ];
    for (position, name) in cases {
        let encoded = CanonicalFilename::encode(position, name).unwrap();
        let decoded = decode(&encoded.to_string()).unwrap();
        assert_eq!(decoded.position, position);
        assert_eq!(decoded.remainder, encoded.slug());
        assert_eq!(decoded.remainder, slugify(name));
    }
}

#[test]
fn test_decode_rejects_missing_digits() {
    assert!(matches!(decode("19_Pizza.jpg"), Err(CatalogError::Format(_))));
    assert!(matches!(decode("Pizza.jpg"), Err(CatalogError::Format(_))));
    assert!(matches!(decode("0a9_Pizza.jpg"), Err(CatalogError::Format(_))));
}

#[test]
fn test_decode_rejects_missing_separator() {
    assert!(matches!(decode("019Pizza.jpg"), Err(CatalogError::Format(_))));
    assert!(matches!(decode("019-Pizza.jpg"), Err(CatalogError::Format(_))));
    assert!(matches!(decode("019"), Err(CatalogError::Format(_))));
}

#[test]
fn test_decode_rejects_zero_and_empty_remainder() {
    assert!(matches!(decode("000_Pizza.jpg"), Err(CatalogError::Format(_))));
    assert!(matches!(decode("004_.jpg"), Err(CatalogError::Format(_))));
}

#[test]
fn test_decode_strips_any_image_extension() {
    assert_eq!(decode("004_Toast.PNG").unwrap().remainder, "Toast");
    assert_eq!(decode("004_Toast.jpeg").unwrap().remainder, "Toast");
    assert_eq!(decode("004_Toast").unwrap().remainder, "Toast");
}

#[test]
fn test_position_prefix() {
    assert_eq!(position_prefix("022_Strawberry_Shake.jpg"), Some("022"));
    assert_eq!(position_prefix("22_Shake.jpg"), None);
    assert_eq!(position_prefix("ab"), None);
    assert!(is_position_prefixed("007_Tea.jpg"));
    assert!(!is_position_prefixed("cover.jpg"));
}

#[test]
fn test_positions_above_999_keep_their_own_slot() {
    let f = CanonicalFilename::encode(1000, "New").unwrap();
    assert_eq!(f.to_string(), "1000_New.jpg");
    assert_eq!(f.prefix(), "1000");
    assert_eq!(position_prefix("1000_New.jpg"), Some("1000"));
    assert_ne!(position_prefix("1000_New.jpg"), position_prefix("100_Keep.jpg"));
    assert_eq!(decode("1000_New.jpg").unwrap().position, 1000);
    assert_eq!(
        sanitize_stored_name("1000_New_(2).jpg").as_deref(),
        Some("1000_New_2.jpg")
    );
}

#[test]
fn test_is_image_file() {
    assert!(is_image_file("001_A.jpg"));
    assert!(is_image_file("001_A.JPEG"));
    assert!(is_image_file("cover.png"));
    assert!(!is_image_file("notes.txt"));
    assert!(!is_image_file("jpg"));
}

#[test]
fn test_folder_name() {
    assert_eq!(
        folder_name("maaltijdList - Vegetar,Dairy,Gluten"),
        "images_maaltijdList - Vegetar,Dairy,Gluten"
    );
}

#[test]
fn test_sanitize_stored_name() {
    assert_eq!(
        sanitize_stored_name("011_Chicken_Wrap_(spicy).jpg").as_deref(),
        Some("011_Chicken_Wrap_spicy.jpg")
    );
    assert_eq!(
        sanitize_stored_name("019_Pizza_Rounds.jpg").as_deref(),
        Some("019_Pizza_Rounds.jpg")
    );
    assert_eq!(sanitize_stored_name("cover.jpg"), None);
    assert_eq!(sanitize_stored_name("019Pizza.jpg"), None);
}
