use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::filename::{self, CanonicalFilename};

/// A single meal or product entry in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: None,
        }
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    /// Ingredients as a slice, empty when the record has none.
    pub fn ingredients(&self) -> &[String] {
        self.ingredients.as_deref().unwrap_or(&[])
    }
}

/// The top-level key a catalog document stores its records under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Meals,
    ProductList,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 2] = [DocumentKey::Meals, DocumentKey::ProductList];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKey::Meals => "meals",
            DocumentKey::ProductList => "productlist",
        }
    }

    /// Find which supported key a parsed document uses (`meals` wins if both exist).
    pub fn detect(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        Self::ALL
            .into_iter()
            .find(|key| object.get(key.as_str()).is_some_and(|v| v.is_array()))
    }
}

/// An ordered list of records loaded from one catalog document.
///
/// Positions are 1-based and follow the sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductList {
    /// Document base name (filename without `.json`), spaces and punctuation included.
    pub name: String,
    pub records: Vec<Record>,
}

impl ProductList {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Records paired with their 1-based position.
    pub fn positioned(&self) -> impl Iterator<Item = (u32, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (i as u32 + 1, record))
    }

    /// Image folder associated with this list (`images_<name>`).
    pub fn folder_name(&self) -> String {
        filename::folder_name(&self.name)
    }

    /// Canonical filename for the record at `position`.
    pub fn filename_at(&self, position: u32) -> Result<CanonicalFilename, CatalogError> {
        let record = position
            .checked_sub(1)
            .and_then(|i| self.records.get(i as usize))
            .ok_or_else(|| {
                CatalogError::format(format!(
                    "{} has no record at position {position}",
                    self.name
                ))
            })?;
        CanonicalFilename::encode(position, &record.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions_are_one_based() {
        let list = ProductList::new(
            "maaltijdList",
            vec![Record::new("Overnight Oats"), Record::new("Pizza Rounds")],
        );
        let positions: Vec<u32> = list.positioned().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(
            list.filename_at(2).unwrap().to_string(),
            "002_Pizza_Rounds.jpg"
        );
        assert!(list.filename_at(0).is_err());
        assert!(list.filename_at(3).is_err());
    }

    #[test]
    fn test_folder_name_keeps_document_name() {
        let list = ProductList::new("maaltijdList - Dairy&GLuten-Free", Vec::new());
        assert_eq!(list.folder_name(), "images_maaltijdList - Dairy&GLuten-Free");
    }

    #[test]
    fn test_record_ingredients_optional() {
        let r: Record = serde_json::from_value(json!({"name": "Toast"})).unwrap();
        assert!(r.ingredients.is_none());
        assert!(r.ingredients().is_empty());

        let r: Record =
            serde_json::from_value(json!({"name": "Toast", "ingredients": ["bread"]})).unwrap();
        assert_eq!(r.ingredients(), ["bread".to_string()]);
    }

    #[test]
    fn test_detect_document_key() {
        assert_eq!(
            DocumentKey::detect(&json!({"meals": []})),
            Some(DocumentKey::Meals)
        );
        assert_eq!(
            DocumentKey::detect(&json!({"productlist": []})),
            Some(DocumentKey::ProductList)
        );
        assert_eq!(DocumentKey::detect(&json!({"meals": {}})), None);
        assert_eq!(DocumentKey::detect(&json!([])), None);
    }
}
