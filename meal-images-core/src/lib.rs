//! Data model and filename rules shared by the meal-images tools.

pub mod error;
pub mod filename;
pub mod record;

pub use error::CatalogError;
pub use filename::{CanonicalFilename, DecodedFilename, decode, folder_name, slugify};
pub use record::{DocumentKey, ProductList, Record};
