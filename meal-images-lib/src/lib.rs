//! Scanning, repairing and curating the meal image catalog.

pub mod availability;
pub mod cancel;
pub mod catalog;
pub mod generate;
pub mod normalize;
pub mod reconcile;
pub mod repair;
pub mod selection;
pub mod settings;
pub mod tidy;

pub use availability::{
    CheckerConfig, ImageStore, LocalStore, Probe, RemoteStore, StorageLocation, probe,
};
pub use cancel::CancelFlag;
pub use catalog::{CatalogDocument, LoadOutcome, discover_documents, load_all, load_document};
pub use generate::{ImageProvider, OpenAiImagesProvider, build_prompt, generate_missing};
pub use meal_images_core::{CanonicalFilename, CatalogError, Record};
pub use normalize::{NameReplacementMap, ReplacementRule, apply_replacements, compute_replacements};
pub use reconcile::{Discrepancy, DiscrepancyReason, KnownMissing, ScanOptions, ScanReport, scan};
pub use repair::{MismatchPolicy, RepairOptions, RepairPlan, RepairSummary, plan_repair};
pub use selection::{MealIndex, SelectionSession};
pub use settings::{Settings, SettingsError};
