//! Masking protocol — document taxonomies, region normalization, reports.
//!
//! Turns raw detector output into the document-agnostic `masked_pii`
//! report consumed by masking tools, plus text-pattern scanning for
//! documents without a dedicated model.

pub mod normalize;
pub mod patterns;
pub mod report;
pub mod taxonomy;

pub use normalize::{normalize, BoundingBox, PiiRegion, RawDetection, Rectangle};
pub use patterns::{identifier_fingerprint, OcrWord, PatternKind, PatternScanner, WordBox};
pub use report::MaskingReport;
pub use taxonomy::{DocumentType, Taxonomy, TaxonomyEntry};
