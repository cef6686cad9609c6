//! Schema profiling for semi-structured documents
//!
//! Walks nested documents (objects, arrays, scalars) and reports:
//! - every distinct field path, in dot-notation (`option.alloy`)
//! - per path: presence across documents, non-null occurrences, and the
//!   distribution of value kinds
//!
//! Arrays never add an index to a path: elements of `option: [{..}, {..}]`
//! are treated as repeated records of one shape under `option`.
//!
//! Documents come from any iterator of `Result<Document, E>`; a source error
//! stops the scan and is returned as is.

pub mod classify;
pub mod document;
pub mod paths;
pub mod report;
pub mod scan;

pub use classify::{type_label, NumberLabels, TypeClassifier};
pub use document::{Document, FieldPath, Scalar};
pub use paths::{field_paths, FieldPaths};
pub use report::{
    render_field_list, write_field_list, write_profile_csv, ProfileReportV1, ProfileRowV1,
    ReportError,
};
pub use scan::{
    discover, discover_with, profile, profile_with, FieldDiscoverer, FieldProfile, FieldProfiler,
    ProfileSummary, ScanLimit, ScanOptions, TypeCounts,
};
