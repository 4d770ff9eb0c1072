//! Core library for the solar-car strategy toolkit: field-document codec,
//! keyed control files and mean-constrained profile shaping.

pub mod control;
pub mod domain;
pub mod field;
pub mod numerics;
pub mod profile;

pub use control::{KeyedTextConfig, PathStyle};
pub use domain::{Diagnostic, DiagnosticCode, S5Error, S5ErrorCategory, S5Result};
pub use field::{FieldDocument, FieldTable, GridDescriptor};
pub use profile::{ClipPolicy, ProfileShaper, ShapedProfile, ShaperConfig};
