//! PDF report generation
//!
//! Medical report for a single prediction: wrapped descriptive text, a
//! paginating symptom list, and side-by-side patient/reference thumbnails.
//! Built directly on `lopdf` with Helvetica AFM metrics for width-accurate
//! word wrapping.

mod font;
mod generator;
mod wrap;

pub use font::string_width;
pub use generator::{generate, ReportData};
pub use wrap::wrap_text;
