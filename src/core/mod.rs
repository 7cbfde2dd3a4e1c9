//! Core build pipeline: error taxonomy, per-build context, sketch assembly.

pub mod builder;
pub mod context;
pub mod error;

pub use builder::SketchBuilder;
pub use context::{BuildContext, FeatureFlags};
pub use error::{Error, Result};
