//! # ApexProbe CAM Tools
//!
//! Generators that assemble Renishaw WIPS probing programs for Haas mills.
//!
//! ## Generators Included
//!
//! - **WIPS Toolpath**: one probe-and-retract sandwich around a single cycle
//! - **Feature Sequence**: several features under one tool change, with
//!   result capture and tolerance alarms
//! - **Flatness**: multi-point Z surface check with on-control min/max range
//!
//! Every generator takes a `*Parameters` bundle and returns a
//! [`GeneratedProgram`](apexprobe_core::GeneratedProgram). Generation is
//! total; `validate` reports input a strict front end should reject.

pub mod error;
pub mod feature_sequence;
pub mod flatness;
pub mod wips_toolpath;

pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
pub use feature_sequence::{
    build_feature_sequence, sequence_number, Feature, FeatureSequenceGenerator,
    SequenceParameters,
};
pub use flatness::{
    build_flatness_routine, FlatnessGenerator, FlatnessParameters, FlatnessPoint,
};
pub use wips_toolpath::{build_single_toolpath, WipsToolpathGenerator, WipsToolpathParameters};
