//! # ApexProbe Core
//!
//! NC formatting primitives shared by the ApexProbe generators:
//!
//! - **Codes**: Haas G/M codes and Renishaw WIPS macro calls
//! - **Format**: decimal normalization and work offset addressing
//! - **Cycle**: the WIPS cycle table and `G65 P9995` line builder
//! - **Metadata**: help text and argument defaults per cycle
//! - **Program**: append-only program builder and `%`/O-number wrapper

pub mod codes;
pub mod cycle;
pub mod error;
pub mod format;
pub mod metadata;
pub mod program;

pub use cycle::{build_cycle_line, unknown_cycle_line, ArgLetter, CycleArgs, ProbeCycle};
pub use error::{FormatError, FormatResult};
pub use format::{
    deserialize_tool_number, normalize_decimal, parse_decimal, parse_tool_number,
    resolve_work_offset, FormValue, WorkAddress, WorkOffset,
};
pub use metadata::{lookup_cycle_metadata, ArgDefaults, ArgFlags, CycleMetadata};
pub use program::{GeneratedProgram, ProgramBuilder, ProgramWrap, Termination};
