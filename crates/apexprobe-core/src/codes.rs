//! Haas G/M codes and Renishaw macro calls used by the generators.
//!
//! One place for every literal word the emitted programs contain.

// G codes
pub const G00: &str = "G00";
pub const G28: &str = "G28";
pub const G43: &str = "G43";
pub const G90: &str = "G90";
pub const G91: &str = "G91";
pub const G103: &str = "G103";
pub const G154: &str = "G154";

// M codes
pub const M01: &str = "M01";
pub const M06: &str = "M06";
pub const M30: &str = "M30";
pub const M99: &str = "M99";

// Renishaw WIPS macros
pub const PROBE_ON: &str = "G65 P9832";
pub const PROBE_OFF: &str = "G65 P9833";
pub const PROBE_PROTECT: &str = "G65 P9810";
pub const WIPS_STORM: &str = "G65 P9995";

/// Rapid to machine home in Z.
pub const G_HOME_Z: &str = "G00 G91 G28 Z0.";
/// Rapid to the safe XY reference (origin of G154 P99).
pub const G_SAFE_XY: &str = "G00 G90 G154 P99 X0. Y0.";

/// Feed used by the protected positioning move in feature sequences.
pub const PROTECT_FEED: &str = "F50.";

/// Register the WIPS cycles leave the measured size in.
pub const MEASURED_REGISTER: u32 = 188;
/// Scratch register for the deviation check.
pub const DEVIATION_REGISTER: u32 = 100;
/// Writing a non-zero value here raises a controller alarm.
pub const ALARM_REGISTER: u32 = 3000;
/// Machine Z position of the last skip signal.
pub const SKIP_Z_REGISTER: u32 = 5063;

/// Program delimiter.
pub const PERCENT: &str = "%";
