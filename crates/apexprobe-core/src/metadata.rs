//! Cycle metadata catalog
//!
//! Help text, default argument values and active-argument flags a cycle
//! picker shows for each WIPS cycle. Reference data only; the generators do
//! not read it.

use crate::cycle::{ArgLetter, CycleArgs, ProbeCycle};
use serde::Serialize;

/// Default value per argument letter, as form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgDefaults {
    pub d: &'static str,
    pub e: &'static str,
    pub h: &'static str,
}

impl ArgDefaults {
    pub fn get(&self, letter: ArgLetter) -> &'static str {
        match letter {
            ArgLetter::D => self.d,
            ArgLetter::E => self.e,
            ArgLetter::H => self.h,
        }
    }

    /// Defaults as a cycle argument map keyed `D`, `E`, `H`.
    pub fn to_args(&self) -> CycleArgs {
        ArgLetter::ALL
            .into_iter()
            .map(|letter| (letter.to_string(), self.get(letter)))
            .collect()
    }
}

/// Whether each argument letter is used by the selected cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgFlags {
    pub d: bool,
    pub e: bool,
    pub h: bool,
}

impl ArgFlags {
    pub fn get(&self, letter: ArgLetter) -> bool {
        match letter {
            ArgLetter::D => self.d,
            ArgLetter::E => self.e,
            ArgLetter::H => self.h,
        }
    }

    fn from_letters(letters: &[ArgLetter]) -> Self {
        Self {
            d: letters.contains(&ArgLetter::D),
            e: letters.contains(&ArgLetter::E),
            h: letters.contains(&ArgLetter::H),
        }
    }
}

/// Catalog entry for one cycle selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleMetadata {
    pub help: &'static str,
    pub defaults: ArgDefaults,
    pub active: ArgFlags,
}

impl CycleMetadata {
    /// Entry returned for a label that matches no cycle.
    pub const SELECTION_ERROR: CycleMetadata = CycleMetadata {
        help: "Selection Error.",
        defaults: ArgDefaults {
            d: "0",
            e: "0",
            h: "0",
        },
        active: ArgFlags {
            d: true,
            e: true,
            h: true,
        },
    };
}

const fn defaults(d: &'static str, e: &'static str, h: &'static str) -> ArgDefaults {
    ArgDefaults { d, e, h }
}

impl ProbeCycle {
    /// Help text and default arguments for this cycle.
    pub fn metadata(self) -> CycleMetadata {
        let (help, defaults) = match self {
            Self::Bore => ("Bore (A10): D = Target Diameter.", defaults("1.0", "0", "0")),
            Self::Boss => (
                "Boss (A11): D = Diameter, H = Z-depth for probing.",
                defaults("1.0", "0", "-0.5"),
            ),
            Self::RectPocket => (
                "Rect Pocket (A12): D = X Width, E = Y Width.",
                defaults("1.0", "1.0", "0"),
            ),
            Self::RectBoss => (
                "Rect Boss (A13): D = X Width, E = Y Width, H = Z-depth.",
                defaults("1.0", "1.0", "-0.5"),
            ),
            Self::WebX => (
                "Web X (A14): D = Width, H = Z-depth.",
                defaults("1.0", "0", "-0.5"),
            ),
            Self::PocketX => ("Pocket X (A15): D = Width.", defaults("1.0", "0", "0")),
            Self::WebY => (
                "Web Y (A16): E = Width, H = Z-depth.",
                defaults("0", "1.0", "-0.5"),
            ),
            Self::PocketY => ("Pocket Y (A17): E = Width.", defaults("0", "1.0", "0")),
            Self::SurfaceZ => (
                "Z Surface (A20): H = Direction (Generator forces negative).",
                defaults("0", "0", "-1.0"),
            ),
            Self::SurfaceX => (
                "X Surface (A20): D = Approach direction/dist.",
                defaults("1.0", "0", "0"),
            ),
            Self::SurfaceY => (
                "Y Surface (A20): E = Approach direction/dist.",
                defaults("0", "1.0", "0"),
            ),
        };

        CycleMetadata {
            help,
            defaults,
            active: ArgFlags::from_letters(self.letters()),
        }
    }
}

/// Look up help, defaults and active flags for a free-text selection label.
pub fn lookup_cycle_metadata(selection: &str) -> CycleMetadata {
    ProbeCycle::from_selection_label(selection)
        .map(ProbeCycle::metadata)
        .unwrap_or(CycleMetadata::SELECTION_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_entry() {
        let meta = lookup_cycle_metadata("A11 - Boss (External)");
        assert_eq!(meta.help, "Boss (A11): D = Diameter, H = Z-depth for probing.");
        assert_eq!(meta.defaults, defaults("1.0", "0", "-0.5"));
        assert_eq!(
            meta.active,
            ArgFlags {
                d: true,
                e: false,
                h: true
            }
        );
    }

    #[test]
    fn test_unmatched_label() {
        let meta = lookup_cycle_metadata("Spiral");
        assert_eq!(meta, CycleMetadata::SELECTION_ERROR);
        assert!(meta.active.d && meta.active.e && meta.active.h);
    }

    #[test]
    fn test_defaults_to_args() {
        let args = ProbeCycle::WebY.metadata().defaults.to_args();
        assert_eq!(args.nc(ArgLetter::E), "1.0");
        assert_eq!(args.nc(ArgLetter::H), "-0.5");
    }
}
