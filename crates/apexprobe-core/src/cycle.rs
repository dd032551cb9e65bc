//! WIPS probing cycles
//!
//! The closed set of measurement cycles the generators know about, and the
//! one table that maps each cycle to its `G65 P9995` sub-code and the
//! argument letters it takes.

use crate::codes::WIPS_STORM;
use crate::error::FormatError;
use crate::format::{FormValue, WorkOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Argument letter of a WIPS cycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArgLetter {
    /// Nominal size along X, or diameter
    D,
    /// Nominal size along Y
    E,
    /// Z depth, or surface direction
    H,
}

impl ArgLetter {
    pub const ALL: [ArgLetter; 3] = [ArgLetter::D, ArgLetter::E, ArgLetter::H];

    pub fn as_char(self) -> char {
        match self {
            Self::D => 'D',
            Self::E => 'E',
            Self::H => 'H',
        }
    }
}

impl fmt::Display for ArgLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Raw cycle arguments keyed by letter.
///
/// Lookup accepts either case and prefers the uppercase key when both are
/// present. Letters a cycle does not use are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleArgs(BTreeMap<String, FormValue>);

impl CycleArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, letter: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(letter, value);
        self
    }

    pub fn insert(&mut self, letter: impl Into<String>, value: impl Into<FormValue>) {
        self.0.insert(letter.into(), value.into());
    }

    /// Value under `letter`, trying the uppercase key first.
    pub fn get(&self, letter: ArgLetter) -> Option<&FormValue> {
        let upper = letter.as_char().to_string();
        let lower = upper.to_ascii_lowercase();
        self.0.get(&upper).or_else(|| self.0.get(&lower))
    }

    /// Decimal form of `letter`, `0.` when missing or blank.
    pub fn nc(&self, letter: ArgLetter) -> String {
        self.get(letter)
            .map(FormValue::nc)
            .unwrap_or_else(|| FormValue::blank().nc())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for CycleArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A WIPS measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeCycle {
    #[serde(rename = "A10")]
    Bore,
    #[serde(rename = "A11")]
    Boss,
    #[serde(rename = "A12")]
    RectPocket,
    #[serde(rename = "A13")]
    RectBoss,
    #[serde(rename = "A14")]
    WebX,
    #[serde(rename = "A15")]
    PocketX,
    #[serde(rename = "A16")]
    WebY,
    #[serde(rename = "A17")]
    PocketY,
    #[serde(rename = "A20Z")]
    SurfaceZ,
    #[serde(rename = "A20X")]
    SurfaceX,
    #[serde(rename = "A20Y")]
    SurfaceY,
}

use ArgLetter::{D, E, H};

impl ProbeCycle {
    /// Every cycle, in selection-label matching priority.
    pub const ALL: [ProbeCycle; 11] = [
        ProbeCycle::Bore,
        ProbeCycle::Boss,
        ProbeCycle::RectPocket,
        ProbeCycle::RectBoss,
        ProbeCycle::WebX,
        ProbeCycle::PocketX,
        ProbeCycle::WebY,
        ProbeCycle::PocketY,
        ProbeCycle::SurfaceZ,
        ProbeCycle::SurfaceX,
        ProbeCycle::SurfaceY,
    ];

    /// Key used in parameter bundles, job files and sequence labels.
    pub fn key(self) -> &'static str {
        match self {
            Self::Bore => "A10",
            Self::Boss => "A11",
            Self::RectPocket => "A12",
            Self::RectBoss => "A13",
            Self::WebX => "A14",
            Self::PocketX => "A15",
            Self::WebY => "A16",
            Self::PocketY => "A17",
            Self::SurfaceZ => "A20Z",
            Self::SurfaceX => "A20X",
            Self::SurfaceY => "A20Y",
        }
    }

    /// The `A` word passed to P9995. All single-surface variants share A20.
    pub fn sub_code(self) -> &'static str {
        match self {
            Self::Bore => "A10.",
            Self::Boss => "A11.",
            Self::RectPocket => "A12.",
            Self::RectBoss => "A13.",
            Self::WebX => "A14.",
            Self::PocketX => "A15.",
            Self::WebY => "A16.",
            Self::PocketY => "A17.",
            Self::SurfaceZ | Self::SurfaceX | Self::SurfaceY => "A20.",
        }
    }

    /// Argument letters emitted on the cycle line, in order.
    pub fn letters(self) -> &'static [ArgLetter] {
        match self {
            Self::Bore => &[D],
            Self::Boss => &[D, H],
            Self::RectPocket => &[D, E],
            Self::RectBoss => &[D, E, H],
            Self::WebX => &[D, H],
            Self::PocketX => &[D],
            Self::WebY => &[E, H],
            Self::PocketY => &[E],
            Self::SurfaceZ => &[H],
            Self::SurfaceX => &[D],
            Self::SurfaceY => &[E],
        }
    }

    /// Letter holding the nominal size the cycle measures.
    pub fn nominal_letter(self) -> ArgLetter {
        match self {
            Self::Bore
            | Self::Boss
            | Self::RectPocket
            | Self::RectBoss
            | Self::WebX
            | Self::PocketX
            | Self::SurfaceX => D,
            Self::WebY | Self::PocketY | Self::SurfaceY => E,
            Self::SurfaceZ => H,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bore => "Bore",
            Self::Boss => "Boss",
            Self::RectPocket => "Rectangular Pocket",
            Self::RectBoss => "Rectangular Boss",
            Self::WebX => "Web X",
            Self::PocketX => "Pocket X",
            Self::WebY => "Web Y",
            Self::PocketY => "Pocket Y",
            Self::SurfaceZ => "Surface Z",
            Self::SurfaceX => "Surface X",
            Self::SurfaceY => "Surface Y",
        }
    }

    /// Label as shown in a cycle picker, e.g. `A20 - Surface X`.
    pub fn label(self) -> String {
        let code = self.sub_code().trim_end_matches('.');
        format!("{code} - {}", self.name())
    }

    /// Token searched for in free-text selection labels.
    fn selection_token(self) -> &'static str {
        match self {
            Self::SurfaceZ | Self::SurfaceX | Self::SurfaceY => self.name(),
            _ => self.key(),
        }
    }

    /// Match a picker label by substring, first cycle in [`Self::ALL`] wins.
    pub fn from_selection_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cycle| label.contains(cycle.selection_token()))
    }

    /// The `G65 P9995` call for this cycle.
    pub fn macro_line(self, args: &CycleArgs, offset: &WorkOffset) -> String {
        self.macro_line_at(args, &offset.resolve().macro_address)
    }

    /// Same as [`Self::macro_line`] with an already resolved macro address.
    pub fn macro_line_at(self, args: &CycleArgs, macro_address: &str) -> String {
        let mut words = vec![WIPS_STORM.to_string(), self.sub_code().to_string()];
        words.extend(
            self.letters()
                .iter()
                .map(|&letter| format!("{letter}{}", args.nc(letter))),
        );
        words.push(macro_address.to_string());
        words.join(" ")
    }
}

impl fmt::Display for ProbeCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProbeCycle {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cycle| cycle.key() == s)
            .ok_or_else(|| FormatError::UnknownCycle(s.to_string()))
    }
}

/// Diagnostic emitted in place of a cycle line for an unknown key.
pub fn unknown_cycle_line(cycle_key: &str) -> String {
    format!("(ERROR: UNKNOWN CYCLE {cycle_key})")
}

/// Build the `G65 P9995` line for a cycle key given as text.
///
/// An unknown key yields a diagnostic comment instead of failing.
pub fn build_cycle_line(cycle_key: &str, args: &CycleArgs, offset: &WorkOffset) -> String {
    match cycle_key.parse::<ProbeCycle>() {
        Ok(cycle) => cycle.macro_line(args, offset),
        Err(e) => {
            warn!("{e}");
            unknown_cycle_line(cycle_key)
        }
    }
}
