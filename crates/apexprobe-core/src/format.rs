//! Formatting primitives
//!
//! Decimal normalization and work offset address translation. Haas reads an
//! address word without a decimal point as an integer count of the least
//! input increment, so every length emitted by the generators carries a
//! literal `.`.
//!
//! Each primitive comes in two flavours: a fallible `parse_*`/`try_*` form
//! that reports what went wrong, and a total form used during generation that
//! logs the problem and substitutes a safe default.

use crate::codes::G154;
use crate::error::{FormatError, FormatResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static DECIMAL_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)$").expect("valid regex"));

/// Decimal used for blank and malformed input.
pub const ZERO: &str = "0.";

/// Parse a decimal form value.
///
/// Returns `Ok(None)` for a blank value and `Ok(Some(..))` with a decimal
/// point guaranteed for a valid number. The digits are kept exactly as typed,
/// so `1.0` stays `1.0` and `1` becomes `1.`.
pub fn parse_decimal(raw: &str) -> FormatResult<Option<String>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !DECIMAL_RE.is_match(value) {
        if value.contains(['e', 'E']) && value.parse::<f64>().is_ok() {
            return Err(FormatError::ExponentNotation(raw.to_string()));
        }
        return Err(FormatError::MalformedDecimal(raw.to_string()));
    }
    if value.contains('.') {
        Ok(Some(value.to_string()))
    } else {
        Ok(Some(format!("{value}.")))
    }
}

/// Normalize a decimal form value, degrading to `0.` on blank or bad input.
pub fn normalize_decimal(raw: &str) -> String {
    match parse_decimal(raw) {
        Ok(Some(value)) => value,
        Ok(None) => ZERO.to_string(),
        Err(e) => {
            warn!("{e}, substituting {ZERO}");
            ZERO.to_string()
        }
    }
}

/// Parse a tool number typed into a form.
///
/// Fractional text is truncated (`"50.0"` is tool 50) and a blank field is
/// tool 0.
pub fn parse_tool_number(raw: &str) -> FormatResult<u32> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(0);
    }
    let number: f64 = value
        .parse()
        .map_err(|_| FormatError::MalformedToolNumber(raw.to_string()))?;
    if !number.is_finite() || number < 0.0 || number >= f64::from(u32::MAX) {
        return Err(FormatError::MalformedToolNumber(raw.to_string()));
    }
    Ok(number.trunc() as u32)
}

/// Serde helper for tool numbers given as an integer, a float or text.
pub fn deserialize_tool_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = FormValue::deserialize(deserializer)?;
    parse_tool_number(raw.as_str()).map_err(serde::de::Error::custom)
}

/// A scalar value as it arrives from a form field or a job file.
///
/// Holds the raw text; numbers given in a job file are converted with their
/// shortest display form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawFormValue", into = "String")]
pub struct FormValue(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFormValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawFormValue> for FormValue {
    fn from(raw: RawFormValue) -> Self {
        match raw {
            RawFormValue::Text(s) => Self(s),
            RawFormValue::Integer(i) => Self(i.to_string()),
            RawFormValue::Float(f) => Self::from(f),
        }
    }
}

impl From<FormValue> for String {
    fn from(value: FormValue) -> Self {
        value.0
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<f64> for FormValue {
    fn from(f: f64) -> Self {
        Self(f.to_string())
    }
}

impl From<i32> for FormValue {
    fn from(i: i32) -> Self {
        Self(i.to_string())
    }
}

impl FormValue {
    /// An empty field.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Raw text of the field.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the field is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Decimal form for an NC address word.
    pub fn nc(&self) -> String {
        normalize_decimal(&self.0)
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two textual forms of a work offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAddress {
    /// Address used in positioning moves, e.g. `G54` or `G154 P7`.
    pub move_address: String,
    /// Address passed to the WIPS macro, e.g. `W54.` or `W154.07`.
    pub macro_address: String,
}

impl WorkAddress {
    fn verbatim(cleaned: &str) -> Self {
        Self {
            move_address: format!("G{cleaned}"),
            macro_address: format!("W{cleaned}."),
        }
    }

    /// Split into `(move_address, macro_address)`.
    pub fn into_pair(self) -> (String, String) {
        (self.move_address, self.macro_address)
    }
}

/// A work coordinate system reference as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOffset {
    /// Raw identifier, e.g. `54`, `G55` or `69`.
    pub id: String,
    /// Whether `id` indexes the extended G154 bank.
    #[serde(default)]
    pub extended: bool,
}

impl Default for WorkOffset {
    fn default() -> Self {
        Self::lobby(54)
    }
}

impl WorkOffset {
    pub fn new(id: impl Into<String>, extended: bool) -> Self {
        Self {
            id: id.into(),
            extended,
        }
    }

    /// One of the direct offsets, G54 to G59.
    pub fn lobby(code: u32) -> Self {
        Self::new(code.to_string(), false)
    }

    /// Entry `P<index>` of the G154 bank.
    pub fn extended(index: u32) -> Self {
        Self::new(index.to_string(), true)
    }

    /// Identifier with whitespace and every leading `G` removed, uppercased.
    pub fn cleaned(&self) -> String {
        self.id
            .to_uppercase()
            .trim_start_matches(|c: char| c == 'G' || c.is_whitespace())
            .trim_end()
            .to_string()
    }

    /// Resolve both address forms, failing when the identifier is not an
    /// integer.
    pub fn try_resolve(&self) -> FormatResult<WorkAddress> {
        let cleaned = self.cleaned();
        let value: i64 = cleaned
            .parse()
            .map_err(|_| FormatError::MalformedWorkOffset {
                raw: self.id.clone(),
                cleaned: cleaned.clone(),
            })?;

        if self.extended {
            Ok(WorkAddress {
                move_address: format!("{G154} P{value}"),
                macro_address: format!("W154.{value:02}"),
            })
        } else {
            Ok(WorkAddress {
                move_address: format!("G{value}"),
                macro_address: format!("W{value}."),
            })
        }
    }

    /// Resolve both address forms.
    ///
    /// A non-integer identifier is reused verbatim in both forms, ignoring
    /// the extended flag.
    pub fn resolve(&self) -> WorkAddress {
        self.try_resolve().unwrap_or_else(|e| {
            warn!("{e}");
            WorkAddress::verbatim(&self.cleaned())
        })
    }
}

/// Translate a work offset identifier into `(move_address, macro_address)`.
pub fn resolve_work_offset(identifier: &str, extended: bool) -> (String, String) {
    WorkOffset::new(identifier, extended).resolve().into_pair()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_keeps_typed_digits() {
        assert_eq!(parse_decimal("1").unwrap().as_deref(), Some("1."));
        assert_eq!(parse_decimal(" 1.0 ").unwrap().as_deref(), Some("1.0"));
        assert_eq!(parse_decimal("-0.5").unwrap().as_deref(), Some("-0.5"));
        assert_eq!(parse_decimal(".25").unwrap().as_deref(), Some(".25"));
        assert_eq!(parse_decimal("+3").unwrap().as_deref(), Some("+3."));
        assert_eq!(parse_decimal("3.").unwrap().as_deref(), Some("3."));
    }

    #[test]
    fn test_parse_decimal_blank_and_malformed() {
        assert_eq!(parse_decimal("").unwrap(), None);
        assert_eq!(parse_decimal("   ").unwrap(), None);
        assert!(matches!(
            parse_decimal("abc"),
            Err(FormatError::MalformedDecimal(_))
        ));
        assert!(parse_decimal("1.2.3").is_err());
        assert_eq!(
            parse_decimal("1e-3"),
            Err(FormatError::ExponentNotation("1e-3".to_string()))
        );
        assert!(matches!(
            parse_decimal("e3"),
            Err(FormatError::MalformedDecimal(_))
        ));
        assert!(parse_decimal("-").is_err());
        assert!(parse_decimal(".").is_err());
    }

    #[test]
    fn test_normalize_decimal_defaults() {
        assert_eq!(normalize_decimal(""), "0.");
        assert_eq!(normalize_decimal("x1"), "0.");
        assert_eq!(normalize_decimal("NaN"), "0.");
        assert_eq!(normalize_decimal("6"), "6.");
    }

    #[test]
    fn test_parse_tool_number() {
        assert_eq!(parse_tool_number("50"), Ok(50));
        assert_eq!(parse_tool_number("50.9"), Ok(50));
        assert_eq!(parse_tool_number(""), Ok(0));
        assert!(parse_tool_number("-1").is_err());
        assert!(parse_tool_number("T5").is_err());
    }

    #[test]
    fn test_deserialize_tool_number() {
        #[derive(Deserialize)]
        struct Job {
            #[serde(deserialize_with = "deserialize_tool_number")]
            tool: u32,
        }
        let parse = |json: &str| serde_json::from_str::<Job>(json).map(|job| job.tool);
        assert_eq!(parse(r#"{"tool": 12}"#).unwrap(), 12);
        assert_eq!(parse(r#"{"tool": "50.0"}"#).unwrap(), 50);
        assert_eq!(parse(r#"{"tool": 7.5}"#).unwrap(), 7);
        assert!(parse(r#"{"tool": "probe"}"#).is_err());
    }

    #[test]
    fn test_form_value_from_numbers() {
        assert_eq!(FormValue::from(6.0).nc(), "6.");
        assert_eq!(FormValue::from(0.1).nc(), "0.1");
        assert_eq!(FormValue::from(-2).nc(), "-2.");
        assert!(FormValue::blank().is_blank());
        assert_eq!(FormValue::blank().nc(), "0.");
    }

    #[test]
    fn test_form_value_deserializes_numbers_and_text() {
        let values: Vec<FormValue> = serde_json::from_str(r#"["1.0", 2, 0.5, ""]"#).unwrap();
        assert_eq!(values[0].as_str(), "1.0");
        assert_eq!(values[1].as_str(), "2");
        assert_eq!(values[2].as_str(), "0.5");
        assert!(values[3].is_blank());
    }

    #[test]
    fn test_work_offset_cleaning() {
        assert_eq!(WorkOffset::new(" g55 ", false).cleaned(), "55");
        assert_eq!(WorkOffset::new("G 56", false).cleaned(), "56");
        assert_eq!(WorkOffset::new("69", true).cleaned(), "69");
        assert_eq!(WorkOffset::new("GG54", false).cleaned(), "54");
        assert_eq!(WorkOffset::new("g G 57", false).cleaned(), "57");
    }

    #[test]
    fn test_try_resolve_reports_malformed() {
        let err = WorkOffset::new("G5X", true).try_resolve().unwrap_err();
        assert_eq!(
            err,
            FormatError::MalformedWorkOffset {
                raw: "G5X".to_string(),
                cleaned: "5X".to_string(),
            }
        );
    }
}
