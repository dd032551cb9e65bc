//! Multi-feature measurement sequence
//!
//! Probes a list of features with one tool change. Each feature can store
//! its measured size in a macro variable and raise alarm `#3000` when the
//! deviation from nominal exceeds a tolerance.
//!
//! The home/safe-XY bracket around the tool change and after the last
//! feature is always emitted; the program wrap only adds `%`, the O-number
//! and the termination code.

use crate::error::{check_decimal, check_variable, CamToolResult, ParameterError};
use apexprobe_core::codes::{
    ALARM_REGISTER, DEVIATION_REGISTER, G00, G103, G43, G90, G_HOME_Z, G_SAFE_XY, M06,
    MEASURED_REGISTER, PROBE_OFF, PROBE_ON, PROBE_PROTECT, PROTECT_FEED,
};
use apexprobe_core::{
    normalize_decimal, CycleArgs, FormValue, GeneratedProgram, ProbeCycle, ProgramBuilder,
    ProgramWrap, WorkOffset,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title of the O-number line when the sequence is wrapped.
pub const SEQUENCE_PROGRAM_TITLE: &str = "APEXPROBE MEASURE";

/// One inspection point. The cycle is required; everything else defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub cycle: ProbeCycle,
    /// Label for the N-line comment, `FEATURE <n>` when absent
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_position")]
    pub x: FormValue,
    #[serde(default = "default_position")]
    pub y: FormValue,
    /// Probing plane Z for the protected move
    #[serde(default = "default_plane")]
    pub plane: FormValue,
    /// Result variable, with or without `#`; blank to skip storage
    #[serde(rename = "macro", default)]
    pub macro_var: String,
    #[serde(default)]
    pub tolerance: FormValue,
    /// Explicit nominal; inferred from `args` when blank
    #[serde(default)]
    pub nominal: FormValue,
    #[serde(default)]
    pub args: CycleArgs,
}

fn default_position() -> FormValue {
    "0.0".into()
}

fn default_plane() -> FormValue {
    "0.1".into()
}

impl Feature {
    pub fn new(cycle: ProbeCycle) -> Self {
        Self {
            cycle,
            comment: None,
            x: default_position(),
            y: default_position(),
            plane: default_plane(),
            macro_var: String::new(),
            tolerance: FormValue::blank(),
            nominal: FormValue::blank(),
            args: CycleArgs::new(),
        }
    }

    pub fn at(mut self, x: impl Into<FormValue>, y: impl Into<FormValue>) -> Self {
        self.x = x.into();
        self.y = y.into();
        self
    }

    pub fn with_plane(mut self, plane: impl Into<FormValue>) -> Self {
        self.plane = plane.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_macro(mut self, macro_var: impl Into<String>) -> Self {
        self.macro_var = macro_var.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: impl Into<FormValue>) -> Self {
        self.tolerance = tolerance.into();
        self
    }

    pub fn with_nominal(mut self, nominal: impl Into<FormValue>) -> Self {
        self.nominal = nominal.into();
        self
    }

    pub fn with_arg(mut self, letter: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.args.insert(letter, value);
        self
    }

    /// Result variable number without `#`, if any.
    pub fn result_variable(&self) -> Option<String> {
        let id = self.macro_var.replace('#', "");
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Nominal to compare against: the explicit value, or the argument the
    /// cycle measures.
    pub fn resolved_nominal(&self) -> Option<String> {
        let explicit = self.nominal.as_str().trim();
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }
        self.args
            .get(self.cycle.nominal_letter())
            .map(|value| value.as_str().trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn display_comment(&self, index: usize) -> String {
        match &self.comment {
            Some(comment) => comment.trim().to_string(),
            None => format!("FEATURE {}", index + 1),
        }
    }
}

/// Parameters for a multi-feature measurement sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceParameters {
    #[serde(deserialize_with = "apexprobe_core::deserialize_tool_number")]
    pub tool_number: u32,
    pub work_offset: WorkOffset,
    pub clearance_z: FormValue,
    pub protected_z: FormValue,
    pub features: Vec<Feature>,
    pub wrap: ProgramWrap,
}

impl Default for SequenceParameters {
    fn default() -> Self {
        Self {
            tool_number: 50,
            work_offset: WorkOffset::default(),
            clearance_z: "6.0".into(),
            protected_z: "1.0".into(),
            features: Vec::new(),
            wrap: ProgramWrap::none(),
        }
    }
}

/// Sequence number of the feature at `index` (0-based) for tool `tool`.
pub fn sequence_number(tool: u32, index: usize) -> u64 {
    u64::from(tool) * 100 + index as u64 + 1
}

/// Generator for multi-feature measurement sequences
pub struct FeatureSequenceGenerator {
    params: SequenceParameters,
}

impl FeatureSequenceGenerator {
    pub fn new(params: SequenceParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SequenceParameters {
        &self.params
    }

    /// Strict input check; an empty feature list is reported here.
    pub fn validate(&self) -> CamToolResult<()> {
        let p = &self.params;
        if p.features.is_empty() {
            return Err(ParameterError::Missing("features".to_string()).into());
        }
        p.work_offset.try_resolve()?;
        check_decimal("clearance_z", &p.clearance_z)?;
        check_decimal("protected_z", &p.protected_z)?;

        for (i, feature) in p.features.iter().enumerate() {
            let n = i + 1;
            check_decimal(&format!("features[{n}].x"), &feature.x)?;
            check_decimal(&format!("features[{n}].y"), &feature.y)?;
            check_decimal(&format!("features[{n}].plane"), &feature.plane)?;
            check_decimal(&format!("features[{n}].tolerance"), &feature.tolerance)?;
            check_decimal(&format!("features[{n}].nominal"), &feature.nominal)?;
            if let Some(id) = feature.result_variable() {
                check_variable(&format!("features[{n}].macro"), &id)?;
            }
        }
        Ok(())
    }

    /// Generate the measurement program. No features, no program.
    pub fn generate(&self) -> GeneratedProgram {
        let p = &self.params;
        if p.features.is_empty() {
            debug!("No features to measure, nothing generated");
            return GeneratedProgram::empty();
        }

        let t = p.tool_number;
        let address = p.work_offset.resolve();
        let clearance = p.clearance_z.nc();
        let protected = p.protected_z.nc();

        debug!(
            features = p.features.len(),
            tool = t,
            work_offset = %address.move_address,
            "Generating feature sequence"
        );

        let mut program = ProgramBuilder::new();

        // Preamble
        program
            .blank()
            .line("(MULTI-FEATURE MEASUREMENT ROUTINE)")
            .line(format!("{G103} P1 (LIMIT LOOK-AHEAD)"))
            .line("(RESET FEATURE MACROS)");
        for id in p.features.iter().filter_map(Feature::result_variable) {
            program.line(format!("#{id} = 0."));
        }

        // Tool change under the safety bracket
        program
            .blank()
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .line(format!("T{t} {M06} (PROBE TOOL)"))
            .line(format!("{G00} {G90} {}", address.move_address))
            .line(format!("{G43} H{t} Z{clearance}"))
            .line(PROBE_ON);

        for (i, feature) in p.features.iter().enumerate() {
            let comment = feature.display_comment(i).to_uppercase();

            program
                .blank()
                .line(format!(
                    "N{} ({comment}: {})",
                    sequence_number(t, i),
                    feature.cycle
                ))
                .line(format!("{G00} X{} Y{}", feature.x.nc(), feature.y.nc()))
                .line(format!("{G00} Z{protected}"))
                .line(format!(
                    "{PROBE_PROTECT} Z{} {PROTECT_FEED}",
                    feature.plane.nc()
                ))
                .line(
                    feature
                        .cycle
                        .macro_line_at(&feature.args, &address.macro_address),
                );

            if let Some(id) = feature.result_variable() {
                program.line(format!("#{id} = #{MEASURED_REGISTER} (STORE MEASURED)"));

                // Evaluation needs both a tolerance and a nominal
                let nominal = feature
                    .resolved_nominal()
                    .filter(|_| !feature.tolerance.is_blank());
                if let Some(nominal) = nominal {
                    program
                        .line(format!("(--- {comment} EVALUATION ---)"))
                        .line(format!(
                            "#{DEVIATION_REGISTER} = ABS[ #{id} - {} ] (DEVIATION)",
                            normalize_decimal(&nominal)
                        ))
                        .line(format!(
                            "IF [ #{DEVIATION_REGISTER} GT {} ] #{ALARM_REGISTER} = 1 ({comment} OUT OF TOL)",
                            feature.tolerance.nc()
                        ));
                }
            }

            program.line(format!("{G00} Z{clearance}"));
        }

        // Closing bracket, always emitted
        program
            .blank()
            .line(PROBE_OFF)
            .line(format!("{G103} P0 (RESTORE LOOK-AHEAD)"))
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .blank();

        program.finish().wrapped(&p.wrap, SEQUENCE_PROGRAM_TITLE)
    }
}

/// Build a measurement program probing every feature in order.
pub fn build_feature_sequence(params: &SequenceParameters) -> GeneratedProgram {
    FeatureSequenceGenerator::new(params.clone()).generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_variable_strips_hash() {
        assert_eq!(
            Feature::new(ProbeCycle::Bore).with_macro(" #901 ").result_variable(),
            Some("901".to_string())
        );
        assert_eq!(Feature::new(ProbeCycle::Bore).with_macro(" # ").result_variable(), None);
    }

    #[test]
    fn test_nominal_inference_families() {
        let args = |f: Feature| f.with_arg("D", "1.0").with_arg("E", "2.0").with_arg("h", "-0.3");
        let cases = [
            (ProbeCycle::Bore, "1.0"),
            (ProbeCycle::Boss, "1.0"),
            (ProbeCycle::RectPocket, "1.0"),
            (ProbeCycle::RectBoss, "1.0"),
            (ProbeCycle::WebX, "1.0"),
            (ProbeCycle::PocketX, "1.0"),
            (ProbeCycle::SurfaceX, "1.0"),
            (ProbeCycle::WebY, "2.0"),
            (ProbeCycle::PocketY, "2.0"),
            (ProbeCycle::SurfaceY, "2.0"),
            (ProbeCycle::SurfaceZ, "-0.3"),
        ];
        for (cycle, expected) in cases {
            let feature = args(Feature::new(cycle));
            assert_eq!(feature.resolved_nominal().as_deref(), Some(expected), "{cycle}");
        }
    }

    #[test]
    fn test_explicit_nominal_wins() {
        let feature = Feature::new(ProbeCycle::Bore)
            .with_arg("D", "1.0")
            .with_nominal(" 0.998 ");
        assert_eq!(feature.resolved_nominal().as_deref(), Some("0.998"));
    }

    #[test]
    fn test_sequence_number() {
        assert_eq!(sequence_number(50, 0), 5001);
        assert_eq!(sequence_number(0, 9), 10);
        assert_eq!(sequence_number(u32::MAX, 0), u64::from(u32::MAX) * 100 + 1);
    }

    #[test]
    fn test_validate_empty_sequence() {
        let generator = FeatureSequenceGenerator::new(SequenceParameters::default());
        assert!(generator.validate().is_err());
        assert!(generator.generate().is_empty());
    }

    #[test]
    fn test_validate_bad_macro() {
        let params = SequenceParameters {
            features: vec![Feature::new(ProbeCycle::Bore).with_macro("#9x1")],
            ..Default::default()
        };
        assert!(FeatureSequenceGenerator::new(params).validate().is_err());
    }
}
