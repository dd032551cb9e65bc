//! Flatness inspection
//!
//! Touches a Z surface cycle at each point into a sacrificial work offset,
//! captures the machine Z of every hit, then computes the min/max range on
//! the control and alarms when it exceeds the tolerance.

use crate::error::{check_decimal, check_variable, CamToolResult, ParameterError};
use apexprobe_core::codes::{
    ALARM_REGISTER, G103, G43, G90, G_HOME_Z, G_SAFE_XY, M01, M06, PROBE_OFF, PROBE_ON,
    PROBE_PROTECT, SKIP_Z_REGISTER, WIPS_STORM,
};
use apexprobe_core::{
    FormValue, GeneratedProgram, ProgramBuilder, ProgramWrap, Termination, WorkOffset,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title of the O-number line when the routine is wrapped.
pub const FLATNESS_PROGRAM_TITLE: &str = "APEXPROBE FLATNESS";

/// O-number used when the wrap is enabled with a blank program number.
pub const DEFAULT_FLATNESS_PROGRAM: &str = "01234";

/// Fewest points a flatness check makes sense with.
pub const MIN_POINTS: usize = 2;

fn variable_id(raw: &str) -> String {
    raw.replace('#', "").trim().to_string()
}

/// One surface point and the variable its Z is captured into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatnessPoint {
    pub x: FormValue,
    pub y: FormValue,
    #[serde(rename = "macro")]
    pub macro_var: String,
}

impl FlatnessPoint {
    pub fn new(
        x: impl Into<FormValue>,
        y: impl Into<FormValue>,
        macro_var: impl Into<String>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            macro_var: macro_var.into(),
        }
    }

    fn variable(&self) -> String {
        variable_id(&self.macro_var)
    }
}

/// Parameters for a flatness inspection routine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatnessParameters {
    #[serde(deserialize_with = "apexprobe_core::deserialize_tool_number")]
    pub tool_number: u32,
    /// Offset the part program runs in
    pub work_offset: WorkOffset,
    /// Offset the surface cycles are allowed to overwrite
    pub sacrificial_offset: WorkOffset,
    pub clearance_z: FormValue,
    pub protected_z: FormValue,
    pub tolerance: FormValue,
    /// Variable the tolerance is stored in
    pub tolerance_macro: String,
    pub min_macro: String,
    pub max_macro: String,
    pub dev_macro: String,
    pub points: Vec<FlatnessPoint>,
    pub wrap: ProgramWrap,
}

impl Default for FlatnessParameters {
    fn default() -> Self {
        Self {
            tool_number: 50,
            work_offset: WorkOffset::default(),
            sacrificial_offset: WorkOffset::extended(97),
            clearance_z: "6.0".into(),
            protected_z: "1.0".into(),
            tolerance: "0.001".into(),
            tolerance_macro: "800".to_string(),
            min_macro: "801".to_string(),
            max_macro: "802".to_string(),
            dev_macro: "803".to_string(),
            points: vec![
                FlatnessPoint::new("1.0", "1.0", "901"),
                FlatnessPoint::new("1.0", "-1.0", "902"),
                FlatnessPoint::new("-1.0", "-1.0", "903"),
                FlatnessPoint::new("-1.0", "1.0", "904"),
            ],
            wrap: ProgramWrap {
                enabled: false,
                program_number: DEFAULT_FLATNESS_PROGRAM.to_string(),
                termination: Termination::SubprogramReturn,
            },
        }
    }
}

/// Generator for flatness inspection routines
pub struct FlatnessGenerator {
    params: FlatnessParameters,
}

impl FlatnessGenerator {
    pub fn new(params: FlatnessParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FlatnessParameters {
        &self.params
    }

    pub fn validate(&self) -> CamToolResult<()> {
        let p = &self.params;
        if p.points.len() < MIN_POINTS {
            return Err(ParameterError::TooFew {
                name: "points".to_string(),
                min: MIN_POINTS,
                actual: p.points.len(),
            }
            .into());
        }
        p.work_offset.try_resolve()?;
        p.sacrificial_offset.try_resolve()?;
        check_decimal("clearance_z", &p.clearance_z)?;
        check_decimal("protected_z", &p.protected_z)?;
        check_decimal("tolerance", &p.tolerance)?;
        check_variable("tolerance_macro", &variable_id(&p.tolerance_macro))?;
        check_variable("min_macro", &variable_id(&p.min_macro))?;
        check_variable("max_macro", &variable_id(&p.max_macro))?;
        check_variable("dev_macro", &variable_id(&p.dev_macro))?;
        for (i, point) in p.points.iter().enumerate() {
            let n = i + 1;
            check_decimal(&format!("points[{n}].x"), &point.x)?;
            check_decimal(&format!("points[{n}].y"), &point.y)?;
            check_variable(&format!("points[{n}].macro"), &point.variable())?;
        }
        Ok(())
    }

    /// Generate the routine. Fewer than two points, no program.
    pub fn generate(&self) -> GeneratedProgram {
        let p = &self.params;
        if p.points.len() < MIN_POINTS {
            debug!(
                points = p.points.len(),
                "Not enough flatness points, nothing generated"
            );
            return GeneratedProgram::empty();
        }

        let t = p.tool_number;
        let work = p.work_offset.resolve();
        let sacrificial = p.sacrificial_offset.resolve().macro_address;
        let protected = p.protected_z.nc();

        let tol = variable_id(&p.tolerance_macro);
        let min = variable_id(&p.min_macro);
        let max = variable_id(&p.max_macro);
        let dev = variable_id(&p.dev_macro);
        let vars: Vec<String> = p.points.iter().map(FlatnessPoint::variable).collect();

        debug!(points = vars.len(), tool = t, sacrificial = %sacrificial, "Generating flatness routine");

        let mut program = ProgramBuilder::new();
        program
            .line("(--- 3-STAGE FLATNESS ROUTINE ---)")
            .line(format!("(USING SACRIFICIAL OFFSET {sacrificial} FOR DUMP)"))
            .line(format!("{G103} P1 (LIMIT LOOK-AHEAD)"))
            .blank()
            .line("(INITIALIZE VARIABLES - CLEAN SLATE)");
        for (i, var) in vars.iter().enumerate() {
            program.line(format!("#{var}=0. (RESET P{})", i + 1));
        }
        program
            .line(format!("#{min}=0. (RESET MIN)"))
            .line(format!("#{max}=0. (RESET MAX)"))
            .line(format!("#{dev}=0. (RESET DEV)"))
            .line(format!("#{tol}={} (SET TOLERANCE)", p.tolerance.nc()));

        program
            .blank()
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .line(format!("T{t} {M06} (PROBE)"))
            .line(format!("{G90} {} (ACTIVE WORK OFFSET)", work.move_address))
            .line(format!("{G43} H{t} Z{} (1. CLEARANCE)", p.clearance_z.nc()))
            .line(PROBE_ON)
            .blank();

        for (i, (point, var)) in p.points.iter().zip(&vars).enumerate() {
            program
                .line(format!("(POINT {} -> #{var})", i + 1))
                .line(format!(
                    "{PROBE_PROTECT} X{} Y{} Z{protected}",
                    point.x.nc(),
                    point.y.nc()
                ))
                .line(format!("{WIPS_STORM} {sacrificial} A20. H-1.0 (SURFACE Z)"))
                .line(format!("#{var}=#{SKIP_Z_REGISTER} (CAPTURE Z MACHINE POS)"))
                .blank();
        }

        program
            .line(PROBE_OFF)
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .line(M01)
            .blank()
            .line("(--- CALCULATE MIN/MAX RANGE ---)")
            .line(format!("#{min}=#{} (SEED MIN)", vars[0]))
            .line(format!("#{max}=#{} (SEED MAX)", vars[0]));
        for var in &vars[1..] {
            program
                .line(format!("IF [#{var} LT #{min}] THEN #{min}=#{var}"))
                .line(format!("IF [#{var} GT #{max}] THEN #{max}=#{var}"));
        }

        program
            .blank()
            .line(format!("#{dev}=[#{max}-#{min}]"))
            .line(format!(
                "IF [#{dev} GT #{tol}] #{ALARM_REGISTER}=1 (FLATNESS TOL EXCEEDED)"
            ))
            .line("(FLATNESS WITHIN LIMITS)")
            .line(format!("{G103} P0 (RESTORE LOOK-AHEAD)"));

        if p.wrap.enabled {
            let mut wrap = p.wrap.clone();
            if wrap.cleaned_number().is_empty() {
                wrap.program_number = DEFAULT_FLATNESS_PROGRAM.to_string();
            }
            program.finish().wrapped(&wrap, FLATNESS_PROGRAM_TITLE)
        } else {
            program.line(M01);
            program.finish()
        }
    }
}

/// Build a flatness inspection routine.
pub fn build_flatness_routine(params: &FlatnessParameters) -> GeneratedProgram {
    FlatnessGenerator::new(params.clone()).generate()
}
