//! Single WIPS probing toolpath
//!
//! One probe-and-retract sandwich: clear Z, center over the safe XY
//! reference, change to the probe, position, approach through the three Z
//! heights, run one measurement cycle, then clear and center again.

use crate::error::{check_decimal, CamToolResult};
use apexprobe_core::codes::{
    G00, G43, G90, G_HOME_Z, G_SAFE_XY, M01, M06, PROBE_OFF, PROBE_ON, PROBE_PROTECT,
};
use apexprobe_core::{
    CycleArgs, FormValue, GeneratedProgram, ProbeCycle, ProgramBuilder, ProgramWrap, WorkOffset,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title of the O-number line when the toolpath is wrapped.
pub const WIPS_PROGRAM_TITLE: &str = "APEXPROBE WIPS";

/// Parameters for a single probing toolpath
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WipsToolpathParameters {
    /// Probe tool number (also its length offset)
    #[serde(deserialize_with = "apexprobe_core::deserialize_tool_number")]
    pub tool_number: u32,
    /// Work offset the cycle measures in
    pub work_offset: WorkOffset,
    /// Measurement cycle
    pub cycle: ProbeCycle,
    /// Cycle arguments (D/E/H)
    pub args: CycleArgs,
    /// X start position
    pub x: FormValue,
    /// Y start position
    pub y: FormValue,
    /// Height the tool length offset is activated at
    pub clearance_z: FormValue,
    /// Rapid height above the part
    pub protected_z: FormValue,
    /// Height the protected move brings the stylus to before the cycle
    pub probing_plane_z: FormValue,
    /// Optional `(PROBE CYCLE: ..)` comment at the top
    pub title: Option<String>,
    /// Program header/footer
    pub wrap: ProgramWrap,
}

impl Default for WipsToolpathParameters {
    fn default() -> Self {
        let cycle = ProbeCycle::Bore;
        Self {
            tool_number: 50,
            work_offset: WorkOffset::default(),
            cycle,
            args: cycle.metadata().defaults.to_args(),
            x: "0.0".into(),
            y: "0.0".into(),
            clearance_z: "1.0".into(),
            protected_z: "0.5".into(),
            probing_plane_z: "0.1".into(),
            title: None,
            wrap: ProgramWrap::none(),
        }
    }
}

/// Generator for a single probing toolpath
pub struct WipsToolpathGenerator {
    params: WipsToolpathParameters,
}

impl WipsToolpathGenerator {
    /// Create a new WipsToolpathGenerator with the given parameters
    pub fn new(params: WipsToolpathParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WipsToolpathParameters {
        &self.params
    }

    /// Strict input check for front ends that want to reject bad fields.
    pub fn validate(&self) -> CamToolResult<()> {
        let p = &self.params;
        p.work_offset.try_resolve()?;
        check_decimal("x", &p.x)?;
        check_decimal("y", &p.y)?;
        check_decimal("clearance_z", &p.clearance_z)?;
        check_decimal("protected_z", &p.protected_z)?;
        check_decimal("probing_plane_z", &p.probing_plane_z)?;
        for letter in p.cycle.letters() {
            if let Some(value) = p.args.get(*letter) {
                check_decimal(&letter.to_string(), value)?;
            }
        }
        Ok(())
    }

    /// Generate the toolpath
    pub fn generate(&self) -> GeneratedProgram {
        let p = &self.params;
        let t = p.tool_number;
        let address = p.work_offset.resolve();
        let clearance = p.clearance_z.nc();

        debug!(
            cycle = %p.cycle,
            tool = t,
            work_offset = %address.move_address,
            "Generating WIPS toolpath"
        );

        let mut program = ProgramBuilder::new();
        if let Some(title) = &p.title {
            program.line(format!("(PROBE CYCLE: {title})"));
        }

        program
            .blank()
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .line(format!("T{t} {M06}"))
            .line(format!(
                "{G00} {G90} {} X{} Y{}",
                address.move_address,
                p.x.nc(),
                p.y.nc()
            ))
            .line(format!("{G43} H{t} Z{clearance}"))
            .line(format!("{G00} Z{}", p.protected_z.nc()))
            .line(PROBE_ON)
            .line(format!("{PROBE_PROTECT} Z{}", p.probing_plane_z.nc()))
            .blank()
            .line(p.cycle.macro_line_at(&p.args, &address.macro_address))
            .blank()
            .line(PROBE_OFF)
            .line(format!("{G43} H{t} Z{clearance}"))
            .line(G_HOME_Z)
            .line(G_SAFE_XY)
            .line(M01)
            .blank();

        program.finish().wrapped(&p.wrap, WIPS_PROGRAM_TITLE)
    }
}

/// Build one probe-and-retract toolpath.
pub fn build_single_toolpath(params: &WipsToolpathParameters) -> GeneratedProgram {
    WipsToolpathGenerator::new(params.clone()).generate()
}
