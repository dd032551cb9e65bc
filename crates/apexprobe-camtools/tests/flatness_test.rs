use apexprobe_camtools::flatness::{
    build_flatness_routine, FlatnessGenerator, FlatnessParameters, FlatnessPoint,
};
use apexprobe_core::{ProgramWrap, Termination, WorkOffset};

fn two_point_params() -> FlatnessParameters {
    FlatnessParameters {
        tool_number: 50,
        points: vec![
            FlatnessPoint::new("1", "1", "901"),
            FlatnessPoint::new("-1", "-1", "#902"),
        ],
        ..Default::default()
    }
}

#[test]
fn test_two_point_routine() {
    let program = FlatnessGenerator::new(two_point_params()).generate();

    let expected = [
        "(--- 3-STAGE FLATNESS ROUTINE ---)",
        "(USING SACRIFICIAL OFFSET W154.97 FOR DUMP)",
        "G103 P1 (LIMIT LOOK-AHEAD)",
        "",
        "(INITIALIZE VARIABLES - CLEAN SLATE)",
        "#901=0. (RESET P1)",
        "#902=0. (RESET P2)",
        "#801=0. (RESET MIN)",
        "#802=0. (RESET MAX)",
        "#803=0. (RESET DEV)",
        "#800=0.001 (SET TOLERANCE)",
        "",
        "G00 G91 G28 Z0.",
        "G00 G90 G154 P99 X0. Y0.",
        "T50 M06 (PROBE)",
        "G90 G54 (ACTIVE WORK OFFSET)",
        "G43 H50 Z6.0 (1. CLEARANCE)",
        "G65 P9832",
        "",
        "(POINT 1 -> #901)",
        "G65 P9810 X1. Y1. Z1.0",
        "G65 P9995 W154.97 A20. H-1.0 (SURFACE Z)",
        "#901=#5063 (CAPTURE Z MACHINE POS)",
        "",
        "(POINT 2 -> #902)",
        "G65 P9810 X-1. Y-1. Z1.0",
        "G65 P9995 W154.97 A20. H-1.0 (SURFACE Z)",
        "#902=#5063 (CAPTURE Z MACHINE POS)",
        "",
        "G65 P9833",
        "G00 G91 G28 Z0.",
        "G00 G90 G154 P99 X0. Y0.",
        "M01",
        "",
        "(--- CALCULATE MIN/MAX RANGE ---)",
        "#801=#901 (SEED MIN)",
        "#802=#901 (SEED MAX)",
        "IF [#902 LT #801] THEN #801=#902",
        "IF [#902 GT #802] THEN #802=#902",
        "",
        "#803=[#802-#801]",
        "IF [#803 GT #800] #3000=1 (FLATNESS TOL EXCEEDED)",
        "(FLATNESS WITHIN LIMITS)",
        "G103 P0 (RESTORE LOOK-AHEAD)",
        "M01",
    ];
    assert_eq!(program.lines(), expected);
}

#[test]
fn test_default_four_points() {
    let program = build_flatness_routine(&FlatnessParameters::default());
    let lines = program.lines();

    let captures = lines.iter().filter(|l| l.contains("=#5063")).count();
    assert_eq!(captures, 4);
    let compares = lines.iter().filter(|l| l.starts_with("IF [#90")).count();
    assert_eq!(compares, 6);
    assert_eq!(lines.last().map(String::as_str), Some("M01"));
}

#[test]
fn test_wrapped_routine_uses_return_code() {
    let params = FlatnessParameters {
        wrap: ProgramWrap::program("4321", Termination::SubprogramReturn),
        ..two_point_params()
    };
    let program = build_flatness_routine(&params);
    let lines = program.lines();

    assert_eq!(lines[0], "%");
    assert_eq!(lines[1], "O4321 (APEXPROBE FLATNESS)");
    assert_eq!(&lines[lines.len() - 3..], ["G103 P0 (RESTORE LOOK-AHEAD)", "M99", "%"]);
}

#[test]
fn test_wrapped_blank_number_falls_back() {
    let params = FlatnessParameters {
        wrap: ProgramWrap::program("  ", Termination::SubprogramReturn),
        ..two_point_params()
    };
    let program = build_flatness_routine(&params);
    assert_eq!(program.lines()[1], "O01234 (APEXPROBE FLATNESS)");
}

#[test]
fn test_sacrificial_offset_is_configurable() {
    let params = FlatnessParameters {
        work_offset: WorkOffset::extended(3),
        sacrificial_offset: WorkOffset::lobby(59),
        ..two_point_params()
    };
    let program = build_flatness_routine(&params);
    let lines = program.lines();
    assert!(lines.contains(&"G90 G154 P3 (ACTIVE WORK OFFSET)".to_string()));
    assert!(lines.contains(&"G65 P9995 W59. A20. H-1.0 (SURFACE Z)".to_string()));
}

#[test]
fn test_too_few_points() {
    for points in [Vec::new(), vec![FlatnessPoint::new("0", "0", "901")]] {
        let params = FlatnessParameters {
            points,
            ..Default::default()
        };
        let generator = FlatnessGenerator::new(params);
        assert!(generator.generate().is_empty());
        assert!(generator.validate().is_err());
    }
}

#[test]
fn test_validate_rejects_bad_macro() {
    let mut params = two_point_params();
    params.max_macro = "8O2".to_string();
    let err = FlatnessGenerator::new(params).validate().unwrap_err();
    assert!(err.to_string().contains("max_macro"));
}

#[test]
fn test_params_from_toml() {
    let text = r#"
        tool_number = 7
        tolerance = 0.0005

        [[points]]
        x = 2
        y = 0
        macro = "911"

        [[points]]
        x = -2
        y = 0
        macro = "912"
    "#;
    let params: FlatnessParameters = toml::from_str(text).unwrap();
    let program = build_flatness_routine(&params);
    let lines = program.lines();
    assert!(lines.contains(&"T7 M06 (PROBE)".to_string()));
    assert!(lines.contains(&"#800=0.0005 (SET TOLERANCE)".to_string()));
    assert!(lines.contains(&"G65 P9810 X2. Y0. Z1.0".to_string()));
}
