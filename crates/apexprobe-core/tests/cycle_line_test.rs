use apexprobe_core::{build_cycle_line, lookup_cycle_metadata, CycleArgs, ProbeCycle, WorkOffset};

fn full_args() -> CycleArgs {
    CycleArgs::new()
        .with("D", "1.25")
        .with("E", "2")
        .with("H", "-0.5")
}

#[test]
fn test_bore_line_is_exact() {
    let line = build_cycle_line("A10", &CycleArgs::new().with("D", "1"), &WorkOffset::lobby(54));
    assert_eq!(line, "G65 P9995 A10. D1. W54.");
}

#[test]
fn test_cycle_table() {
    let offset = WorkOffset::lobby(54);
    let args = full_args();
    let expected = [
        ("A10", "G65 P9995 A10. D1.25 W54."),
        ("A11", "G65 P9995 A11. D1.25 H-0.5 W54."),
        ("A12", "G65 P9995 A12. D1.25 E2. W54."),
        ("A13", "G65 P9995 A13. D1.25 E2. H-0.5 W54."),
        ("A14", "G65 P9995 A14. D1.25 H-0.5 W54."),
        ("A15", "G65 P9995 A15. D1.25 W54."),
        ("A16", "G65 P9995 A16. E2. H-0.5 W54."),
        ("A17", "G65 P9995 A17. E2. W54."),
        ("A20X", "G65 P9995 A20. D1.25 W54."),
        ("A20Y", "G65 P9995 A20. E2. W54."),
        ("A20Z", "G65 P9995 A20. H-0.5 W54."),
    ];
    for (key, line) in expected {
        assert_eq!(build_cycle_line(key, &args, &offset), line, "cycle {key}");
    }
}

#[test]
fn test_lowercase_argument_keys() {
    let args = CycleArgs::new().with("d", "3").with("h", "-1");
    let line = build_cycle_line("A11", &args, &WorkOffset::extended(5));
    assert_eq!(line, "G65 P9995 A11. D3. H-1. W154.05");
}

#[test]
fn test_missing_and_blank_arguments_default_to_zero() {
    let args = CycleArgs::new().with("D", "");
    let line = build_cycle_line("A13", &args, &WorkOffset::lobby(55));
    assert_eq!(line, "G65 P9995 A13. D0. E0. H0. W55.");
}

#[test]
fn test_unknown_cycle_produces_diagnostic() {
    let line = build_cycle_line("A18", &full_args(), &WorkOffset::lobby(54));
    assert_eq!(line, "(ERROR: UNKNOWN CYCLE A18)");
}

#[test]
fn test_cycle_keys_are_case_sensitive() {
    let args = CycleArgs::new().with("D", "1");
    let line = build_cycle_line("a10", &args, &WorkOffset::lobby(54));
    assert_eq!(line, "(ERROR: UNKNOWN CYCLE a10)");
}

#[test]
fn test_every_cycle_has_a_matching_catalog_entry() {
    for cycle in ProbeCycle::ALL {
        let meta = lookup_cycle_metadata(&cycle.label());
        assert_eq!(meta, cycle.metadata());
        for letter in apexprobe_core::ArgLetter::ALL {
            assert_eq!(meta.active.get(letter), cycle.letters().contains(&letter));
        }
    }
}

#[test]
fn test_catalog_surface_entries() {
    let meta = lookup_cycle_metadata("A20 - Surface Z");
    assert_eq!(
        meta.help,
        "Z Surface (A20): H = Direction (Generator forces negative)."
    );
    assert_eq!(meta.defaults.h, "-1.0");
    assert!(!meta.active.d && !meta.active.e && meta.active.h);

    let meta = lookup_cycle_metadata("A20 - Surface X");
    assert_eq!(meta.help, "X Surface (A20): D = Approach direction/dist.");
}
