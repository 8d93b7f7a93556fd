// tests/gcode_output.rs
use glam::Vec2;
use pnp_gcode::{
    Configuration, GcodeEmitter, JsonLinesEmitter, MachineConfig, Part, PickAndPlace,
    PlacementEngine, read_parts,
};

fn render(layout: &str, parts: &[Part]) -> String {
    let mut config = Configuration::parse(layout).unwrap();
    let engine = PlacementEngine::new(MachineConfig {
        angle_units_per_turn: 360.0,
        ..MachineConfig::default()
    });
    let mut emitter = GcodeEmitter::new(Vec::new());
    engine.run(&mut config, parts, &mut emitter).unwrap();
    String::from_utf8(emitter.into_inner()).unwrap()
}

#[test]
fn test_pick_and_place_blocks() {
    let out = render(
        "origin: 100 50\nTape: 0805@10k\norigin: 10 20 5\nspacing: 4 0\ncount: 2\n",
        &[Part::new("R1", "0805", "10k", Vec2::new(1.0, 2.5), 90.0)],
    );

    let expected_pick = "
; Pick R1 (0805@10k)
G1 X10.000 Y20.000 Z15.000 E0.000 ; Move over component to pick.
G1 Z5.000   ; move down
G4
M42 P6 S255  ; turn on suckage
G1 Z15.000  ; Move up a bit for traveling
";
    let expected_place = "
; Place R1 (0805@10k)
G1 X101.000 Y52.500 Z15.000 E90.000 ; Move over component to place.
G1 Z3.000    ; move down.
G4
M42 P6 S0    ; turn off suckage
G4
M42 P8 S255  ; blow
G4 P100      ; .. for 100ms
M42 P8 S0    ; done.
G1 Z15.000   ; Move up
";

    assert!(
        out.starts_with("\n; Preamble. Fill be whatever is necessary to init.\n"),
        "{out}"
    );
    assert!(out.contains("G28 X0 Y0"));
    assert!(out.contains("G1 Z35 E0 F2500"));
    assert!(
        out.contains(&format!("{expected_pick}{expected_place}")),
        "{out}"
    );
    assert!(out.ends_with("\nM84 ; done.\n"));
}

#[test]
fn test_full_turn_rotation_prints_unsigned_zero() {
    let out = render(
        "Tape: Q@1\nangle: 270\ncount: 1\n",
        &[Part::new("Q1", "Q", "1", Vec2::ZERO, -90.0)],
    );
    assert!(
        out.contains("G1 X0.000 Y0.000 Z10.000 E0.000 ; Move over component to place."),
        "{out}"
    );
    assert!(!out.contains("-0.000"), "{out}");
}

#[test]
fn test_skipped_parts_emit_nothing() {
    let out = render(
        "Tape: A@1\ncount: 1\n",
        &[
            Part::new("A1", "A", "1", Vec2::ZERO, 0.0),
            Part::new("A2", "A", "1", Vec2::ZERO, 0.0),
            Part::new("B1", "B", "1", Vec2::ZERO, 0.0),
        ],
    );
    assert_eq!(out.matches("; Pick ").count(), 1);
    assert_eq!(out.matches("; Place ").count(), 1);
    assert_eq!(out.matches("M84").count(), 1);
}

#[test]
fn test_empty_run_still_has_preamble_and_closing() {
    let out = render("Tape: A@1\ncount: 0\n", &[]);
    assert!(out.contains("G28 Z0"));
    assert!(out.ends_with("\nM84 ; done.\n"));
    assert!(!out.contains("; Pick"));
}

#[test]
fn test_json_lines_output() {
    let mut config = Configuration::parse("Tape: A@1\nspacing: 1 0\ncount: 2\n").unwrap();
    let engine = PlacementEngine::default();
    let parts = [
        Part::new("A1", "A", "1", Vec2::ZERO, 0.0),
        Part::new("A2", "A", "1", Vec2::ZERO, 0.0),
    ];
    let mut emitter = JsonLinesEmitter::new(Vec::new());
    engine.run(&mut config, &parts, &mut emitter).unwrap();

    let text = String::from_utf8(emitter.into_inner()).unwrap();
    let decoded: Vec<PickAndPlace> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[1].slot, 1);
    assert_eq!(decoded[1].pick.position, Vec2::new(1.0, 0.0));
}

#[test]
fn test_read_kicad_position_list() {
    let text = "\
### Module positions
# Ref     Val       Package        PosX       PosY       Rot  Side
C1        100n      C0603          12.5000    -3.2500    90.0  top
R1        10k       R0805          0          7          -45   top

## End
";
    let parts = read_parts(text.as_bytes()).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], Part::new("C1", "C0603", "100n", Vec2::new(12.5, -3.25), 90.0));
    assert_eq!(parts[1].key(), "R0805@10k");
    assert_eq!(parts[1].angle, -45.0);
}

#[test]
fn test_read_parts_rejects_short_lines() {
    let err = read_parts("R1 10k R0805 1 2\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 1"), "{err}");

    let err = read_parts("# hdr\nR1 10k R0805 1 two 0\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
    assert!(err.to_string().contains("PosY"), "{err}");
}
