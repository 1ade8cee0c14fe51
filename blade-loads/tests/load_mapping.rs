mod common;

use approx::assert_relative_eq;
use blade_loads::prelude::*;
use blade_loads::structure::{lift_pressure, ChordStation, DragWidthAxis, PressureSign};

use common::{chord_stations, init_logging, solved_propeller, MockPanel, SECTIONS};

fn env_usize(name: &str, default_val: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_val)
}

fn blade_mesh(prop: &Propeller, units: &UnitSystem) -> (ShellMesh, Vec<ChordStation>) {
    let n_chord = env_usize("BLADE_MESH_NCHORD", 4);
    let n_span = env_usize("BLADE_MESH_NSPAN", 6);
    let stations = chord_stations(prop, units);
    (ShellMesh::from_planform(&stations, n_chord, n_span).unwrap(), stations)
}

fn build(prop: &Propeller, mesh: &mut ShellMesh, stations: &[ChordStation]) -> BladeResult<ElementData> {
    build_with(prop, mesh, stations, BuilderOptions::default())
}

fn build_with(
    prop: &Propeller,
    mesh: &mut ShellMesh,
    stations: &[ChordStation],
    options: BuilderOptions,
) -> BladeResult<ElementData> {
    let panel = MockPanel;
    let interp = SpanwiseSectionInterpolator::new(prop, &panel, LoadSelector::Envelope);
    let builder = ElementDataBuilder::new(EdgeLocator::new(ShellMesh::planform_edge_segments(stations)), options);
    builder.build(mesh, &interp)
}

/// Nodal extent of an element along x and y
fn extents(mesh: &ShellMesh, element: usize) -> (f64, f64) {
    let points: Vec<_> = mesh
        .element_nodes(element)
        .unwrap()
        .into_iter()
        .map(|n| mesh.node_location(n).unwrap())
        .collect();
    let spread = |f: fn(&blade_loads::math::Vec3) -> f64| {
        let lo = points.iter().map(f).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(f).fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    (spread(|p| p.x), spread(|p| p.y))
}

/// Thickness of the mock airfoils, linear between sections
fn section_thickness(rel_span: f64) -> f64 {
    let (first, last) = (SECTIONS[0], SECTIONS[SECTIONS.len() - 1]);
    if rel_span <= first.0 {
        return first.1;
    }
    if rel_span >= last.0 {
        return last.1;
    }
    let i = SECTIONS.iter().position(|s| s.0 > rel_span).unwrap();
    let (a, b) = (SECTIONS[i - 1], SECTIONS[i]);
    a.1 + (b.1 - a.1) * (rel_span - a.0) / (b.0 - a.0)
}

#[derive(Debug, PartialEq)]
enum Command {
    Accumulate,
    Pressure(usize, f64),
    Force(usize, ForceComponent, f64),
    Omega([f64; 3]),
}

#[derive(Default)]
struct RecordingSink {
    commands: Vec<Command>,
}

impl LoadSink for RecordingSink {
    fn accumulate_add(&mut self) -> BladeResult<()> {
        self.commands.push(Command::Accumulate);
        Ok(())
    }

    fn surface_pressure(&mut self, element: usize, pressure: f64) -> BladeResult<()> {
        self.commands.push(Command::Pressure(element, pressure));
        Ok(())
    }

    fn nodal_force(&mut self, node: usize, component: ForceComponent, value: f64) -> BladeResult<()> {
        self.commands.push(Command::Force(node, component, value));
        Ok(())
    }

    fn angular_velocity(&mut self, omega: [f64; 3]) -> BladeResult<()> {
        self.commands.push(Command::Omega(omega));
        Ok(())
    }
}

#[test]
fn element_table_covers_every_element() {
    init_logging();
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);

    let data = build(&prop, &mut mesh, &stations).unwrap();
    assert_eq!(data.len(), mesh.element_count());
    // cutting planes leave nothing behind
    assert_eq!(mesh.keypoint_count(), 0);

    let rho = units.density(1.225);
    for r in &data.records {
        assert!((0.0..=1.0).contains(&r.rel_chord), "element {}: {}", r.element, r.rel_chord);
        assert!(r.section < 20);
        assert!(r.height > 0.0 && r.chord_length > 0.0);
        assert!(r.pressure >= 0.0, "suction side below pressure side gives lift");
        assert!(r.viscous_drag > 0.0);
        assert_relative_eq!(r.aoa_vector().norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.chord_vector().norm(), 1.0, epsilon = 1e-9);

        let expected = lift_pressure(r.cp_suc, r.cp_pres, rho, r.circular_velocity);
        assert_relative_eq!(r.pressure, expected, max_relative = 1e-2);

        let x = r.rel_chord;
        let height = 4.0 * section_thickness(r.rel_span) * x * (1.0 - x) * r.chord_length;
        assert_relative_eq!(r.height, height, max_relative = 5e-2);
    }

    // velocity from the fastest loadcase
    let outer = data.records.iter().max_by(|a, b| a.midpoint_y.total_cmp(&b.midpoint_y)).unwrap();
    assert_relative_eq!(
        outer.circular_velocity,
        UnitSystem::circular_velocity(outer.midpoint_y, 4000.0),
        max_relative = 1e-4
    );
}

#[test]
fn sections_follow_span() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);
    let data = build(&prop, &mut mesh, &stations).unwrap();

    let mut by_span = data.records.clone();
    by_span.sort_by(|a, b| a.midpoint_y.total_cmp(&b.midpoint_y));
    assert!(by_span.windows(2).all(|w| w[0].section <= w[1].section));
    assert!(by_span.iter().any(|r| r.section == 0));
    assert!(by_span.iter().any(|r| r.section == 19));
}

#[test]
fn loads_reach_the_solver() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);
    let data = build(&prop, &mut mesh, &stations).unwrap();

    let mut sink = RecordingSink::default();
    LoadApplicator::default()
        .apply(&data, &mesh, &mut sink, prop.max_rpm().unwrap())
        .unwrap();

    assert_eq!(sink.commands.first(), Some(&Command::Accumulate));
    let pressures: Vec<_> = sink
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::Pressure(e, p) => Some((*e, *p)),
            _ => None,
        })
        .collect();
    assert_eq!(pressures.len(), data.len());
    for ((element, p), record) in pressures.iter().zip(&data.records) {
        assert_eq!(*element, record.element);
        assert_eq!(*p, -record.pressure);
    }

    let forces = sink.commands.iter().filter(|c| matches!(c, Command::Force(..))).count();
    assert_eq!(forces, 2 * 4 * data.len());

    // drag of one element is spread evenly over its nodes
    let first = &data.records[0];
    let fx: f64 = sink
        .commands
        .iter()
        .take(2 + 2 * 4)
        .filter_map(|c| match c {
            Command::Force(_, ForceComponent::Fx, v) => Some(*v),
            _ => None,
        })
        .sum();
    assert_relative_eq!(fx, first.viscous_drag * first.aoa_x, max_relative = 1e-12);

    match sink.commands.last() {
        Some(Command::Omega(w)) => {
            assert_eq!(w[0], 0.0);
            assert_relative_eq!(w[2], 4000.0 * 2.0 * std::f64::consts::PI / 60.0, max_relative = 1e-12);
        }
        other => panic!("expected angular velocity last, got {:?}", other),
    }
}

#[test]
fn element_table_csv_round_trip() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);
    let data = build(&prop, &mut mesh, &stations).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("element_data.csv");
    data.write_csv(&path).unwrap();
    let restored = ElementData::read_csv(&path).unwrap();

    assert_eq!(restored, data);
    let some = data.records[data.len() / 2].element;
    assert_eq!(restored.get(some), data.get(some));
}

#[test]
fn misplaced_leading_edge_is_rejected() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (_, mut stations) = blade_mesh(&prop, &units);
    let mesh_stations = stations.clone();

    // edges pulled 30 mm towards the trailing edge
    for s in &mut stations {
        s.leading.x += 30.0;
    }
    let mut mesh = ShellMesh::from_planform(&mesh_stations, 4, 6).unwrap();
    for (k, w) in stations.windows(2).enumerate() {
        mesh.add_line(2 * k + 1, vec![w[0].leading, w[1].leading]).unwrap();
    }

    match build(&prop, &mut mesh, &stations) {
        Err(BladeError::ChordOutOfRange { value, .. }) => assert!(value < -0.05),
        other => panic!("expected ChordOutOfRange, got {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn chordwise_drag_width() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);
    let span = build(&prop, &mut mesh, &stations).unwrap();
    let options = BuilderOptions {
        drag_width: DragWidthAxis::Chord,
        ..BuilderOptions::default()
    };
    let chord = build_with(&prop, &mut mesh, &stations, options).unwrap();

    assert_eq!(chord.len(), span.len());
    for (c, s) in chord.records.iter().zip(&span.records) {
        assert_eq!(c.element, s.element);
        assert_eq!(c.pressure, s.pressure);
        // area / x-extent against area / y-extent
        let (dx, dy) = extents(&mesh, c.element);
        assert_relative_eq!(c.cf_dx, s.cf_dx * dy / dx, max_relative = 1e-4);
        assert_relative_eq!(c.viscous_drag, s.viscous_drag * dy / dx, max_relative = 1e-4);
    }
    assert!(chord.records.iter().zip(&span.records).any(|(c, s)| c.viscous_drag != s.viscous_drag));
}

#[test]
fn pressure_applied_as_computed() {
    let prop = solved_propeller();
    let units = UnitSystem::default();
    let (mut mesh, stations) = blade_mesh(&prop, &units);
    let data = build(&prop, &mut mesh, &stations).unwrap();

    let applicator = LoadApplicator::new(LoadOptions {
        pressure_sign: PressureSign::AsComputed,
        ..LoadOptions::default()
    });
    let mut sink = RecordingSink::default();
    applicator.apply(&data, &mesh, &mut sink, prop.max_rpm().unwrap()).unwrap();

    let pressures: Vec<_> = sink
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::Pressure(e, p) => Some((*e, *p)),
            _ => None,
        })
        .collect();
    assert_eq!(pressures.len(), data.len());
    for ((element, p), record) in pressures.iter().zip(&data.records) {
        assert_eq!(*element, record.element);
        assert_eq!(*p, record.pressure);
    }
    assert!(data.records.iter().any(|r| r.pressure != 0.0));
}
