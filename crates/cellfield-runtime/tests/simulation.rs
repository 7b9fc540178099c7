//! Integration tests: whole populations stepping through signal fields.

use cellfield_runtime::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

const ATTRACTANT: SignalId = SignalId(0);
const REPELLENT: SignalId = SignalId(1);

/// Cells on a jittered lattice; every third cell secretes the attractant,
/// every fifth the repellent, and every cell senses both at its center plus
/// one extra point for the attractant.
fn tissue(side: usize, spacing: f64) -> CellPopulation {
    let mut population = CellPopulation::new();
    let mut seed = 0u64;
    for i in 0..side {
        for j in 0..side {
            for k in 0..side {
                let jitter = 0.1 * spacing * (((i * 7 + j * 3 + k) % 5) as f64 / 5.0);
                let at = Point3::new(
                    i as f64 * spacing + jitter,
                    j as f64 * spacing,
                    k as f64 * spacing - jitter,
                );
                let mut cell = FieldCell::with_id(CellId::from_seed(seed), at);
                if seed % 3 == 0 {
                    cell.emit(ATTRACTANT, 1.0 + (seed % 4) as f64);
                }
                if seed % 5 == 0 {
                    cell.emit(REPELLENT, -0.5);
                }
                cell.sense(ATTRACTANT);
                cell.sense_at(ATTRACTANT, at.map(|c| c + 0.25 * spacing));
                cell.sense(REPELLENT);
                population.spawn(cell);
                seed += 1;
            }
        }
    }
    population
}

fn brute_force(population: &CellPopulation, signal: SignalId, delta: f64, at: &Point3) -> f64 {
    population
        .cells()
        .iter()
        .map(|c| c.emission(signal) * (-c.position.dist2(at) / delta).exp())
        .sum()
}

fn config(attractant_delta: f64, repellent_delta: f64, epsilon: f64) -> DiffusionConfig {
    DiffusionConfig::from_parallel(
        &[ATTRACTANT, REPELLENT],
        &[attractant_delta, repellent_delta],
        &[epsilon, epsilon],
    )
    .unwrap()
}

#[test]
fn every_cell_receives_accurate_fields() {
    init_logging();
    let mut population = tissue(8, 1.0);
    let (da, dr, eps) = (6.0, 20.0, 1e-4);
    let mut field = SignalField::new(config(da, dr, eps)).unwrap();

    let summary = field.step(&mut population).unwrap();
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.reports[0].signal, ATTRACTANT);
    assert_eq!(summary.reports[0].targets, 2 * 512);
    assert_eq!(summary.reports[1].targets, 512);
    assert!(summary.box_pairs() > 0);

    let q_attractant: f64 = population.cells().iter().map(|c| c.emission(ATTRACTANT).abs()).sum();
    let q_repellent: f64 = population.cells().iter().map(|c| c.emission(REPELLENT).abs()).sum();

    for cell in population.cells() {
        let got = cell.field(ATTRACTANT);
        assert_eq!(got.len(), 2);
        for (value, probe) in got.iter().zip(cell.probes(ATTRACTANT)) {
            let exact = brute_force(&population, ATTRACTANT, da, probe);
            assert!((value - exact).abs() <= eps * q_attractant);
        }

        let got = cell.field(REPELLENT);
        assert_eq!(got.len(), 1);
        let exact = brute_force(&population, REPELLENT, dr, &cell.position);
        assert!((got[0] - exact).abs() <= eps * q_repellent);
        assert!(got[0] <= 0.0);
    }
}

#[test]
fn repeated_steps_give_identical_fields() {
    let mut population = tissue(6, 2.0);
    let mut field = SignalField::new(config(10.0, 30.0, 1e-3)).unwrap();

    field.step(&mut population).unwrap();
    let first: Vec<Vec<f64>> = population
        .cells()
        .iter()
        .map(|c| c.field(ATTRACTANT).to_vec())
        .collect();
    field.step(&mut population).unwrap();
    let second: Vec<Vec<f64>> = population
        .cells()
        .iter()
        .map(|c| c.field(ATTRACTANT).to_vec())
        .collect();

    assert_eq!(first, second);
    assert_eq!(field.tick(), 2);
}

#[test]
fn moving_cells_changes_the_field() {
    let mut population = tissue(4, 1.0);
    let mut field = SignalField::new(config(2.0, 2.0, 1e-3)).unwrap();
    let probe = population.cells()[1].id;

    field.step(&mut population).unwrap();
    let before = population.get(probe).unwrap().field(ATTRACTANT)[0];

    // Carry every emitter far away; the sensed field should collapse.
    for cell in population.iter_mut() {
        if cell.emission(ATTRACTANT) != 0.0 {
            let far = cell.position.map(|c| c + 20.0);
            cell.move_to(far);
        }
    }
    field.step(&mut population).unwrap();
    let after = population.get(probe).unwrap().field(ATTRACTANT)[0];

    assert!(before > 0.1);
    assert!(after.abs() < 1e-6);
}

#[test]
fn population_without_emitters_gets_zero_fields() {
    let mut population: CellPopulation = (0..10)
        .map(|k| {
            let mut cell = FieldCell::new(Point3::new(k as f64, 0.0, 0.0));
            cell.sense(ATTRACTANT);
            cell
        })
        .collect();
    let mut field = SignalField::new(config(1.0, 1.0, 1e-3)).unwrap();
    let summary = field.step(&mut population).unwrap();

    assert_eq!(summary.report(ATTRACTANT).unwrap().sources, 0);
    assert_eq!(summary.report(REPELLENT).unwrap().targets, 0);
    assert!(population.cells().iter().all(|c| c.field(ATTRACTANT) == [0.0]));
    assert!(population.cells().iter().all(|c| c.field(REPELLENT).is_empty()));
}

#[test]
fn settings_file_configures_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cellfield.toml");
    std::fs::write(
        &path,
        r#"
        [field]
        log_reports = false

        [[signal]]
        id = 1
        delta = 20.0

        [[signal]]
        id = 0
        delta = 6.0
        epsilon = 1e-5
        "#,
    )
    .unwrap();

    let settings = FieldSettings::load(&path).unwrap();
    let field = SignalField::from_settings(&settings).unwrap();
    let order: Vec<SignalId> = field.config().signals().collect();
    assert_eq!(order, vec![REPELLENT, ATTRACTANT]);
    assert_eq!(field.config().get(ATTRACTANT).unwrap().epsilon, 1e-5);
    assert_eq!(field.config().get(REPELLENT).unwrap().epsilon, 1e-3);

    // Written back out, the file parses to the same settings.
    let copy = dir.path().join("out").join("copy.toml");
    settings.save(&copy).unwrap();
    assert_eq!(FieldSettings::load(&copy).unwrap(), settings);
}

#[test]
fn checkpoint_restores_a_field_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let ckpt = dir.path().join("run").join("diffusion.ckpt");
    let reports_path = dir.path().join("run").join("reports.json");

    let mut population = tissue(4, 1.5);
    let mut field = SignalField::new(config(5.0, 12.0, 1e-3)).unwrap();
    let summary = field.step(&mut population).unwrap();
    let before: Vec<f64> = population.cells().iter().map(|c| c.field(REPELLENT)[0]).collect();

    save_config(field.config(), &ckpt).unwrap();
    save_reports(&summary.reports, &reports_path).unwrap();

    let mut restored = SignalField::new(load_config(&ckpt).unwrap()).unwrap();
    assert_eq!(restored.config(), field.config());
    restored.step(&mut population).unwrap();
    let after: Vec<f64> = population.cells().iter().map(|c| c.field(REPELLENT)[0]).collect();
    assert_eq!(before, after);

    let reports = load_reports(&reports_path).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].signal, REPELLENT);
    assert_eq!(reports[1].counters, summary.reports[1].counters);
}

#[test]
fn clamped_accuracy_is_reported() {
    init_logging();
    let mut population = tissue(3, 1.0);
    let mut config = DiffusionConfig::new();
    config.push(ATTRACTANT, 4.0, 0.5).unwrap();
    let mut field = SignalField::new(config).unwrap();

    let summary = field.step(&mut population).unwrap();
    let params = summary.report(ATTRACTANT).unwrap().parameters;
    assert!(params.epsilon_clamped);
    assert_eq!(params.epsilon, EPSILON_CEILING);
}

#[test]
fn lone_cell_with_narrow_kernel_senses_its_own_signal() {
    init_logging();
    let mut population = CellPopulation::new();
    let mut cell = FieldCell::new(Point3::new(5.0, 5.0, 5.0));
    cell.emit(ATTRACTANT, 2.0);
    cell.sense(ATTRACTANT);
    let id = population.spawn(cell);

    let mut field = SignalField::new(config(1e-5, 1e-5, 1e-3)).unwrap();
    let summary = field.step(&mut population).unwrap();

    for report in &summary.reports {
        assert_eq!(report.parameters.boxes_per_side, 1);
    }
    let seen = population.get(id).unwrap().field(ATTRACTANT);
    assert_eq!(seen.len(), 1);
    assert!((seen[0] - 2.0).abs() < 1e-12);
}
