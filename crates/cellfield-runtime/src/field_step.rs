//! Per-step signal field computation.
//!
//! Each simulation step, every configured signal goes through one full
//! transform cycle against the population:
//!
//! 1. Previously received field values are cleared (optional)
//! 2. For each signal, in configured order: ingest, normalize, fast sum
//! 3. The values are delivered back to the cells that asked for them
//!
//! The diffusion configuration is the only state kept between steps.

use crate::population::CellPopulation;
use crate::settings::{FieldSettings, SettingsResult, StepSettings};
use cellfield_core::error::Result;
use cellfield_core::population::{FieldSink, FieldSource};
use cellfield_core::types::{SignalId, Tick};
use cellfield_fgt::config::DiffusionConfig;
use cellfield_fgt::metrics::TransformReport;
use cellfield_fgt::transform::FastGaussTransform;
use serde::Serialize;
use tracing::{debug, info};

/// Summary of one step over all signals.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub tick: Tick,
    pub reports: Vec<TransformReport>,
}

impl StepSummary {
    pub fn report(&self, signal: SignalId) -> Option<&TransformReport> {
        self.reports.iter().find(|r| r.signal == signal)
    }

    /// Box pairs evaluated across all signals.
    pub fn box_pairs(&self) -> u32 {
        self.reports.iter().map(|r| r.counters.total()).sum()
    }
}

/// Drives the transform once per step for every diffusing signal.
#[derive(Debug, Clone)]
pub struct SignalField {
    engine: FastGaussTransform,
    step: StepSettings,
    tick: Tick,
}

impl SignalField {
    pub fn new(config: DiffusionConfig) -> Result<Self> {
        Ok(Self {
            engine: FastGaussTransform::with_config(config)?,
            step: StepSettings::default(),
            tick: 0,
        })
    }

    pub fn from_settings(settings: &FieldSettings) -> SettingsResult<Self> {
        let mut field = Self::new(settings.diffusion_config()?)?;
        field.step = settings.field.clone();
        Ok(field)
    }

    pub fn with_step_settings(mut self, step: StepSettings) -> Self {
        self.step = step;
        self
    }

    /// Replace the diffusion configuration. Takes effect next step.
    pub fn reconfigure(&mut self, config: DiffusionConfig) -> Result<()> {
        self.engine.configure(config)
    }

    pub fn config(&self) -> &DiffusionConfig {
        self.engine.config()
    }

    /// Steps completed so far.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Run one step against `population`.
    pub fn step(&mut self, population: &mut CellPopulation) -> Result<StepSummary> {
        if self.step.reset_fields {
            population.reset_fields();
        }
        let reports = compute_gaussian_fields(&mut self.engine, population)?;
        if self.step.log_reports {
            for report in &reports {
                info!(
                    tick = self.tick,
                    signal = %report.signal,
                    sources = report.sources,
                    targets = report.targets,
                    order = report.parameters.order,
                    boxes_per_side = report.parameters.boxes_per_side,
                    "signal field computed"
                );
            }
        }
        let summary = StepSummary {
            tick: self.tick,
            reports,
        };
        self.tick += 1;
        Ok(summary)
    }
}

/// Run a full transform cycle for every configured signal.
///
/// Signals are processed in configured order, each ending with delivery to
/// `population`. On error the engine is reset so the next call starts from
/// a clean cycle.
pub fn compute_gaussian_fields<P>(
    engine: &mut FastGaussTransform,
    population: &mut P,
) -> Result<Vec<TransformReport>>
where
    P: FieldSource + FieldSink + ?Sized,
{
    let signals: Vec<SignalId> = engine.config().signals().collect();
    let mut reports = Vec::with_capacity(signals.len());
    for signal in signals {
        let report = match run_cycle(engine, signal, population) {
            Ok(report) => report,
            Err(e) => {
                engine.reset();
                return Err(e);
            }
        };
        debug!(%signal, pairs = report.counters.total(), "signal cycle complete");
        reports.push(report);
    }
    Ok(reports)
}

fn run_cycle<P>(
    engine: &mut FastGaussTransform,
    signal: SignalId,
    population: &mut P,
) -> Result<TransformReport>
where
    P: FieldSource + FieldSink + ?Sized,
{
    engine.ingest(signal, &*population)?;
    engine.normalize()?;
    let report = engine.fast_sum()?;
    engine.distribute(population)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::FieldCell;
    use cellfield_core::types::Point3;

    fn two_cells(signal: SignalId) -> CellPopulation {
        let mut emitter = FieldCell::new(Point3::ORIGIN);
        emitter.emit(signal, 2.0);
        let mut receiver = FieldCell::new(Point3::new(1.0, 0.0, 0.0));
        receiver.sense(signal);
        [emitter, receiver].into_iter().collect()
    }

    fn field_for(signal: SignalId, delta: f64) -> SignalField {
        let mut config = DiffusionConfig::new();
        config.push(signal, delta, 1e-3).unwrap();
        SignalField::new(config).unwrap()
    }

    #[test]
    fn step_delivers_and_advances_tick() {
        let s = SignalId(3);
        let mut population = two_cells(s);
        let mut field = field_for(s, 2.0);

        let summary = field.step(&mut population).unwrap();
        assert_eq!(summary.tick, 0);
        assert_eq!(field.tick(), 1);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.report(s).unwrap().targets, 1);

        let got = population.cells()[1].field(s);
        assert_eq!(got.len(), 1);
        assert!((got[0] - 2.0 * (-0.5f64).exp()).abs() < 1e-9);
        assert!(population.cells()[0].field(s).is_empty());
    }

    #[test]
    fn fields_are_replaced_each_step_by_default() {
        let s = SignalId(0);
        let mut population = two_cells(s);
        let mut field = field_for(s, 1.0);
        field.step(&mut population).unwrap();
        field.step(&mut population).unwrap();
        assert_eq!(population.cells()[1].field(s).len(), 1);
    }

    #[test]
    fn fields_accumulate_without_reset() {
        let s = SignalId(0);
        let mut population = two_cells(s);
        let mut field = field_for(s, 1.0).with_step_settings(StepSettings {
            log_reports: false,
            reset_fields: false,
        });
        field.step(&mut population).unwrap();
        field.step(&mut population).unwrap();
        let got = population.cells()[1].field(s);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], got[1]);
    }

    #[test]
    fn engine_recovers_after_failed_cycle() {
        let s = SignalId(1);
        let mut population = two_cells(s);
        let mut config = DiffusionConfig::new();
        config.push(s, 1.0, 1e-3).unwrap();
        let mut engine = FastGaussTransform::with_config(config).unwrap();

        // A cycle left half-way leaves the engine mid-phase.
        engine.ingest(s, &population).unwrap();
        assert!(compute_gaussian_fields(&mut engine, &mut population).is_err());

        let reports = compute_gaussian_fields(&mut engine, &mut population).unwrap();
        assert_eq!(reports.len(), 1);
    }
}
