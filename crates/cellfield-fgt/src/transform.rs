//! Fast Gauss transform: the per-signal, per-step summation cycle.
//!
//! One cycle computes, for every target point `t_i`,
//!
//! ```text
//! G_i = Σ_j q_j · exp(-|t_i - s_j|² / δ)
//! ```
//!
//! to accuracy `ε · Σ|q_j|`, and runs
//!
//! 1. [`ingest`](FastGaussTransform::ingest): collect sources and targets from the population
//! 2. [`normalize`](FastGaussTransform::normalize): map everything into the unit cube
//! 3. [`fast_sum`](FastGaussTransform::fast_sum): hierarchical summation over a box grid
//!    (or [`exact_sum`](FastGaussTransform::exact_sum) for validation)
//! 4. [`distribute`](FastGaussTransform::distribute): hand each cell its values and clear
//!
//! Only the [`DiffusionConfig`] survives a cycle.

use crate::config::DiffusionConfig;
use crate::expansion::GaussKernel;
use crate::metrics::{EvalCounters, EvalPath, TransformReport};
use crate::params::RunParameters;
use crate::spatial_box::{BoxArena, BoxGrid};
use cellfield_core::error::{FieldError, Result, TransformError};
use cellfield_core::population::{FieldSink, FieldSource, PointSlices};
use cellfield_core::types::{Point3, SignalId, SourcePoint};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Pad keeping the largest normalized coordinate strictly below 1.
const SCALE_PAD: f64 = 1.000001;

/// Normalized bandwidth for a point set without extent. Above 2, so the
/// grid has a single box per side.
const SINGLE_BOX_DELTA: f64 = 4.0;

/// Where a transform is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformPhase {
    /// No configuration yet.
    Idle,
    /// Configured and waiting for a cycle.
    Configured,
    /// Points collected, coordinates still raw.
    Ingested,
    /// Coordinates in the unit cube, bandwidth rescaled.
    Normalized,
    /// Field values computed, ready for delivery.
    Summed,
}

impl fmt::Display for TransformPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformPhase::Idle => "idle",
            TransformPhase::Configured => "configured",
            TransformPhase::Ingested => "ingested",
            TransformPhase::Normalized => "normalized",
            TransformPhase::Summed => "summed",
        };
        f.write_str(name)
    }
}

/// Fast Gauss transform engine for one signal at a time.
///
/// All working state belongs to the instance, so independent engines (one
/// per signal, say) can run on different threads.
#[derive(Debug, Clone)]
pub struct FastGaussTransform {
    config: DiffusionConfig,
    phase: TransformPhase,

    // --- one cycle ---
    signal: Option<SignalId>,
    delta: f64,
    epsilon: f64,
    scale: f64,
    weights: Vec<f64>,
    sources: Vec<Point3>,
    targets: Vec<Point3>,
    /// Targets declared by each cell, in enumeration order.
    targets_per_cell: Vec<usize>,
    values: Vec<f64>,

    // --- fast summation ---
    parameters: Option<RunParameters>,
    counters: EvalCounters,
    source_boxes: BoxArena,
    target_boxes: BoxArena,
    occupied_boxes: BTreeSet<usize>,
    taylor_boxes: BTreeSet<usize>,
    interaction: Vec<usize>,
    hermite: Vec<f64>,
}

impl Default for FastGaussTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl FastGaussTransform {
    /// An unconfigured engine.
    pub fn new() -> Self {
        Self {
            config: DiffusionConfig::new(),
            phase: TransformPhase::Idle,
            signal: None,
            delta: 0.0,
            epsilon: 0.0,
            scale: 1.0,
            weights: Vec::new(),
            sources: Vec::new(),
            targets: Vec::new(),
            targets_per_cell: Vec::new(),
            values: Vec::new(),
            parameters: None,
            counters: EvalCounters::default(),
            source_boxes: BoxArena::default(),
            target_boxes: BoxArena::default(),
            occupied_boxes: BTreeSet::new(),
            taylor_boxes: BTreeSet::new(),
            interaction: Vec::new(),
            hermite: Vec::new(),
        }
    }

    /// An engine configured with `config`.
    pub fn with_config(config: DiffusionConfig) -> Result<Self> {
        let mut fgt = Self::new();
        fgt.configure(config)?;
        Ok(fgt)
    }

    /// Record which signals diffuse. Only allowed between cycles.
    pub fn configure(&mut self, config: DiffusionConfig) -> Result<()> {
        self.expect_phase("configure", &[TransformPhase::Idle, TransformPhase::Configured])?;
        config.validate()?;
        self.config = config;
        self.phase = TransformPhase::Configured;
        Ok(())
    }

    /// Collect this signal's sources and targets from the population.
    ///
    /// Cells are walked in their enumeration order; each contributes its
    /// source (unless the weight is exactly zero) and all of its targets.
    pub fn ingest<P>(&mut self, signal: SignalId, population: &P) -> Result<()>
    where
        P: FieldSource + ?Sized,
    {
        self.expect_phase("ingest", &[TransformPhase::Configured])?;
        let entry = *self
            .config
            .get(signal)
            .ok_or_else(|| FieldError::unknown_signal(signal))?;

        self.signal = Some(signal);
        self.delta = entry.delta;
        self.epsilon = entry.epsilon;
        self.scale = 1.0;

        let cells = population.cell_count();
        self.targets_per_cell.reserve(cells);
        for cell in 0..cells {
            if let Some(source) = population.field_source(cell, signal) {
                if source.is_active() {
                    self.weights.push(source.weight);
                    self.sources.push(source.position);
                }
            }
            let targets = population.field_targets(cell, signal);
            self.targets.extend_from_slice(targets);
            self.targets_per_cell.push(targets.len());
        }

        self.values = vec![0.0; self.targets.len()];
        self.phase = TransformPhase::Ingested;
        debug!(
            %signal,
            sources = self.sources.len(),
            targets = self.targets.len(),
            delta = self.delta,
            "ingested gaussian field points"
        );
        Ok(())
    }

    /// Collect bare point lists, for callers without a cell population.
    ///
    /// Every source and every target counts as its own cell, sources first,
    /// so [`values`](Self::values) lines up with `targets`.
    pub fn ingest_points(
        &mut self,
        signal: SignalId,
        sources: &[SourcePoint],
        targets: &[Point3],
    ) -> Result<()> {
        self.ingest(signal, &PointSlices::new(sources, targets))
    }

    /// Map all coordinates into `[0, 1)³` and rescale the bandwidth.
    ///
    /// One scalar bounding interval spans all three axes of sources and
    /// targets together, so distances shrink uniformly and
    /// `exp(-d²/δ)` is unchanged when `δ` shrinks by the square of the scale.
    /// Points that all sit at one location (or no points at all) map to the
    /// origin, with a bandwidth wide enough for a single-box grid whatever
    /// `δ` was.
    /// Calling it again on normalized points does nothing.
    pub fn normalize(&mut self) -> Result<()> {
        self.expect_phase(
            "normalize",
            &[TransformPhase::Ingested, TransformPhase::Normalized],
        )?;
        if self.phase == TransformPhase::Normalized {
            return Ok(());
        }

        let (lo, hi) = self
            .sources
            .iter()
            .chain(self.targets.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.min_component()), hi.max(p.max_component()))
            });

        let extent = hi - lo;
        let (offset, scale) = if extent > 0.0 && extent.is_finite() {
            (lo, extent * SCALE_PAD)
        } else {
            // One location, or no point at all. Every coordinate equals `lo`,
            // so all points land on the origin, and the bandwidth becomes
            // SINGLE_BOX_DELTA whatever it was.
            let offset = if lo.is_finite() { lo } else { 0.0 };
            (offset, (self.delta / SINGLE_BOX_DELTA).sqrt())
        };

        let to_unit = |c: f64| (c - offset) / scale;
        for p in self.sources.iter_mut().chain(self.targets.iter_mut()) {
            *p = p.map(to_unit);
        }
        self.scale = scale;
        self.delta /= scale * scale;
        self.phase = TransformPhase::Normalized;
        Ok(())
    }

    /// Hierarchical summation into the field values.
    ///
    /// May be repeated on the same normalized points; each run starts
    /// from zeroed values.
    pub fn fast_sum(&mut self) -> Result<TransformReport> {
        self.expect_phase("fast_sum", &[TransformPhase::Normalized, TransformPhase::Summed])?;
        self.clear_boxes();
        self.values.iter_mut().for_each(|g| *g = 0.0);

        let params = RunParameters::derive(self.delta, self.epsilon);
        let grid = BoxGrid::new(params.boxes_per_side);
        let order = params.order;
        debug!(
            boxes_per_side = params.boxes_per_side,
            r = params.box_radius,
            reach = params.neighbor_reach,
            order,
            cutoff = params.source_cutoff,
            scale = self.scale,
            delta = params.delta,
            "fast gauss transform parameters"
        );

        self.source_boxes = BoxArena::with_grid(&grid);
        self.target_boxes = BoxArena::with_grid(&grid);
        for (j, s) in self.sources.iter().enumerate() {
            let b = grid.box_index(s);
            self.source_boxes.insert(&grid, b, j, order);
            self.occupied_boxes.insert(b);
        }
        for (i, t) in self.targets.iter().enumerate() {
            let b = grid.box_index(t);
            self.target_boxes.insert(&grid, b, i, order);
            self.occupied_boxes.insert(b);
        }

        let kernel = GaussKernel::new(params.delta, order);
        self.hermite = vec![0.0; kernel.coefficient_count()];

        for &i in self.source_boxes.touched() {
            let Some(source_box) = self.source_boxes.get(i) else {
                continue;
            };
            grid.interaction_list(i, params.neighbor_reach, &mut self.interaction);

            if source_box.len() < params.source_cutoff {
                // Few sources: send out individual Gaussians.
                for &k in &self.interaction {
                    let Some(target_box) = self.target_boxes.get_mut(k) else {
                        continue;
                    };
                    let mc = target_box.len();
                    if mc == 0 {
                        continue;
                    }
                    if mc <= params.target_cutoff {
                        kernel.direct_direct(
                            &self.sources,
                            &self.weights,
                            source_box.points(),
                            &self.targets,
                            target_box.points(),
                            &mut self.values,
                        );
                        self.counters.record(EvalPath::DirectDirect);
                    } else {
                        let center = target_box.center();
                        kernel.direct_taylor(
                            &self.sources,
                            &self.weights,
                            source_box.points(),
                            &center,
                            target_box.coefficients_mut(),
                        );
                        self.taylor_boxes.insert(k);
                        self.counters.record(EvalPath::DirectTaylor);
                    }
                }
            } else {
                // Many sources: one Hermite expansion for the whole box.
                let source_center = source_box.center();
                kernel.hermite_coefficients(
                    &self.sources,
                    &self.weights,
                    source_box.points(),
                    &source_center,
                    &mut self.hermite,
                );
                for &k in &self.interaction {
                    let Some(target_box) = self.target_boxes.get_mut(k) else {
                        continue;
                    };
                    let mc = target_box.len();
                    if mc == 0 {
                        continue;
                    }
                    if mc <= params.target_cutoff {
                        kernel.hermite_direct(
                            &self.hermite,
                            &source_center,
                            &self.targets,
                            target_box.points(),
                            &mut self.values,
                        );
                        self.counters.record(EvalPath::HermiteDirect);
                    } else {
                        let target_center = target_box.center();
                        kernel.hermite_taylor(
                            &self.hermite,
                            &source_center,
                            &target_center,
                            target_box.coefficients_mut(),
                        );
                        self.taylor_boxes.insert(k);
                        self.counters.record(EvalPath::HermiteTaylor);
                    }
                }
            }
        }

        for &k in &self.taylor_boxes {
            let Some(target_box) = self.target_boxes.get(k) else {
                continue;
            };
            if target_box.len() > params.target_cutoff {
                kernel.taylor_evaluate(
                    target_box.coefficients(),
                    &target_box.center(),
                    &self.targets,
                    target_box.points(),
                    &mut self.values,
                );
            }
        }

        self.parameters = Some(params);
        self.phase = TransformPhase::Summed;

        let report = TransformReport {
            signal: self.signal.unwrap_or_default(),
            sources: self.sources.len(),
            targets: self.targets.len(),
            scale: self.scale,
            parameters: params,
            counters: self.counters,
            taylor_boxes: self.taylor_boxes.len(),
        };
        debug!(
            signal = %report.signal,
            direct_direct = report.counters.direct_direct,
            direct_taylor = report.counters.direct_taylor,
            hermite_direct = report.counters.hermite_direct,
            hermite_taylor = report.counters.hermite_taylor,
            occupied_boxes = self.occupied_boxes.len(),
            source_boxes = self.source_boxes.len(),
            target_boxes = self.target_boxes.len(),
            "fast gauss transform done"
        );
        Ok(report)
    }

    /// Brute-force `O(N·M)` summation into the field values, in place of
    /// [`fast_sum`](Self::fast_sum). Ignores `ε`.
    pub fn exact_sum(&mut self) -> Result<()> {
        self.values = self.exact_values()?;
        self.clear_boxes();
        self.parameters = None;
        self.phase = TransformPhase::Summed;
        debug!(
            sources = self.sources.len(),
            targets = self.targets.len(),
            "exact gaussian sum done"
        );
        Ok(())
    }

    /// Brute-force reference values, for validating [`fast_sum`].
    ///
    /// Leaves the cycle's own values untouched.
    ///
    /// [`fast_sum`]: Self::fast_sum
    pub fn exact_values(&self) -> Result<Vec<f64>> {
        self.expect_phase("exact_sum", &[TransformPhase::Normalized, TransformPhase::Summed])?;
        if self.sources.is_empty() {
            return Ok(vec![0.0; self.targets.len()]);
        }
        let kernel = GaussKernel::new(self.delta, 1);
        Ok(self
            .targets
            .par_iter()
            .map(|t| {
                self.sources
                    .iter()
                    .zip(&self.weights)
                    .map(|(s, q)| q * kernel.eval(t, s))
                    .sum::<f64>()
            })
            .collect())
    }

    /// Deliver each cell its slice of values, then clear the cycle.
    pub fn distribute<P>(&mut self, population: &mut P) -> Result<()>
    where
        P: FieldSource + FieldSink + ?Sized,
    {
        self.expect_phase("distribute", &[TransformPhase::Summed])?;
        let cells = population.cell_count();
        if cells != self.targets_per_cell.len() {
            return Err(TransformError::PopulationChanged {
                ingested: self.targets_per_cell.len(),
                delivered: cells,
            }
            .into());
        }
        let signal = self.signal.unwrap_or_default();
        let mut start = 0;
        for (cell, &count) in self.targets_per_cell.iter().enumerate() {
            let end = start + count;
            population.deliver_field(cell, signal, &self.values[start..end]);
            start = end;
        }
        self.reset();
        Ok(())
    }

    /// Drop everything from the current cycle, keeping the configuration.
    pub fn reset(&mut self) {
        self.signal = None;
        self.weights.clear();
        self.sources.clear();
        self.targets.clear();
        self.targets_per_cell.clear();
        self.values.clear();
        self.parameters = None;
        self.scale = 1.0;
        self.clear_boxes();
        self.hermite.clear();
        self.phase = match self.phase {
            TransformPhase::Idle => TransformPhase::Idle,
            _ => TransformPhase::Configured,
        };
    }

    fn clear_boxes(&mut self) {
        self.counters = EvalCounters::default();
        self.source_boxes.clear();
        self.target_boxes.clear();
        self.occupied_boxes.clear();
        self.taylor_boxes.clear();
        self.interaction.clear();
    }

    fn expect_phase(&self, operation: &'static str, allowed: &[TransformPhase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(FieldError::invalid_phase(operation, self.phase))
        }
    }

    // --- accessors ---

    pub fn phase(&self) -> TransformPhase {
        self.phase
    }

    pub fn config(&self) -> &DiffusionConfig {
        &self.config
    }

    /// Signal of the running cycle.
    pub fn signal(&self) -> Option<SignalId> {
        self.signal
    }

    /// Field values, one per ingested target, in ingestion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Parameters of the last fast run in this cycle.
    pub fn parameters(&self) -> Option<&RunParameters> {
        self.parameters.as_ref()
    }

    pub fn counters(&self) -> EvalCounters {
        self.counters
    }

    /// Number of ingested sources (N).
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of ingested targets (M).
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Total absolute source weight `Q`, the scale of the error bound.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|q| q.abs()).sum()
    }

    /// Current bandwidth: raw after ingestion, normalized afterwards.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Source positions, normalized once [`normalize`](Self::normalize) ran.
    pub fn sources(&self) -> &[Point3] {
        &self.sources
    }

    /// Target positions, normalized once [`normalize`](Self::normalize) ran.
    pub fn targets(&self) -> &[Point3] {
        &self.targets
    }

    /// Boxes holding at least one source or target in the last fast run.
    pub fn occupied_boxes(&self) -> &BTreeSet<usize> {
        &self.occupied_boxes
    }
}
