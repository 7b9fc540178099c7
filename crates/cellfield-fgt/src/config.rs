//! Diffusion configuration: which signals diffuse, with what bandwidth
//! and accuracy.
//!
//! The only state that survives between simulation steps. It is written
//! into simulation checkpoints in a fixed little-endian layout:
//!
//! ```text
//! u16 count
//! count × { u16 signal, f64 delta, f64 epsilon }
//! ```

use cellfield_core::error::{CheckpointError, ConfigError, FieldError, Result};
use cellfield_core::types::SignalId;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One diffusing signal: Gaussian bandwidth `delta` and accuracy `epsilon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusiveSignal {
    pub signal: SignalId,
    /// Kernel bandwidth in simulation units: `exp(-d² / delta)`.
    pub delta: f64,
    /// Requested accuracy, relative to the total source weight.
    pub epsilon: f64,
}

impl DiffusiveSignal {
    pub fn new(signal: SignalId, delta: f64, epsilon: f64) -> Self {
        Self {
            signal,
            delta,
            epsilon,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.delta > 0.0 && self.delta.is_finite()) {
            return Err(FieldError::invalid_config(
                format!("{}.delta", self.signal),
                self.delta.to_string(),
                "bandwidth must be positive and finite",
            ));
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(FieldError::invalid_config(
                format!("{}.epsilon", self.signal),
                self.epsilon.to_string(),
                "accuracy must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// Ordered list of diffusing signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffusionConfig {
    signals: Vec<DiffusiveSignal>,
}

impl DiffusionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel lists of signals, bandwidths and accuracies.
    pub fn from_parallel(signals: &[SignalId], deltas: &[f64], epsilons: &[f64]) -> Result<Self> {
        if signals.len() != deltas.len() || signals.len() != epsilons.len() {
            return Err(FieldError::invalid_config(
                "diffusive signals",
                format!("{}/{}/{}", signals.len(), deltas.len(), epsilons.len()),
                "signal, delta and epsilon lists must have the same length",
            ));
        }
        let entries = signals
            .iter()
            .zip(deltas)
            .zip(epsilons)
            .map(|((&s, &d), &e)| DiffusiveSignal::new(s, d, e))
            .collect();
        Self::from_entries(entries)
    }

    /// Build from entries, validating each one.
    pub fn from_entries(entries: Vec<DiffusiveSignal>) -> Result<Self> {
        let config = Self { signals: entries };
        config.validate()?;
        Ok(config)
    }

    /// Append a signal. Duplicates and invalid values are rejected.
    pub fn push(&mut self, signal: SignalId, delta: f64, epsilon: f64) -> Result<()> {
        let entry = DiffusiveSignal::new(signal, delta, epsilon);
        entry.validate()?;
        if self.position_of(signal).is_some() {
            return Err(ConfigError::DuplicateSignal(signal).into());
        }
        self.signals.push(entry);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.signals.iter().enumerate() {
            entry.validate()?;
            if self.signals[..i].iter().any(|e| e.signal == entry.signal) {
                return Err(ConfigError::DuplicateSignal(entry.signal).into());
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[DiffusiveSignal] {
        &self.signals
    }

    pub fn signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.signals.iter().map(|e| e.signal)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Position of a signal in the configured order.
    pub fn position_of(&self, signal: SignalId) -> Option<usize> {
        self.signals.iter().position(|e| e.signal == signal)
    }

    pub fn get(&self, signal: SignalId) -> Option<&DiffusiveSignal> {
        self.signals.iter().find(|e| e.signal == signal)
    }

    /// Write the checkpoint record.
    pub fn save<W: Write>(&self, mut out: W) -> Result<()> {
        let count = u16::try_from(self.signals.len())
            .map_err(|_| CheckpointError::TooManySignals(self.signals.len()))?;
        out.write_all(&count.to_le_bytes())?;
        for entry in &self.signals {
            out.write_all(&entry.signal.as_u16().to_le_bytes())?;
            out.write_all(&entry.delta.to_le_bytes())?;
            out.write_all(&entry.epsilon.to_le_bytes())?;
        }
        Ok(())
    }

    /// Read a checkpoint record written by [`save`](Self::save).
    ///
    /// Values are taken as stored; a checkpoint is trusted to come from a
    /// valid configuration.
    pub fn load<R: Read>(mut input: R) -> Result<Self> {
        let count = read_u16(&mut input)?;
        let mut signals = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let signal = SignalId(read_u16(&mut input)?);
            let delta = read_f64(&mut input)?;
            let epsilon = read_f64(&mut input)?;
            signals.push(DiffusiveSignal::new(signal, delta, epsilon));
        }
        Ok(Self { signals })
    }

    /// Size in bytes of the checkpoint record.
    pub fn encoded_len(&self) -> usize {
        2 + self.signals.len() * (2 + 8 + 8)
    }
}

fn read_u16<R: Read>(input: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    input.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_f64<R: Read>(input: &mut R) -> Result<f64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiffusionConfig {
        let mut config = DiffusionConfig::new();
        config.push(SignalId(3), 25.0, 1e-3).unwrap();
        config.push(SignalId(0), 0.5, 0.05).unwrap();
        config
    }

    #[test]
    fn positions_follow_insertion_order() {
        let config = sample();
        assert_eq!(config.position_of(SignalId(3)), Some(0));
        assert_eq!(config.position_of(SignalId(0)), Some(1));
        assert_eq!(config.position_of(SignalId(9)), None);
        assert_eq!(config.get(SignalId(0)).unwrap().delta, 0.5);
    }

    #[test]
    fn zero_delta_is_rejected() {
        let mut config = DiffusionConfig::new();
        let err = config.push(SignalId(1), 0.0, 1e-3).unwrap_err();
        assert!(matches!(err, FieldError::Config(ConfigError::InvalidValue { .. })));
        assert!(config.is_empty());
    }

    #[test]
    fn duplicate_signal_is_rejected() {
        let mut config = sample();
        let err = config.push(SignalId(3), 1.0, 1e-3).unwrap_err();
        assert_eq!(err, FieldError::Config(ConfigError::DuplicateSignal(SignalId(3))));
    }

    #[test]
    fn parallel_lists_must_agree() {
        let err = DiffusionConfig::from_parallel(&[SignalId(1)], &[1.0, 2.0], &[0.1]).unwrap_err();
        assert!(matches!(err, FieldError::Config(_)));

        let ok = DiffusionConfig::from_parallel(&[SignalId(1), SignalId(2)], &[1.0, 2.0], &[0.1, 0.01])
            .unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn checkpoint_layout_has_no_padding() {
        let config = sample();
        let mut buf = Vec::new();
        config.save(&mut buf).unwrap();
        assert_eq!(buf.len(), config.encoded_len());
        assert_eq!(buf.len(), 2 + 2 * 18);
        assert_eq!(&buf[..2], &2u16.to_le_bytes());
        assert_eq!(&buf[2..4], &3u16.to_le_bytes());
        assert_eq!(&buf[4..12], &25.0f64.to_le_bytes());
    }

    #[test]
    fn checkpoint_round_trip() {
        let config = sample();
        let mut buf = Vec::new();
        config.save(&mut buf).unwrap();
        let loaded = DiffusionConfig::load(buf.as_slice()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn truncated_checkpoint_is_reported() {
        let mut buf = Vec::new();
        sample().save(&mut buf).unwrap();
        buf.truncate(buf.len() - 3);
        let err = DiffusionConfig::load(buf.as_slice()).unwrap_err();
        assert_eq!(err, FieldError::Checkpoint(CheckpointError::Truncated));
    }

    #[test]
    fn empty_config_round_trips() {
        let mut buf = Vec::new();
        DiffusionConfig::new().save(&mut buf).unwrap();
        assert_eq!(buf, vec![0, 0]);
        assert!(DiffusionConfig::load(buf.as_slice()).unwrap().is_empty());
    }
}
