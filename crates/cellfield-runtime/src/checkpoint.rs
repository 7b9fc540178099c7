//! Checkpoint files.
//!
//! The diffusion configuration is the only transform state that outlives a
//! step, so it is what goes into a checkpoint. Per-step reports can be
//! dumped next to it as JSON for inspection.

use cellfield_core::error::Result;
use cellfield_fgt::config::DiffusionConfig;
use cellfield_fgt::metrics::TransformReport;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Write `config` to `path` in the binary checkpoint layout.
pub fn save_config(config: &DiffusionConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    config.save(&mut out)?;
    out.flush()?;
    debug!(path = %path.display(), signals = config.len(), "saved diffusion config");
    Ok(())
}

/// Read a configuration written by [`save_config`].
pub fn load_config(path: &Path) -> Result<DiffusionConfig> {
    let config = DiffusionConfig::load(BufReader::new(File::open(path)?))?;
    debug!(path = %path.display(), signals = config.len(), "loaded diffusion config");
    Ok(config)
}

/// Dump a step's reports as pretty JSON.
pub fn save_reports(reports: &[TransformReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Read reports written by [`save_reports`].
pub fn load_reports(path: &Path) -> Result<Vec<TransformReport>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfield_core::error::FieldError;
    use cellfield_core::types::SignalId;

    #[test]
    fn config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("diffusion.ckpt");

        let mut config = DiffusionConfig::new();
        config.push(SignalId(0), 16.0, 1e-4).unwrap();
        config.push(SignalId(12), 0.5, 0.2).unwrap();
        save_config(&config, &path).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, config.encoded_len());
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.ckpt")).unwrap_err();
        assert!(matches!(err, FieldError::Io(_)));
    }
}
