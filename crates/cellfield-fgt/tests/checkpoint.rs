//! Diffusion configuration checkpoints written to real files.

use cellfield_core::prelude::*;
use cellfield_fgt::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};

fn config() -> DiffusionConfig {
    DiffusionConfig::from_parallel(
        &[SignalId(2), SignalId(7), SignalId(1)],
        &[12.5, 0.25, 3.0],
        &[1e-3, 1e-6, 0.05],
    )
    .unwrap()
}

#[test]
fn config_survives_a_file_round_trip() {
    let mut file = tempfile::tempfile().unwrap();
    config().save(BufWriter::new(&mut file)).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let loaded = DiffusionConfig::load(BufReader::new(&file)).unwrap();
    assert_eq!(loaded, config());
    assert_eq!(
        loaded.signals().collect::<Vec<_>>(),
        vec![SignalId(2), SignalId(7), SignalId(1)]
    );
}

#[test]
fn checkpoint_is_embedded_in_a_larger_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.bin");

    {
        let mut out = BufWriter::new(File::create(&path).unwrap());
        out.write_all(b"HDR!").unwrap();
        config().save(&mut out).unwrap();
        out.write_all(b"tail").unwrap();
    }

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 4 + config().encoded_len() + 4);

    // Reading stops exactly at the end of the record.
    let mut rest = &bytes[4..];
    let loaded = DiffusionConfig::load(&mut rest).unwrap();
    assert_eq!(loaded, config());
    assert_eq!(rest, b"tail");
}

#[test]
fn restored_config_drives_a_transform() {
    let mut buf = Vec::new();
    config().save(&mut buf).unwrap();
    let restored = DiffusionConfig::load(buf.as_slice()).unwrap();

    let mut fgt = FastGaussTransform::with_config(restored).unwrap();
    let mut cloud = PointCloud::new(
        vec![SourcePoint::new(Point3::ORIGIN, 1.0)],
        vec![Point3::new(0.5, 0.0, 0.0)],
    );
    fgt.ingest(SignalId(7), &cloud).unwrap();
    fgt.normalize().unwrap();
    fgt.fast_sum().unwrap();
    fgt.distribute(&mut cloud).unwrap();

    let expected = (-0.25f64 / 0.25).exp();
    assert!((cloud.values[0] - expected).abs() < 1e-9);
}

#[test]
fn empty_file_is_truncated() {
    let file = tempfile::tempfile().unwrap();
    let err = DiffusionConfig::load(&file).unwrap_err();
    assert_eq!(err, FieldError::Checkpoint(CheckpointError::Truncated));
}
