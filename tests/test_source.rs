//! Tests for the composite minibatch source
//!
//! Builds real map files, raw grayscale image files, and CTF target files in
//! a temp directory, then exercises batching, sweep accounting, the sweep
//! limit, and the construction-time failure modes.

use multichannel_trainer::source::{CompositeSource, MinibatchSource};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEIGHT: usize = 2;
const WIDTH: usize = 2;

/// Write raw 2x2 grayscale images plus the map file listing them.
/// Returns the map file path.
fn write_channel(dir: &Path, channel: &str, images: &[[u8; 4]]) -> String {
    let mut map_lines = String::new();
    for (i, image) in images.iter().enumerate() {
        let file_name = format!("{}_{}.raw", channel, i);
        fs::write(dir.join(&file_name), image).expect("failed to write image");
        map_lines.push_str(&format!("{}\t0\n", file_name));
    }
    let map_path = dir.join(format!("{}.map", channel));
    fs::write(&map_path, map_lines).expect("failed to write map file");
    map_path.to_str().unwrap().to_string()
}

fn write_targets(dir: &Path, lines: &[&str]) -> String {
    let path = dir.join("targets.ctf");
    fs::write(&path, lines.join("\n")).expect("failed to write ctf file");
    path.to_str().unwrap().to_string()
}

fn one_channel_source(
    dir: &Path,
    images: &[[u8; 4]],
    target_lines: &[&str],
    output_size: usize,
    max_sweeps: Option<u32>,
) -> Result<CompositeSource, Box<dyn std::error::Error>> {
    let map = write_channel(dir, "Channel1", images);
    let targets = write_targets(dir, target_lines);
    CompositeSource::new(
        &[("Channel1".to_string(), map)],
        &targets,
        HEIGHT,
        WIDTH,
        output_size,
        max_sweeps,
    )
}

// ============================================================================
// Batching and Sweep Accounting Tests
// ============================================================================

mod batching_tests {
    use super::*;

    #[test]
    fn test_single_batch_completes_sweep() {
        let dir = TempDir::new().unwrap();
        let mut source = one_channel_source(
            dir.path(),
            &[[0, 1, 2, 3], [10, 11, 12, 13]],
            &["|targets 1.0", "|targets 2.0"],
            1,
            Some(1),
        )
        .unwrap();

        let batch = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(batch.count, 2);
        assert!(batch.sweep_end);
        assert_eq!(batch.targets, vec![1.0, 2.0]);
        let channel = &batch.channels["Channel1"];
        assert_eq!(channel, &vec![0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0]);

        assert!(source.next_minibatch(2).unwrap().is_none());
        assert_eq!(source.sweeps_completed(), 1);
    }

    #[test]
    fn test_short_final_batch() {
        let dir = TempDir::new().unwrap();
        let mut source = one_channel_source(
            dir.path(),
            &[[1; 4], [2; 4], [3; 4]],
            &["|targets 1.0", "|targets 2.0", "|targets 3.0"],
            1,
            Some(1),
        )
        .unwrap();

        let first = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(first.count, 2);
        assert!(!first.sweep_end);

        let second = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(second.count, 1);
        assert!(second.sweep_end);
        assert_eq!(second.targets, vec![3.0]);
    }

    #[test]
    fn test_cursor_wraps_after_sweep() {
        let dir = TempDir::new().unwrap();
        let mut source = one_channel_source(
            dir.path(),
            &[[7; 4], [9; 4]],
            &["|targets 0.5", "|targets 0.25"],
            1,
            Some(2),
        )
        .unwrap();

        let first_pass = source.next_minibatch(2).unwrap().unwrap();
        let second_pass = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(first_pass.targets, second_pass.targets);
        assert!(second_pass.sweep_end);
        assert!(source.next_minibatch(2).unwrap().is_none());
    }

    #[test]
    fn test_unbounded_source_never_exhausts() {
        let dir = TempDir::new().unwrap();
        let mut source = one_channel_source(
            dir.path(),
            &[[1; 4]],
            &["|targets 1.0"],
            1,
            None,
        )
        .unwrap();

        for _ in 0..10 {
            let batch = source.next_minibatch(4).unwrap().unwrap();
            assert_eq!(batch.count, 1);
            assert!(batch.sweep_end);
        }
        assert_eq!(source.sweeps_completed(), 10);
    }

    #[test]
    fn test_exhausted_source_stays_exhausted() {
        let dir = TempDir::new().unwrap();
        let mut source =
            one_channel_source(dir.path(), &[[1; 4]], &["|targets 1.0"], 1, Some(1)).unwrap();

        assert!(source.next_minibatch(1).unwrap().is_some());
        for _ in 0..3 {
            assert!(source.next_minibatch(1).unwrap().is_none());
        }
    }

    #[test]
    fn test_multi_channel_batches_carry_every_channel() {
        let dir = TempDir::new().unwrap();
        let map_a = write_channel(dir.path(), "Channel1", &[[1; 4], [2; 4]]);
        let map_b = write_channel(dir.path(), "Channel2", &[[5; 4], [6; 4]]);
        let targets = write_targets(dir.path(), &["|targets 1.0 0.0", "|targets 0.0 1.0"]);

        let mut source = CompositeSource::new(
            &[
                ("Channel1".to_string(), map_a),
                ("Channel2".to_string(), map_b),
            ],
            &targets,
            HEIGHT,
            WIDTH,
            2,
            Some(1),
        )
        .unwrap();

        let batch = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(batch.channels.len(), 2);
        assert_eq!(batch.channels["Channel1"][0], 1.0);
        assert_eq!(batch.channels["Channel2"][0], 5.0);
        assert_eq!(batch.targets, vec![1.0, 0.0, 0.0, 1.0]);
    }
}

// ============================================================================
// Format Tests
// ============================================================================

mod format_tests {
    use super::*;

    #[test]
    fn test_ctf_sequence_ids_and_comments_ignored() {
        let dir = TempDir::new().unwrap();
        let mut source = one_channel_source(
            dir.path(),
            &[[1; 4], [2; 4]],
            &[
                "0 |targets 1.0 |# a comment",
                "1 |other 9.9 |targets 2.0",
            ],
            1,
            Some(1),
        )
        .unwrap();

        let batch = source.next_minibatch(2).unwrap().unwrap();
        assert_eq!(batch.targets, vec![1.0, 2.0]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let source = one_channel_source(
            dir.path(),
            &[[1; 4]],
            &["|targets 1.0", "", "   "],
            1,
            Some(1),
        );
        assert_eq!(source.unwrap().example_count(), 1);
    }
}

// ============================================================================
// Failure Mode Tests (all fatal at construction)
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_missing_map_file() {
        let dir = TempDir::new().unwrap();
        let targets = write_targets(dir.path(), &["|targets 1.0"]);
        let result = CompositeSource::new(
            &[("Channel1".to_string(), "no/such.map".to_string())],
            &targets,
            HEIGHT,
            WIDTH,
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_image_file() {
        let dir = TempDir::new().unwrap();
        let map_path = dir.path().join("Channel1.map");
        fs::write(&map_path, "missing.raw\t0\n").unwrap();
        let targets = write_targets(dir.path(), &["|targets 1.0"]);

        let result = CompositeSource::new(
            &[("Channel1".to_string(), map_path.to_str().unwrap().to_string())],
            &targets,
            HEIGHT,
            WIDTH,
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_wrongly_sized_image() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img.raw"), [0u8; 3]).unwrap();
        let map_path = dir.path().join("Channel1.map");
        fs::write(&map_path, "img.raw\t0\n").unwrap();
        let targets = write_targets(dir.path(), &["|targets 1.0"]);

        let result = CompositeSource::new(
            &[("Channel1".to_string(), map_path.to_str().unwrap().to_string())],
            &targets,
            HEIGHT,
            WIDTH,
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_map_line_without_label_column() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img.raw"), [0u8; 4]).unwrap();
        let map_path = dir.path().join("Channel1.map");
        fs::write(&map_path, "img.raw\n").unwrap();
        let targets = write_targets(dir.path(), &["|targets 1.0"]);

        let result = CompositeSource::new(
            &[("Channel1".to_string(), map_path.to_str().unwrap().to_string())],
            &targets,
            HEIGHT,
            WIDTH,
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_channel_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let map_a = write_channel(dir.path(), "Channel1", &[[1; 4], [2; 4]]);
        let map_b = write_channel(dir.path(), "Channel2", &[[1; 4]]);
        let targets = write_targets(dir.path(), &["|targets 1.0", "|targets 2.0"]);

        let result = CompositeSource::new(
            &[
                ("Channel1".to_string(), map_a),
                ("Channel2".to_string(), map_b),
            ],
            &targets,
            HEIGHT,
            WIDTH,
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_target_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let result = one_channel_source(
            dir.path(),
            &[[1; 4], [2; 4]],
            &["|targets 1.0"],
            1,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_target_width() {
        let dir = TempDir::new().unwrap();
        let result = one_channel_source(dir.path(), &[[1; 4]], &["|targets 1.0 2.0"], 1, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_unparseable_target_value() {
        let dir = TempDir::new().unwrap();
        let result = one_channel_source(dir.path(), &[[1; 4]], &["|targets abc"], 1, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_targets_stream() {
        let dir = TempDir::new().unwrap();
        let result = one_channel_source(dir.path(), &[[1; 4]], &["|labels 1.0"], 1, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let result = one_channel_source(dir.path(), &[], &[], 1, None);
        assert!(result.is_err());
    }
}
