use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}

#[allow(dead_code)]
mod cnn_infer_bin {
    include!("../cnn_infer.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;
        use cnn_inference::architecture::IMAGE_SIZE;
        use cnn_inference::utils::SimpleRng;
        use cnn_inference::LayerGraph;

        fn args(values: &[&str]) -> Vec<String> {
            values.iter().map(|s| s.to_string()).collect()
        }

        fn numbers(values: &[f32]) -> String {
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        }

        #[test]
        fn test_usage_names_program() {
            assert_eq!(
                usage(&args(&["./cnn_infer"])),
                "Usage: ./cnn_infer model input [threads]"
            );
            assert_eq!(usage(&[]), "Usage: cnn_infer model input [threads]");
        }

        #[test]
        fn test_run_small_batch() {
            let count = LayerGraph::reference().unwrap().parameter_count();
            let mut rng = SimpleRng::new(9);
            let model = crate::write_temp(&numbers(&rng.uniform_vec(count, -0.5, 0.5)));
            let input = crate::write_temp(&numbers(&rng.pixel_vec(3 * IMAGE_SIZE)));

            let cli = parse_args(&args(&[
                "cnn_infer",
                model.path().to_str().unwrap(),
                input.path().to_str().unwrap(),
                "2",
            ]))
            .unwrap();
            let config = RunConfig {
                image_count: 3,
                max_threads: 4,
                show_results: true,
            };

            run(&cli, &config).unwrap();
        }

        #[test]
        fn test_run_reports_short_input() {
            let count = LayerGraph::reference().unwrap().parameter_count();
            let model = crate::write_temp(&"0 ".repeat(count));
            let input = crate::write_temp(&"0 ".repeat(IMAGE_SIZE));

            let cli = parse_args(&args(&[
                "cnn_infer",
                model.path().to_str().unwrap(),
                input.path().to_str().unwrap(),
            ]))
            .unwrap();
            let config = RunConfig {
                image_count: 2,
                ..RunConfig::default()
            };

            let err = run(&cli, &config).unwrap_err();
            assert!(matches!(err, InferenceError::TooFewValues { found: 256, .. }));
        }

        #[test]
        fn test_run_missing_model() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("model.txt");
            let cli = CliArgs {
                model: missing.to_string_lossy().into_owned(),
                input: missing.to_string_lossy().into_owned(),
                threads: None,
            };

            let err = run(&cli, &RunConfig::default()).unwrap_err();
            assert!(matches!(err, InferenceError::Io { .. }));
        }

        #[test]
        fn test_format_predictions_ten_per_line_block() {
            let preds: Vec<usize> = (0..20).map(|i| i % 10).collect();
            let text = format_predictions(&preds, 20 / 10);

            assert_eq!(text.lines().count(), 10);
            assert_eq!(text.lines().next(), Some("0 1 "));
        }
    }
}
