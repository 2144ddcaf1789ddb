// cnn_infer.rs
// Batch classification of 16x16 grayscale images with the fixed nine-layer CNN.
//
// Usage:
//   cnn_infer <model> <input> [threads]
//
//   model:   whitespace-separated floats, the 11230 trained parameters
//   input:   whitespace-separated raw pixels in [0, 255], image_count * 256 values
//   threads: optional, honoured only when 0 < threads < max_threads
//
// An optional JSON run configuration (image_count, max_threads, show_results)
// is read from the file named by CNN_INFER_CONFIG.
//
// Output:
//   - model, input and thread settings
//   - elapsed wall-clock time of the batch pass in milliseconds
//   - every prediction, when show_results is set

use cnn_inference::config::{load_config, RunConfig};
use cnn_inference::loader::load_array;
use cnn_inference::telemetry::init_tracing;
use cnn_inference::{BatchScheduler, InferenceError, Network};
use std::env;
use std::process;

const CONFIG_ENV: &str = "CNN_INFER_CONFIG";

// Positional command-line arguments.
struct CliArgs {
    model: String,
    input: String,
    threads: Option<String>,
}

// None when the two required paths are missing.
fn parse_args(args: &[String]) -> Option<CliArgs> {
    if args.len() < 3 {
        return None;
    }
    Some(CliArgs {
        model: args[1].clone(),
        input: args[2].clone(),
        threads: args.get(3).cloned(),
    })
}

fn usage(args: &[String]) -> String {
    let program = args.first().map(String::as_str).unwrap_or("cnn_infer");
    format!("Usage: {} model input [threads]", program)
}

fn config_from_env() -> Result<RunConfig, InferenceError> {
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => load_config(path),
        _ => Ok(RunConfig::default()),
    }
}

// Space-separated predictions, a line break after every `per_line` of them.
fn format_predictions(predictions: &[usize], per_line: usize) -> String {
    let per_line = per_line.max(1);
    let mut out = String::with_capacity(predictions.len() * 3);
    for (i, pred) in predictions.iter().enumerate() {
        out.push_str(&pred.to_string());
        out.push(' ');
        if (i + 1) % per_line == 0 {
            out.push('\n');
        }
    }
    out
}

fn run(cli: &CliArgs, config: &RunConfig) -> Result<(), InferenceError> {
    let threads = config.resolve_threads(cli.threads.as_deref());
    println!("Model: {}", cli.model);
    println!("Input: {}", cli.input);
    println!("Threads: {}", threads);

    // Everything is loaded and validated before the batch starts.
    let network = Network::load_reference(&cli.model)?;
    let image_len = network.graph().image_len();
    let images = load_array(&cli.input, config.image_count * image_len)?;
    let scheduler = BatchScheduler::new(threads)?;

    let report = scheduler.run_timed(&network, &images)?;
    println!("Elapsed time: {:.2} ms", report.elapsed_ms());

    if config.show_results {
        print!(
            "{}",
            format_predictions(&report.predictions, config.image_count / 10)
        );
    }
    Ok(())
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let Some(cli) = parse_args(&args) else {
        println!("{}", usage(&args));
        return;
    };

    let config = config_from_env().unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });

    if let Err(err) = run(&cli, &config) {
        println!("Failed to load data");
        eprintln!("{}", err);
        process::exit(1);
    }
}
