//! rxforge – command-line prescription → PDF generator.
//!
//! Usage:
//!   rxforge <record.json> [output] [--format base64] [--layout layout.json]
//!
//! If `output` is omitted the document is written next to the input file as
//! `<prescription id>.pdf`.

use std::{env, fs, path::Path, path::PathBuf, process};

use rx_forge::pipeline::{compute_layout_config, generate, GenerationConfig};
use rx_forge::{output_file_name, OutputFormat, PrescriptionRecord};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut format = OutputFormat::Binary;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                format = OutputFormat::from_return_format(iter.next().map(String::as_str))
            }
            "--layout" => match iter.next() {
                Some(v) => layout_path = Some(PathBuf::from(v)),
                None => {
                    eprintln!("Error: --layout needs a path.");
                    print_usage(&args[0]);
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let record = match PrescriptionRecord::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // Default output: same directory as input, named after the record.
    let output = output_path.unwrap_or_else(|| {
        input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(output_file_name(&record))
    });

    let config = GenerationConfig {
        format,
        ..GenerationConfig::default()
    };

    if let Some(path) = &layout_path {
        match compute_layout_config(&record, &config) {
            Ok(layout) => write_or_exit(path, layout.to_json().as_bytes()),
            Err(e) => {
                eprintln!("Error computing layout: {e}");
                process::exit(1);
            }
        }
    }

    match generate(&record, &config) {
        Ok(payload) => {
            let bytes = payload.into_bytes();
            write_or_exit(&output, &bytes);
            eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn write_or_exit(path: &Path, bytes: &[u8]) {
    // Create output directory if necessary.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Error writing '{}': {e}", path.display());
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("rxforge – prescription record to PDF (rx-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <record.json> [output] [--format base64] [--layout layout.json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <record.json>  Prescription record as JSON");
    eprintln!("  [output]       Output path  (default: <prescription id>.pdf next to the input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --format, -f   `base64` writes the PDF as base64 text; anything else writes raw bytes");
    eprintln!("  --layout       Also dump the paginated layout as JSON to this path");
    eprintln!("  --help         Print this message");
}
