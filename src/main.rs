use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use prescripta_lib::advisory::{check_interactions, recommend_dosage};
use prescripta_lib::config::InferenceConfig;
use prescripta_lib::{build_analyzer, AnalysisInput};

/// Turn prescriptions into structured records
#[derive(Parser, Debug)]
#[command(name = "prescripta", version)]
#[command(about = "Structured prescription analysis from text, PDF, DOCX or scanned images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a prescription file, or pasted text with --text
    Analyze {
        /// Prescription file (.txt, .pdf, .docx, .jpg, .jpeg, .png, .bmp, .tiff)
        #[arg(required_unless_present = "text", conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Prescription text to analyze instead of a file
        #[arg(long)]
        text: Option<String>,
    },
    /// Check a list of drugs against known interaction pairs
    Interactions {
        #[arg(required = true)]
        drugs: Vec<String>,
    },
    /// Estimate a weight-based dose
    Dosage {
        medication: String,

        /// Patient age in years
        #[arg(long)]
        age: u32,

        /// Patient weight in kilograms
        #[arg(long)]
        weight: f64,
    },
}

fn main() -> ExitCode {
    prescripta_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, String> {
    match command {
        Command::Analyze { file, text } => {
            let input = match (file, text) {
                (Some(path), _) => AnalysisInput::from_path(&path).map_err(|e| e.to_string())?,
                (None, Some(text)) => AnalysisInput::Text(text),
                (None, None) => return Err("provide a file or --text".into()),
            };
            let config = InferenceConfig::from_env();
            let analyzer = build_analyzer(&config).map_err(|e| e.to_string())?;
            let outcome = analyzer
                .analyze(input)
                .map_err(|e| format!("{e} ({})", e.cause()))?;
            to_json(&outcome)
        }
        Command::Interactions { drugs } => to_json(&check_interactions(&drugs)),
        Command::Dosage {
            medication,
            age,
            weight,
        } => {
            let recommendation =
                recommend_dosage(&medication, age, weight).map_err(|e| e.to_string())?;
            to_json(&recommendation)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}
