use crate::{FailureSet, FileError, RunOutcome};
use colored::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    files_skipped: usize,
    total_words: usize,
    failures: &'a FailureSet,
    file_errors: &'a [FileError],
}

pub fn print_failures(outcome: &RunOutcome, colored_output: bool, format: &OutputFormat) {
    match format {
        OutputFormat::Text => print_text(outcome, colored_output),
        OutputFormat::Json => print_json(outcome),
    }
}

fn print_text(outcome: &RunOutcome, colored_output: bool) {
    let mut current: Option<&str> = None;

    for occurrence in &outcome.occurrences {
        if current != Some(occurrence.file.as_str()) {
            current = Some(&occurrence.file);
            if colored_output {
                println!("\n{}", occurrence.file.bold().underline());
            } else {
                println!("\n{}", occurrence.file);
            }
        }

        let line_info = format!("{}:{}", occurrence.line, occurrence.column);
        if colored_output {
            println!("  {} {}", line_info.blue().bold(), occurrence.word.red().bold());
        } else {
            println!("  {} {}", line_info, occurrence.word);
        }
    }

    for error in &outcome.file_errors {
        if colored_output {
            eprintln!(
                "{} {}: {}",
                "warning:".yellow().bold(),
                error.file,
                error.error
            );
        } else {
            eprintln!("warning: {}: {}", error.file, error.error);
        }
    }
}

fn print_json(outcome: &RunOutcome) {
    let output = JsonOutput {
        files_checked: outcome.checked,
        files_skipped: outcome.skipped,
        total_words: outcome.failures.len(),
        failures: &outcome.failures,
        file_errors: &outcome.file_errors,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

pub fn print_summary(outcome: &RunOutcome, colored_output: bool) {
    println!();
    if outcome.failures.is_empty() {
        if colored_output {
            println!("{}", "✓ No unknown words found!".green().bold());
        } else {
            println!("✓ No unknown words found!");
        }
        return;
    }

    let files: HashSet<&str> = outcome
        .failures
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    let word_label = if outcome.failures.len() == 1 {
        "unknown word"
    } else {
        "unknown words"
    };
    let file_label = if files.len() == 1 { "file" } else { "files" };

    if colored_output {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            outcome.failures.len().to_string().red().bold(),
            word_label,
            files.len(),
            file_label
        );
    } else {
        println!(
            "✗ {} {} found in {} {}",
            outcome.failures.len(),
            word_label,
            files.len(),
            file_label
        );
    }
}
