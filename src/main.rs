//! # Dossier CLI
//!
//! Usage:
//!   dossier request.json -o report.pdf
//!   cat request.json | dossier --base64
//!   dossier --example > request.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;
use log::debug;
use serde_json::json;

use dossier::error::DossierError;
use dossier::model::ReportRequest;
use dossier::report::{ReportArtifact, ReportComposer};
use dossier::style::ReportConfig;

#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(about = "Render a case and its subtasks as a paginated PDF audit report")]
#[command(version)]
struct Cli {
    /// Request JSON file; reads stdin when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where to write the PDF (default: "<KEY> - Audit Report.pdf")
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Report configuration JSON (page geometry, theme, title)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print `{ pdf, filename, size }` with the PDF base64-encoded instead of writing a file
    #[arg(long)]
    base64: bool,

    /// Print a sample request and exit
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_request_json());
        return;
    }

    let result = generate(&cli);

    if cli.base64 {
        let response = match result {
            Ok(artifact) => json!({
                "pdf": STANDARD.encode(&artifact.bytes),
                "filename": artifact.filename,
                "size": artifact.size,
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        println!("{}", response);
        return;
    }

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(e) => {
            eprintln!("✗ Failed to generate report: {}", e);
            process::exit(1);
        }
    };

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&artifact.filename));
    if let Err(e) = fs::write(&path, &artifact.bytes) {
        eprintln!("✗ Failed to write {}: {}", path.display(), e);
        process::exit(1);
    }
    eprintln!("✓ Written {} bytes to {}", artifact.size, path.display());
}

fn generate(cli: &Cli) -> Result<ReportArtifact, DossierError> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_json(&read_file(path)?)?,
        None => ReportConfig::default(),
    };

    let input = match &cli.input {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| DossierError::ReadInput {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            buf
        }
    };

    let request = ReportRequest::from_json(&input)?;
    debug!(
        "request for {} with {} subtasks",
        request.parent.key,
        request.subtasks.len()
    );
    ReportComposer::new(config).generate(&request.parent, &request.subtasks)
}

fn read_file(path: &Path) -> Result<String, DossierError> {
    fs::read_to_string(path).map_err(|source| DossierError::ReadInput {
        path: path.display().to_string(),
        source,
    })
}

fn example_request_json() -> &'static str {
    r##"{
  "parent": {
    "key": "CWP-904",
    "summary": "Data erasure request for customer #58213",
    "type": "Data Rights Request",
    "assignee": { "name": "Dana Lee" },
    "status": "Done",
    "priority": "High",
    "resolutiondate": "2024-02-01T16:42:10.000+0000",
    "activity": [
      {
        "created": "2024-01-29T09:12:00.000+0000",
        "author": "Dana Lee",
        "field": "status",
        "fromString": "Open",
        "toString": "In Progress"
      },
      {
        "created": "2024-02-01T16:42:10.000+0000",
        "author": "Dana Lee",
        "field": "status",
        "fromString": "In Progress",
        "toString": "Done"
      }
    ],
    "comments": [
      {
        "author": "Dana Lee",
        "created": "2024-01-29T09:15:00.000+0000",
        "body": "Identity verified against the account email. Starting erasure across CRM, billing and analytics."
      },
      {
        "author": "Sam Ortiz",
        "created": "2024-02-01T16:40:00.000+0000",
        "body": "All downstream systems confirmed deletion. Backups age out within 30 days per retention policy."
      }
    ]
  },
  "subtasks": [
    {
      "key": "CWP-905",
      "summary": "Purge CRM contact record",
      "assignee": { "name": "Sam Ortiz" },
      "status": "Done",
      "resolutiondate": "2024-01-30T11:00:00.000+0000",
      "activity": [
        {
          "created": "2024-01-30T11:00:00.000+0000",
          "author": "Sam Ortiz",
          "field": "resolution",
          "fromString": "",
          "toString": "Done"
        }
      ],
      "comments": []
    },
    {
      "key": "CWP-906",
      "summary": "Remove analytics identifiers",
      "status": "Done",
      "activity": [],
      "comments": [
        {
          "author": "Analytics Bot",
          "created": "2024-01-31T02:00:00.000+0000",
          "body": "Pseudonymous identifiers for the customer were dropped from the warehouse."
        }
      ]
    }
  ]
}
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_file_names_the_path() {
        let path = Path::new("no-such-dir/request.json");
        let err = read_file(path).unwrap_err();
        assert!(matches!(err, DossierError::ReadInput { .. }));
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to read no-such-dir/request.json"));
        assert!(!msg.contains("Stream error"));
    }

    #[test]
    fn missing_config_file_aborts_generation() {
        let cli = Cli::parse_from(["dossier", "--config", "no-such-dir/config.json"]);
        let err = generate(&cli).unwrap_err();
        assert!(matches!(err, DossierError::ReadInput { ref path, .. } if path.ends_with("config.json")));
    }

    #[test]
    fn example_request_parses() {
        assert!(ReportRequest::from_json(example_request_json()).is_ok());
    }
}
