//! Feature schema inspection
//!
//! Lists the columns the advisor supplies and, on request, the inputs each
//! model artifact declares, so the training-time contract can be checked
//! against the artifacts themselves.

use advisor_lib::predictor::{
    derive_features, read_artifact, FeatureFrame, OnnxModel, FEATURE_COLUMNS,
};
use advisor_lib::PropertyRecord;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::config::AdvisorConfig;
use crate::output::{print_heading, print_success, print_table, print_warning, OutputFormat};

/// Row for the feature column table
#[derive(Tabled, Serialize)]
struct ColumnRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

/// Row for a model input table
#[derive(Tabled, Serialize)]
struct InputRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Type")]
    datum_type: String,
    #[tabled(rename = "Supplied")]
    supplied: String,
}

/// Declared inputs of one artifact and the columns it expects but cannot get
#[derive(Serialize)]
struct ArtifactReport {
    inputs: Vec<InputRow>,
    missing: Vec<String>,
}

/// The whole schema report, printed as one JSON document
#[derive(Serialize)]
struct SchemaReport {
    columns: Vec<ColumnRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<ArtifactReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regressor: Option<ArtifactReport>,
}

/// Print the feature schema, optionally checked against both artifacts
pub fn show_schema(config: &AdvisorConfig, check_models: bool, format: OutputFormat) -> Result<()> {
    // Kinds are fixed per column, so any record yields the same frame shape
    let frame = FeatureFrame::from(&derive_features(&PropertyRecord::default(), 2025));

    let columns: Vec<ColumnRow> = FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(ix, column)| ColumnRow {
            position: ix + 1,
            column: column.to_string(),
            kind: frame
                .get(column)
                .map(|value| value.kind().to_string())
                .unwrap_or_default(),
        })
        .collect();

    let mut report = SchemaReport {
        columns,
        classifier: None,
        regressor: None,
    };
    if check_models {
        let paths = config.artifact_paths();
        report.classifier = Some(inspect_artifact(
            &paths.classifier,
            paths.classifier_sha256.as_deref(),
            &frame,
        )?);
        report.regressor = Some(inspect_artifact(
            &paths.regressor,
            paths.regressor_sha256.as_deref(),
            &frame,
        )?);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            print_heading("Feature Columns");
            print_table(&report.columns, format);
            let paths = config.artifact_paths();
            if let Some(artifact) = &report.classifier {
                print_artifact("Classifier", &paths.classifier, artifact);
            }
            if let Some(artifact) = &report.regressor {
                print_artifact("Regressor", &paths.regressor, artifact);
            }
        }
    }

    Ok(())
}

fn inspect_artifact(
    path: &Path,
    expected_sha256: Option<&str>,
    frame: &FeatureFrame,
) -> Result<ArtifactReport> {
    let bytes = read_artifact(path, expected_sha256)?;
    let model = OnnxModel::from_bytes(&path.display().to_string(), &bytes)?;

    let inputs = model
        .inputs()
        .iter()
        .map(|input| InputRow {
            input: input.name.clone(),
            datum_type: format!("{:?}", input.datum_type),
            supplied: if frame.get(&input.name).is_some() {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        })
        .collect();

    Ok(ArtifactReport {
        inputs,
        missing: model.missing_columns(frame),
    })
}

fn print_artifact(title: &str, path: &Path, artifact: &ArtifactReport) {
    println!();
    print_heading(&format!("{} inputs ({})", title, path.display().to_string().cyan()));
    print_table(&artifact.inputs, OutputFormat::Table);

    if artifact.missing.is_empty() {
        print_success(&format!("{} inputs are all supplied", title));
    } else {
        print_warning(&format!(
            "{} expects columns the feature record does not supply: {}",
            title,
            artifact.missing.join(", ")
        ));
    }
}
