//! The "Predict" action

use advisor_lib::predictor::{derive_features_now, ModelStore, OnnxModelLoader, PredictionService};
use advisor_lib::{FeatureRecord, PredictionLogger, PredictionResult, PropertyRecord};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::preview::print_feature_table;
use crate::config::AdvisorConfig;
use crate::output::{print_heading, print_info, print_success, print_warning, OutputFormat};

/// JSON document printed by `predict --format json`
#[derive(Serialize)]
struct PredictionReport<'a> {
    features: &'a FeatureRecord,
    prediction: &'a PredictionResult,
}

/// Load the models, derive features and print the prediction
///
/// Models load before the record is touched; a missing or corrupt artifact
/// aborts the command.
pub fn run_prediction(
    config: &AdvisorConfig,
    record: &PropertyRecord,
    logger: &PredictionLogger,
    format: OutputFormat,
) -> Result<()> {
    let store = ModelStore::new(OnnxModelLoader::new(config.artifact_paths()));
    let models = store.get_or_load()?;
    let service = PredictionService::with_config(models, config.output_config());

    let features = derive_features_now(record);
    logger.log_features(&features);

    let result = match service.predict(&features) {
        Ok(result) => result,
        Err(err) => {
            logger.log_prediction_failure(&err);
            return Err(err);
        }
    };
    logger.log_prediction(&features, &result);

    match format {
        OutputFormat::Json => {
            let report = PredictionReport {
                features: &features,
                prediction: &result,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            print_feature_table(&features);
            println!();
            print_heading("Results");

            let formatter = service.formatter();
            let headline = formatter.headline(&result);
            if result.label.is_good() {
                print_success(&headline.green().bold().to_string());
            } else {
                print_warning(&headline.yellow().bold().to_string());
            }
            print_info(&formatter.price_line(&result));
        }
    }

    Ok(())
}
