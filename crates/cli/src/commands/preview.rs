//! Model input preview

use advisor_lib::predictor::{derive_features_now, FeatureFrame};
use advisor_lib::{FeatureRecord, PropertyRecord};
use anyhow::Result;

use crate::output::{preview_rows, print_heading, print_table, OutputFormat};

/// Derive features for `record` and print the model input preview
pub fn show_preview(record: &PropertyRecord, format: OutputFormat) -> Result<()> {
    let features = derive_features_now(record);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&features)?);
        }
        OutputFormat::Table => print_feature_table(&features),
    }
    Ok(())
}

/// Print the 16 model input columns as a table
pub fn print_feature_table(features: &FeatureRecord) {
    print_heading("Model Input Preview");
    print_table(&preview_rows(&FeatureFrame::from(features)), OutputFormat::Table);
}
