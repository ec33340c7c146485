//! Single-row tabular view of a feature record
//!
//! Models bind their inputs to these columns by name, so the names and
//! their order are the schema contract with the training pipeline.

use crate::models::FeatureRecord;
use serde::Serialize;
use std::fmt;

/// Column names in the order the training pipeline saw them
pub const FEATURE_COLUMNS: [&str; 16] = [
    "City",
    "Locality",
    "BHK",
    "Size_in_SqFt",
    "Price_in_Lakhs",
    "Furnished_Status",
    "Availability_Status",
    "Nearby_Schools",
    "Nearby_Hospitals",
    "Public_Transport_Accessibility",
    "Parking_Space",
    "Amenities",
    "Year_Built",
    "Price_per_SqFt",
    "Age_of_Property",
    "School_Density_Score",
];

/// One cell of the feature row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Text(_) => "text",
            FeatureValue::Int(_) => "integer",
            FeatureValue::Float(_) => "float",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Int(v) => write!(f, "{}", v),
            // Full precision, keeping the decimal point on whole values
            FeatureValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// Ordered named columns of a single feature row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureFrame {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.columns.iter().map(|(name, value)| (*name, value))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<&FeatureRecord> for FeatureFrame {
    fn from(features: &FeatureRecord) -> Self {
        let p = &features.property;
        let values = [
            FeatureValue::Text(p.city.to_string()),
            FeatureValue::Text(p.locality.clone()),
            FeatureValue::Int(p.bhk.into()),
            FeatureValue::Int(p.size_sqft.into()),
            FeatureValue::Float(p.price_lakhs),
            FeatureValue::Text(p.furnished_status.to_string()),
            FeatureValue::Text(p.availability_status.to_string()),
            FeatureValue::Int(p.nearby_schools.into()),
            FeatureValue::Int(p.nearby_hospitals.into()),
            FeatureValue::Int(p.public_transport.into()),
            FeatureValue::Int(p.parking_space.into()),
            FeatureValue::Int(p.amenities.into()),
            FeatureValue::Int(p.year_built.into()),
            FeatureValue::Float(features.price_per_sqft),
            FeatureValue::Int(features.property_age.into()),
            FeatureValue::Float(features.school_density_score),
        ];
        Self {
            columns: FEATURE_COLUMNS.into_iter().zip(values).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyRecord;
    use crate::predictor::derive_features;

    fn frame() -> FeatureFrame {
        FeatureFrame::from(&derive_features(&PropertyRecord::default(), 2025))
    }

    #[test]
    fn test_frame_has_sixteen_ordered_columns() {
        let f = frame();
        assert_eq!(f.len(), 16);
        assert_eq!(f.names(), FEATURE_COLUMNS.to_vec());
    }

    #[test]
    fn test_frame_values() {
        let f = frame();
        assert_eq!(f.get("City"), Some(&FeatureValue::Text("Mumbai".into())));
        assert_eq!(f.get("Price_per_SqFt"), Some(&FeatureValue::Float(6250.0)));
        assert_eq!(f.get("Age_of_Property"), Some(&FeatureValue::Int(20)));
        assert_eq!(
            f.get("Furnished_Status"),
            Some(&FeatureValue::Text("Unfurnished".into()))
        );
        assert!(f.get("Price_per_sqft").is_none());
    }

    #[test]
    fn test_frame_names_match_record_serialization() {
        let record = derive_features(&PropertyRecord::default(), 2025);
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            assert!(object.contains_key(name), "missing {}", name);
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Float(0.3).to_string(), "0.3");
        assert_eq!(FeatureValue::Float(75.125).to_string(), "75.125");
        assert_eq!(FeatureValue::Float(6250.0).to_string(), "6250.0");
        assert_eq!(FeatureValue::Int(7).to_string(), "7");
        assert_eq!(FeatureValue::Text("x".into()).kind(), "text");
    }
}
