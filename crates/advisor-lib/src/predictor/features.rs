//! Feature derivation for ML inference
//!
//! Turns a raw property record into the feature record the models consume.
//! Derivation is pure: the only outside input is the calendar year, which
//! callers pass explicitly or read once through [`current_year`].

use crate::models::{FeatureRecord, PropertyRecord};
use chrono::{Datelike, Local};

/// Rupees per Lakh
pub const PRICE_UNIT: f64 = 100_000.0;

/// Normalization divisor for the nearby school count
pub const SCHOOL_DENSITY_DIVISOR: f64 = 10.0;

/// Calendar year from the local wall clock
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Price per square foot in rupees; size is floored to 1 before dividing
pub fn price_per_sqft(price_lakhs: f64, size_sqft: u32) -> f64 {
    (price_lakhs * PRICE_UNIT) / f64::from(size_sqft.max(1))
}

/// Years since construction; negative when built in the future
pub fn property_age(current_year: i32, year_built: i32) -> i32 {
    current_year - year_built
}

pub fn school_density_score(nearby_schools: u32) -> f64 {
    f64::from(nearby_schools) / SCHOOL_DENSITY_DIVISOR
}

/// Derive the feature record for `record` as of `current_year`
pub fn derive_features(record: &PropertyRecord, current_year: i32) -> FeatureRecord {
    FeatureRecord {
        property: record.clone(),
        price_per_sqft: price_per_sqft(record.price_lakhs, record.size_sqft),
        property_age: property_age(current_year, record.year_built),
        school_density_score: school_density_score(record.nearby_schools),
    }
}

/// Derive the feature record using the current clock year
pub fn derive_features_now(record: &PropertyRecord) -> FeatureRecord {
    derive_features(record, current_year())
}
