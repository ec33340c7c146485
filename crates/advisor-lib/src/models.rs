//! Core data models for the investment advisor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Input bounds enforced by the form before a record is built
pub mod bounds {
    use std::ops::RangeInclusive;

    pub const BHK: RangeInclusive<u32> = 1..=10;
    pub const SIZE_SQFT: RangeInclusive<u32> = 200..=10_000;
    pub const PRICE_LAKHS: RangeInclusive<f64> = 5.0..=10_000.0;
    pub const NEARBY_SCHOOLS: RangeInclusive<u32> = 0..=50;
    pub const NEARBY_HOSPITALS: RangeInclusive<u32> = 0..=50;
    pub const PUBLIC_TRANSPORT: RangeInclusive<u32> = 0..=10;
    pub const PARKING_SPACE: RangeInclusive<u32> = 0..=3;
    pub const AMENITIES: RangeInclusive<u32> = 0..=10;
    pub const YEAR_BUILT: RangeInclusive<i32> = 1950..=2025;
}

/// Error returned when a categorical field does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares a categorical field whose wire form is the exact label the
/// models were trained on.
macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownVariant {
                        field: $field,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

categorical!(
    /// Cities the models were trained on
    City, "city" {
        Mumbai => "Mumbai",
        Delhi => "Delhi",
        Bengaluru => "Bengaluru",
        Chennai => "Chennai",
        Kolkata => "Kolkata",
    }
);

categorical!(
    FurnishedStatus, "furnished status" {
        Unfurnished => "Unfurnished",
        SemiFurnished => "Semi-Furnished",
        FullyFurnished => "Fully-Furnished",
    }
);

categorical!(
    AvailabilityStatus, "availability status" {
        ReadyToMove => "Ready_to_move",
        UnderConstruction => "Under_Construction",
    }
);

/// Raw property attributes entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "City")]
    pub city: City,
    #[serde(rename = "Locality")]
    pub locality: String,
    #[serde(rename = "BHK")]
    pub bhk: u32,
    #[serde(rename = "Size_in_SqFt")]
    pub size_sqft: u32,
    #[serde(rename = "Price_in_Lakhs")]
    pub price_lakhs: f64,
    #[serde(rename = "Furnished_Status")]
    pub furnished_status: FurnishedStatus,
    #[serde(rename = "Availability_Status")]
    pub availability_status: AvailabilityStatus,
    #[serde(rename = "Nearby_Schools")]
    pub nearby_schools: u32,
    #[serde(rename = "Nearby_Hospitals")]
    pub nearby_hospitals: u32,
    #[serde(rename = "Public_Transport_Accessibility")]
    pub public_transport: u32,
    #[serde(rename = "Parking_Space")]
    pub parking_space: u32,
    #[serde(rename = "Amenities")]
    pub amenities: u32,
    #[serde(rename = "Year_Built")]
    pub year_built: i32,
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self {
            city: City::Mumbai,
            locality: "Some Locality".to_string(),
            bhk: 3,
            size_sqft: 1200,
            price_lakhs: 75.0,
            furnished_status: FurnishedStatus::Unfurnished,
            availability_status: AvailabilityStatus::ReadyToMove,
            nearby_schools: 3,
            nearby_hospitals: 2,
            public_transport: 7,
            parking_space: 1,
            amenities: 6,
            year_built: 2005,
        }
    }
}

/// Property record plus the derived model features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(flatten)]
    pub property: PropertyRecord,
    #[serde(rename = "Price_per_SqFt")]
    pub price_per_sqft: f64,
    #[serde(rename = "Age_of_Property")]
    pub property_age: i32,
    #[serde(rename = "School_Density_Score")]
    pub school_density_score: f64,
}

/// Binary investment verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentLabel {
    GoodInvestment,
    NotGoodInvestment,
}

impl InvestmentLabel {
    /// Map the classifier's raw class (1 = positive) to a label
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            InvestmentLabel::GoodInvestment
        } else {
            InvestmentLabel::NotGoodInvestment
        }
    }

    pub fn is_good(&self) -> bool {
        matches!(self, InvestmentLabel::GoodInvestment)
    }
}

impl fmt::Display for InvestmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvestmentLabel::GoodInvestment => write!(f, "Good Investment"),
            InvestmentLabel::NotGoodInvestment => write!(f, "Not a Good Investment"),
        }
    }
}

/// Outcome of one prediction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: InvestmentLabel,
    /// Positive-class probability, always within [0, 1]
    pub confidence: f64,
    pub future_price_lakhs: f64,
}
