//! Property input form
//!
//! Each flag is one labeled form field. Bounds are enforced by the argument
//! parser, so an out-of-range value never reaches feature derivation.

use advisor_lib::models::bounds;
use advisor_lib::{AvailabilityStatus, City, FurnishedStatus, PropertyRecord};
use clap::builder::TypedValueParser;
use clap::Args;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Args)]
pub struct PropertyArgs {
    /// City: Mumbai, Delhi, Bengaluru, Chennai or Kolkata
    #[arg(long, default_value = "Mumbai")]
    pub city: City,

    /// Locality / Area
    #[arg(long, default_value = "Some Locality")]
    pub locality: String,

    /// BHK (1-10)
    #[arg(long, default_value_t = 3, value_parser = bounded_u32(bounds::BHK))]
    pub bhk: u32,

    /// Size in square feet (200-10000)
    #[arg(long, default_value_t = 1200, value_parser = bounded_u32(bounds::SIZE_SQFT))]
    pub size: u32,

    /// Current price in Lakhs (5.0-10000.0)
    #[arg(long, default_value_t = 75.0, value_parser = parse_price)]
    pub price: f64,

    /// Furnished status: Unfurnished, Semi-Furnished or Fully-Furnished
    #[arg(long, default_value = "Unfurnished")]
    pub furnished: FurnishedStatus,

    /// Availability status: Ready_to_move or Under_Construction
    #[arg(long, default_value = "Ready_to_move")]
    pub availability: AvailabilityStatus,

    /// Nearby schools (0-50)
    #[arg(long, default_value_t = 3, value_parser = bounded_u32(bounds::NEARBY_SCHOOLS))]
    pub schools: u32,

    /// Nearby hospitals (0-50)
    #[arg(long, default_value_t = 2, value_parser = bounded_u32(bounds::NEARBY_HOSPITALS))]
    pub hospitals: u32,

    /// Public transport accessibility (0-10)
    #[arg(long, default_value_t = 7, value_parser = bounded_u32(bounds::PUBLIC_TRANSPORT))]
    pub transport: u32,

    /// Parking space (0-3)
    #[arg(long, default_value_t = 1, value_parser = bounded_u32(bounds::PARKING_SPACE))]
    pub parking: u32,

    /// Amenities score (0-10)
    #[arg(long, default_value_t = 6, value_parser = bounded_u32(bounds::AMENITIES))]
    pub amenities: u32,

    /// Year built (1950-2025)
    #[arg(long, default_value_t = 2005, value_parser = bounded_i32(bounds::YEAR_BUILT))]
    pub year_built: i32,
}

impl From<PropertyArgs> for PropertyRecord {
    fn from(args: PropertyArgs) -> Self {
        PropertyRecord {
            city: args.city,
            locality: args.locality,
            bhk: args.bhk,
            size_sqft: args.size,
            price_lakhs: args.price,
            furnished_status: args.furnished,
            availability_status: args.availability,
            nearby_schools: args.schools,
            nearby_hospitals: args.hospitals,
            public_transport: args.transport,
            parking_space: args.parking,
            amenities: args.amenities,
            year_built: args.year_built,
        }
    }
}

fn bounded_u32(range: RangeInclusive<u32>) -> impl TypedValueParser<Value = u32> {
    clap::value_parser!(u32).range(i64::from(*range.start())..=i64::from(*range.end()))
}

fn bounded_i32(range: RangeInclusive<i32>) -> impl TypedValueParser<Value = i32> {
    clap::value_parser!(i32).range(i64::from(*range.start())..=i64::from(*range.end()))
}

fn parse_price(s: &str) -> Result<f64, String> {
    let price: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !bounds::PRICE_LAKHS.contains(&price) {
        return Err(format!(
            "{} is not in {}..={}",
            price,
            bounds::PRICE_LAKHS.start(),
            bounds::PRICE_LAKHS.end()
        ));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Form {
        #[command(flatten)]
        property: PropertyArgs,
    }

    fn parse(args: &[&str]) -> Result<PropertyRecord, clap::Error> {
        let mut argv = vec!["advisor"];
        argv.extend_from_slice(args);
        Form::try_parse_from(argv).map(|form| form.property.into())
    }

    #[test]
    fn test_defaults_match_record_defaults() {
        assert_eq!(parse(&[]).unwrap(), PropertyRecord::default());
    }

    #[test]
    fn test_fields_map_to_record() {
        let record = parse(&[
            "--city",
            "Chennai",
            "--furnished",
            "Semi-Furnished",
            "--availability",
            "Under_Construction",
            "--size",
            "900",
            "--price",
            "42.5",
        ])
        .unwrap();
        assert_eq!(record.city, City::Chennai);
        assert_eq!(record.furnished_status, FurnishedStatus::SemiFurnished);
        assert_eq!(record.availability_status, AvailabilityStatus::UnderConstruction);
        assert_eq!(record.size_sqft, 900);
        assert_eq!(record.price_lakhs, 42.5);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(parse(&["--bhk", "0"]).is_err());
        assert!(parse(&["--bhk", "11"]).is_err());
        assert!(parse(&["--size", "199"]).is_err());
        assert!(parse(&["--parking", "4"]).is_err());
        assert!(parse(&["--year-built", "1949"]).is_err());
        assert!(parse(&["--year-built", "2026"]).is_err());
        assert!(parse(&["--price", "4.99"]).is_err());
        assert!(parse(&["--price", "abc"]).is_err());
    }

    #[test]
    fn test_bounds_inclusive() {
        let record = parse(&["--bhk", "10", "--size", "10000", "--price", "5.0", "--schools", "0"]).unwrap();
        assert_eq!(record.bhk, 10);
        assert_eq!(record.size_sqft, 10_000);
        assert_eq!(record.price_lakhs, 5.0);
        assert_eq!(record.nearby_schools, 0);
    }

    #[test]
    fn test_unknown_city_rejected() {
        assert!(parse(&["--city", "Pune"]).is_err());
    }
}
