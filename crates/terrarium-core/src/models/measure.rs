//! Area, centroid and coverage measurements

use serde::{Deserialize, Serialize};

/// Units an area can be reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaUnit {
    #[serde(rename = "SQM")]
    SquareMeters,
    #[serde(rename = "SQKM")]
    SquareKilometers,
    #[serde(rename = "ACRE")]
    Acres,
    #[serde(rename = "HA")]
    Hectares,
}

impl AreaUnit {
    pub const ALL: [AreaUnit; 4] = [
        AreaUnit::SquareMeters,
        AreaUnit::SquareKilometers,
        AreaUnit::Acres,
        AreaUnit::Hectares,
    ];

    /// Multiplier from square meters into this unit
    pub fn factor(&self) -> f64 {
        match self {
            AreaUnit::SquareMeters => 1.0,
            AreaUnit::SquareKilometers => 0.000001,
            AreaUnit::Acres => 0.000247,
            AreaUnit::Hectares => 0.0001,
        }
    }

    /// Short label used as the mapping key
    pub fn label(&self) -> &'static str {
        match self {
            AreaUnit::SquareMeters => "SQM",
            AreaUnit::SquareKilometers => "SQKM",
            AreaUnit::Acres => "ACRE",
            AreaUnit::Hectares => "HA",
        }
    }
}

/// Area of a shape expressed in every supported unit, rounded to 3 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaMeasure {
    #[serde(rename = "SQM")]
    pub sqm: f64,
    #[serde(rename = "SQKM")]
    pub sqkm: f64,
    #[serde(rename = "ACRE")]
    pub acre: f64,
    #[serde(rename = "HA")]
    pub ha: f64,
}

impl AreaMeasure {
    /// Build the unit mapping from an area in square meters
    pub fn from_square_meters(area: f64) -> Self {
        let convert = |unit: AreaUnit| round_decimals(area * unit.factor(), 3);
        Self {
            sqm: convert(AreaUnit::SquareMeters),
            sqkm: convert(AreaUnit::SquareKilometers),
            acre: convert(AreaUnit::Acres),
            ha: convert(AreaUnit::Hectares),
        }
    }

    pub fn get(&self, unit: AreaUnit) -> f64 {
        match unit {
            AreaUnit::SquareMeters => self.sqm,
            AreaUnit::SquareKilometers => self.sqkm,
            AreaUnit::Acres => self.acre,
            AreaUnit::Hectares => self.ha,
        }
    }
}

/// Geometric centroid of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub longitude: f64,
    pub latitude: f64,
}

/// Percentage of a target geometry covered by an image footprint
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CoverageScore(pub f64);

impl CoverageScore {
    pub const FULL: CoverageScore = CoverageScore(100.0);

    /// Score from the expected (target) area and the covered area.
    ///
    /// Both areas are rounded to 5 significant digits first so that a
    /// footprint identical to the target scores exactly 100.
    pub fn from_areas(expected: f64, actual: f64) -> Self {
        let expected = round_significant(expected, 5);
        let actual = round_significant(actual, 5);
        if expected <= 0.0 {
            return CoverageScore(0.0);
        }
        let score = 100.0 - ((expected - actual) / expected * 100.0);
        CoverageScore(score.clamp(0.0, 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Full coverage in the strict sense: the score equals exactly 100
    pub fn is_full(&self) -> bool {
        self.0 == 100.0
    }
}

/// Round to a fixed number of decimal places
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    if decimals < 0 {
        let factor = 10f64.powi(-decimals);
        return (value / factor).round() * factor;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to a fixed number of significant digits
pub fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    round_decimals(value, digits - 1 - magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_measure_units() {
        let measure = AreaMeasure::from_square_meters(12_345_678.9);
        assert_eq!(measure.sqm, 12_345_678.9);
        assert_eq!(measure.sqkm, 12.346);
        assert_eq!(measure.ha, 1234.568);
        assert_eq!(measure.get(AreaUnit::Acres), round_decimals(12_345_678.9 * 0.000247, 3));
    }

    #[test]
    fn test_area_measure_serializes_unit_keys() {
        let json = serde_json::to_value(AreaMeasure::from_square_meters(1.0)).unwrap();
        for unit in AreaUnit::ALL {
            assert!(json.get(unit.label()).is_some(), "missing {}", unit.label());
        }
    }

    #[test]
    fn test_coverage_score() {
        assert!(CoverageScore::from_areas(1000.0, 1000.0).is_full());
        assert_eq!(CoverageScore::from_areas(1000.0, 250.0).value(), 25.0);
        assert!(!CoverageScore::from_areas(1000.0, 999.0).is_full());
        assert_eq!(CoverageScore::from_areas(0.0, 0.0).value(), 0.0);
    }

    #[test]
    fn test_coverage_absorbs_float_noise() {
        let expected = 12_364_262_012.77;
        let actual = expected * (1.0 - 1e-12);
        assert!(CoverageScore::from_areas(expected, actual).is_full());
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(123_456.0, 5), 123_460.0);
        assert_eq!(round_significant(0.000_123_456, 3), 0.000_123);
        assert_eq!(round_significant(0.0, 5), 0.0);
    }
}
