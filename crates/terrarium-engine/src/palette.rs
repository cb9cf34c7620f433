//! Visualization parameters for spectral products

use crate::image::Visualization;

/// True color bands of Sentinel-2 L2A
pub const TRUE_COLOR_BANDS: [&str; 3] = ["TCI_R", "TCI_G", "TCI_B"];

/// 17-stop vegetation palette, bare soil to dense canopy
pub const NDVI_PALETTE: [&str; 17] = [
    "FFFFFF", "CE7E45", "DF923D", "F1B555", "FCD163", "99B718", "74A901", "66A000", "529400",
    "3E8601", "207401", "056201", "004C00", "023B01", "012E01", "011D01", "011301",
];

pub const S2_TRUE_COLOR: Visualization =
    Visualization { bands: &TRUE_COLOR_BANDS, min: 0.0, max: 255.0, palette: &[] };

/// NDVI in its natural `[0, 1]` range
pub const NDVI_RAW: Visualization =
    Visualization { bands: &[], min: 0.0, max: 1.0, palette: &NDVI_PALETTE };

/// NDVI after scaling by ten and focal filtering
pub const NDVI_FOCAL: Visualization =
    Visualization { bands: &[], min: 0.0, max: 10.0, palette: &NDVI_PALETTE };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_ranges() {
        assert_eq!((NDVI_RAW.min, NDVI_RAW.max), (0.0, 1.0));
        assert_eq!((NDVI_FOCAL.min, NDVI_FOCAL.max), (0.0, 10.0));
        assert_eq!(NDVI_RAW.palette, NDVI_FOCAL.palette);
        assert_eq!(NDVI_RAW.palette.len(), 17);
        assert!(NDVI_RAW.bands.is_empty());
    }

    #[test]
    fn test_true_color_range() {
        assert_eq!(S2_TRUE_COLOR.bands, &TRUE_COLOR_BANDS[..]);
        assert_eq!(S2_TRUE_COLOR.max, 255.0);
        assert!(S2_TRUE_COLOR.palette.is_empty());
    }
}
