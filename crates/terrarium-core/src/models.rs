pub mod geometry;
pub mod imagery;
pub mod measure;
pub mod temporal;

pub use geometry::{Crs, Distance, DistanceUnit, Geometry, GeometryType};
pub use imagery::{ExportJob, JobRef, JobState, SpectralIndex};
pub use measure::{AreaMeasure, AreaUnit, Centroid, CoverageScore};
pub use temporal::DateRange;
