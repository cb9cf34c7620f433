//! Coverage scoring of candidate image footprints against a target region

use geo::{BooleanOps, ChamberlainDuquetteArea, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

use terrarium_core::models::CoverageScore;

use crate::measure::geodesic_area;

/// A candidate image with the footprint it covers on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Platform index of the image within its collection
    pub id: String,
    pub footprint: MultiPolygon,
}

impl Candidate {
    pub fn new(id: impl Into<String>, footprint: impl Into<MultiPolygon>) -> Self {
        Self { id: id.into(), footprint: footprint.into() }
    }
}

/// Decides whether a coverage score counts as full coverage.
///
/// A tolerance of zero demands an exact score of 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoveragePredicate {
    tolerance: f64,
}

impl CoveragePredicate {
    pub fn exact() -> Self {
        Self { tolerance: 0.0 }
    }

    /// Accept scores of at least `100 - tolerance`, clamped to `[0, 100]`
    pub fn with_tolerance(tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() { tolerance.clamp(0.0, 100.0) } else { 0.0 };
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn accepts(&self, score: CoverageScore) -> bool {
        if self.tolerance == 0.0 {
            return score.is_full();
        }
        score.value() >= CoverageScore::FULL.value() - self.tolerance
    }
}

/// Score how much of `target` the `footprint` covers
pub fn coverage_score(footprint: &MultiPolygon, target: &Polygon) -> CoverageScore {
    let expected = geodesic_area(target);
    let target = MultiPolygon::new(vec![target.clone()]);
    let actual = footprint.intersection(&target).chamberlain_duquette_unsigned_area();
    CoverageScore::from_areas(expected, actual)
}

/// Keep the candidates whose footprint fully covers `target`, in order
pub fn filter_full_coverage(
    candidates: Vec<Candidate>,
    target: &Polygon,
    predicate: CoveragePredicate,
) -> Vec<Candidate> {
    let total = candidates.len();
    let retained: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| {
            let score = coverage_score(&candidate.footprint, target);
            debug!(id = %candidate.id, score = score.value(), "Scored candidate coverage");
            predicate.accepts(score)
        })
        .collect();

    debug!(total, retained = retained.len(), "Filtered candidates by coverage");
    retained
}
