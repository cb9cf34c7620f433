use terrarium_core::models::Geometry;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// First reason, for single-line error messages
    pub fn first_reason(&self) -> Option<&str> {
        self.errors.first().map(|e| e.reason.as_str())
    }
}

/// Validate a canonical geometry
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    let mut result = ValidationResult::valid();
    match geometry {
        Geometry::Point { coordinates } => check_finite(&mut result, "Point", &[*coordinates]),
        Geometry::LineString { coordinates } => {
            validate_line(&mut result, "LineString", coordinates)
        }
        Geometry::Polygon { coordinates } => validate_rings(&mut result, "Polygon", coordinates),
        Geometry::MultiPoint { coordinates } => {
            check_finite(&mut result, "MultiPoint", coordinates)
        }
        Geometry::MultiLineString { coordinates } => {
            for (i, line) in coordinates.iter().enumerate() {
                validate_line(&mut result, &format!("MultiLineString[{}]", i), line);
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            for (i, rings) in coordinates.iter().enumerate() {
                validate_rings(&mut result, &format!("MultiPolygon[{}]", i), rings);
            }
        }
    }
    result
}

fn check_finite(result: &mut ValidationResult, location: &str, coords: &[[f64; 2]]) {
    for (i, coord) in coords.iter().enumerate() {
        if !coord[0].is_finite() || !coord[1].is_finite() {
            result.add_error(format!("{}[{}]", location, i), "Coordinates must be finite".into());
        }
    }
}

fn validate_line(result: &mut ValidationResult, location: &str, coords: &[[f64; 2]]) {
    if coords.len() < 2 {
        result.add_error(
            location.to_string(),
            format!("LineString must have at least 2 points, found {}", coords.len()),
        );
        return;
    }
    check_finite(result, location, coords);
}

fn validate_rings(result: &mut ValidationResult, location: &str, rings: &[Vec<[f64; 2]>]) {
    if rings.is_empty() {
        result.add_error(location.to_string(), "Polygon must have an exterior ring".into());
        return;
    }

    for (i, ring) in rings.iter().enumerate() {
        let ring_location = if i == 0 {
            format!("{} exterior", location)
        } else {
            format!("{} interior[{}]", location, i - 1)
        };

        if ring.len() < 4 {
            result.add_error(
                ring_location.clone(),
                format!("Polygon ring must have at least 4 points, found {}", ring.len()),
            );
        }

        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                result.add_error(
                    ring_location.clone(),
                    "Polygon ring must be closed (first point == last point)".into(),
                );
            }
        }

        check_finite(result, &ring_location, ring);
    }
}
