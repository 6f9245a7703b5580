//! Request models for point operations
//!
//! Defines the caller-supplied inputs for creating and updating points.

use serde::{Deserialize, Serialize};

/// Input for creating a point.
///
/// # Fields
/// - `x`, `y`: coordinates of the sample
/// - `r`: area radius the sample is tested against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRequest {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl PointRequest {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_coordinates(self.x, self.y, self.r)
    }
}

/// Replacement values for an existing point.
///
/// `inside_area` is copied as given; updating never reruns the hit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointUpdate {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub inside_area: bool,
}

impl PointUpdate {
    /// Validates the update data
    pub fn validate(&self) -> Option<String> {
        validate_coordinates(self.x, self.y, self.r)
    }
}

fn validate_coordinates(x: f64, y: f64, r: f64) -> Option<String> {
    for (name, value) in [("x", x), ("y", y), ("r", r)] {
        if !value.is_finite() {
            return Some(format!("Field '{}' must be a finite number", name));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_request_deserialize() {
        let json = r#"{"x": 1.5, "y": -2, "r": 3}"#;
        let req: PointRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, PointRequest::new(1.5, -2.0, 3.0));
    }

    #[test]
    fn test_point_request_missing_field_rejected() {
        let json = r#"{"x": 1.5, "r": 3}"#;
        assert!(serde_json::from_str::<PointRequest>(json).is_err());
    }

    #[test]
    fn test_validate_non_finite() {
        let req = PointRequest::new(f64::NAN, 0.0, 1.0);
        assert_eq!(
            req.validate(),
            Some("Field 'x' must be a finite number".to_string())
        );

        let req = PointRequest::new(0.0, 0.0, f64::INFINITY);
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        assert!(PointRequest::new(-1.0, 1.0, 2.0).validate().is_none());

        let update = PointUpdate {
            x: 1.0,
            y: 1.0,
            r: 1.0,
            inside_area: false,
        };
        assert!(update.validate().is_none());
    }
}
