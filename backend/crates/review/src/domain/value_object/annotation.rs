//! Annotation Value Object
//!
//! Drawings attached to a comment at its timecode. Coordinates are
//! normalized to the video frame, so `(0, 0)` is the top-left corner and
//! `(1, 1)` the bottom-right whatever the playback size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum shapes per annotation
pub const ANNOTATION_MAX_SHAPES: usize = 50;

/// Maximum points per shape
pub const SHAPE_MAX_POINTS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    #[error("Annotation is malformed: {0}")]
    Malformed(String),

    #[error("Annotation must contain between 1 and {ANNOTATION_MAX_SHAPES} shapes")]
    ShapeCount,

    #[error("Shape {index}: color must be #rrggbb")]
    Color { index: usize },

    #[error("Shape {index}: must have between 1 and {SHAPE_MAX_POINTS} points")]
    PointCount { index: usize },

    #[error("Shape {index}: {kind} needs exactly 2 points")]
    TwoPointShape { index: usize, kind: &'static str },

    #[error("Shape {index}: coordinates must be between 0 and 1")]
    OutOfFrame { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Freehand,
    Arrow,
    Rect,
    Ellipse,
}

impl ShapeKind {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Freehand => "freehand",
            Self::Arrow => "arrow",
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
        }
    }

    /// Arrow, rect and ellipse are defined by two corners
    const fn is_two_point(&self) -> bool {
        !matches!(self, Self::Freehand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn in_frame(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub color: String,
    pub points: Vec<Point>,
}

/// Validated set of shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    shapes: Vec<Shape>,
}

#[derive(Deserialize)]
struct RawAnnotation {
    shapes: Vec<Shape>,
}

impl Annotation {
    pub fn new(shapes: Vec<Shape>) -> Result<Self, AnnotationError> {
        if shapes.is_empty() || shapes.len() > ANNOTATION_MAX_SHAPES {
            return Err(AnnotationError::ShapeCount);
        }

        let mut validated = Vec::with_capacity(shapes.len());
        for (index, mut shape) in shapes.into_iter().enumerate() {
            shape.color = normalize_color(&shape.color).ok_or(AnnotationError::Color { index })?;

            let count = shape.points.len();
            if count == 0 || count > SHAPE_MAX_POINTS {
                return Err(AnnotationError::PointCount { index });
            }
            if shape.kind.is_two_point() && count != 2 {
                return Err(AnnotationError::TwoPointShape {
                    index,
                    kind: shape.kind.code(),
                });
            }
            if !shape.points.iter().all(Point::in_frame) {
                return Err(AnnotationError::OutOfFrame { index });
            }
            validated.push(shape);
        }

        Ok(Self { shapes: validated })
    }

    /// Parse and validate client JSON (`{"shapes": [...]}`)
    pub fn from_json(value: serde_json::Value) -> Result<Self, AnnotationError> {
        let raw: RawAnnotation = serde_json::from_value(value)
            .map_err(|e| AnnotationError::Malformed(e.to_string()))?;
        Self::new(raw.shapes)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

/// `#RRGGBB` → `#rrggbb`
fn normalize_color(color: &str) -> Option<String> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    fn rect() -> Shape {
        Shape {
            kind: ShapeKind::Rect,
            color: "#FF3300".to_string(),
            points: vec![point(0.1, 0.1), point(0.4, 0.5)],
        }
    }

    #[test]
    fn test_valid_annotation_normalizes_color() {
        let annotation = Annotation::new(vec![rect()]).unwrap();
        assert_eq!(annotation.shapes()[0].color, "#ff3300");
    }

    #[test]
    fn test_shape_count_limits() {
        assert_eq!(Annotation::new(vec![]), Err(AnnotationError::ShapeCount));
        assert!(Annotation::new(vec![rect(); ANNOTATION_MAX_SHAPES]).is_ok());
        assert_eq!(
            Annotation::new(vec![rect(); ANNOTATION_MAX_SHAPES + 1]),
            Err(AnnotationError::ShapeCount)
        );
    }

    #[test]
    fn test_two_point_shapes() {
        let mut arrow = rect();
        arrow.kind = ShapeKind::Arrow;
        arrow.points.push(point(0.9, 0.9));
        assert_eq!(
            Annotation::new(vec![arrow]),
            Err(AnnotationError::TwoPointShape {
                index: 0,
                kind: "arrow"
            })
        );

        let stroke = Shape {
            kind: ShapeKind::Freehand,
            color: "#00ff00".to_string(),
            points: (0..SHAPE_MAX_POINTS)
                .map(|i| point(i as f64 / SHAPE_MAX_POINTS as f64, 0.5))
                .collect(),
        };
        assert!(Annotation::new(vec![stroke.clone()]).is_ok());

        let mut long = stroke;
        long.points.push(point(1.0, 1.0));
        assert_eq!(
            Annotation::new(vec![long]),
            Err(AnnotationError::PointCount { index: 0 })
        );
    }

    #[test]
    fn test_rejects_bad_color_and_coordinates() {
        let mut shape = rect();
        shape.color = "red".to_string();
        assert_eq!(
            Annotation::new(vec![rect(), shape]),
            Err(AnnotationError::Color { index: 1 })
        );

        let mut shape = rect();
        shape.points[1] = point(1.2, 0.5);
        assert_eq!(
            Annotation::new(vec![shape]),
            Err(AnnotationError::OutOfFrame { index: 0 })
        );

        let mut shape = rect();
        shape.points[0] = point(f64::NAN, 0.5);
        assert_eq!(
            Annotation::new(vec![shape]),
            Err(AnnotationError::OutOfFrame { index: 0 })
        );
    }

    #[test]
    fn test_from_json() {
        let value = json!({
            "shapes": [
                { "kind": "ellipse", "color": "#123abc", "points": [{"x": 0.2, "y": 0.2}, {"x": 0.3, "y": 0.4}] }
            ]
        });
        let annotation = Annotation::from_json(value).unwrap();
        assert_eq!(annotation.shapes()[0].kind, ShapeKind::Ellipse);

        let unknown_kind = json!({ "shapes": [{ "kind": "star", "color": "#000000", "points": [] }] });
        assert!(matches!(
            Annotation::from_json(unknown_kind),
            Err(AnnotationError::Malformed(_))
        ));
    }
}
