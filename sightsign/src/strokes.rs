//! Stroke files
//!
//! A signature on disk is a TOML array of strokes, each an ordered list of
//! screen-space `[x, y]` pixel pairs:
//!
//! ```toml
//! [[stroke]]
//! points = [[100.0, 120.0], [104.5, 118.0], [110.0, 117.5]]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sightsign_core::Stroke;
use tracing::info;

/// Stroke file errors
#[derive(Debug, thiserror::Error)]
pub enum StrokeFileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid stroke file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("point {point} of stroke {stroke} is not finite")]
    NonFinite { stroke: usize, point: usize },
}

#[derive(Debug, Default, Deserialize)]
struct StrokeFile {
    #[serde(default)]
    stroke: Vec<Stroke>,
}

/// Parse stroke file text
pub fn parse_strokes(text: &str) -> Result<Vec<Stroke>, StrokeFileError> {
    let file: StrokeFile = toml::from_str(text)?;
    for (s, stroke) in file.stroke.iter().enumerate() {
        if let Some(p) = stroke
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(StrokeFileError::NonFinite {
                stroke: s,
                point: p,
            });
        }
    }
    Ok(file.stroke)
}

/// Load the strokes stored at `path`
pub fn load_strokes(path: &Path) -> Result<Vec<Stroke>, StrokeFileError> {
    let text = fs::read_to_string(path).map_err(|source| StrokeFileError::Read {
        path: path.to_owned(),
        source,
    })?;
    let strokes = parse_strokes(&text)?;
    info!(
        "Loaded {} strokes ({} points) from {}",
        strokes.len(),
        strokes.iter().map(Stroke::len).sum::<usize>(),
        path.display()
    );
    Ok(strokes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightsign_core::Point2D;

    #[test]
    fn test_parse_strokes() {
        let strokes = parse_strokes(
            r#"
            [[stroke]]
            points = [[100.0, 120.0], [104.5, 118.0]]

            [[stroke]]
            points = [[300, 90]]
            "#,
        )
        .unwrap();

        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].points[1], Point2D::new(104.5, 118.0));
        assert_eq!(strokes[1].first(), Some(Point2D::new(300.0, 90.0)));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_strokes("").unwrap().is_empty());
    }

    #[test]
    fn test_empty_stroke_kept() {
        // Playback drops empty strokes, the file format does not
        let strokes = parse_strokes("[[stroke]]\npoints = []\n").unwrap();
        assert_eq!(strokes.len(), 1);
        assert!(strokes[0].is_empty());
    }

    #[test]
    fn test_malformed_point() {
        for text in [
            "[[stroke]]\npoints = [[1.0, 2.0, 3.0]]\n",
            "[[stroke]]\npoints = [[1.0, 2.0], [4.0]]\n",
            "[[stroke]]\npoints = [[\"a\", 2.0]]\n",
        ] {
            assert!(
                matches!(parse_strokes(text), Err(StrokeFileError::Parse(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn test_non_finite_point() {
        assert!(matches!(
            parse_strokes("[[stroke]]\npoints = [[1.0, 2.0], [nan, 0.0]]\n"),
            Err(StrokeFileError::NonFinite {
                stroke: 0,
                point: 1
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_strokes(Path::new("/nonexistent/signature.toml")).unwrap_err();
        assert!(matches!(err, StrokeFileError::Read { .. }));
    }
}
