//! Dataset - named point series with per-point image filenames
//!
//! The on-disk document is a JSON array of series, each carrying parallel
//! `x`, `y`, `z` and `imgURLs` arrays:
//!
//! ```json
//! [{ "name": "Cluster A", "x": [0.1], "y": [0.4], "z": [1.2], "imgURLs": ["0.png"] }]
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::marker::HexColor;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Series '{name}' has mismatched arrays: x={x}, y={y}, z={z}, imgURLs={images}")]
    LengthMismatch {
        name: String,
        x: usize,
        y: usize,
        z: usize,
        images: usize,
    },
}

/// A single plotted point and the image it stands for
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub image_file: String,
}

/// One named, single-colored group of points
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
    pub color: HexColor,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Series as stored in the dataset document (parallel arrays)
#[derive(Debug, Deserialize)]
struct RawSeries {
    name: String,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    #[serde(rename = "imgURLs")]
    img_urls: Vec<String>,
}

impl RawSeries {
    fn into_series(self, color: HexColor) -> Result<Series, DatasetError> {
        let n = self.x.len();
        if self.y.len() != n || self.z.len() != n || self.img_urls.len() != n {
            return Err(DatasetError::LengthMismatch {
                name: self.name,
                x: n,
                y: self.y.len(),
                z: self.z.len(),
                images: self.img_urls.len(),
            });
        }

        let points = self
            .x
            .into_iter()
            .zip(self.y)
            .zip(self.z)
            .zip(self.img_urls)
            .map(|(((x, y), z), image_file)| Point { x, y, z, image_file })
            .collect();

        Ok(Series {
            name: self.name,
            points,
            color,
        })
    }
}

/// Immutable collection of series, fixed for the whole session
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    series: Vec<Series>,
}

impl Dataset {
    #[cfg(test)]
    pub fn new(series: Vec<Series>) -> Self {
        Self { series }
    }

    /// Load a dataset document from disk
    pub fn load<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, config)
    }

    /// Parse a dataset document, assigning series colors from the palette
    pub fn from_json(content: &str, config: &Config) -> Result<Self, DatasetError> {
        let raw: Vec<RawSeries> = serde_json::from_str(content)?;
        let series = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_series(config.series_color(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { series })
    }

    /// Small demo dataset used when no document is configured
    pub fn builtin(config: &Config) -> Self {
        let clusters: [(&str, [f64; 3]); 3] = [
            ("Cluster A", [-2.0, -1.0, 0.5]),
            ("Cluster B", [1.5, 2.0, -1.0]),
            ("Cluster C", [2.5, -2.0, 1.5]),
        ];
        // Fixed offsets so every run shows the same scatter
        let offsets: [[f64; 3]; 6] = [
            [0.0, 0.0, 0.0],
            [0.6, 0.3, -0.2],
            [-0.4, 0.7, 0.4],
            [0.3, -0.6, 0.6],
            [-0.7, -0.2, -0.5],
            [0.5, 0.8, 0.1],
        ];

        let mut image_index = 0;
        let series = clusters
            .iter()
            .enumerate()
            .map(|(i, (name, center))| {
                let points = offsets
                    .iter()
                    .map(|o| {
                        let point = Point {
                            x: center[0] + o[0],
                            y: center[1] + o[1],
                            z: center[2] + o[2],
                            image_file: format!("{}.png", image_index),
                        };
                        image_index += 1;
                        point
                    })
                    .collect();
                Series {
                    name: name.to_string(),
                    points,
                    color: config.series_color(i),
                }
            })
            .collect();

        Self { series }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn point(&self, series: usize, point: usize) -> Option<&Point> {
        self.series.get(series)?.points.get(point)
    }

    pub fn total_points(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parallel_arrays() {
        let json = r#"[
            {"name": "one", "x": [0, 1], "y": [0, 1], "z": [5, 6], "imgURLs": ["a.png", "b.png"]},
            {"name": "two", "x": [2], "y": [3], "z": [4], "imgURLs": ["c.png"]}
        ]"#;
        let config = Config::default();
        let dataset = Dataset::from_json(json, &config).unwrap();

        assert_eq!(dataset.series().len(), 2);
        assert_eq!(dataset.total_points(), 3);
        assert_eq!(dataset.series()[0].color, config.series_color(0));
        assert_eq!(dataset.series()[1].color, config.series_color(1));

        let p = dataset.point(0, 1).unwrap();
        assert_eq!((p.x, p.y, p.z), (1.0, 1.0, 6.0));
        assert_eq!(p.image_file, "b.png");
        assert!(dataset.point(1, 1).is_none());
        assert!(dataset.point(2, 0).is_none());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let json = r#"[{"name": "bad", "x": [0, 1], "y": [0], "z": [0, 1], "imgURLs": ["a.png", "b.png"]}]"#;
        let err = Dataset::from_json(json, &Config::default()).unwrap_err();
        match err {
            DatasetError::LengthMismatch { name, x, y, .. } => {
                assert_eq!(name, "bad");
                assert_eq!((x, y), (2, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Dataset::from_json("{not json", &Config::default()),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn test_builtin_dataset_has_unique_images() {
        let dataset = Dataset::builtin(&Config::default());
        assert_eq!(dataset.series().len(), 3);
        assert_eq!(dataset.total_points(), 18);

        let mut files: Vec<_> = dataset
            .series()
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.image_file.clone()))
            .collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 18);
    }
}
