//! Region reduction and time series over an image collection.
//!
//! Produces the data behind an index-over-time chart: for every timestamped
//! image, each requested band is reduced over a pixel window to one number.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::image::Image;

/// Aggregation applied to the valid (non-NaN) pixels of a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Median,
    Mean,
    Min,
    Max,
}

impl Reducer {
    /// Reduce `values`, skipping NaN. None when nothing valid remains.
    pub fn reduce(self, values: &[f64]) -> Option<f64> {
        let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            return None;
        }
        let n = valid.len();
        Some(match self {
            Reducer::Mean => valid.iter().sum::<f64>() / n as f64,
            Reducer::Min => valid.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Median => {
                valid.sort_by(f64::total_cmp);
                if n % 2 == 1 {
                    valid[n / 2]
                } else {
                    (valid[n / 2 - 1] + valid[n / 2]) / 2.0
                }
            }
        })
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reducer::Median => "median",
            Reducer::Mean => "mean",
            Reducer::Min => "min",
            Reducer::Max => "max",
        })
    }
}

impl FromStr for Reducer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(Reducer::Median),
            "mean" => Ok(Reducer::Mean),
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            other => Err(format!("unknown reducer {other:?}")),
        }
    }
}

/// Pixel window: top-left corner plus size. Clipped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self { row, col, height, width }
    }

    /// The whole of `image`.
    pub fn full(image: &Image) -> Self {
        Self::new(0, 0, image.height(), image.width())
    }

    /// Values of `data` (a band of `image`) inside the window.
    fn extract(&self, image: &Image, data: &[f64]) -> Vec<f64> {
        let row_end = self.row.saturating_add(self.height).min(image.height());
        let col_end = self.col.saturating_add(self.width).min(image.width());
        let mut out = Vec::new();
        for r in self.row..row_end {
            let base = r * image.width();
            if self.col < col_end {
                out.extend_from_slice(&data[base + self.col..base + col_end]);
            }
        }
        out
    }
}

impl FromStr for Region {
    type Err = String;

    /// `row,col,height,width`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>().map_err(|e| format!("invalid region {s:?}: {e}")))
            .collect::<std::result::Result<_, _>>()?;
        match parts.as_slice() {
            &[row, col, height, width] => Ok(Region::new(row, col, height, width)),
            _ => Err(format!("region must be row,col,height,width, got {s:?}")),
        }
    }
}

/// Reduce one band of one image over `region` (the whole image when None).
pub fn reduce_region(
    image: &Image,
    band: &str,
    region: Option<Region>,
    reducer: Reducer,
) -> Result<Option<f64>> {
    let data = &image
        .band(band)
        .ok_or_else(|| Error::MissingBand(band.to_string()))?
        .data;
    let region = region.unwrap_or_else(|| Region::full(image));
    Ok(reducer.reduce(&region.extract(image, data)))
}

/// One time step of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Milliseconds since the Unix epoch.
    pub time_start: i64,
    /// Band name → reduced value; None where the region held no valid pixel.
    pub values: BTreeMap<String, Option<f64>>,
}

/// Reduce `bands` of every timestamped image, sorted by time. Images without
/// a timestamp are skipped.
pub fn time_series<S: AsRef<str>>(
    images: &[Image],
    bands: &[S],
    region: Option<Region>,
    reducer: Reducer,
) -> Result<Vec<SeriesPoint>> {
    let mut points = Vec::with_capacity(images.len());

    for (i, image) in images.iter().enumerate() {
        let Some(time_start) = image.time_start else {
            warn!(image = i, "image has no time_start, left out of series");
            continue;
        };
        let mut values = BTreeMap::new();
        for band in bands {
            let band = band.as_ref();
            values.insert(band.to_string(), reduce_region(image, band, region, reducer)?);
        }
        points.push(SeriesPoint { time_start, values });
    }

    points.sort_by_key(|p| p.time_start);
    Ok(points)
}
