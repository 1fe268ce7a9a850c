use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One named channel of an image, row-major, `width * height` values.
/// No-data pixels are stored as NaN (and written as `null` in JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    #[serde(deserialize_with = "null_as_nan_vec")]
    pub data: Vec<f64>,
}

impl Band {
    pub fn new(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self { name: name.into(), data }
    }

    /// A band holding the same value at every pixel.
    pub fn filled(name: impl Into<String>, len: usize, value: f64) -> Self {
        Self::new(name, vec![value; len])
    }
}

fn null_as_nan_vec<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<f64>, D::Error> {
    let v: Vec<Option<f64>> = Vec::deserialize(d)?;
    Ok(v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
}

/// A multi-band raster image: a named-band container with a fixed pixel grid,
/// an optional acquisition timestamp and free numeric properties.
///
/// Band order is preserved; band names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ImageRepr", into = "ImageRepr")]
pub struct Image {
    width: usize,
    height: usize,
    bands: Vec<Band>,
    /// Acquisition time in milliseconds since the Unix epoch.
    pub time_start: Option<i64>,
    pub properties: BTreeMap<String, f64>,
}

#[derive(Serialize, Deserialize)]
struct ImageRepr {
    width: usize,
    height: usize,
    #[serde(default)]
    bands: Vec<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_start: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, f64>,
}

impl TryFrom<ImageRepr> for Image {
    type Error = Error;

    fn try_from(repr: ImageRepr) -> Result<Self> {
        if repr.width.checked_mul(repr.height).is_none() {
            return Err(Error::ImageTooLarge { width: repr.width, height: repr.height });
        }
        let mut image = Image::new(repr.width, repr.height);
        image.time_start = repr.time_start;
        image.properties = repr.properties;
        for band in repr.bands {
            image.add_band(band)?;
        }
        Ok(image)
    }
}

impl From<Image> for ImageRepr {
    fn from(image: Image) -> Self {
        Self {
            width: image.width,
            height: image.height,
            bands: image.bands,
            time_start: image.time_start,
            properties: image.properties,
        }
    }
}

impl Image {
    /// Create an image with no bands.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: Vec::new(),
            time_start: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels per band. Saturates for grids too large to address.
    #[inline]
    pub fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_time_start(mut self, millis: i64) -> Self {
        self.time_start = Some(millis);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: f64) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Builder form of [`Image::add_band`].
    pub fn with_band(mut self, name: impl Into<String>, data: Vec<f64>) -> Result<Self> {
        self.add_band(Band::new(name, data))?;
        Ok(self)
    }

    /// Append a band. Fails if the name is taken or the length does not
    /// match the pixel grid.
    pub fn add_band(&mut self, band: Band) -> Result<()> {
        if self.has_band(&band.name) {
            return Err(Error::DuplicateBand(band.name));
        }
        if band.data.len() != self.len() {
            return Err(Error::SizeMismatch {
                band: band.name,
                expected: self.len(),
                actual: band.data.len(),
            });
        }
        self.bands.push(band);
        Ok(())
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub(crate) fn bands_mut(&mut self) -> &mut [Band] {
        &mut self.bands
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn has_band(&self, name: &str) -> bool {
        self.band(name).is_some()
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Pixel value of `band` at (row, col), or None if either is out of range.
    pub fn get(&self, band: &str, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.band(band).map(|b| b.data[row * self.width + col])
    }

    /// A new image with only the named bands, in the requested order.
    /// Timestamp and properties are carried over.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Image> {
        let mut out = Image::new(self.width, self.height);
        out.time_start = self.time_start;
        out.properties = self.properties.clone();
        for name in names {
            let name = name.as_ref();
            let band = self
                .band(name)
                .ok_or_else(|| Error::MissingBand(name.to_string()))?;
            out.add_band(band.clone())?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_band() -> Image {
        Image::new(2, 2)
            .with_band("B4", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_band("B8", vec![5.0, 6.0, 7.0, 8.0])
            .unwrap()
    }

    #[test]
    fn add_band_rejects_duplicate_names() {
        let mut img = two_band();
        let err = img.add_band(Band::filled("B4", 4, 0.0)).unwrap_err();
        assert_eq!(err, Error::DuplicateBand("B4".into()));
        assert_eq!(img.band_names(), vec!["B4", "B8"]);
    }

    #[test]
    fn add_band_rejects_wrong_length() {
        let mut img = two_band();
        let err = img.add_band(Band::filled("B2", 3, 0.0)).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 4, actual: 3, .. }));
    }

    #[test]
    fn get_is_row_major_and_bounds_checked() {
        let img = two_band();
        assert_eq!(img.get("B4", 1, 0), Some(3.0));
        assert_eq!(img.get("B8", 0, 1), Some(6.0));
        assert_eq!(img.get("B8", 2, 0), None);
        assert_eq!(img.get("B2", 0, 0), None);
    }

    #[test]
    fn select_keeps_requested_order_and_metadata() {
        let img = two_band().with_time_start(1_000).with_property("CLOUDY_PIXEL_PERCENTAGE", 3.5);
        let sel = img.select(&["B8", "B4"]).unwrap();
        assert_eq!(sel.band_names(), vec!["B8", "B4"]);
        assert_eq!(sel.time_start, Some(1_000));
        assert_eq!(sel.properties["CLOUDY_PIXEL_PERCENTAGE"], 3.5);
        assert_eq!(img.select(&["B2"]).unwrap_err(), Error::MissingBand("B2".into()));
    }

    #[test]
    fn json_null_pixels_load_as_nan() {
        let json = r#"{"width":2,"height":1,"bands":[{"name":"B4","data":[0.5,null]}]}"#;
        let img: Image = serde_json::from_str(json).unwrap();
        let data = &img.band("B4").unwrap().data;
        assert_eq!(data[0], 0.5);
        assert!(data[1].is_nan());
    }

    #[test]
    fn json_with_short_band_is_rejected() {
        let json = r#"{"width":2,"height":2,"bands":[{"name":"B4","data":[1,2,3]}]}"#;
        assert!(serde_json::from_str::<Image>(json).is_err());
    }

    #[test]
    fn json_with_unaddressable_grid_is_rejected() {
        let json = r#"{"width":4294967296,"height":4294967297,"bands":[]}"#;
        let err = serde_json::from_str::<Image>(json).unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }

    #[test]
    fn huge_programmatic_grid_rejects_bands_without_panicking() {
        let mut img = Image::new(usize::MAX, 2);
        assert_eq!(img.len(), usize::MAX);
        assert!(matches!(
            img.add_band(Band::new("B4", vec![1.0])),
            Err(Error::SizeMismatch { actual: 1, .. })
        ));
    }
}
