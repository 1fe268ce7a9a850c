//! Mapping index computation over an image collection.
//!
//! Images are independent, so with the `threading` feature they are processed
//! on rayon's pool; without it, sequentially. Output order always matches
//! input order.

#[cfg(feature = "threading")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::evaluator::{Evaluator, IndexSelection, Parameters};
use crate::image::Image;
use crate::scale::scale;

impl Evaluator<'_> {
    /// Optionally scale each image for `dataset`, then compute the selected
    /// indices on it. The first failing image fails the whole call.
    pub fn compute_collection(
        &self,
        images: &[Image],
        selection: impl Into<IndexSelection>,
        params: &Parameters,
        dataset: Option<&str>,
    ) -> Result<Vec<Image>> {
        let selection = selection.into();
        debug!(images = images.len(), dataset = ?dataset, "mapping indices over collection");

        let run = |img: &Image| -> Result<Image> {
            match dataset {
                Some(id) => {
                    let scaled = scale(self.catalog(), img, id)?;
                    self.compute_index(&scaled, &selection, params)
                }
                None => self.compute_index(img, &selection, params),
            }
        };

        #[cfg(feature = "threading")]
        let out = images.par_iter().map(run).collect();
        #[cfg(not(feature = "threading"))]
        let out = images.iter().map(run).collect();

        out
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::catalog::Catalog;
    use crate::error::Error;

    fn raw_s2(t: i64, nir: f64, red: f64) -> Image {
        Image::new(1, 1)
            .with_band("B8", vec![nir])
            .unwrap()
            .with_band("B4", vec![red])
            .unwrap()
            .with_time_start(t)
    }

    #[test]
    fn scales_then_computes_preserving_order() {
        let catalog = Catalog::builtin();
        let eval = Evaluator::new(catalog);
        let images: Vec<Image> = (0..16)
            .map(|i| raw_s2(i, 3000.0 + i as f64 * 100.0, 1000.0))
            .collect();
        let params = catalog.default_parameters("COPERNICUS/S2_SR_HARMONIZED").unwrap();

        let out = eval
            .compute_collection(&images, "NDVI", &params, Some("COPERNICUS/S2_SR_HARMONIZED"))
            .unwrap();

        assert_eq!(out.len(), images.len());
        for (i, img) in out.iter().enumerate() {
            assert_eq!(img.time_start, Some(i as i64));
            let n = (3000.0 + i as f64 * 100.0) * 0.0001;
            let r = 0.1;
            let ndvi = img.band("NDVI").unwrap().data[0];
            assert_relative_eq!(ndvi, (n - r) / (n + r), epsilon = 1e-12);
            assert_relative_eq!(img.band("B4").unwrap().data[0], 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn one_bad_image_fails_the_collection() {
        let eval = Evaluator::new(Catalog::builtin());
        let mut images = vec![raw_s2(0, 3000.0, 1000.0), raw_s2(1, 3000.0, 1000.0)];
        images.push(Image::new(1, 1).with_band("B8", vec![1.0]).unwrap());
        let params = Parameters::new().with("N", "B8").with("R", "B4");

        let err = eval.compute_collection(&images, "NDVI", &params, None).unwrap_err();
        assert_eq!(err, Error::UnknownBand { variable: "R".into(), band: "B4".into() });
    }
}
