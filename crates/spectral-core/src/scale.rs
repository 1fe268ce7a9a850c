//! Conversion of stored band values to physical units.
//!
//! Applying [`scale`] twice to the same image scales it twice; nothing marks
//! an image as already scaled.

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::image::Image;

/// Return a copy of `image` where every band registered for `dataset_id` is
/// replaced by `v * scale + offset`. Unregistered bands, the timestamp and
/// the properties are carried over unchanged.
pub fn scale(catalog: &Catalog, image: &Image, dataset_id: &str) -> Result<Image> {
    let dataset = catalog.dataset(dataset_id)?;
    let mut out = image.clone();
    let mut scaled = 0usize;

    for band in out.bands_mut() {
        let Some(entry) = dataset.band(&band.name) else {
            continue;
        };
        let so = entry.scale_offset();
        for v in &mut band.data {
            *v = so.apply(*v);
        }
        scaled += 1;
    }

    debug!(dataset = dataset_id, scaled, total = image.bands().len(), "scaled image");
    Ok(out)
}
