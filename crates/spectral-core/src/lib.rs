//! Spectral index catalog and evaluator.
//!
//! ```ignore
//! use spectral_core::{Catalog, Evaluator, Parameters, scale};
//!
//! let catalog = Catalog::builtin();
//! let image = scale(catalog, &raw, "COPERNICUS/S2_SR_HARMONIZED")?;
//! let params = Parameters::new().with("N", "B8").with("R", "B4").with("L", 0.5);
//! let out = Evaluator::new(catalog).compute_index(&image, ["NIRv", "SAVI"], &params)?;
//! ```

pub mod catalog;
pub mod collection;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod image;
pub mod scale;
pub mod series;

pub use catalog::{
    Catalog, DatasetBand, DatasetDescriptor, IndexDefinition, IndexType, ScaleOffset,
    VariableDescriptor, VariableKind,
};
pub use error::{Error, Result};
pub use evaluator::{Evaluator, EvaluatorConfig, IndexSelection, Parameter, Parameters};
pub use formula::Formula;
pub use image::{Band, Image};
pub use scale::scale;
pub use series::{reduce_region, time_series, Reducer, Region, SeriesPoint};
