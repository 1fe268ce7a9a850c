//! Index evaluation: bind formula variables to image bands or constants,
//! evaluate, and attach one output band per requested index.
//!
//! A request is validated as a whole before anything is evaluated: an
//! unknown index, a missing variable, a band selection the image does not
//! have, or an output name that would collide with an existing band fails the
//! call and no image is returned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog::{Catalog, IndexDefinition};
use crate::error::{Error, Result};
use crate::formula::Operand;
use crate::image::{Band, Image};

// ── Parameters ────────────────────────────────────────────────────────────────

/// Value source for one formula variable. In JSON a string selects a band
/// and a number is a constant: `{"N": "B8", "L": 0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    Constant(f64),
    Band(String),
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Parameter::Constant(v)
    }
}

impl From<&str> for Parameter {
    fn from(band: &str) -> Self {
        Parameter::Band(band.to_string())
    }
}

/// Variable name → value source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<Parameter>) {
        self.0.insert(variable.into(), value.into());
    }

    /// Builder form of [`Parameters::insert`].
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn get(&self, variable: &str) -> Option<&Parameter> {
        self.0.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries of `other` override entries of `self`.
    pub fn merge(mut self, other: Parameters) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Fill every constant the caller did not supply with its catalog default.
    pub fn with_defaults(mut self, catalog: &Catalog) -> Self {
        for (name, value) in catalog.constants() {
            self.0.entry(name.to_string()).or_insert(Parameter::Constant(value));
        }
        self
    }
}

impl<K: Into<String>, V: Into<Parameter>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// One index name or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSelection(Vec<String>);

impl IndexSelection {
    /// Requested names with repeats removed, first occurrence kept.
    pub fn names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.0.len());
        for n in &self.0 {
            if !out.contains(&n.as_str()) {
                out.push(n.as_str());
            }
        }
        out
    }
}

impl From<&str> for IndexSelection {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for IndexSelection {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for IndexSelection {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for IndexSelection {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for IndexSelection {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&IndexSelection> for IndexSelection {
    fn from(sel: &IndexSelection) -> Self {
        sel.clone()
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

fn default_nodata() -> f64 {
    f64::NAN
}

fn null_as_nan<'de, D: serde::Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Written where a pixel divides by zero. `null` in JSON means NaN.
    #[serde(default = "default_nodata", deserialize_with = "null_as_nan")]
    pub nodata: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { nodata: default_nodata() }
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Computes catalog indices over images. Holds no per-call state; share it
/// freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'c> {
    catalog: &'c Catalog,
    config: EvaluatorConfig,
}

impl<'c> Evaluator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_config(catalog, EvaluatorConfig::default())
    }

    pub fn with_config(catalog: &'c Catalog, config: EvaluatorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Compute every selected index and return `image` with one new band per
    /// index, named by its short name. Existing bands are left as they are.
    pub fn compute_index(
        &self,
        image: &Image,
        selection: impl Into<IndexSelection>,
        params: &Parameters,
    ) -> Result<Image> {
        let bands = self.compute_bands(image, selection, params)?;
        let mut out = image.clone();
        for band in bands {
            out.add_band(band)?;
        }
        Ok(out)
    }

    /// Like [`Evaluator::compute_index`] but returns only the new bands.
    pub fn compute_bands(
        &self,
        image: &Image,
        selection: impl Into<IndexSelection>,
        params: &Parameters,
    ) -> Result<Vec<Band>> {
        let selection = selection.into();
        let defs = self.validate(image, &selection, params)?;

        debug!(
            indices = ?selection.names(),
            pixels = image.len(),
            "computing spectral indices"
        );

        defs.into_iter().map(|def| self.evaluate(def, image, params)).collect()
    }

    /// Resolve and check the whole request before any evaluation.
    fn validate(
        &self,
        image: &Image,
        selection: &IndexSelection,
        params: &Parameters,
    ) -> Result<Vec<&'c IndexDefinition>> {
        let defs = selection
            .names()
            .into_iter()
            .map(|name| self.catalog.get_index(name))
            .collect::<Result<Vec<_>>>()?;

        for def in &defs {
            for variable in &def.required_variables {
                match params.get(variable) {
                    None => {
                        return Err(Error::MissingVariable {
                            index: def.short_name.clone(),
                            variable: variable.clone(),
                        })
                    }
                    Some(Parameter::Band(band)) if !image.has_band(band) => {
                        return Err(Error::UnknownBand {
                            variable: variable.clone(),
                            band: band.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
            if image.has_band(&def.short_name) {
                return Err(Error::DuplicateBand(def.short_name.clone()));
            }
        }

        Ok(defs)
    }

    fn evaluate(&self, def: &IndexDefinition, image: &Image, params: &Parameters) -> Result<Band> {
        trace!(index = %def.short_name, formula = %def.formula, "evaluating");
        let lookup = |name: &str| {
            params.get(name).and_then(|p| match p {
                Parameter::Constant(v) => Some(Operand::Scalar(*v)),
                Parameter::Band(band) => {
                    image.band(band).map(|b| Operand::Array(b.data.as_slice()))
                }
            })
        };
        let value = def
            .formula
            .evaluate(lookup, self.config.nodata)
            .map_err(|e| match e {
                Error::MissingVariable { variable, .. } => Error::MissingVariable {
                    index: def.short_name.clone(),
                    variable,
                },
                other => other,
            })?;
        Ok(Band::new(def.short_name.clone(), value.into_vec(image.len())))
    }
}
