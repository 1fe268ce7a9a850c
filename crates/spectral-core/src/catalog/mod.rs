//! The spectral index catalog: index definitions, variable descriptors and
//! per-dataset scale/offset tables.
//!
//! A [`Catalog`] is validated once when it is built and is read-only
//! afterwards. [`Catalog::builtin`] gives the process-wide instance built from
//! the compiled-in tables; other catalogs can be built with [`Catalog::new`]
//! or [`Catalog::from_asi_json`] and passed to the evaluator explicitly.

mod builtin;
pub mod dataset;
pub mod index;
mod json;
pub mod variable;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Error, Result};
use crate::evaluator::{Parameter, Parameters};

pub use dataset::{DatasetBand, DatasetDescriptor, ScaleOffset};
pub use index::{IndexDefinition, IndexType};
pub use variable::{VariableDescriptor, VariableKind};

#[derive(Debug, Clone)]
pub struct Catalog {
    indices: BTreeMap<String, IndexDefinition>,
    variables: BTreeMap<String, VariableDescriptor>,
    datasets: BTreeMap<String, DatasetDescriptor>,
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// Rejects duplicate names, indices that use an undescribed variable, and
    /// dataset bands mapped to an undescribed variable. Index records are
    /// already checked for formula/variable agreement by
    /// [`IndexDefinition::new`].
    pub fn new(
        indices: Vec<IndexDefinition>,
        variables: Vec<VariableDescriptor>,
        datasets: Vec<DatasetDescriptor>,
    ) -> Result<Self> {
        let mut variable_map = BTreeMap::new();
        for v in variables {
            if variable_map.contains_key(&v.name) {
                return Err(invalid(&v.name, "variable described twice"));
            }
            variable_map.insert(v.name.clone(), v);
        }

        let mut index_map = BTreeMap::new();
        for def in indices {
            if index_map.contains_key(&def.short_name) {
                return Err(invalid(&def.short_name, "index defined twice"));
            }
            let undescribed = def
                .required_variables
                .iter()
                .find(|v| !variable_map.contains_key(*v));
            if let Some(v) = undescribed {
                return Err(invalid(&def.short_name, &format!("variable {v} is not described")));
            }
            index_map.insert(def.short_name.clone(), def);
        }

        let mut dataset_map = BTreeMap::new();
        for ds in datasets {
            if dataset_map.contains_key(&ds.id) {
                return Err(invalid(&ds.id, "dataset registered twice"));
            }
            for (i, b) in ds.bands.iter().enumerate() {
                if ds.bands[..i].iter().any(|o| o.band == b.band) {
                    return Err(invalid(&ds.id, &format!("band {} registered twice", b.band)));
                }
                if let Some(v) = &b.variable {
                    if !variable_map.contains_key(v) {
                        let reason = format!("band {} maps to undescribed variable {v}", b.band);
                        return Err(invalid(&ds.id, &reason));
                    }
                }
            }
            dataset_map.insert(ds.id.clone(), ds);
        }

        debug!(
            indices = index_map.len(),
            variables = variable_map.len(),
            datasets = dataset_map.len(),
            "catalog built"
        );

        Ok(Self { indices: index_map, variables: variable_map, datasets: dataset_map })
    }

    /// The process-wide catalog built from the compiled-in tables.
    /// Built on first use; shared read-only afterwards.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| {
            // The compiled-in tables are covered by `builtin_catalog_is_valid`.
            Self::try_builtin().expect("compiled-in catalog tables are valid")
        })
    }

    /// Build a fresh copy of the compiled-in catalog.
    pub fn try_builtin() -> Result<Self> {
        Self::new(builtin::indices()?, builtin::variables(), builtin::datasets())
    }

    /// Index records from an Awesome Spectral Indices style JSON document,
    /// combined with the compiled-in variables and datasets. Variables the
    /// document describes replace compiled-in ones of the same name.
    pub fn from_asi_json(text: &str) -> Result<Self> {
        let doc = json::parse_document(text)?;
        let mut variables = builtin::variables();
        variables.retain(|v| !doc.variables.iter().any(|d| d.name == v.name));
        variables.extend(doc.variables);
        Self::new(doc.indices, variables, builtin::datasets())
    }

    // ── Indices ─────────────────────────────────────────────────────────────

    /// All index definitions, ordered by short name.
    pub fn list_indices(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.indices.values()
    }

    pub fn get_index(&self, short_name: &str) -> Result<&IndexDefinition> {
        self.indices
            .get(short_name)
            .ok_or_else(|| Error::UnknownIndex(short_name.to_string()))
    }

    pub fn contains_index(&self, short_name: &str) -> bool {
        self.indices.contains_key(short_name)
    }

    pub fn indices_of_type(&self, index_type: IndexType) -> impl Iterator<Item = &IndexDefinition> {
        self.indices.values().filter(move |d| d.index_type == index_type)
    }

    // ── Variables ───────────────────────────────────────────────────────────

    pub fn list_variables(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.values()
    }

    pub fn get_variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.get(name)
    }

    /// Default values of every constant variable.
    pub fn constants(&self) -> BTreeMap<&str, f64> {
        self.variables
            .values()
            .filter_map(|v| v.default_value().map(|d| (v.name.as_str(), d)))
            .collect()
    }

    // ── Datasets ────────────────────────────────────────────────────────────

    pub fn datasets(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.values()
    }

    pub fn dataset(&self, id: &str) -> Result<&DatasetDescriptor> {
        self.datasets.get(id).ok_or_else(|| Error::UnknownDataset(id.to_string()))
    }

    pub fn get_scale_offset(&self, dataset_id: &str, band: &str) -> Result<ScaleOffset> {
        self.datasets
            .get(dataset_id)
            .and_then(|ds| ds.band(band))
            .map(DatasetBand::scale_offset)
            .ok_or_else(|| Error::UnknownDatasetBand {
                dataset: dataset_id.to_string(),
                band: band.to_string(),
            })
    }

    /// Dataset → band → scale, for every registered pair.
    pub fn scale_parameters(&self) -> BTreeMap<&str, BTreeMap<&str, f64>> {
        self.per_band(|b| b.scale)
    }

    /// Dataset → band → offset, for every registered pair.
    pub fn offset_parameters(&self) -> BTreeMap<&str, BTreeMap<&str, f64>> {
        self.per_band(|b| b.offset)
    }

    fn per_band(&self, f: impl Fn(&DatasetBand) -> f64) -> BTreeMap<&str, BTreeMap<&str, f64>> {
        self.datasets
            .values()
            .map(|ds| {
                let bands = ds.bands.iter().map(|b| (b.band.as_str(), f(b))).collect();
                (ds.id.as_str(), bands)
            })
            .collect()
    }

    /// Band selections for every variable the dataset measures, e.g.
    /// `N -> B8`, `R -> B4` for Sentinel-2.
    pub fn default_parameters(&self, dataset_id: &str) -> Result<Parameters> {
        let ds = self.dataset(dataset_id)?;
        let mut params = Parameters::new();
        for b in &ds.bands {
            if let Some(v) = &b.variable {
                params.insert(v.clone(), Parameter::Band(b.band.clone()));
            }
        }
        Ok(params)
    }
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidCatalog { name: name.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::try_builtin().unwrap();
        assert!(catalog.list_indices().count() >= 30);
    }

    #[test]
    fn every_required_variable_set_equals_formula_free_variables() {
        for def in Catalog::builtin().list_indices() {
            let required: BTreeSet<&str> =
                def.required_variables.iter().map(String::as_str).collect();
            let free: BTreeSet<&str> = def.formula.variables().iter().map(String::as_str).collect();
            assert_eq!(required, free, "index {}", def.short_name);
        }
    }

    #[test]
    fn get_index_is_exact_and_repeatable() {
        let catalog = Catalog::builtin();
        let a = catalog.get_index("NDVI").unwrap();
        let b = catalog.get_index("NDVI").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.formula.source(), "(N - R)/(N + R)");
        assert_eq!(catalog.get_index("ndvi").unwrap_err(), Error::UnknownIndex("ndvi".into()));
        assert_eq!(
            catalog.get_index("NOT_AN_INDEX").unwrap_err(),
            Error::UnknownIndex("NOT_AN_INDEX".into())
        );
    }

    #[test]
    fn bais2_attributes() {
        let def = Catalog::builtin().get_index("BAIS2").unwrap();
        assert_eq!(def.long_name, "Burned Area Index for Sentinel 2");
        assert_eq!(def.index_type, IndexType::Burn);
        assert_eq!(def.required_variables, vec!["RE2", "RE3", "N2", "R", "S2"]);
        assert_eq!(def.reference, "https://doi.org/10.3390/ecrs-2-05177");
    }

    #[test]
    fn list_indices_is_sorted_by_short_name() {
        let names: Vec<&str> =
            Catalog::builtin().list_indices().map(|d| d.short_name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn indices_of_type_filters() {
        let burn: Vec<&str> = Catalog::builtin()
            .indices_of_type(IndexType::Burn)
            .map(|d| d.short_name.as_str())
            .collect();
        assert!(burn.contains(&"NBR"));
        assert!(burn.contains(&"BAIS2"));
        assert!(!burn.contains(&"NDVI"));
    }

    #[test]
    fn scale_offset_lookup() {
        let catalog = Catalog::builtin();
        let so = catalog.get_scale_offset("COPERNICUS/S2_SR_HARMONIZED", "B8").unwrap();
        assert_eq!(so, ScaleOffset { scale: 0.0001, offset: 0.0 });
        let l8 = catalog.get_scale_offset("LANDSAT/LC08/C02/T1_L2", "SR_B4").unwrap();
        assert_eq!(l8, ScaleOffset { scale: 0.0000275, offset: -0.2 });
        assert!(matches!(
            catalog.get_scale_offset("COPERNICUS/S2_SR_HARMONIZED", "SR_B4"),
            Err(Error::UnknownDatasetBand { .. })
        ));
        assert!(matches!(
            catalog.get_scale_offset("NOPE", "B8"),
            Err(Error::UnknownDatasetBand { .. })
        ));
    }

    #[test]
    fn scale_and_offset_tables_cover_every_dataset() {
        let catalog = Catalog::builtin();
        let scales = catalog.scale_parameters();
        let offsets = catalog.offset_parameters();
        assert_eq!(scales.len(), catalog.datasets().count());
        assert_eq!(scales["LANDSAT/LC09/C02/T1_L2"]["ST_B10"], 0.00341802);
        assert_eq!(offsets["LANDSAT/LC09/C02/T1_L2"]["ST_B10"], 149.0);
        assert_eq!(offsets["COPERNICUS/S2_SR_HARMONIZED"]["B12"], 0.0);
    }

    #[test]
    fn constants_expose_defaults() {
        let constants = Catalog::builtin().constants();
        assert_eq!(constants["L"], 1.0);
        assert_eq!(constants["g"], 2.5);
        assert!(!constants.contains_key("N"));
    }

    #[test]
    fn default_parameters_map_variables_to_dataset_bands() {
        let params = Catalog::builtin().default_parameters("COPERNICUS/S2_SR_HARMONIZED").unwrap();
        assert_eq!(params.get("N"), Some(&Parameter::Band("B8".into())));
        assert_eq!(params.get("R"), Some(&Parameter::Band("B4".into())));
        assert_eq!(params.get("RE1"), Some(&Parameter::Band("B5".into())));
        assert!(params.get("L").is_none());
        assert!(matches!(
            Catalog::builtin().default_parameters("NOPE"),
            Err(Error::UnknownDataset(_))
        ));
    }

    #[test]
    fn new_rejects_undescribed_variables_and_duplicates() {
        let ndvi = Catalog::builtin().get_index("NDVI").unwrap().clone();
        let err = Catalog::new(vec![ndvi.clone()], vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog { .. }));

        let vars: Vec<VariableDescriptor> = Catalog::builtin().list_variables().cloned().collect();
        let err = Catalog::new(vec![ndvi.clone(), ndvi], vars, vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog { .. }));
    }

    #[test]
    fn asi_json_loads_and_validates() {
        let text = r#"{"SpectralIndices": {
            "NDVI": {"short_name": "NDVI", "long_name": "Normalized Difference Vegetation Index",
                     "application_domain": "vegetation", "formula": "(N - R)/(N + R)",
                     "bands": ["N", "R"], "reference": "https://ntrs.nasa.gov/citations/19740022614",
                     "contributor": "https://github.com/davemlz", "platforms": ["Sentinel-2"],
                     "date_of_addition": "2021-04-07"},
            "NBR": {"short_name": "NBR", "type": "burn", "formula": "(N - S2) / (N + S2)",
                    "bands": ["N", "S2"]}
        }}"#;
        let catalog = Catalog::from_asi_json(text).unwrap();
        assert_eq!(catalog.list_indices().count(), 2);
        assert_eq!(catalog.get_index("NBR").unwrap().index_type, IndexType::Burn);

        let bad = r#"{"SpectralIndices": {"X": {"short_name": "X", "type": "burn",
                     "formula": "(N - S2) / (N + S2)", "bands": ["N"]}}}"#;
        assert!(matches!(Catalog::from_asi_json(bad), Err(Error::InvalidCatalog { .. })));
        assert!(matches!(Catalog::from_asi_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn asi_json_kernel_records_load() {
        let text = r#"{"SpectralIndices": {
            "kNDVI": {"short_name": "kNDVI", "application_domain": "kernel",
                      "formula": "(kNN - kNR)/(kNN + kNR)", "bands": ["kNN", "kNR"]},
            "kEVI": {"short_name": "kEVI", "application_domain": "kernel",
                     "formula": "g * (kNN - kNR) / (kNN + C1 * kNR - C2 * kNB + kNL)",
                     "bands": ["g", "kNN", "kNR", "C1", "C2", "kNB", "kNL"]}
        }}"#;
        let catalog = Catalog::from_asi_json(text).unwrap();
        assert_eq!(catalog.indices_of_type(IndexType::Kernel).count(), 2);
        let knr = catalog.get_variable("kNR").unwrap();
        assert_eq!(knr.kind, VariableKind::Kernel { left: "N".into(), right: "R".into() });
    }

    #[test]
    fn asi_json_document_variables_extend_and_override() {
        let text = r#"{
            "SpectralIndices": {
                "NIRvP": {"short_name": "NIRvP", "application_domain": "vegetation",
                          "formula": "((N - R) / (N + R)) * N * PAR",
                          "bands": ["N", "R", "PAR"]}
            },
            "Variables": [
                {"name": "PAR", "description": "Photosynthetically Active Radiation",
                 "kind": "constant", "default": 1.0},
                {"name": "L", "description": "Canopy background adjustment",
                 "kind": "constant", "default": 0.5}
            ]
        }"#;
        let catalog = Catalog::from_asi_json(text).unwrap();
        assert!(catalog.contains_index("NIRvP"));
        assert_eq!(catalog.constants()["PAR"], 1.0);
        assert_eq!(catalog.constants()["L"], 0.5);
        assert_eq!(catalog.list_variables().filter(|v| v.name == "L").count(), 1);
    }

    #[test]
    fn builtin_describes_kernel_and_polynomial_constants() {
        let catalog = Catalog::builtin();
        for name in ["kNN", "kNR", "kNL", "kGG", "kAB"] {
            assert!(catalog.get_variable(name).is_some(), "{name}");
        }
        assert_eq!(catalog.constants()["p"], 2.0);
        assert_eq!(catalog.constants()["c"], 1.0);
    }
}
