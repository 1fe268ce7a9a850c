//! Loader for index records in the Awesome Spectral Indices JSON layout:
//!
//! ```json
//! {"SpectralIndices": {"NDVI": {"short_name": "NDVI", "formula": "(N - R)/(N + R)",
//!   "bands": ["N", "R"], "application_domain": "vegetation", ...}}}
//! ```
//!
//! An optional top-level `"Variables"` array describes variables the
//! compiled-in table lacks, in the same shape [`VariableDescriptor`]
//! serializes to.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::index::{IndexDefinition, IndexType};
use super::variable::VariableDescriptor;
use crate::error::Result;

#[derive(Deserialize)]
struct Document {
    #[serde(rename = "SpectralIndices")]
    spectral_indices: BTreeMap<String, Record>,
    #[serde(rename = "Variables", default)]
    variables: Vec<VariableDescriptor>,
}

#[derive(Deserialize)]
struct Record {
    short_name: String,
    #[serde(default)]
    long_name: String,
    #[serde(alias = "type")]
    application_domain: IndexType,
    formula: String,
    bands: Vec<String>,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    contributor: String,
    #[serde(default)]
    platforms: Vec<String>,
    #[serde(default)]
    date_of_addition: String,
}

/// Index records and extra variable descriptors of one document.
pub(super) struct AsiDocument {
    pub indices: Vec<IndexDefinition>,
    pub variables: Vec<VariableDescriptor>,
}

/// Parse and validate every record of an ASI-style document.
pub(super) fn parse_document(text: &str) -> Result<AsiDocument> {
    let doc: Document = serde_json::from_str(text)?;
    let indices = doc
        .spectral_indices
        .into_values()
        .map(|r| {
            IndexDefinition::new(
                r.short_name,
                r.long_name,
                r.application_domain,
                &r.formula,
                r.bands,
                r.reference,
                r.contributor,
                r.platforms,
                r.date_of_addition,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AsiDocument { indices, variables: doc.variables })
}
