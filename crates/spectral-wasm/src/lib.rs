use anyhow::{Context, Result};
use wasm_bindgen::prelude::*;

use spectral_core::{scale, Catalog, Evaluator, Image, IndexSelection, Parameters};

fn js_err(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

#[wasm_bindgen(start)]
pub fn init() {
    // Catalog tables are parsed on first use; force it at load time.
    let _ = Catalog::builtin();
}

/// Every catalog index as an array of objects.
#[wasm_bindgen]
pub fn list_indices() -> Result<JsValue, JsValue> {
    let defs: Vec<_> = Catalog::builtin().list_indices().collect();
    serde_wasm_bindgen::to_value(&defs).map_err(JsValue::from)
}

/// One index by short name.
#[wasm_bindgen]
pub fn get_index(name: &str) -> Result<JsValue, JsValue> {
    let def = Catalog::builtin().get_index(name).map_err(|e| js_err(e.into()))?;
    serde_wasm_bindgen::to_value(def).map_err(JsValue::from)
}

/// Compute indices on an image. `names_json` is a short name or an array of
/// them; `params_json` maps variables to band names or numbers. Returns the
/// image with the index bands appended, as JSON.
#[wasm_bindgen]
pub fn compute_index(
    image_json: &str,
    names_json: &str,
    params_json: &str,
) -> Result<String, JsValue> {
    compute_index_json(image_json, names_json, params_json).map_err(js_err)
}

/// Scale an image for a dataset, JSON in and out.
#[wasm_bindgen(js_name = scale)]
pub fn scale_image(image_json: &str, dataset: &str) -> Result<String, JsValue> {
    scale_json(image_json, dataset).map_err(js_err)
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Names {
    One(String),
    Many(Vec<String>),
}

impl From<Names> for IndexSelection {
    fn from(n: Names) -> Self {
        match n {
            Names::One(s) => s.into(),
            Names::Many(v) => v.into(),
        }
    }
}

fn compute_index_json(image_json: &str, names_json: &str, params_json: &str) -> Result<String> {
    let image: Image = serde_json::from_str(image_json).context("Invalid image")?;
    let names: Names = serde_json::from_str(names_json).context("Invalid index names")?;
    let params: Parameters = serde_json::from_str(params_json).context("Invalid params")?;

    let out = Evaluator::new(Catalog::builtin()).compute_index(&image, names, &params)?;
    Ok(serde_json::to_string(&out)?)
}

fn scale_json(image_json: &str, dataset: &str) -> Result<String> {
    let image: Image = serde_json::from_str(image_json).context("Invalid image")?;
    let out = scale(Catalog::builtin(), &image, dataset)?;
    Ok(serde_json::to_string(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = r#"{"width": 2, "height": 1, "bands": [
        {"name": "B8", "data": [4000, 3000]},
        {"name": "B4", "data": [1000, null]}
    ]}"#;

    #[test]
    fn computes_from_json() {
        let out = compute_index_json(IMAGE, r#"["NDVI"]"#, r#"{"N": "B8", "R": "B4"}"#).unwrap();
        let image: Image = serde_json::from_str(&out).unwrap();
        let ndvi = &image.band("NDVI").unwrap().data;
        assert!((ndvi[0] - 0.6).abs() < 1e-12);
        assert!(ndvi[1].is_nan());
    }

    #[test]
    fn single_name_and_constants() {
        let params = r#"{"N": "B8", "R": "B4", "L": 0.5}"#;
        let out = compute_index_json(IMAGE, r#""SAVI""#, params).unwrap();
        let image: Image = serde_json::from_str(&out).unwrap();
        let expected = 1.5 * (4000.0 - 1000.0) / (4000.0 + 1000.0 + 0.5);
        assert!((image.band("SAVI").unwrap().data[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn errors_carry_context() {
        let err = compute_index_json("{", r#""NDVI""#, "{}").unwrap_err();
        assert!(format!("{err:#}").starts_with("Invalid image"));
        let err = compute_index_json(IMAGE, r#""NOPE""#, "{}").unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn scales_from_json() {
        let out = scale_json(IMAGE, "COPERNICUS/S2_SR").unwrap();
        let image: Image = serde_json::from_str(&out).unwrap();
        assert!((image.band("B8").unwrap().data[0] - 0.4).abs() < 1e-12);
    }
}
