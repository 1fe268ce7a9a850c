//! `spectral`: explore the spectral index catalog and compute indices on
//! images stored as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use spectral_core::{
    scale, time_series, Catalog, Evaluator, EvaluatorConfig, Image, IndexType, Parameter,
    Parameters, Reducer, Region, VariableKind,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "spectral", version, about = "Spectral index catalog and evaluator")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog indices
    Indices {
        /// Only indices of this type (vegetation, burn, water, ...)
        #[arg(short, long)]
        r#type: Option<IndexType>,
    },
    /// Print every attribute of one index as JSON
    Show {
        name: String,
    },
    /// Describe the formula variables
    Variables,
    /// Default values of the constant variables
    Constants,
    /// Scale and offset parameters per dataset
    ScaleParams {
        /// Only this dataset
        #[arg(short, long)]
        dataset: Option<String>,
    },
    /// Convert stored band values of an image to physical units
    Scale {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        dataset: String,
        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute one or more indices and add them as bands
    Compute {
        #[arg(short, long)]
        input: PathBuf,
        /// Index short name; repeat for several
        #[arg(short = 'n', long = "index", required = true)]
        indices: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute indices over a collection and reduce them to a time series
    Series {
        /// JSON array of images
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short = 'n', long = "index", required = true)]
        indices: Vec<String>,
        #[command(flatten)]
        request: RequestArgs,
        #[arg(short, long, default_value = "median")]
        reducer: Reducer,
        /// Pixel window row,col,height,width (whole image when omitted)
        #[arg(short, long)]
        window: Option<Region>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    /// Scale the input for this dataset first and bind its bands to variables
    #[arg(short, long)]
    dataset: Option<String>,
    /// VARIABLE=VALUE; a number is a constant, anything else a band name
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Parameter)>,
    /// JSON object of parameters, e.g. {"N": "B8", "L": 0.5}
    #[arg(long = "params")]
    params_file: Option<PathBuf>,
    /// Fill unsupplied constants with catalog defaults
    #[arg(long)]
    defaults: bool,
    /// Value written where a pixel divides by zero (NaN when omitted)
    #[arg(long)]
    nodata: Option<f64>,
}

fn parse_param(s: &str) -> std::result::Result<(String, Parameter), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VARIABLE=VALUE, got {s:?}"))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected VARIABLE=VALUE, got {s:?}"));
    }
    let param = match value.parse::<f64>() {
        Ok(v) => Parameter::Constant(v),
        Err(_) => Parameter::Band(value.to_string()),
    };
    Ok((name.to_string(), param))
}

impl RequestArgs {
    /// Dataset bindings, then the params file, then `--param` flags, each
    /// overriding the previous; defaults fill whatever is still missing.
    fn parameters(&self, catalog: &Catalog) -> Result<Parameters> {
        let mut params = match &self.dataset {
            Some(id) => catalog.default_parameters(id)?,
            None => Parameters::new(),
        };
        if let Some(path) = &self.params_file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading parameters {}", path.display()))?;
            let file: Parameters = serde_json::from_str(&text)
                .with_context(|| format!("parsing parameters {}", path.display()))?;
            params = params.merge(file);
        }
        params = params.merge(self.params.iter().cloned().collect());
        if self.defaults {
            params = params.with_defaults(catalog);
        }
        Ok(params)
    }

    fn config(&self) -> EvaluatorConfig {
        match self.nodata {
            Some(nodata) => EvaluatorConfig { nodata },
            None => EvaluatorConfig::default(),
        }
    }
}

// ── IO helpers ────────────────────────────────────────────────────────────────

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let catalog = Catalog::builtin();

    match cli.command {
        Command::Indices { r#type } => {
            let defs: Vec<_> = match r#type {
                Some(t) => catalog.indices_of_type(t).collect(),
                None => catalog.list_indices().collect(),
            };
            for def in &defs {
                println!("{:<10} {:<11} {}", def.short_name, def.index_type, def.long_name);
            }
            info!("{} indices", defs.len());
        }
        Command::Show { name } => {
            write_json(catalog.get_index(&name)?, None)?;
        }
        Command::Variables => {
            for v in catalog.list_variables() {
                let detail = match &v.kind {
                    VariableKind::Band { min_wavelength, max_wavelength, .. } => {
                        format!("{min_wavelength}-{max_wavelength} nm")
                    }
                    VariableKind::Backscatter { polarization } => {
                        format!("{polarization} backscatter")
                    }
                    VariableKind::Constant { default } => format!("default {default}"),
                    VariableKind::Kernel { left, right } => format!("k({left}, {right})"),
                };
                println!("{:<8} {:<45} {}", v.name, v.description, detail);
            }
        }
        Command::Constants => {
            write_json(&catalog.constants(), None)?;
        }
        Command::ScaleParams { dataset } => {
            #[derive(Serialize)]
            struct Tables<'a> {
                scale: BTreeMap<&'a str, BTreeMap<&'a str, f64>>,
                offset: BTreeMap<&'a str, BTreeMap<&'a str, f64>>,
            }
            let mut tables = Tables {
                scale: catalog.scale_parameters(),
                offset: catalog.offset_parameters(),
            };
            if let Some(id) = &dataset {
                catalog.dataset(id)?;
                tables.scale.retain(|k, _| *k == id.as_str());
                tables.offset.retain(|k, _| *k == id.as_str());
            }
            write_json(&tables, None)?;
        }
        Command::Scale { input, dataset, output } => {
            let image: Image = read_json(&input)?;
            let scaled = scale(catalog, &image, &dataset)
                .with_context(|| format!("scaling {} for {dataset}", input.display()))?;
            write_json(&scaled, output.as_deref())?;
        }
        Command::Compute { input, indices, request, output } => {
            let image: Image = read_json(&input)?;
            let params = request.parameters(catalog)?;
            let image = match &request.dataset {
                Some(id) => scale(catalog, &image, id)?,
                None => image,
            };
            let evaluator = Evaluator::with_config(catalog, request.config());
            let out = evaluator
                .compute_index(&image, indices.clone(), &params)
                .with_context(|| {
                    format!("computing {} on {}", indices.join(", "), input.display())
                })?;
            info!("added bands {}", indices.join(", "));
            write_json(&out, output.as_deref())?;
        }
        Command::Series { input, indices, request, reducer, window, output } => {
            let images: Vec<Image> = read_json(&input)?;
            if images.is_empty() {
                bail!("{} holds no images", input.display());
            }
            let params = request.parameters(catalog)?;
            let evaluator = Evaluator::with_config(catalog, request.config());
            let computed = evaluator
                .compute_collection(&images, indices.clone(), &params, request.dataset.as_deref())
                .with_context(|| {
                    format!("computing {} over {}", indices.join(", "), input.display())
                })?;
            let series = time_series(&computed, &indices, window, reducer)?;
            info!("{} time steps, reducer {reducer}", series.len());
            write_json(&series, output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_numbers_are_constants_and_words_are_bands() {
        assert_eq!(parse_param("L=0.5").unwrap(), ("L".to_string(), Parameter::Constant(0.5)));
        assert_eq!(parse_param("N = B8").unwrap(), ("N".to_string(), Parameter::Band("B8".into())));
        assert!(parse_param("N").is_err());
        assert!(parse_param("=B8").is_err());
    }

    #[test]
    fn flags_override_dataset_bindings() {
        let cli = Cli::try_parse_from([
            "spectral", "compute", "-i", "in.json", "-n", "NDVI",
            "--dataset", "COPERNICUS/S2_SR_HARMONIZED", "-p", "N=B8A", "--defaults",
        ])
        .unwrap();
        let Command::Compute { request, indices, .. } = cli.command else {
            panic!("expected compute");
        };
        assert_eq!(indices, vec!["NDVI"]);
        let params = request.parameters(Catalog::builtin()).unwrap();
        assert_eq!(params.get("N"), Some(&Parameter::Band("B8A".into())));
        assert_eq!(params.get("R"), Some(&Parameter::Band("B4".into())));
        assert_eq!(params.get("L"), Some(&Parameter::Constant(1.0)));
    }

    #[test]
    fn series_parses_reducer_and_window() {
        let cli = Cli::try_parse_from([
            "spectral", "series", "-i", "c.json", "-n", "IRECI", "-n", "NDVI",
            "-r", "mean", "-w", "0,0,10,10",
        ])
        .unwrap();
        let Command::Series { reducer, window, indices, .. } = cli.command else {
            panic!("expected series");
        };
        assert_eq!(reducer, Reducer::Mean);
        assert_eq!(window, Some(Region::new(0, 0, 10, 10)));
        assert_eq!(indices, vec!["IRECI", "NDVI"]);
    }
}
