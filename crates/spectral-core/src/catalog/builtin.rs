//! Compiled-in catalog tables.
//!
//! Index records follow the Awesome Spectral Indices naming (short names,
//! variable letters, formulas in Python operator syntax). Scale and offset
//! values are the published collection-2 / surface-reflectance factors of
//! each dataset.

use super::{
    dataset::{DatasetBand, DatasetDescriptor},
    index::{IndexDefinition, IndexType},
    variable::VariableDescriptor,
};
use crate::error::Result;

pub(super) struct RawIndex {
    pub short_name: &'static str,
    pub long_name: &'static str,
    pub index_type: IndexType,
    pub formula: &'static str,
    pub bands: &'static [&'static str],
    pub reference: &'static str,
    pub contributor: &'static str,
    pub platforms: &'static [&'static str],
    pub date_of_addition: &'static str,
}

// ── Platform groups ───────────────────────────────────────────────────────────

const DAVEMLZ: &str = "https://github.com/davemlz";

const VISNIR: &[&str] = &[
    "Sentinel-2", "Landsat-OLI", "Landsat-TM", "Landsat-ETM+", "MODIS", "Planet-Fusion",
];
const VISNIR_SWIR: &[&str] = &["Sentinel-2", "Landsat-OLI", "Landsat-TM", "Landsat-ETM+", "MODIS"];
const RED_EDGE: &[&str] = &["Sentinel-2"];
const DUAL_POL: &[&str] = &["Sentinel-1 (Dual Polarisation VV-VH)"];

// ── Indices ───────────────────────────────────────────────────────────────────

pub(super) const INDICES: &[RawIndex] = &[
    RawIndex {
        short_name: "AFRI1600",
        long_name: "Aerosol Free Vegetation Index (1600 nm)",
        index_type: IndexType::Vegetation,
        formula: "(N - 0.66 * S1) / (N + 0.66 * S1)",
        bands: &["N", "S1"],
        reference: "https://doi.org/10.1016/S0034-4257(01)00190-0",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "ARVI",
        long_name: "Atmospherically Resistant Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "(N - (R - gamma * (R - B))) / (N + (R - gamma * (R - B)))",
        bands: &["N", "R", "gamma", "B"],
        reference: "https://doi.org/10.1109/36.134076",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "AWEInsh",
        long_name: "Automated Water Extraction Index",
        index_type: IndexType::Water,
        formula: "4.0 * (G - S1) - 0.25 * N + 2.75 * S2",
        bands: &["G", "S1", "N", "S2"],
        reference: "https://doi.org/10.1016/j.rse.2013.08.029",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-09-18",
    },
    RawIndex {
        short_name: "BAI",
        long_name: "Burned Area Index",
        index_type: IndexType::Burn,
        formula: "1.0 / ((0.1 - R) ** 2.0 + (0.06 - N) ** 2.0)",
        bands: &["R", "N"],
        reference: "https://digital.csic.es/bitstream/10261/6426/1/Martin_Isabel_Serie_Geografica.pdf",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "BAIS2",
        long_name: "Burned Area Index for Sentinel 2",
        index_type: IndexType::Burn,
        formula: "(1.0 - ((RE2 * RE3 * N2) / R) ** 0.5) * (((S2 - N2)/(S2 + N2) ** 0.5) + 1.0)",
        bands: &["RE2", "RE3", "N2", "R", "S2"],
        reference: "https://doi.org/10.3390/ecrs-2-05177",
        contributor: DAVEMLZ,
        platforms: RED_EDGE,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "BI",
        long_name: "Bare Soil Index",
        index_type: IndexType::Soil,
        formula: "((S1 + R) - (N + B))/((S1 + R) + (N + B))",
        bands: &["S1", "R", "N", "B"],
        reference: "http://hdl.handle.net/1959.11/29500",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2022-04-08",
    },
    RawIndex {
        short_name: "CIG",
        long_name: "Chlorophyll Index Green",
        index_type: IndexType::Vegetation,
        formula: "(N / G) - 1.0",
        bands: &["N", "G"],
        reference: "https://doi.org/10.1078/0176-1617-00887",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "CIRE",
        long_name: "Chlorophyll Index Red Edge",
        index_type: IndexType::Vegetation,
        formula: "(N / RE1) - 1",
        bands: &["N", "RE1"],
        reference: "https://doi.org/10.1078/0176-1617-00887",
        contributor: DAVEMLZ,
        platforms: RED_EDGE,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "DpRVIVV",
        long_name: "Dual-Polarized Radar Vegetation Index VV",
        index_type: IndexType::Radar,
        formula: "(4.0 * VH) / (VV + VH)",
        bands: &["VV", "VH"],
        reference: "https://www.tandfonline.com/doi/abs/10.5589/m12-043",
        contributor: DAVEMLZ,
        platforms: DUAL_POL,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "EVI",
        long_name: "Enhanced Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "g * (N - R) / (N + C1 * R - C2 * B + L)",
        bands: &["g", "N", "R", "C1", "C2", "B", "L"],
        reference: "https://doi.org/10.1016/S0034-4257(96)00112-5",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "EVI2",
        long_name: "Two-Band Enhanced Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "g * (N - R) / (N + 2.4 * R + 1.0)",
        bands: &["g", "N", "R"],
        reference: "https://doi.org/10.1016/j.rse.2008.06.006",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "GEMI",
        long_name: "Global Environment Monitoring Index",
        index_type: IndexType::Vegetation,
        formula: "((2.0*((N ** 2.0)-(R ** 2.0)) + 1.5*N + 0.5*R)/(N + R + 0.5))*(1.0 - 0.25*((2.0 * ((N ** 2.0) - (R ** 2)) + 1.5 * N + 0.5 * R)/(N + R + 0.5)))-((R - 0.125)/(1 - R))",
        bands: &["N", "R"],
        reference: "http://dx.doi.org/10.1007/bf00031911",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "GNDVI",
        long_name: "Green Normalized Difference Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "(N - G)/(N + G)",
        bands: &["N", "G"],
        reference: "https://doi.org/10.1016/S0034-4257(96)00072-7",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "IRECI",
        long_name: "Inverted Red-Edge Chlorophyll Index",
        index_type: IndexType::Vegetation,
        formula: "(RE3 - R) / (RE1 / RE2)",
        bands: &["RE3", "R", "RE1", "RE2"],
        reference: "https://doi.org/10.1016/j.isprsjprs.2013.04.007",
        contributor: DAVEMLZ,
        platforms: RED_EDGE,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "MNDWI",
        long_name: "Modified Normalized Difference Water Index",
        index_type: IndexType::Water,
        formula: "(G - S1) / (G + S1)",
        bands: &["G", "S1"],
        reference: "https://doi.org/10.1080/01431160600589179",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "MSAVI",
        long_name: "Modified Soil-Adjusted Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "0.5 * (2.0 * N + 1 - (((2 * N + 1) ** 2) - 8 * (N - R)) ** 0.5)",
        bands: &["N", "R"],
        reference: "https://doi.org/10.1016/0034-4257(94)90134-1",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NBR",
        long_name: "Normalized Burn Ratio",
        index_type: IndexType::Burn,
        formula: "(N - S2) / (N + S2)",
        bands: &["N", "S2"],
        reference: "https://doi.org/10.3133/ofr0211",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NBR2",
        long_name: "Normalized Burn Ratio 2",
        index_type: IndexType::Burn,
        formula: "(S1 - S2) / (S1 + S2)",
        bands: &["S1", "S2"],
        reference: "https://www.usgs.gov/core-science-systems/nli/landsat/landsat-normalized-burn-ratio-2",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDBI",
        long_name: "Normalized Difference Built-Up Index",
        index_type: IndexType::Urban,
        formula: "(S1 - N) / (S1 + N)",
        bands: &["S1", "N"],
        reference: "http://dx.doi.org/10.1080/01431160304987",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDGlaI",
        long_name: "Normalized Difference Glacier Index",
        index_type: IndexType::Snow,
        formula: "(G - R)/(G + R)",
        bands: &["G", "R"],
        reference: "https://doi.org/10.1080/01431160802385459",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-09-18",
    },
    RawIndex {
        short_name: "NDMI",
        long_name: "Normalized Difference Moisture Index",
        index_type: IndexType::Vegetation,
        formula: "(N - S1)/(N + S1)",
        bands: &["N", "S1"],
        reference: "https://doi.org/10.1016/S0034-4257(01)00318-2",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDPolI",
        long_name: "Normalized Difference Polarization Index",
        index_type: IndexType::Radar,
        formula: "(VV - VH)/(VV + VH)",
        bands: &["VV", "VH"],
        reference: "https://www.isprs.org/proceedings/XXXVII/congress/4_pdf/267.pdf",
        contributor: DAVEMLZ,
        platforms: DUAL_POL,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDRE",
        long_name: "Normalized Difference Red Edge",
        index_type: IndexType::Vegetation,
        formula: "(N - RE1) / (N + RE1)",
        bands: &["N", "RE1"],
        reference: "https://doi.org/10.1016/1011-1344(93)06963-4",
        contributor: DAVEMLZ,
        platforms: RED_EDGE,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDSI",
        long_name: "Normalized Difference Snow Index",
        index_type: IndexType::Snow,
        formula: "(G - S1) / (G + S1)",
        bands: &["G", "S1"],
        reference: "https://doi.org/10.1109/IGARSS.1994.399618",
        contributor: DAVEMLZ,
        platforms: VISNIR_SWIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDTI",
        long_name: "Normalized Difference Turbidity Index",
        index_type: IndexType::Water,
        formula: "(R - G)/(R + G)",
        bands: &["R", "G"],
        reference: "https://doi.org/10.1016/j.rse.2006.07.012",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-09-18",
    },
    RawIndex {
        short_name: "NDVI",
        long_name: "Normalized Difference Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "(N - R)/(N + R)",
        bands: &["N", "R"],
        reference: "https://ntrs.nasa.gov/citations/19740022614",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NDWI",
        long_name: "Normalized Difference Water Index",
        index_type: IndexType::Water,
        formula: "(G - N) / (G + N)",
        bands: &["G", "N"],
        reference: "https://doi.org/10.1080/01431169608948714",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "NIRv",
        long_name: "Near-Infrared Reflectance of Vegetation",
        index_type: IndexType::Vegetation,
        formula: "((N - R) / (N + R)) * N",
        bands: &["N", "R"],
        reference: "https://doi.org/10.1126/sciadv.1602244",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "OSAVI",
        long_name: "Optimized Soil-Adjusted Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "(N - R) / (N + R + 0.16)",
        bands: &["N", "R"],
        reference: "https://doi.org/10.1016/0034-4257(95)00186-7",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "SAVI",
        long_name: "Soil-Adjusted Vegetation Index",
        index_type: IndexType::Vegetation,
        formula: "(1.0 + L) * (N - R) / (N + R + L)",
        bands: &["L", "N", "R"],
        reference: "https://doi.org/10.1016/0034-4257(88)90106-X",
        contributor: DAVEMLZ,
        platforms: VISNIR,
        date_of_addition: "2021-04-07",
    },
    RawIndex {
        short_name: "SeLI",
        long_name: "Sentinel-2 LAI Green Index",
        index_type: IndexType::Vegetation,
        formula: "(N2 - RE1) / (N2 + RE1)",
        bands: &["N2", "RE1"],
        reference: "https://doi.org/10.3390/s19040904",
        contributor: DAVEMLZ,
        platforms: RED_EDGE,
        date_of_addition: "2022-04-08",
    },
    RawIndex {
        short_name: "VHVVR",
        long_name: "VH-VV Ratio",
        index_type: IndexType::Radar,
        formula: "VH/VV",
        bands: &["VH", "VV"],
        reference: "https://doi.org/10.1109/IGARSS47720.2021.9554099",
        contributor: DAVEMLZ,
        platforms: DUAL_POL,
        date_of_addition: "2022-04-20",
    },
];

// ── Variables ─────────────────────────────────────────────────────────────────

pub(super) fn variables() -> Vec<VariableDescriptor> {
    use VariableDescriptor as V;
    let mut vars = vec![
        V::band("A", "Aerosols band", "coastal", 400.0, 455.0),
        V::band("B", "Blue band", "blue", 450.0, 530.0),
        V::band("G", "Green band", "green", 510.0, 600.0),
        V::band("R", "Red band", "red", 620.0, 690.0),
        V::band("RE1", "Red Edge 1 band", "rededge", 695.0, 715.0),
        V::band("RE2", "Red Edge 2 band", "rededge", 730.0, 749.0),
        V::band("RE3", "Red Edge 3 band", "rededge", 765.0, 795.0),
        V::band("N", "Near-Infrared (NIR) band", "nir", 760.0, 900.0),
        V::band("N2", "Near-Infrared (NIR) band 2", "nir08", 850.0, 880.0),
        V::band("WV", "Water Vapour band", "nir09", 930.0, 960.0),
        V::band("S1", "Short-wave Infrared (SWIR) band 1", "swir16", 1550.0, 1750.0),
        V::band("S2", "Short-wave Infrared (SWIR) band 2", "swir22", 2080.0, 2350.0),
        V::band("T", "Thermal Infrared band", "lwir", 10400.0, 12500.0),
        V::band("T1", "Thermal Infrared band 1", "lwir11", 10600.0, 11190.0),
        V::band("T2", "Thermal Infrared band 2", "lwir12", 11500.0, 12510.0),
        V::backscatter("VV", "Backscattering Coefficient VV"),
        V::backscatter("VH", "Backscattering Coefficient VH"),
        V::backscatter("HH", "Backscattering Coefficient HH"),
        V::backscatter("HV", "Backscattering Coefficient HV"),
        V::constant("L", "Canopy background adjustment", 1.0),
        V::constant("g", "Gain factor", 2.5),
        V::constant("C1", "Coefficient 1 for the aerosol resistance term", 6.0),
        V::constant("C2", "Coefficient 2 for the aerosol resistance term", 7.5),
        V::constant("gamma", "Weighting coefficient used for ARVI", 1.0),
        V::constant("alpha", "Weighting coefficient used for WDRVI", 0.1),
        V::constant("beta", "Calibration parameter used for NDSIns", 0.05),
        V::constant("sla", "Soil line slope", 1.0),
        V::constant("slb", "Soil line intercept", 0.0),
        V::constant("cexp", "Exponent used for OCVI", 1.16),
        V::constant("nexp", "Exponent used for GDVI", 2.0),
        V::constant("sigma", "Length-scale parameter in the RBF kernel", 0.5),
        V::constant("lambdaN", "NIR wavelength used for NIRvH2 and NDGI", 858.5),
        V::constant("lambdaR", "Red wavelength used for NIRvH2 and NDGI", 645.0),
        V::constant("lambdaG", "Green wavelength used for NDGI", 555.0),
        V::constant("epsilon", "Adjustment constant used for EBI", 1.0),
        V::constant("fdelta", "Adjustment factor used for SEVI", 0.581),
        V::constant("omega", "Weighting coefficient used for MBWI", 2.0),
        V::constant("k", "Slope parameter by soil used for NIRvH2", 0.0),
        V::constant("lambdaS1", "SWIR1 wavelength used for NDGI", 1600.0),
        V::constant("p", "Kernel degree in the polynomial kernel", 2.0),
        V::constant("c", "Trade-off parameter in the polynomial kernel", 1.0),
    ];
    vars.extend(kernel_variables());
    vars
}

/// Bands the kernel indices are written over.
const KERNEL_BANDS: &[&str] = &["A", "B", "G", "R", "N"];

/// `kXY` for every ordered pair of kernel bands, plus `kXL` against the
/// canopy background constant.
fn kernel_variables() -> impl Iterator<Item = VariableDescriptor> {
    KERNEL_BANDS.iter().flat_map(|left| {
        KERNEL_BANDS
            .iter()
            .chain(std::iter::once(&"L"))
            .map(move |right| VariableDescriptor::kernel(left, right))
    })
}

// ── Datasets ──────────────────────────────────────────────────────────────────

type BandRow = (&'static str, Option<&'static str>);

const S2_SR_BANDS: &[BandRow] = &[
    ("B1", Some("A")),
    ("B2", Some("B")),
    ("B3", Some("G")),
    ("B4", Some("R")),
    ("B5", Some("RE1")),
    ("B6", Some("RE2")),
    ("B7", Some("RE3")),
    ("B8", Some("N")),
    ("B8A", Some("N2")),
    ("B9", Some("WV")),
    ("B11", Some("S1")),
    ("B12", Some("S2")),
];

const S2_TOA_EXTRA: &[BandRow] = &[("B10", None)];

const OLI_SR_BANDS: &[BandRow] = &[
    ("SR_B1", Some("A")),
    ("SR_B2", Some("B")),
    ("SR_B3", Some("G")),
    ("SR_B4", Some("R")),
    ("SR_B5", Some("N")),
    ("SR_B6", Some("S1")),
    ("SR_B7", Some("S2")),
];

const TM_SR_BANDS: &[BandRow] = &[
    ("SR_B1", Some("B")),
    ("SR_B2", Some("G")),
    ("SR_B3", Some("R")),
    ("SR_B4", Some("N")),
    ("SR_B5", Some("S1")),
    ("SR_B7", Some("S2")),
];

const MODIS_SR_BANDS: &[BandRow] = &[
    ("sur_refl_b01", Some("R")),
    ("sur_refl_b02", Some("N")),
    ("sur_refl_b03", Some("B")),
    ("sur_refl_b04", Some("G")),
    ("sur_refl_b05", None),
    ("sur_refl_b06", Some("S1")),
    ("sur_refl_b07", Some("S2")),
];

const L2_SR_SCALE: f64 = 0.0000275;
const L2_SR_OFFSET: f64 = -0.2;
const L2_ST_SCALE: f64 = 0.00341802;
const L2_ST_OFFSET: f64 = 149.0;

fn rows(table: &[BandRow], scale: f64, offset: f64) -> impl Iterator<Item = DatasetBand> + '_ {
    table.iter().map(move |&(band, variable)| DatasetBand {
        band: band.to_string(),
        scale,
        offset,
        variable: variable.map(str::to_string),
    })
}

fn thermal(band: &str) -> DatasetBand {
    DatasetBand {
        band: band.to_string(),
        scale: L2_ST_SCALE,
        offset: L2_ST_OFFSET,
        variable: Some("T".to_string()),
    }
}

pub(super) fn datasets() -> Vec<DatasetDescriptor> {
    let mut out = Vec::new();

    for id in ["COPERNICUS/S2_SR", "COPERNICUS/S2_SR_HARMONIZED"] {
        out.push(DatasetDescriptor {
            id: id.to_string(),
            bands: rows(S2_SR_BANDS, 0.0001, 0.0).collect(),
        });
    }
    for id in ["COPERNICUS/S2", "COPERNICUS/S2_HARMONIZED"] {
        let bands = rows(S2_SR_BANDS, 0.0001, 0.0).chain(rows(S2_TOA_EXTRA, 0.0001, 0.0)).collect();
        out.push(DatasetDescriptor { id: id.to_string(), bands });
    }
    for id in ["LANDSAT/LC08/C02/T1_L2", "LANDSAT/LC09/C02/T1_L2"] {
        let bands = rows(OLI_SR_BANDS, L2_SR_SCALE, L2_SR_OFFSET)
            .chain(std::iter::once(thermal("ST_B10")))
            .collect();
        out.push(DatasetDescriptor { id: id.to_string(), bands });
    }
    for id in ["LANDSAT/LE07/C02/T1_L2", "LANDSAT/LT05/C02/T1_L2", "LANDSAT/LT04/C02/T1_L2"] {
        let bands = rows(TM_SR_BANDS, L2_SR_SCALE, L2_SR_OFFSET)
            .chain(std::iter::once(thermal("ST_B6")))
            .collect();
        out.push(DatasetDescriptor { id: id.to_string(), bands });
    }
    for id in ["MODIS/061/MOD09GA", "MODIS/061/MYD09GA", "MODIS/061/MOD09A1", "MODIS/061/MYD09A1"] {
        out.push(DatasetDescriptor {
            id: id.to_string(),
            bands: rows(MODIS_SR_BANDS, 0.0001, 0.0).collect(),
        });
    }

    out
}

pub(super) fn indices() -> Result<Vec<IndexDefinition>> {
    INDICES
        .iter()
        .map(|r| {
            IndexDefinition::new(
                r.short_name,
                r.long_name,
                r.index_type,
                r.formula,
                r.bands.iter().map(|s| s.to_string()).collect(),
                r.reference,
                r.contributor,
                r.platforms.iter().map(|s| s.to_string()).collect(),
                r.date_of_addition,
            )
        })
        .collect()
}
