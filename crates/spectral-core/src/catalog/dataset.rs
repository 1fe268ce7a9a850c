use serde::{Deserialize, Serialize};

/// Linear transform from a stored value to physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleOffset {
    pub scale: f64,
    pub offset: f64,
}

impl ScaleOffset {
    pub const IDENTITY: ScaleOffset = ScaleOffset { scale: 1.0, offset: 0.0 };

    #[inline]
    pub fn apply(self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

/// One band of a dataset: its scale/offset and, when it measures a catalog
/// variable, that variable's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBand {
    pub band: String,
    pub scale: f64,
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl DatasetBand {
    pub fn scale_offset(&self) -> ScaleOffset {
        ScaleOffset { scale: self.scale, offset: self.offset }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub id: String,
    pub bands: Vec<DatasetBand>,
}

impl DatasetDescriptor {
    pub fn band(&self, name: &str) -> Option<&DatasetBand> {
        self.bands.iter().find(|b| b.band == name)
    }
}
