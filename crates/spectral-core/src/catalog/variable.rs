use serde::{Deserialize, Serialize};

/// What a formula variable stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariableKind {
    /// Surface reflectance (or brightness temperature) over a wavelength
    /// range in nanometres.
    Band {
        common_name: String,
        min_wavelength: f64,
        max_wavelength: f64,
    },
    /// SAR backscatter for one polarisation.
    Backscatter { polarization: String },
    /// Tunable parameter with a published default.
    Constant { default: f64 },
    /// Precomputed kernel value `k(left, right)` of two band variables, as
    /// used by the kernel indices (kNDVI and friends).
    Kernel { left: String, right: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: VariableKind,
}

impl VariableDescriptor {
    pub fn band(
        name: &str,
        description: &str,
        common_name: &str,
        min_nm: f64,
        max_nm: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: VariableKind::Band {
                common_name: common_name.to_string(),
                min_wavelength: min_nm,
                max_wavelength: max_nm,
            },
        }
    }

    pub fn backscatter(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: VariableKind::Backscatter { polarization: name.to_string() },
        }
    }

    pub fn constant(name: &str, description: &str, default: f64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: VariableKind::Constant { default },
        }
    }

    /// `k{left}{right}`, e.g. `kNR` for the kernel of N and R.
    pub fn kernel(left: &str, right: &str) -> Self {
        Self {
            name: format!("k{left}{right}"),
            description: format!("Kernel of {left} and {right}"),
            kind: VariableKind::Kernel { left: left.to_string(), right: right.to_string() },
        }
    }

    /// Default value for constants, None for measured quantities.
    pub fn default_value(&self) -> Option<f64> {
        match self.kind {
            VariableKind::Constant { default } => Some(default),
            _ => None,
        }
    }
}
