use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page width per figure number, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRules {
    pub widths_mm: BTreeMap<u32, f64>,
    pub default_mm: f64,
}

impl Default for SizeRules {
    fn default() -> Self {
        let widths_mm = [(1, 150.0), (2, 83.0), (3, 90.0), (4, 90.0), (5, 90.0), (6, 90.0)]
            .into_iter()
            .collect();
        Self {
            widths_mm,
            default_mm: 80.0,
        }
    }
}

impl SizeRules {
    pub fn width_for(&self, number: u32) -> f64 {
        self.widths_mm.get(&number).copied().unwrap_or(self.default_mm)
    }
}
