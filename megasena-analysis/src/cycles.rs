use serde::Serialize;

use crate::frequency::{FrequencyRecord, summarize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleClass {
    VeryHot,
    Hot,
    Cold,
    Neutral,
}

impl std::fmt::Display for CycleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleClass::VeryHot => write!(f, "TRÈS CHAUD"),
            CycleClass::Hot => write!(f, "CHAUD"),
            CycleClass::Cold => write!(f, "FROID"),
            CycleClass::Neutral => write!(f, "NEUTRE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    pub number: u8,
    pub vezes: u32,
    pub atraso: u32,
    pub class: CycleClass,
}

/// Classe chaque numéro par rapport à la fréquence moyenne et au retard moyen de la table.
pub fn classify(table: &[FrequencyRecord]) -> Vec<CycleRecord> {
    let summary = summarize(table, 0);
    let (mean_freq, mean_delay) = (summary.mean_frequency, summary.mean_delay);

    table
        .iter()
        .map(|r| {
            let frequent = r.vezes as f64 >= mean_freq;
            let class = if frequent && r.atraso as f64 <= mean_delay {
                CycleClass::VeryHot
            } else if frequent {
                CycleClass::Hot
            } else if r.atraso as f64 >= mean_delay {
                CycleClass::Cold
            } else {
                CycleClass::Neutral
            };
            CycleRecord {
                number: r.number,
                vezes: r.vezes,
                atraso: r.atraso,
                class,
            }
        })
        .collect()
}

/// Numéros très chauds ou chauds, par fréquence décroissante.
pub fn hot_numbers(cycles: &[CycleRecord], limit: usize) -> Vec<CycleRecord> {
    let mut hot: Vec<CycleRecord> = cycles
        .iter()
        .filter(|c| matches!(c.class, CycleClass::VeryHot | CycleClass::Hot))
        .cloned()
        .collect();
    hot.sort_by(|a, b| b.vezes.cmp(&a.vezes));
    hot.truncate(limit);
    hot
}

/// Numéros froids, par retard décroissant.
pub fn cold_numbers(cycles: &[CycleRecord], limit: usize) -> Vec<CycleRecord> {
    let mut cold: Vec<CycleRecord> = cycles
        .iter()
        .filter(|c| c.class == CycleClass::Cold)
        .cloned()
        .collect();
    cold.sort_by(|a, b| b.atraso.cmp(&a.atraso));
    cold.truncate(limit);
    cold
}

/// Numéros très chauds, par fréquence décroissante.
pub fn very_hot_numbers(cycles: &[CycleRecord]) -> Vec<u8> {
    let mut very_hot: Vec<&CycleRecord> = cycles
        .iter()
        .filter(|c| c.class == CycleClass::VeryHot)
        .collect();
    very_hot.sort_by(|a, b| b.vezes.cmp(&a.vezes));
    very_hot.iter().map(|c| c.number).collect()
}
