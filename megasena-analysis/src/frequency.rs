use serde::Serialize;

use megasena_db::models::{Draw, POOL_SIZE};
use megasena_db::repository::DrawRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRecord {
    pub number: u8,
    /// Occurrences dans la plage analysée.
    pub vezes: u32,
    /// Retard sur l'historique complet, pas sur la plage.
    pub atraso: u32,
}

/// Une ligne par numéro 1..=60, par ordre croissant de numéro.
///
/// `draws` est la plage analysée ; le retard est toujours mesuré contre le
/// dernier concours de `repository`, pour refléter la récence réelle même
/// quand la plage s'arrête dans le passé.
pub fn frequency_table(draws: &[Draw], repository: &DrawRepository) -> Vec<FrequencyRecord> {
    let mut counts = vec![0u32; POOL_SIZE];
    for draw in draws {
        for &n in &draw.numbers {
            if let Some(count) = (n as usize).checked_sub(1).and_then(|i| counts.get_mut(i)) {
                *count += 1;
            }
        }
    }

    (1..=POOL_SIZE as u8)
        .map(|number| FrequencyRecord {
            number,
            vezes: counts[(number - 1) as usize],
            atraso: repository.delay(number),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencySummary {
    pub draws: usize,
    /// 6 × nombre de tirages
    pub total_numbers: usize,
    pub distinct_numbers: usize,
    pub mean_frequency: f64,
    pub mean_delay: f64,
}

pub fn summarize(table: &[FrequencyRecord], draws: usize) -> FrequencySummary {
    let n = table.len().max(1) as f64;
    FrequencySummary {
        draws,
        total_numbers: table.iter().map(|r| r.vezes as usize).sum(),
        distinct_numbers: table.iter().filter(|r| r.vezes > 0).count(),
        mean_frequency: table.iter().map(|r| r.vezes as f64).sum::<f64>() / n,
        mean_delay: table.iter().map(|r| r.atraso as f64).sum::<f64>() / n,
    }
}

/// Copie de la table triée par fréquence décroissante (ordre stable à égalité).
pub fn by_frequency(table: &[FrequencyRecord]) -> Vec<FrequencyRecord> {
    let mut sorted = table.to_vec();
    sorted.sort_by(|a, b| b.vezes.cmp(&a.vezes));
    sorted
}

/// Copie de la table triée par retard décroissant (ordre stable à égalité).
pub fn by_delay(table: &[FrequencyRecord]) -> Vec<FrequencyRecord> {
    let mut sorted = table.to_vec();
    sorted.sort_by(|a, b| b.atraso.cmp(&a.atraso));
    sorted
}

#[cfg(test)]
pub(crate) fn sample_repository() -> DrawRepository {
    DrawRepository::new(vec![
        Draw::new(1, "2024-01-01", [1, 2, 3, 4, 5, 6]).unwrap(),
        Draw::new(2, "2024-01-04", [1, 7, 8, 9, 10, 11]).unwrap(),
        Draw::new(3, "2024-01-08", [1, 2, 7, 12, 13, 14]).unwrap(),
    ])
    .unwrap()
}
