//! Générateurs de grilles à partir de la table fréquence/retard.
//!
//! Tous renvoient `k` numéros distincts, triés par ordre croissant. Seule la
//! stratégie `RandomSmart` consomme de l'aléa ; elle accepte un seed pour la
//! reproductibilité.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use megasena_db::error::{Error, Result};

use crate::cycles::{classify, very_hot_numbers};
use crate::frequency::FrequencyRecord;

/// Taille du pool dans lequel `RandomSmart` tire ses numéros.
pub const RANDOM_POOL_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// 1.5 × fréquence + 0.5 × retard
    Optimized,
    /// Les plus fréquents
    Hot,
    /// Les plus en retard
    Overdue,
    /// Moitié fréquents, moitié en retard
    Balanced,
    /// Tirage uniforme dans le top 20 (0.7 × fréquence + 0.3 × retard)
    RandomSmart,
    /// Numéros très chauds, complétés par les plus fréquents
    VeryHot,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Optimized,
        Strategy::Hot,
        Strategy::Overdue,
        Strategy::Balanced,
        Strategy::RandomSmart,
        Strategy::VeryHot,
    ];

    pub fn is_random(&self) -> bool {
        matches!(self, Strategy::RandomSmart)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Optimized => write!(f, "Optimisée"),
            Strategy::Hot => write!(f, "Chauds"),
            Strategy::Overdue => write!(f, "En retard"),
            Strategy::Balanced => write!(f, "Équilibrée"),
            Strategy::RandomSmart => write!(f, "Aléatoire intelligente"),
            Strategy::VeryHot => write!(f, "Très chauds"),
        }
    }
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

pub fn generate(
    strategy: Strategy,
    k: usize,
    table: &[FrequencyRecord],
    seed: Option<u64>,
) -> Result<Vec<u8>> {
    let mut rng = make_rng(seed);
    generate_with_rng(strategy, k, table, &mut rng)
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    strategy: Strategy,
    k: usize,
    table: &[FrequencyRecord],
    rng: &mut R,
) -> Result<Vec<u8>> {
    match strategy {
        Strategy::Optimized => optimized(table, k),
        Strategy::Hot => hot(table, k),
        Strategy::Overdue => overdue(table, k),
        Strategy::Balanced => balanced(table, k),
        Strategy::RandomSmart => random_smart(table, k, rng),
        Strategy::VeryHot => very_hot(table, k),
    }
}

fn ensure_pool(requested: usize, available: usize) -> Result<()> {
    if requested == 0 || requested > available {
        return Err(Error::InsufficientPool {
            requested,
            available,
        });
    }
    Ok(())
}

/// Numéros de la table triés par score décroissant. Tri stable : à égalité,
/// l'ordre de la table est conservé.
fn ranked_by<F>(table: &[FrequencyRecord], score: F) -> Vec<u8>
where
    F: Fn(&FrequencyRecord) -> f64,
{
    let mut order: Vec<&FrequencyRecord> = table.iter().collect();
    order.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
    order.iter().map(|r| r.number).collect()
}

fn top_sorted(mut ranked: Vec<u8>, k: usize) -> Vec<u8> {
    ranked.truncate(k);
    ranked.sort_unstable();
    ranked
}

pub fn optimized(table: &[FrequencyRecord], k: usize) -> Result<Vec<u8>> {
    ensure_pool(k, table.len())?;
    let ranked = ranked_by(table, |r| 1.5 * r.vezes as f64 + 0.5 * r.atraso as f64);
    Ok(top_sorted(ranked, k))
}

pub fn hot(table: &[FrequencyRecord], k: usize) -> Result<Vec<u8>> {
    ensure_pool(k, table.len())?;
    Ok(top_sorted(ranked_by(table, |r| r.vezes as f64), k))
}

pub fn overdue(table: &[FrequencyRecord], k: usize) -> Result<Vec<u8>> {
    ensure_pool(k, table.len())?;
    Ok(top_sorted(ranked_by(table, |r| r.atraso as f64), k))
}

/// ⌊k/2⌋ chauds + ⌈k/2⌉ en retard ; les doublons sont comblés dans l'ordre de la table.
pub fn balanced(table: &[FrequencyRecord], k: usize) -> Result<Vec<u8>> {
    ensure_pool(k, table.len())?;
    let half = k / 2;

    let hot_top = ranked_by(table, |r| r.vezes as f64);
    let overdue_top = ranked_by(table, |r| r.atraso as f64);

    let mut selected: Vec<u8> = Vec::with_capacity(k);
    for &n in hot_top.iter().take(half).chain(overdue_top.iter().take(k - half)) {
        if !selected.contains(&n) {
            selected.push(n);
        }
    }

    for record in table {
        if selected.len() >= k {
            break;
        }
        if !selected.contains(&record.number) {
            selected.push(record.number);
        }
    }

    Ok(top_sorted(selected, k))
}

/// Les `RANDOM_POOL_SIZE` meilleurs numéros selon 0.7 × fréquence + 0.3 × retard.
pub fn random_smart_pool(table: &[FrequencyRecord]) -> Vec<u8> {
    let mut pool = ranked_by(table, |r| 0.7 * r.vezes as f64 + 0.3 * r.atraso as f64);
    pool.truncate(RANDOM_POOL_SIZE);
    pool
}

pub fn random_smart<R: Rng + ?Sized>(
    table: &[FrequencyRecord],
    k: usize,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let pool = random_smart_pool(table);
    ensure_pool(k, pool.len())?;

    let mut picked: Vec<u8> = rand::seq::index::sample(rng, pool.len(), k)
        .into_iter()
        .map(|i| pool[i])
        .collect();
    picked.sort_unstable();
    Ok(picked)
}

/// Numéros très chauds (fréquence ≥ moyenne et retard ≤ moyenne) par fréquence
/// décroissante, complétés par les plus fréquents restants.
pub fn very_hot(table: &[FrequencyRecord], k: usize) -> Result<Vec<u8>> {
    ensure_pool(k, table.len())?;

    let mut selected = very_hot_numbers(&classify(table));
    if selected.len() < k {
        for n in ranked_by(table, |r| r.vezes as f64) {
            if selected.len() >= k {
                break;
            }
            if !selected.contains(&n) {
                selected.push(n);
            }
        }
    }

    Ok(top_sorted(selected, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{frequency_table, sample_repository};

    fn sample_table() -> Vec<FrequencyRecord> {
        let repo = sample_repository();
        frequency_table(repo.draws(), &repo)
    }

    fn flat_table(overrides: &[(u8, u32, u32)]) -> Vec<FrequencyRecord> {
        (1..=60u8)
            .map(|number| {
                let (vezes, atraso) = overrides
                    .iter()
                    .find(|(n, _, _)| *n == number)
                    .map(|&(_, v, a)| (v, a))
                    .unwrap_or((0, 0));
                FrequencyRecord { number, vezes, atraso }
            })
            .collect()
    }

    fn assert_valid(game: &[u8], k: usize) {
        assert_eq!(game.len(), k);
        assert!(game.windows(2).all(|w| w[0] < w[1]), "non trié ou doublon : {:?}", game);
        assert!(game.iter().all(|&n| (1..=60).contains(&n)));
    }

    #[test]
    fn test_hot() {
        assert_eq!(hot(&sample_table(), 6).unwrap(), vec![1, 2, 3, 4, 5, 7]);
    }

    #[test]
    fn test_overdue() {
        assert_eq!(overdue(&sample_table(), 6).unwrap(), vec![15, 16, 17, 18, 19, 20]);
    }

    #[test]
    fn test_optimized() {
        // scores : 1 → 4.5, 2 et 7 → 3.0, 3..6 → 2.5
        assert_eq!(optimized(&sample_table(), 6).unwrap(), vec![1, 2, 3, 4, 5, 7]);

        let table = flat_table(&[(10, 0, 20), (20, 5, 0)]);
        // 10 → 10.0, 20 → 7.5
        assert_eq!(optimized(&table, 2).unwrap(), vec![10, 20]);
    }

    #[test]
    fn test_balanced_halves() {
        assert_eq!(balanced(&sample_table(), 6).unwrap(), vec![1, 2, 7, 15, 16, 17]);
        // k impair : 3 chauds + 4 en retard
        assert_eq!(balanced(&sample_table(), 7).unwrap(), vec![1, 2, 7, 15, 16, 17, 18]);
    }

    #[test]
    fn test_balanced_backfills_in_table_order() {
        // le 1 est à la fois le plus fréquent et le plus en retard
        let table = flat_table(&[(1, 10, 10), (2, 9, 0), (3, 0, 9)]);
        assert_eq!(balanced(&table, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_balanced_always_k_distinct() {
        let table = sample_table();
        for k in 1..=60 {
            assert_valid(&balanced(&table, k).unwrap(), k);
        }
        let overlapping = flat_table(&[(1, 10, 10), (2, 9, 9), (3, 8, 8)]);
        for k in 1..=60 {
            assert_valid(&balanced(&overlapping, k).unwrap(), k);
        }
    }

    #[test]
    fn test_insufficient_pool() {
        let table = sample_table();
        for strategy in Strategy::ALL {
            let err = generate(strategy, 61, &table, Some(1)).unwrap_err();
            assert!(matches!(err, Error::InsufficientPool { requested: 61, .. }), "{strategy}");
        }
        assert!(matches!(
            generate(Strategy::RandomSmart, 21, &table, Some(1)),
            Err(Error::InsufficientPool { requested: 21, available: 20 })
        ));
        assert!(matches!(
            generate(Strategy::Hot, 0, &table, None),
            Err(Error::InsufficientPool { requested: 0, .. })
        ));
    }

    #[test]
    fn test_random_smart_pool() {
        let pool = random_smart_pool(&sample_table());
        assert_eq!(pool.len(), RANDOM_POOL_SIZE);
        let mut sorted = pool.clone();
        sorted.sort_unstable();
        let expected: Vec<u8> = (1..=11).chain(15..=23).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_random_smart_seed_determinism() {
        let table = sample_table();
        let a = generate(Strategy::RandomSmart, 6, &table, Some(123)).unwrap();
        let b = generate(Strategy::RandomSmart, 6, &table, Some(123)).unwrap();
        assert_eq!(a, b);
        assert_valid(&a, 6);
    }

    #[test]
    fn test_random_smart_stays_in_pool() {
        let table = sample_table();
        let pool = random_smart_pool(&table);
        for _ in 0..200 {
            let game = generate(Strategy::RandomSmart, 10, &table, None).unwrap();
            assert_valid(&game, 10);
            assert!(game.iter().all(|n| pool.contains(n)), "{:?} hors du pool", game);
        }
    }

    #[test]
    fn test_random_smart_whole_pool() {
        let table = sample_table();
        let mut pool = random_smart_pool(&table);
        pool.sort_unstable();
        assert_eq!(generate(Strategy::RandomSmart, 20, &table, Some(7)).unwrap(), pool);
    }

    #[test]
    fn test_very_hot() {
        let table = sample_table();
        assert_eq!(very_hot(&table, 6).unwrap(), vec![1, 2, 3, 4, 5, 7]);
        // 14 numéros très chauds, complétés par 15 et 16
        let game = very_hot(&table, 16).unwrap();
        assert_valid(&game, 16);
        assert!(game.contains(&15) && game.contains(&16));
    }

    #[test]
    fn test_deterministic_strategies_ignore_seed() {
        let table = sample_table();
        for strategy in Strategy::ALL.into_iter().filter(|s| !s.is_random()) {
            assert_eq!(
                generate(strategy, 8, &table, Some(1)).unwrap(),
                generate(strategy, 8, &table, Some(2)).unwrap()
            );
        }
    }
}
