use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use megasena_db::error::{Error, Result};
use megasena_db::models::{Draw, POOL_SIZE};
use megasena_db::repository::{DrawRange, DrawRepository};

use crate::cooccurrence::{pair_frequencies, triplet_frequencies, PairRecord, TripletRecord};
use crate::frequency::{frequency_table, summarize, FrequencyRecord, FrequencySummary};
use crate::patterns::{summarize_patterns, PatternSummary};
use crate::succession::{succession, succession_for_last_draw, SuccessionRecord};

pub use crate::generators::{generate, Strategy};

/// Résultat complet d'une analyse sur une plage.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub range: DrawRange,
    pub draws: usize,
    pub frequencies: Vec<FrequencyRecord>,
    pub pairs: Vec<PairRecord>,
    pub triplets: Vec<TripletRecord>,
    /// `None` si la plage ne contient aucun tirage.
    pub patterns: Option<PatternSummary>,
}

impl Analysis {
    pub fn summary(&self) -> FrequencySummary {
        summarize(&self.frequencies, self.draws)
    }
}

/// Point d'entrée des analyses. Les résultats de `analyze` sont gardés par plage :
/// une plage déjà vue n'est pas recalculée.
pub struct AnalysisEngine<'a> {
    repository: &'a DrawRepository,
    cache: RefCell<HashMap<DrawRange, Rc<Analysis>>>,
}

impl<'a> AnalysisEngine<'a> {
    pub fn new(repository: &'a DrawRepository) -> Self {
        Self {
            repository,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &'a DrawRepository {
        self.repository
    }

    /// Tirages de la plage, après validation des bornes.
    pub fn draws(&self, range: DrawRange) -> Result<&'a [Draw]> {
        let range = self.repository.validate_range(range)?;
        Ok(self.repository.range(range))
    }

    pub fn analyze(&self, range: DrawRange) -> Result<Rc<Analysis>> {
        let range = self.repository.validate_range(range)?;

        if let Some(cached) = self.cache.borrow().get(&range) {
            debug!(%range, "analyse servie depuis le cache");
            return Ok(Rc::clone(cached));
        }

        let draws = self.repository.range(range);
        debug!(%range, draws = draws.len(), "analyse de la plage");

        let analysis = Rc::new(Analysis {
            range,
            draws: draws.len(),
            frequencies: frequency_table(draws, self.repository),
            pairs: pair_frequencies(draws),
            triplets: triplet_frequencies(draws),
            patterns: summarize_patterns(draws),
        });

        self.cache.borrow_mut().insert(range, Rc::clone(&analysis));
        Ok(analysis)
    }

    /// Moyennes pair/impair/premier/somme ; une plage sans tirage est une erreur.
    pub fn patterns(&self, range: DrawRange) -> Result<PatternSummary> {
        let analysis = self.analyze(range)?;
        analysis.patterns.clone().ok_or(Error::EmptyRange {
            start: range.start,
            end: range.end,
        })
    }

    pub fn succession(
        &self,
        number: u8,
        range: DrawRange,
        top_n: usize,
    ) -> Result<Vec<SuccessionRecord>> {
        if number == 0 || number as usize > POOL_SIZE {
            return Err(Error::invalid_draw(format!(
                "numéro {} hors de 1..={}",
                number, POOL_SIZE
            )));
        }
        let draws = self.draws(range)?;
        debug!(number, %range, top_n, "succession");
        Ok(succession(draws, self.repository, number, top_n))
    }

    pub fn succession_for_last_draw(
        &self,
        range: DrawRange,
        top_n: usize,
    ) -> Result<Vec<(u8, Vec<SuccessionRecord>)>> {
        let draws = self.draws(range)?;
        Ok(succession_for_last_draw(draws, self.repository, top_n))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::sample_repository;
    use megasena_db::models::make_test_draws;

    #[test]
    fn test_analyze_sample() {
        let repo = sample_repository();
        let engine = AnalysisEngine::new(&repo);
        let analysis = engine.analyze(DrawRange::new(1, 3)).unwrap();

        assert_eq!(analysis.draws, 3);
        assert_eq!(analysis.frequencies.len(), 60);
        assert_eq!(analysis.frequencies[0].vezes, 3);
        assert_eq!(analysis.pairs[0].numbers, [1, 2]);
        assert_eq!(analysis.pairs[0].count, 2);
        assert!(analysis.patterns.is_some());
        assert_eq!(analysis.summary().total_numbers, 18);
    }

    #[test]
    fn test_invalid_range_rejected_before_dispatch() {
        let repo = sample_repository();
        let engine = AnalysisEngine::new(&repo);
        assert!(matches!(
            engine.analyze(DrawRange::new(3, 1)),
            Err(Error::InvalidRange { .. })
        ));
        assert!(engine.analyze(DrawRange::new(1, 4)).is_err());
        assert!(engine.succession(1, DrawRange::new(0, 2), 15).is_err());
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_repeated_query_hits_cache() {
        let repo = DrawRepository::new(make_test_draws(50)).unwrap();
        let engine = AnalysisEngine::new(&repo);

        let first = engine.analyze(DrawRange::new(10, 40)).unwrap();
        let second = engine.analyze(DrawRange::new(10, 40)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(engine.cache_len(), 1);

        let other = engine.analyze(DrawRange::new(10, 41)).unwrap();
        assert!(!Rc::ptr_eq(&first, &other));
        assert_eq!(engine.cache_len(), 2);
    }

    #[test]
    fn test_patterns_on_empty_range() {
        let repo = DrawRepository::new(vec![
            Draw::new(10, "a", [1, 2, 3, 4, 5, 6]).unwrap(),
            Draw::new(12, "b", [7, 8, 9, 10, 11, 12]).unwrap(),
        ])
        .unwrap();
        let engine = AnalysisEngine::new(&repo);

        let analysis = engine.analyze(DrawRange::new(11, 11)).unwrap();
        assert_eq!(analysis.draws, 0);
        assert!(analysis.pairs.is_empty());
        assert!(matches!(
            engine.patterns(DrawRange::new(11, 11)),
            Err(Error::EmptyRange { start: 11, end: 11 })
        ));
        assert!(engine.patterns(DrawRange::new(10, 12)).is_ok());
    }

    #[test]
    fn test_succession_validates_number() {
        let repo = sample_repository();
        let engine = AnalysisEngine::new(&repo);
        assert!(matches!(
            engine.succession(0, DrawRange::new(1, 3), 15),
            Err(Error::InvalidDraw(_))
        ));
        assert!(engine.succession(61, DrawRange::new(1, 3), 15).is_err());
        assert_eq!(engine.succession(1, DrawRange::new(1, 3), 15).unwrap()[0].number, 1);
        assert!(engine.succession(14, DrawRange::new(3, 3), 15).unwrap().is_empty());
    }

    #[test]
    fn test_generate_from_analysis() {
        let repo = sample_repository();
        let engine = AnalysisEngine::new(&repo);
        let analysis = engine.analyze(DrawRange::new(1, 3)).unwrap();
        let game = generate(Strategy::Hot, 6, &analysis.frequencies, None).unwrap();
        assert_eq!(game, vec![1, 2, 3, 4, 5, 7]);
    }
}
