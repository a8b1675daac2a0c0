use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Draw, POOL_SIZE};

/// Plage inclusive de concours `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawRange {
    pub start: u32,
    pub end: u32,
}

impl DrawRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for DrawRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} à #{}", self.start, self.end)
    }
}

/// Historique des tirages, trié par concours croissant, en lecture seule après chargement.
#[derive(Debug, Clone)]
pub struct DrawRepository {
    draws: Vec<Draw>,
    positions: HashMap<u32, usize>,
    /// index[n - 1] = concours (croissants) contenant le numéro n
    index: Vec<Vec<u32>>,
}

impl DrawRepository {
    pub fn new(mut draws: Vec<Draw>) -> Result<Self> {
        draws.sort_by_key(|d| d.contest);

        let mut positions = HashMap::with_capacity(draws.len());
        let mut index = vec![Vec::new(); POOL_SIZE];

        for (i, draw) in draws.iter().enumerate() {
            if positions.insert(draw.contest, i).is_some() {
                return Err(Error::data_load(format!(
                    "concours {} présent plusieurs fois",
                    draw.contest
                )));
            }
            for &n in &draw.numbers {
                if let Some(contests) = (n as usize).checked_sub(1).and_then(|i| index.get_mut(i)) {
                    contests.push(draw.contest);
                }
            }
        }

        Ok(Self {
            draws,
            positions,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn first_contest(&self) -> Option<u32> {
        self.draws.first().map(|d| d.contest)
    }

    pub fn latest_contest(&self) -> Option<u32> {
        self.draws.last().map(|d| d.contest)
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }

    pub fn get(&self, contest: u32) -> Option<&Draw> {
        self.positions.get(&contest).map(|&i| &self.draws[i])
    }

    /// Concours contenant `number`, par ordre croissant.
    pub fn contests_with(&self, number: u8) -> &[u32] {
        match (number as usize).checked_sub(1) {
            Some(idx) if idx < POOL_SIZE => self.index[idx].as_slice(),
            _ => &[],
        }
    }

    pub fn last_seen(&self, number: u8) -> Option<u32> {
        self.contests_with(number).last().copied()
    }

    /// Retard d'un numéro mesuré sur tout l'historique : dernier concours connu
    /// moins le dernier concours où le numéro est sorti. Un numéro jamais sorti
    /// prend le nombre total de tirages.
    pub fn delay(&self, number: u8) -> u32 {
        match (self.latest_contest(), self.last_seen(number)) {
            (Some(latest), Some(seen)) => latest - seen,
            _ => self.draws.len() as u32,
        }
    }

    /// Tirages dont le concours est dans `range`. Une plage inversée donne une tranche vide.
    pub fn range(&self, range: DrawRange) -> &[Draw] {
        if range.start > range.end {
            return &[];
        }
        let lo = self.draws.partition_point(|d| d.contest < range.start);
        let hi = self.draws.partition_point(|d| d.contest <= range.end);
        &self.draws[lo..hi]
    }

    /// Rejette les bornes inversées ou hors de l'historique.
    pub fn validate_range(&self, range: DrawRange) -> Result<DrawRange> {
        let (min, max) = match (self.first_contest(), self.latest_contest()) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(Error::InvalidRange {
                    start: range.start,
                    end: range.end,
                    min: 0,
                    max: 0,
                })
            }
        };
        if range.start > range.end || range.start < min || range.end > max {
            return Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
                min,
                max,
            });
        }
        Ok(range)
    }

    /// Plage par défaut : les `window` derniers concours jusqu'au plus récent.
    pub fn default_range(&self, window: u32) -> Option<DrawRange> {
        let min = self.first_contest()?;
        let max = self.latest_contest()?;
        Some(DrawRange::new(min.max(max.saturating_sub(window)), max))
    }

    /// Plage couvrant tout l'historique.
    pub fn full_range(&self) -> Option<DrawRange> {
        Some(DrawRange::new(self.first_contest()?, self.latest_contest()?))
    }
}
