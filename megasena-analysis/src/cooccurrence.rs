use std::collections::HashMap;

use serde::Serialize;

use megasena_db::models::Draw;

/// Combinaison de K numéros (triés) sortis ensemble, avec son nombre d'apparitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination<const K: usize> {
    #[serde(with = "serde_numbers")]
    pub numbers: [u8; K],
    pub count: u32,
}

pub type PairRecord = Combination<2>;
pub type TripletRecord = Combination<3>;

/// Tous les sous-ensembles de taille K de `numbers`, dans l'ordre lexicographique des indices.
pub fn combinations<const K: usize>(numbers: &[u8]) -> Vec<[u8; K]> {
    let n = numbers.len();
    let mut out = Vec::new();
    if K == 0 || K > n {
        return out;
    }

    let mut idx: [usize; K] = std::array::from_fn(|i| i);
    loop {
        out.push(std::array::from_fn(|i| numbers[idx[i]]));

        let Some(i) = (0..K).rev().find(|&i| idx[i] < n - K + i) else {
            return out;
        };
        idx[i] += 1;
        for j in (i + 1)..K {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Compte chaque combinaison de K numéros sur la plage.
/// Tri : nombre décroissant, puis combinaison croissante.
pub fn combination_frequencies<const K: usize>(draws: &[Draw]) -> Vec<Combination<K>> {
    let mut counts: HashMap<[u8; K], u32> = HashMap::new();
    for draw in draws {
        for combo in combinations::<K>(&draw.sorted_numbers()) {
            *counts.entry(combo).or_insert(0) += 1;
        }
    }

    let mut records: Vec<Combination<K>> = counts
        .into_iter()
        .map(|(numbers, count)| Combination { numbers, count })
        .collect();
    records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.numbers.cmp(&b.numbers)));
    records
}

pub fn pair_frequencies(draws: &[Draw]) -> Vec<PairRecord> {
    combination_frequencies::<2>(draws)
}

pub fn triplet_frequencies(draws: &[Draw]) -> Vec<TripletRecord> {
    combination_frequencies::<3>(draws)
}

// serde ne dérive pas encore Serialize pour [T; K] générique
mod serde_numbers {
    use serde::Serializer;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer, const K: usize>(
        numbers: &[u8; K],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(K))?;
        for n in numbers {
            seq.serialize_element(n)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_db::models::make_test_draws;

    fn draw(contest: u32, numbers: [u8; 6]) -> Draw {
        Draw::new(contest, "2024-01-01", numbers).unwrap()
    }

    #[test]
    fn test_combinations_counts() {
        let numbers = [1, 2, 3, 4, 5, 6];
        assert_eq!(combinations::<2>(&numbers).len(), 15);
        assert_eq!(combinations::<3>(&numbers).len(), 20);
        assert_eq!(combinations::<6>(&numbers), vec![numbers]);
        assert!(combinations::<7>(&numbers).is_empty());
    }

    #[test]
    fn test_combinations_order() {
        let pairs = combinations::<2>(&[1, 2, 3]);
        assert_eq!(pairs, vec![[1, 2], [1, 3], [2, 3]]);
    }

    #[test]
    fn test_single_draw_gives_15_pairs_and_20_triplets() {
        let draws = vec![draw(1, [33, 4, 52, 5, 41, 30])];
        let pairs = pair_frequencies(&draws);
        let triplets = triplet_frequencies(&draws);
        assert_eq!(pairs.len(), 15);
        assert_eq!(triplets.len(), 20);
        assert!(pairs.iter().all(|p| p.count == 1 && p.numbers[0] < p.numbers[1]));
        assert!(triplets.iter().all(|t| t.count == 1));
        // à égalité, ordre croissant des combinaisons
        assert_eq!(pairs[0].numbers, [4, 5]);
        assert_eq!(pairs[14].numbers, [41, 52]);
    }

    #[test]
    fn test_counts_sorted_descending() {
        let draws = vec![
            draw(1, [1, 2, 3, 4, 5, 6]),
            draw(2, [1, 2, 7, 8, 9, 10]),
            draw(3, [1, 2, 3, 11, 12, 13]),
        ];
        let pairs = pair_frequencies(&draws);
        assert_eq!(pairs[0], Combination { numbers: [1, 2], count: 3 });
        assert_eq!(pairs[1].numbers, [1, 3]);
        assert_eq!(pairs[1].count, 2);
        assert!(pairs.windows(2).all(|w| w[0].count >= w[1].count));

        let triplets = triplet_frequencies(&draws);
        assert_eq!(triplets[0], Combination { numbers: [1, 2, 3], count: 2 });
    }

    #[test]
    fn test_pair_total_matches_draws() {
        let draws = make_test_draws(40);
        let total: u32 = pair_frequencies(&draws).iter().map(|p| p.count).sum();
        assert_eq!(total, 15 * 40);
    }

    #[test]
    fn test_deterministic_order() {
        let draws = make_test_draws(25);
        assert_eq!(triplet_frequencies(&draws), triplet_frequencies(&draws));
    }

    #[test]
    fn test_empty_range() {
        assert!(pair_frequencies(&[]).is_empty());
        assert!(triplet_frequencies(&[]).is_empty());
    }
}
