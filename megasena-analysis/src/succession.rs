use serde::Serialize;

use megasena_db::models::Draw;
use megasena_db::repository::DrawRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessionRecord {
    pub number: u8,
    /// Nombre de tirages suivants contenant ce numéro.
    pub count: u32,
    /// count / tirages suivants retenus, en pourcentage.
    pub percentage: f64,
    /// Retard sur l'historique complet.
    pub delay: u32,
}

/// Numéros qui sortent dans le tirage suivant (concours + 1) ceux de la plage
/// contenant `reference`. Le tirage suivant est cherché dans tout l'historique ;
/// s'il n'existe pas, l'occurrence ne compte pas.
///
/// Tri par nombre décroissant ; à égalité, l'ordre de découverte est conservé.
pub fn succession(
    draws: &[Draw],
    repository: &DrawRepository,
    reference: u8,
    top_n: usize,
) -> Vec<SuccessionRecord> {
    let followers: Vec<&Draw> = draws
        .iter()
        .filter(|d| d.contains(reference))
        .filter_map(|d| d.contest.checked_add(1).and_then(|next| repository.get(next)))
        .collect();

    if followers.is_empty() {
        return Vec::new();
    }

    // (numéro, nombre) dans l'ordre de première apparition
    let mut counts: Vec<(u8, u32)> = Vec::new();
    for draw in &followers {
        for &n in &draw.numbers {
            match counts.iter_mut().find(|(number, _)| *number == n) {
                Some((_, count)) => *count += 1,
                None => counts.push((n, 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = followers.len() as f64;
    counts
        .into_iter()
        .take(top_n)
        .map(|(number, count)| SuccessionRecord {
            number,
            count,
            percentage: count as f64 / total * 100.0,
            delay: repository.delay(number),
        })
        .collect()
}

/// Succession de chaque numéro du dernier tirage de la plage, par numéro croissant.
pub fn succession_for_last_draw(
    draws: &[Draw],
    repository: &DrawRepository,
    top_n: usize,
) -> Vec<(u8, Vec<SuccessionRecord>)> {
    let Some(last) = draws.last() else {
        return Vec::new();
    };
    last.sorted_numbers()
        .iter()
        .map(|&n| (n, succession(draws, repository, n, top_n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::sample_repository;
    use megasena_db::repository::DrawRange;

    #[test]
    fn test_followers_of_one() {
        let repo = sample_repository();
        let table = succession(repo.draws(), &repo, 1, 15);

        // le 1 sort aux concours 1, 2, 3 ; seuls 2 et 3 ont un suivant
        // suivants : {1,7,8,9,10,11} et {1,2,7,12,13,14}
        assert_eq!(table[0].number, 1);
        assert_eq!(table[0].count, 2);
        assert!((table[0].percentage - 100.0).abs() < 1e-10);
        assert_eq!(table[1].number, 7);
        assert_eq!(table[1].count, 2);
        // puis l'ordre de découverte : 8, 9, 10, 11, 2, 12...
        let rest: Vec<u8> = table[2..].iter().map(|r| r.number).collect();
        assert_eq!(rest, vec![8, 9, 10, 11, 2, 12, 13, 14]);
        assert!((table[2].percentage - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_follower_delay_from_full_history() {
        let repo = sample_repository();
        let table = succession(repo.range(DrawRange::new(1, 1)), &repo, 3, 15);
        // concours 2 suit le 1 ; le 8 n'est plus sorti depuis
        let eight = table.iter().find(|r| r.number == 8).unwrap();
        assert_eq!(eight.delay, 1);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn test_top_n_truncates() {
        let repo = sample_repository();
        assert_eq!(succession(repo.draws(), &repo, 1, 3).len(), 3);
        assert!(succession(repo.draws(), &repo, 1, 0).is_empty());
    }

    #[test]
    fn test_latest_draw_has_no_follower() {
        let repo = sample_repository();
        let latest = repo.range(DrawRange::new(3, 3));
        for n in latest[0].numbers {
            assert!(succession(latest, &repo, n, 15).is_empty());
        }
    }

    #[test]
    fn test_gap_in_numbering_contributes_nothing() {
        let repo = DrawRepository::new(vec![
            Draw::new(10, "a", [1, 2, 3, 4, 5, 6]).unwrap(),
            Draw::new(12, "b", [7, 8, 9, 10, 11, 12]).unwrap(),
        ])
        .unwrap();
        assert!(succession(repo.draws(), &repo, 1, 15).is_empty());
    }

    #[test]
    fn test_absent_reference() {
        let repo = sample_repository();
        assert!(succession(repo.draws(), &repo, 60, 15).is_empty());
    }

    #[test]
    fn test_for_last_draw() {
        let repo = sample_repository();
        let panels = succession_for_last_draw(repo.range(DrawRange::new(1, 2)), &repo, 6);
        let refs: Vec<u8> = panels.iter().map(|(n, _)| *n).collect();
        assert_eq!(refs, vec![1, 7, 8, 9, 10, 11]);
        // le 7 (concours 2) est suivi par le concours 3
        assert_eq!(panels[1].1.len(), 6);
        assert!(succession_for_last_draw(&[], &repo, 6).is_empty());
    }
}
