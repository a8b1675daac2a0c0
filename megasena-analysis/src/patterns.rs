use serde::Serialize;

use megasena_db::models::Draw;

pub fn is_prime(n: u8) -> bool {
    if n < 2 {
        return false;
    }
    let n = n as u32;
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawPattern {
    pub even: u32,
    pub odd: u32,
    pub prime: u32,
    pub sum: u32,
}

pub fn classify_draw(draw: &Draw) -> DrawPattern {
    let even = draw.numbers.iter().filter(|&&n| n % 2 == 0).count() as u32;
    DrawPattern {
        even,
        odd: draw.numbers.len() as u32 - even,
        prime: draw.numbers.iter().filter(|&&n| is_prime(n)).count() as u32,
        sum: draw.numbers.iter().map(|&n| n as u32).sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSummary {
    pub draws: usize,
    pub mean_even: f64,
    pub mean_odd: f64,
    pub mean_prime: f64,
    pub mean_sum: f64,
}

/// Moyennes pair/impair/premier/somme sur la plage. `None` si la plage est vide.
pub fn summarize_patterns(draws: &[Draw]) -> Option<PatternSummary> {
    if draws.is_empty() {
        return None;
    }

    let n = draws.len() as f64;
    let (even, odd, prime, sum) = draws
        .iter()
        .map(classify_draw)
        .fold((0u64, 0u64, 0u64, 0u64), |acc, p| {
            (
                acc.0 + p.even as u64,
                acc.1 + p.odd as u64,
                acc.2 + p.prime as u64,
                acc.3 + p.sum as u64,
            )
        });

    Some(PatternSummary {
        draws: draws.len(),
        mean_even: even as f64 / n,
        mean_odd: odd as f64 / n,
        mean_prime: prime as f64 / n,
        mean_sum: sum as f64 / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        let primes: Vec<u8> = (0..=60).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(49));
    }

    #[test]
    fn test_classify_draw() {
        let draw = Draw::new(1, "x", [2, 3, 10, 15, 41, 60]).unwrap();
        let p = classify_draw(&draw);
        assert_eq!(p, DrawPattern { even: 3, odd: 3, prime: 3, sum: 131 });
    }

    #[test]
    fn test_summary_means() {
        let draws = vec![
            Draw::new(1, "x", [2, 4, 6, 8, 10, 12]).unwrap(),
            Draw::new(2, "y", [1, 3, 5, 7, 9, 11]).unwrap(),
        ];
        let s = summarize_patterns(&draws).unwrap();
        assert_eq!(s.draws, 2);
        assert!((s.mean_even - 3.0).abs() < 1e-10);
        assert!((s.mean_odd - 3.0).abs() < 1e-10);
        // premiers : {2} puis {3, 5, 7, 11}
        assert!((s.mean_prime - 2.5).abs() < 1e-10);
        assert!((s.mean_sum - 39.0).abs() < 1e-10);
    }

    #[test]
    fn test_even_plus_odd_is_six() {
        let draws = megasena_db::models::make_test_draws(30);
        let s = summarize_patterns(&draws).unwrap();
        assert!((s.mean_even + s.mean_odd - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_range_has_no_summary() {
        assert!(summarize_patterns(&[]).is_none());
    }
}
