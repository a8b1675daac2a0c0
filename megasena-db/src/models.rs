use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Numéros tirables : 1..=60.
pub const POOL_SIZE: usize = 60;
/// Numéros par tirage.
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub contest: u32,
    pub date: String,
    /// Ordre de la source (ordre de sortie des boules), pas forcément trié.
    pub numbers: [u8; PICK_COUNT],
}

impl Draw {
    pub fn new(contest: u32, date: impl Into<String>, numbers: [u8; PICK_COUNT]) -> Result<Self> {
        validate_numbers(&numbers)?;
        Ok(Self {
            contest,
            date: date.into(),
            numbers,
        })
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    pub fn sorted_numbers(&self) -> [u8; PICK_COUNT] {
        let mut sorted = self.numbers;
        sorted.sort_unstable();
        sorted
    }
}

/// Vérifie que chaque numéro est dans 1..=60 et qu'il n'y a pas de doublon.
pub fn validate_numbers(numbers: &[u8]) -> Result<()> {
    for &n in numbers {
        if n < 1 || n as usize > POOL_SIZE {
            return Err(Error::invalid_draw(format!(
                "numéro {} hors limites (1-{})",
                n, POOL_SIZE
            )));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(Error::invalid_draw(format!("numéro en double : {}", numbers[i])));
            }
        }
    }
    Ok(())
}

/// Parse une liste de numéros séparés par des espaces, virgules ou tirets.
pub fn parse_numbers(input: &str) -> Result<Vec<u8>> {
    let numbers = input
        .split(|c: char| c.is_whitespace() || c == ',' || c == '-' || c == ';')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .map_err(|_| Error::invalid_draw(format!("'{}' n'est pas un numéro", s)))
        })
        .collect::<Result<Vec<_>>>()?;
    validate_numbers(&numbers)?;
    Ok(numbers)
}

/// Historique synthétique : le concours i+1 tire le bloc de six numéros consécutifs `(i % 10) * 6 + 1..`.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = (i % 10) as u8;
            Draw {
                contest: (i + 1) as u32,
                date: format!("2024-01-{:02}", (i % 28) + 1),
                numbers: [
                    base * 6 + 1,
                    base * 6 + 2,
                    base * 6 + 3,
                    base * 6 + 4,
                    base * 6 + 5,
                    base * 6 + 6,
                ],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_numbers_ok() {
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(validate_numbers(&[60, 59, 58, 57, 56, 55]).is_ok());
    }

    #[test]
    fn test_validate_numbers_out_of_range() {
        assert!(validate_numbers(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(validate_numbers(&[1, 2, 3, 4, 5, 61]).is_err());
    }

    #[test]
    fn test_validate_numbers_duplicate() {
        let err = validate_numbers(&[1, 1, 3, 4, 5, 6]).unwrap_err();
        assert!(matches!(err, Error::InvalidDraw(_)));
    }

    #[test]
    fn test_draw_new_rejects_invalid() {
        assert!(Draw::new(1, "2024-01-01", [1, 2, 3, 4, 5, 5]).is_err());
        assert!(Draw::new(1, "2024-01-01", [1, 2, 3, 4, 5, 70]).is_err());
    }

    #[test]
    fn test_draw_keeps_source_order() {
        let draw = Draw::new(7, "2024-01-01", [42, 3, 17, 60, 1, 9]).unwrap();
        assert_eq!(draw.numbers, [42, 3, 17, 60, 1, 9]);
        assert_eq!(draw.sorted_numbers(), [1, 3, 9, 17, 42, 60]);
        assert!(draw.contains(60));
        assert!(!draw.contains(2));
    }

    #[test]
    fn test_parse_numbers_separators() {
        assert_eq!(parse_numbers("1 2 3 4 5 6").unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_numbers("04, 15,23").unwrap(), vec![4, 15, 23]);
        assert_eq!(parse_numbers("10 - 20 - 30").unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn test_parse_numbers_invalid() {
        assert!(parse_numbers("1 2 x").is_err());
        assert!(parse_numbers("1 2 2").is_err());
        assert!(parse_numbers("1 2 300").is_err());
    }
}
