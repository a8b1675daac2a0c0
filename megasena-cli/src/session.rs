use serde::Serialize;

use megasena_db::error::{Error, Result};
use megasena_db::models::{validate_numbers, PICK_COUNT};

/// Jeu mis de côté pendant une session interactive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedGame {
    pub label: String,
    pub numbers: Vec<u8>,
}

/// Jeux sauvegardés, vivant le temps d'une session. Rien n'est écrit sur disque.
#[derive(Debug, Default)]
pub struct SessionStore {
    games: Vec<SavedGame>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un jeu d'au moins 6 numéros distincts dans 1..=60. Les doublons
    /// de jeux sont acceptés.
    pub fn save(&mut self, label: impl Into<String>, numbers: Vec<u8>) -> Result<&SavedGame> {
        if numbers.len() < PICK_COUNT {
            return Err(Error::invalid_draw(format!(
                "{} numéros, au moins {} attendus",
                numbers.len(),
                PICK_COUNT
            )));
        }
        validate_numbers(&numbers)?;

        self.games.push(SavedGame {
            label: label.into(),
            numbers,
        });
        let index = self.games.len() - 1;
        Ok(&self.games[index])
    }

    pub fn list(&self) -> &[SavedGame] {
        &self.games
    }

    /// Retire le jeu à la position `position` (à partir de 1).
    pub fn remove(&mut self, position: usize) -> Option<SavedGame> {
        let index = position.checked_sub(1)?;
        if index < self.games.len() {
            Some(self.games.remove(index))
        } else {
            None
        }
    }

    /// Vide la session ; renvoie le nombre de jeux retirés.
    pub fn clear(&mut self) -> usize {
        let n = self.games.len();
        self.games.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
