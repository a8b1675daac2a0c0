//! Erreurs partagées par le dépôt de tirages, les sources et les analyseurs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Source absente ou mal formée. Fatal pour la commande en cours.
    #[error("Chargement des tirages impossible : {0}")]
    DataLoad(String),

    /// La plage ne contient aucun tirage.
    #[error("Aucun tirage entre les concours {start} et {end}")]
    EmptyRange { start: u32, end: u32 },

    /// Un générateur a demandé plus de numéros que de candidats.
    #[error("{requested} numéros demandés, seulement {available} candidats disponibles")]
    InsufficientPool { requested: usize, available: usize },

    /// Bornes inversées ou hors de l'historique.
    #[error("Plage invalide {start}..={end} (concours disponibles : {min}..={max})")]
    InvalidRange { start: u32, end: u32, min: u32, max: u32 },

    #[error("Tirage invalide : {0}")]
    InvalidDraw(String),

    #[error("Erreur d'E/S : {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur SQLite : {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }

    pub fn invalid_draw(msg: impl Into<String>) -> Self {
        Self::InvalidDraw(msg.into())
    }
}
