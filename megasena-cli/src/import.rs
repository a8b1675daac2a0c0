use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use megasena_db::db::insert_draw;
use megasena_db::models::Draw;
use megasena_db::repository::DrawRepository;
use megasena_db::rusqlite::Connection;
use megasena_db::source::DrawSource;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Charge la source avec un spinner ; toute ligne invalide fait échouer le chargement.
pub fn load_with_spinner(source: &dyn DrawSource) -> Result<DrawRepository> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Gabarit de progression invalide")?,
    );
    spinner.set_message(format!("Chargement depuis {}", source.describe()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = source
        .load()
        .with_context(|| format!("Impossible de charger {}", source.describe()));
    spinner.finish_and_clear();
    result
}

/// Insère les tirages dans une seule transaction. Les concours déjà présents sont ignorés.
pub fn import_draws(conn: &Connection, draws: &[Draw]) -> Result<ImportResult> {
    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let pb = ProgressBar::new(draws.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Gabarit de progression invalide")?
            .progress_chars("=> "),
    );

    let mut result = ImportResult::default();
    for draw in draws {
        result.total_records += 1;
        match insert_draw(&tx, draw) {
            Ok(true) => result.inserted += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => {
                warn!(contest = draw.contest, error = %e, "insertion impossible");
                result.errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    tx.commit().context("Échec du commit")?;
    info!(
        inserted = result.inserted,
        skipped = result.skipped,
        errors = result.errors,
        "import terminé"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_db::db::{count_draws, migrate};
    use megasena_db::models::make_test_draws;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_then_reimport() {
        let conn = memory_db();
        let draws = make_test_draws(25);

        let first = import_draws(&conn, &draws).unwrap();
        assert_eq!(
            first,
            ImportResult {
                total_records: 25,
                inserted: 25,
                skipped: 0,
                errors: 0
            }
        );

        let second = import_draws(&conn, &draws).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 25);
        assert_eq!(count_draws(&conn).unwrap(), 25);
    }

    #[test]
    fn test_import_empty() {
        let conn = memory_db();
        assert_eq!(import_draws(&conn, &[]).unwrap(), ImportResult::default());
    }
}
