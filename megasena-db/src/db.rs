use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    contest  INTEGER PRIMARY KEY,
    date     TEXT NOT NULL,
    ball_1   INTEGER NOT NULL,
    ball_2   INTEGER NOT NULL,
    ball_3   INTEGER NOT NULL,
    ball_4   INTEGER NOT NULL,
    ball_5   INTEGER NOT NULL,
    ball_6   INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("megasena.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    Ok(conn)
}

/// Ouvre une base existante en lecture seule ; rien n'est créé si le chemin est absent.
pub fn open_db_read_only(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(Error::data_load(format!("base {} introuvable", path.display())));
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insère un tirage. Retourne `false` si le concours existe déjà.
pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (contest, date, ball_1, ball_2, ball_3, ball_4, ball_5, ball_6)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            draw.contest,
            draw.date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
        ],
    )?;
    Ok(changed > 0)
}

fn query_draws(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                [
                    row.get::<_, u8>(2)?,
                    row.get::<_, u8>(3)?,
                    row.get::<_, u8>(4)?,
                    row.get::<_, u8>(5)?,
                    row.get::<_, u8>(6)?,
                    row.get::<_, u8>(7)?,
                ],
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // La base peut avoir été modifiée à la main : on revalide chaque ligne.
    rows.into_iter()
        .map(|(contest, date, numbers)| {
            Draw::new(contest, date, numbers).map_err(|e| match e {
                Error::InvalidDraw(msg) => {
                    Error::data_load(format!("concours {} en base : {}", contest, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Tous les tirages, par concours croissant.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    query_draws(
        conn,
        "SELECT contest, date, ball_1, ball_2, ball_3, ball_4, ball_5, ball_6
         FROM draws ORDER BY contest ASC",
        [],
    )
}

/// Les `limit` derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    query_draws(
        conn,
        "SELECT contest, date, ball_1, ball_2, ball_3, ball_4, ball_5, ball_6
         FROM draws ORDER BY contest DESC LIMIT ?1",
        [limit],
    )
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
