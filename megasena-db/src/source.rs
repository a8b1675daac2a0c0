//! Sources de tirages : fichier CSV ou tableur local, CSV distant (HTTP) ou base SQLite.
//!
//! Chaque source normalise ses lignes vers [`Draw`] et construit un
//! [`DrawRepository`]. Une ligne mal formée fait échouer tout le chargement,
//! et tout échec de chargement remonte en [`Error::DataLoad`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::db::{fetch_all_draws, open_db_read_only};
use crate::error::{Error, Result};
use crate::models::{Draw, PICK_COUNT};
use crate::repository::DrawRepository;

pub trait DrawSource {
    fn describe(&self) -> String;
    fn load(&self) -> Result<DrawRepository>;
}

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Source fichier choisie selon l'extension : tableur ou CSV.
pub fn file_source(path: impl Into<PathBuf>) -> Box<dyn DrawSource> {
    let path = path.into();
    if is_spreadsheet(&path) {
        Box::new(XlsxFileSource::new(path))
    } else {
        Box::new(CsvFileSource::new(path))
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DrawSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("fichier {}", self.path.display())
    }

    fn load(&self) -> Result<DrawRepository> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::data_load(format!("impossible de lire {:?} : {}", self.path, e))
        })?;
        let draws = parse_draws(&content)?;
        info!(source = %self.describe(), draws = draws.len(), "tirages chargés");
        repository_from(draws)
    }
}

/// Première feuille d'un classeur (xlsx, xls, ods).
pub struct XlsxFileSource {
    path: PathBuf,
}

impl XlsxFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DrawSource for XlsxFileSource {
    fn describe(&self) -> String {
        format!("classeur {}", self.path.display())
    }

    fn load(&self) -> Result<DrawRepository> {
        let fail = |e: calamine::Error| Error::data_load(format!("{} : {}", self.describe(), e));
        let mut workbook = open_workbook_auto(&self.path).map_err(fail)?;
        let sheet = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::data_load(format!("{} : aucune feuille", self.describe())))?
            .map_err(fail)?;
        let draws = parse_sheet(&sheet)?;
        info!(source = %self.describe(), draws = draws.len(), "tirages chargés");
        repository_from(draws)
    }
}

pub struct RemoteCsvSource {
    url: String,
    timeout: Duration,
}

impl RemoteCsvSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn fetch(&self) -> std::result::Result<String, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        client.get(&self.url).send()?.error_for_status()?.text()
    }
}

impl DrawSource for RemoteCsvSource {
    fn describe(&self) -> String {
        format!("URL {}", self.url)
    }

    fn load(&self) -> Result<DrawRepository> {
        debug!(url = %self.url, "téléchargement du CSV");
        let content = self
            .fetch()
            .map_err(|e| Error::data_load(format!("{} : {}", self.describe(), e)))?;
        let draws = parse_draws(&content)?;
        info!(source = %self.describe(), draws = draws.len(), "tirages chargés");
        repository_from(draws)
    }
}

pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DrawSource for SqliteSource {
    fn describe(&self) -> String {
        format!("base {}", self.path.display())
    }

    fn load(&self) -> Result<DrawRepository> {
        let draws = open_db_read_only(&self.path)
            .and_then(|conn| fetch_all_draws(&conn))
            .map_err(|e| match e {
                Error::DataLoad(_) => e,
                other => Error::data_load(format!("{} : {}", self.describe(), other)),
            })?;
        info!(source = %self.describe(), draws = draws.len(), "tirages chargés");
        repository_from(draws)
    }
}

fn repository_from(draws: Vec<Draw>) -> Result<DrawRepository> {
    if draws.is_empty() {
        return Err(Error::data_load("aucun tirage dans la source"));
    }
    DrawRepository::new(draws)
}

/// Position des colonnes utiles dans une ligne CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub contest: usize,
    pub date: usize,
    pub numbers: [usize; PICK_COUNT],
}

impl ColumnLayout {
    /// Concours, Date, puis les 6 numéros.
    pub const POSITIONAL: ColumnLayout = ColumnLayout {
        contest: 0,
        date: 1,
        numbers: [2, 3, 4, 5, 6, 7],
    };

    /// Reconnaît les en-têtes `Concurso`/`Data` et `B1..B6`, `D1..D6` ou `Bola1..Bola6`.
    pub fn from_headers(headers: &csv::StringRecord) -> Option<ColumnLayout> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| names.iter().position(|h| aliases.contains(&h.as_str()));

        let contest = find(&["concurso", "contest", "concursoid", "draw"])?;
        let date = find(&["data", "datasorteio", "datadosorteio", "date"])?;

        let mut numbers = [0usize; PICK_COUNT];
        for (i, slot) in numbers.iter_mut().enumerate() {
            let k = i + 1;
            let aliases = [
                format!("b{k}"),
                format!("d{k}"),
                format!("bola{k}"),
                format!("dezena{k}"),
                format!("ball{k}"),
            ];
            *slot = names
                .iter()
                .position(|h| aliases.iter().any(|a| a == h))?;
        }

        Some(ColumnLayout {
            contest,
            date,
            numbers,
        })
    }

    fn min_len(&self) -> usize {
        self.numbers
            .iter()
            .copied()
            .chain([self.contest, self.date])
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// `;` si la première ligne en contient plus que de `,`.
fn detect_delimiter(content: &str) -> u8 {
    let first = content.lines().next().unwrap_or_default();
    let semicolons = first.matches(';').count();
    let commas = first.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// `DD/MM/YYYY` et `YYYY-MM-DD` deviennent `YYYY-MM-DD`, le reste est gardé tel quel.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

fn parse_record(record: &csv::StringRecord, layout: &ColumnLayout, line: u64) -> Result<Draw> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| Error::data_load(format!("ligne {} : colonne {} manquante", line, idx + 1)))
    };

    let contest_raw = get(layout.contest)?;
    let contest = contest_raw.parse::<u32>().map_err(|_| {
        Error::data_load(format!("ligne {} : concours '{}' invalide", line, contest_raw))
    })?;
    if contest == 0 {
        return Err(Error::data_load(format!("ligne {} : concours 0", line)));
    }

    let date = normalize_date(get(layout.date)?);

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, &idx) in numbers.iter_mut().zip(layout.numbers.iter()) {
        let raw = get(idx)?;
        *slot = raw.parse::<u8>().map_err(|_| {
            Error::data_load(format!("ligne {} : numéro '{}' invalide", line, raw))
        })?;
    }

    Draw::new(contest, date, numbers).map_err(|e| match e {
        Error::InvalidDraw(msg) => Error::data_load(format!("ligne {} : {}", line, msg)),
        other => other,
    })
}

fn resolve_layout(headers: &csv::StringRecord) -> Result<ColumnLayout> {
    if let Some(layout) = ColumnLayout::from_headers(headers) {
        return Ok(layout);
    }
    if headers.len() < ColumnLayout::POSITIONAL.min_len() {
        return Err(Error::data_load(format!(
            "structure incorrecte : au moins 8 colonnes attendues (Concours, Date, 6 numéros), {} trouvées",
            headers.len()
        )));
    }
    debug!("en-têtes non reconnus, lecture positionnelle");
    Ok(ColumnLayout::POSITIONAL)
}

/// Lignes numérotées après l'en-tête ; les lignes entièrement vides sont ignorées.
fn collect_draws<I>(headers: &csv::StringRecord, rows: I) -> Result<Vec<Draw>>
where
    I: IntoIterator<Item = Result<(u64, csv::StringRecord)>>,
{
    let layout = resolve_layout(headers)?;
    let mut draws = Vec::new();
    for row in rows {
        let (line, record) = row?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() < layout.min_len() {
            return Err(Error::data_load(format!(
                "ligne {} : {} colonnes, {} attendues",
                line,
                record.len(),
                layout.min_len()
            )));
        }
        draws.push(parse_record(&record, &layout, line)?);
    }
    Ok(draws)
}

/// Parse un CSV de tirages. La première ligne est toujours un en-tête ; s'il n'est
/// pas reconnu, les 8 premières colonnes sont lues dans l'ordre Concours, Date, 6 numéros.
pub fn parse_draws(content: &str) -> Result<Vec<Draw>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::data_load(format!("en-tête CSV : {}", e)))?
        .clone();

    let rows = reader.records().map(|record| -> Result<(u64, csv::StringRecord)> {
        let record = record.map_err(|e| Error::data_load(format!("lecture CSV : {}", e)))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        Ok((line, record))
    });
    collect_draws(&headers, rows)
}

/// Texte d'une cellule ; les nombres entiers perdent leur `.0`, les dates Excel
/// deviennent `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        other => other.to_string(),
    }
}

/// Même lecture que [`parse_draws`] sur une feuille : en-tête sur la première ligne,
/// lignes numérotées comme dans le tableur.
pub fn parse_sheet(sheet: &Range<Data>) -> Result<Vec<Draw>> {
    let first_row = sheet.start().map(|(row, _)| u64::from(row)).unwrap_or(0);
    let mut rows = sheet
        .rows()
        .map(|cells| csv::StringRecord::from(cells.iter().map(cell_text).collect::<Vec<_>>()));

    let headers = rows
        .next()
        .ok_or_else(|| Error::data_load("feuille vide"))?;

    let numbered = rows
        .enumerate()
        .map(|(i, record)| -> Result<(u64, csv::StringRecord)> {
            Ok((first_row + i as u64 + 2, record))
        });
    collect_draws(&headers, numbered)
}
