mod config;
mod display;
mod import;
mod interactive;
mod session;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use megasena_analysis::cooccurrence::{PairRecord, TripletRecord};
use megasena_analysis::cycles::{classify, cold_numbers, hot_numbers};
use megasena_analysis::engine::{generate, AnalysisEngine, Strategy};
use megasena_analysis::frequency::{FrequencyRecord, FrequencySummary};
use megasena_db::db::{
    count_draws, db_path, fetch_last_draws, migrate, open_db, open_db_read_only,
};
use megasena_db::models::Draw;
use megasena_db::repository::{DrawRange, DrawRepository};
use megasena_db::source::{file_source, DrawSource, RemoteCsvSource, SqliteSource};

use crate::config::{Config, SourceConfig, SourceKind};

#[derive(Parser)]
#[command(name = "megasena", about = "Statistiques descriptives des tirages Mega-Sena")]
struct Cli {
    /// Fichier de configuration (défaut : megasena.toml du répertoire utilisateur)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source des tirages
    #[arg(long, global = true)]
    source: Option<SourceKind>,

    /// Fichier local (CSV, ou xlsx / xls / ods)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// URL d'un CSV distant
    #[arg(long, global = true)]
    url: Option<String>,

    /// Base SQLite (défaut : data/megasena.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Premier concours de la plage analysée
    #[arg(long, global = true)]
    start: Option<u32>,

    /// Dernier concours de la plage analysée
    #[arg(long, global = true)]
    end: Option<u32>,

    /// Partir de tout l'historique au lieu des derniers concours
    #[arg(long, global = true)]
    all: bool,

    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    /// Logs détaillés
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer un CSV ou un tableur (local) ou un CSV distant dans la base SQLite
    Import,

    /// Afficher le chemin de la base de données
    DbPath,

    /// Afficher la configuration effective
    Config {
        /// Écrire le fichier de configuration avec les valeurs courantes
        #[arg(long)]
        init: bool,
    },

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Tableau de bord : indicateurs, fréquences, retards et graphique
    Stats {
        /// Taille des tops fréquents / en retard
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Ne pas afficher les graphiques
        #[arg(long)]
        no_chart: bool,
    },

    /// Moyennes pair / impair / premier / somme
    Patterns,

    /// Paires et trios les plus fréquents
    Pairs {
        /// Nombre de lignes (défaut : analysis.top_n)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Cycles : numéros très chauds, chauds, froids
    Cycles {
        /// Nombre de lignes par liste (défaut : analysis.top_n)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Numéros sortis au tirage suivant celui d'un numéro
    Succession {
        /// Numéro de référence (défaut : chaque numéro du dernier tirage de la plage)
        number: Option<u8>,

        /// Nombre de lignes (défaut : analysis.top_n)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Générer des grilles heuristiques
    Generate {
        /// Stratégie (défaut : toutes)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Nombre de numéros par grille (défaut : generator.k)
        #[arg(short)]
        k: Option<usize>,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Mode interactif avec jeux sauvegardés
    Interactive,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "megasena=debug" } else { "megasena=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(kind) = cli.source {
        config.source.kind = kind;
    }
    if let Some(file) = &cli.file {
        config.source.file = file.clone();
    }
    if let Some(url) = &cli.url {
        config.source.url = Some(url.clone());
    }
    if let Some(db) = &cli.db {
        config.source.db = Some(db.clone());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    match &cli.command {
        Command::Import => return cmd_import(&config, cli.url.is_some()),
        Command::DbPath => {
            println!("{}", database_path(&config.source).display());
            return Ok(());
        }
        Command::Config { init } => return cmd_config(&config, cli.config.as_deref(), *init),
        Command::List { last } if config.source.kind == SourceKind::Sqlite => {
            return cmd_list_db(&config.source, *last, cli.json)
        }
        _ => {}
    }

    let repository = load_repository(&config.source)?;
    let engine = AnalysisEngine::new(&repository);
    let window = (!cli.all).then_some(config.analysis.window);
    let range = resolve_range(&repository, window, cli.start, cli.end)?;
    let top_n = config.analysis.top_n;

    match cli.command {
        Command::List { last } => cmd_list(&repository, last, cli.json),
        Command::Stats { top, no_chart } => cmd_stats(&engine, range, top, !no_chart, cli.json),
        Command::Patterns => cmd_patterns(&engine, range, cli.json),
        Command::Pairs { top } => cmd_pairs(&engine, range, top.unwrap_or(top_n), cli.json),
        Command::Cycles { top } => cmd_cycles(&engine, range, top.unwrap_or(top_n), cli.json),
        Command::Succession { number, top } => {
            cmd_succession(&engine, range, number, top.unwrap_or(top_n), cli.json)
        }
        Command::Generate { strategy, k, seed } => {
            let strategies = match strategy {
                Some(s) => vec![s],
                None => Strategy::ALL.to_vec(),
            };
            let k = k.unwrap_or(config.generator.k);
            let seed = seed.or(config.generator.seed);
            cmd_generate(&engine, range, &strategies, k, seed, cli.json).map(|_| ())
        }
        Command::Interactive => interactive::run_interactive(&engine, range, &config),
        Command::Import | Command::DbPath | Command::Config { .. } => Ok(()),
    }
}

fn database_path(source: &SourceConfig) -> PathBuf {
    source.db.clone().unwrap_or_else(db_path)
}

fn build_source(source: &SourceConfig) -> Result<Box<dyn DrawSource>> {
    let built: Box<dyn DrawSource> = match source.kind {
        SourceKind::File => file_source(&source.file),
        SourceKind::Remote => {
            let url = source
                .url
                .clone()
                .context("Aucune URL configurée (--url ou source.url)")?;
            Box::new(RemoteCsvSource::new(url).with_timeout(Duration::from_secs(source.timeout_secs)))
        }
        SourceKind::Sqlite => Box::new(SqliteSource::new(database_path(source))),
    };
    Ok(built)
}

fn load_repository(source: &SourceConfig) -> Result<DrawRepository> {
    let built = build_source(source)?;
    let repository = import::load_with_spinner(built.as_ref());
    if source.kind == SourceKind::Sqlite {
        return repository.context("Base vide ou illisible. Lancez d'abord : megasena import");
    }
    repository
}

/// Plage demandée ; les bornes absentes viennent des `window` derniers concours,
/// ou de tout l'historique sans fenêtre.
fn resolve_range(
    repository: &DrawRepository,
    window: Option<u32>,
    start: Option<u32>,
    end: Option<u32>,
) -> Result<DrawRange> {
    let default = match window {
        Some(window) => repository.default_range(window),
        None => repository.full_range(),
    }
    .context("Aucun tirage chargé")?;
    Ok(DrawRange::new(
        start.unwrap_or(default.start),
        end.unwrap_or(default.end),
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_import(config: &Config, prefer_url: bool) -> Result<()> {
    let mut source_config = config.source.clone();
    source_config.kind = if prefer_url || config.source.kind == SourceKind::Remote {
        SourceKind::Remote
    } else {
        SourceKind::File
    };
    let source = build_source(&source_config)?;
    let repository = import::load_with_spinner(source.as_ref())?;

    let path = database_path(&config.source);
    let conn = open_db(&path).with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    migrate(&conn)?;

    let result = import::import_draws(&conn, repository.draws())?;
    display::display_import_summary(&result);
    info!(db = %path.display(), total = count_draws(&conn)?, "base à jour");
    Ok(())
}

fn cmd_config(config: &Config, path: Option<&std::path::Path>, init: bool) -> Result<()> {
    if init {
        config.save(path)?;
        let written = path
            .map(std::path::Path::to_path_buf)
            .unwrap_or_else(config::default_config_path);
        println!("Configuration écrite dans {}", written.display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_draws(draws: &[Draw], json: bool) -> Result<()> {
    if json {
        return print_json(draws);
    }
    display::display_draws(draws);
    Ok(())
}

/// Les derniers tirages lus directement en base, sans charger l'historique.
fn cmd_list_db(source: &SourceConfig, last: usize, json: bool) -> Result<()> {
    let path = database_path(source);
    if !path.exists() {
        println!("Base absente. Lancez d'abord : megasena import");
        return Ok(());
    }
    let conn = open_db_read_only(&path)?;
    if count_draws(&conn)? == 0 {
        println!("Base vide. Lancez d'abord : megasena import");
        return Ok(());
    }
    let limit = u32::try_from(last).unwrap_or(u32::MAX);
    show_draws(&fetch_last_draws(&conn, limit)?, json)
}

fn cmd_list(repository: &DrawRepository, last: usize, json: bool) -> Result<()> {
    let draws: Vec<Draw> = repository.draws().iter().rev().take(last).cloned().collect();
    show_draws(&draws, json)
}

#[derive(Serialize)]
struct StatsReport<'a> {
    range: DrawRange,
    summary: FrequencySummary,
    frequencies: &'a [FrequencyRecord],
}

pub(crate) fn cmd_stats(
    engine: &AnalysisEngine,
    range: DrawRange,
    top: usize,
    chart: bool,
    json: bool,
) -> Result<()> {
    let analysis = engine.analyze(range)?;
    if json {
        return print_json(&StatsReport {
            range,
            summary: analysis.summary(),
            frequencies: &analysis.frequencies,
        });
    }

    display::display_dashboard(&analysis, engine.repository().latest());
    display::display_frequency_table(&analysis.frequencies);
    display::display_hot_and_overdue(&analysis.frequencies, top);
    if chart {
        display::display_frequency_chart(&analysis.frequencies);
    }
    Ok(())
}

pub(crate) fn cmd_patterns(engine: &AnalysisEngine, range: DrawRange, json: bool) -> Result<()> {
    let summary = engine.patterns(range)?;
    if json {
        return print_json(&summary);
    }
    display::display_patterns(&summary);
    Ok(())
}

#[derive(Serialize)]
struct CooccurrenceReport<'a> {
    range: DrawRange,
    pairs: &'a [PairRecord],
    triplets: &'a [TripletRecord],
}

pub(crate) fn cmd_pairs(engine: &AnalysisEngine, range: DrawRange, top: usize, json: bool) -> Result<()> {
    let analysis = engine.analyze(range)?;
    let pairs = &analysis.pairs[..top.min(analysis.pairs.len())];
    let triplets = &analysis.triplets[..top.min(analysis.triplets.len())];
    if json {
        return print_json(&CooccurrenceReport {
            range,
            pairs,
            triplets,
        });
    }

    display::display_combinations(&format!("Paires les plus fréquentes ({})", range), pairs, top);
    display::display_combinations(&format!("Trios les plus fréquents ({})", range), triplets, top);
    Ok(())
}

pub(crate) fn cmd_cycles(engine: &AnalysisEngine, range: DrawRange, top: usize, json: bool) -> Result<()> {
    let analysis = engine.analyze(range)?;
    let cycles = classify(&analysis.frequencies);
    if json {
        return print_json(&cycles);
    }

    display::display_cycles("Numéros chauds", &hot_numbers(&cycles, top));
    display::display_cycles("Numéros froids", &cold_numbers(&cycles, top));
    Ok(())
}

pub(crate) fn cmd_succession(
    engine: &AnalysisEngine,
    range: DrawRange,
    number: Option<u8>,
    top: usize,
    json: bool,
) -> Result<()> {
    match number {
        Some(n) => {
            let records = engine.succession(n, range, top)?;
            if json {
                return print_json(&records);
            }
            display::display_succession(n, &records);
        }
        None => {
            let panels = engine.succession_for_last_draw(range, top)?;
            if json {
                return print_json(&panels);
            }
            for (n, records) in &panels {
                display::display_succession(*n, records);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct GeneratedGame {
    strategy: Strategy,
    numbers: Vec<u8>,
}

/// Génère une grille par stratégie et renvoie la dernière, pour la sauvegarde interactive.
pub(crate) fn cmd_generate(
    engine: &AnalysisEngine,
    range: DrawRange,
    strategies: &[Strategy],
    k: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<Option<(Strategy, Vec<u8>)>> {
    let analysis = engine.analyze(range)?;

    let mut games = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let numbers = generate(strategy, k, &analysis.frequencies, seed)
            .with_context(|| format!("Stratégie {}", strategy))?;
        games.push((strategy, numbers));
    }

    if json {
        let report: Vec<GeneratedGame> = games
            .iter()
            .map(|(strategy, numbers)| GeneratedGame {
                strategy: *strategy,
                numbers: numbers.clone(),
            })
            .collect();
        print_json(&report)?;
    } else {
        display::display_games(&games);
    }
    Ok(games.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use megasena_db::models::make_test_draws;

    #[test]
    fn test_resolve_range_defaults() {
        let repo = DrawRepository::new(make_test_draws(250)).unwrap();
        assert_eq!(resolve_range(&repo, Some(100), None, None).unwrap(), DrawRange::new(150, 250));
        assert_eq!(
            resolve_range(&repo, Some(100), Some(10), None).unwrap(),
            DrawRange::new(10, 250)
        );
        assert_eq!(
            resolve_range(&repo, Some(100), None, Some(200)).unwrap(),
            DrawRange::new(150, 200)
        );
        assert_eq!(resolve_range(&repo, None, None, None).unwrap(), DrawRange::new(1, 250));
        assert!(resolve_range(&DrawRepository::new(vec![]).unwrap(), Some(100), None, None).is_err());
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "megasena",
            "generate",
            "--strategy",
            "random-smart",
            "-k",
            "8",
            "--seed",
            "3",
            "--start",
            "10",
            "--source",
            "file",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.start, Some(10));
        assert_eq!(cli.source, Some(SourceKind::File));
        assert!(cli.json);
        match cli.command {
            Command::Generate { strategy, k, seed } => {
                assert_eq!(strategy, Some(Strategy::RandomSmart));
                assert_eq!(k, Some(8));
                assert_eq!(seed, Some(3));
            }
            _ => panic!("sous-commande inattendue"),
        }
    }

    #[test]
    fn test_overrides_win_over_config() {
        let cli = Cli::try_parse_from([
            "megasena",
            "stats",
            "--source",
            "remote",
            "--url",
            "https://example.org/m.csv",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.source.kind, SourceKind::Remote);
        assert_eq!(config.source.url.as_deref(), Some("https://example.org/m.csv"));
    }

    #[test]
    fn test_remote_source_requires_url() {
        let mut source = SourceConfig::default();
        source.kind = SourceKind::Remote;
        assert!(build_source(&source).is_err());
        source.url = Some("https://example.org/m.csv".into());
        assert!(build_source(&source).is_ok());
    }

    #[test]
    fn test_file_source_reads_spreadsheet_by_extension() {
        let mut source = SourceConfig::default();
        source.kind = SourceKind::File;
        source.file = PathBuf::from("MegaSena.xlsx");
        assert!(build_source(&source).unwrap().describe().starts_with("classeur"));
        source.file = PathBuf::from("data/mega_sena.csv");
        assert!(build_source(&source).unwrap().describe().starts_with("fichier"));
    }
}
