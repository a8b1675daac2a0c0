use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;

use megasena_analysis::engine::{AnalysisEngine, Strategy};
use megasena_db::models::parse_numbers;
use megasena_db::repository::DrawRange;

use crate::config::Config;
use crate::display::{display_saved_games, format_numbers};
use crate::session::SessionStore;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Stats,
    Patterns,
    Pairs,
    Cycles,
    Succession,
    Generate,
    Save,
    Games,
    Remove,
    Clear,
    Range,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "stats" | "statistiques" => Some(InteractiveCommand::Stats),
        "2" | "motifs" | "patterns" => Some(InteractiveCommand::Patterns),
        "3" | "paires" | "pairs" | "trios" => Some(InteractiveCommand::Pairs),
        "4" | "cycles" | "cyc" => Some(InteractiveCommand::Cycles),
        "5" | "succession" | "suite" | "succ" => Some(InteractiveCommand::Succession),
        "6" | "generer" | "générer" | "generate" | "gen" => Some(InteractiveCommand::Generate),
        "7" | "sauver" | "sauvegarder" | "save" => Some(InteractiveCommand::Save),
        "8" | "jeux" | "games" | "ls" => Some(InteractiveCommand::Games),
        "9" | "retirer" | "remove" | "rm" => Some(InteractiveCommand::Remove),
        "10" | "vider" | "clear" => Some(InteractiveCommand::Clear),
        "11" | "plage" | "range" => Some(InteractiveCommand::Range),
        "12" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu(range: DrawRange, saved: usize) {
    println!();
    println!("── Mode interactif (concours {}, {} jeu(x) sauvegardé(s)) ──", range, saved);
    println!("  1. stats      Tableau de bord fréquence / retard");
    println!("  2. motifs     Pair / impair / premier / somme");
    println!("  3. paires     Paires et trios fréquents");
    println!("  4. cycles     Numéros chauds et froids");
    println!("  5. succession Numéros sortis au tirage suivant");
    println!("  6. generer    Générer une grille");
    println!("  7. sauver     Sauvegarder un jeu");
    println!("  8. jeux       Jeux sauvegardés");
    println!("  9. retirer    Retirer un jeu");
    println!(" 10. vider      Vider les jeux sauvegardés");
    println!(" 11. plage      Changer la plage analysée");
    println!(" 12. quitter    Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        anyhow::bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn parse_strategy(input: &str) -> Result<Option<Strategy>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("toutes") {
        return Ok(None);
    }
    Strategy::from_str(input, true)
        .map(Some)
        .map_err(|_| anyhow::anyhow!("Stratégie inconnue : '{}'", input))
}

fn parse_range(start: &str, end: &str) -> Result<DrawRange> {
    let start: u32 = start.trim().parse().context("Concours de début invalide")?;
    let end: u32 = end.trim().parse().context("Concours de fin invalide")?;
    Ok(DrawRange::new(start, end))
}

/// Dernière grille générée, proposée par défaut à la sauvegarde.
type LastGame = Option<(Strategy, Vec<u8>)>;

struct Session<'e, 'r> {
    engine: &'e AnalysisEngine<'r>,
    config: &'e Config,
    range: DrawRange,
    store: SessionStore,
    last_game: LastGame,
}

impl Session<'_, '_> {
    fn succession(&self) -> Result<()> {
        let input = prompt_with_default("Numéro de référence (vide = dernier tirage)", "")?;
        let number = if input.is_empty() {
            None
        } else {
            Some(input.parse::<u8>().context("Numéro invalide")?)
        };
        super::cmd_succession(self.engine, self.range, number, self.config.analysis.top_n, false)
    }

    fn generate(&mut self) -> Result<()> {
        let names = Strategy::ALL
            .iter()
            .filter_map(|s| s.to_possible_value().map(|v| v.get_name().to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Stratégies : {}", names);

        let strategy = parse_strategy(&prompt_with_default("Stratégie", "toutes")?)?;
        let k_str = prompt_with_default("Nombre de numéros", &self.config.generator.k.to_string())?;
        let k: usize = k_str.parse().context("Nombre invalide")?;

        let strategies = match strategy {
            Some(s) => vec![s],
            None => Strategy::ALL.to_vec(),
        };
        let mut seed = self.config.generator.seed;
        if strategies.iter().any(Strategy::is_random) {
            let seed_str = prompt_with_default("Seed (vide = aléatoire)", "")?;
            if !seed_str.is_empty() {
                seed = Some(seed_str.parse().context("Seed invalide")?);
            }
        }
        self.last_game = super::cmd_generate(self.engine, self.range, &strategies, k, seed, false)?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let (default_label, default_numbers) = match &self.last_game {
            Some((strategy, numbers)) => (
                format!("{} ({}D)", strategy, numbers.len()),
                format_numbers(numbers),
            ),
            None => ("Perso".to_string(), String::new()),
        };

        let raw = prompt_with_default("Numéros (séparés par des espaces)", &default_numbers)?;
        let numbers = parse_numbers(&raw)?;
        let label = prompt_with_default("Libellé", &default_label)?;

        let game = self.store.save(label, numbers)?;
        println!("Jeu sauvegardé : {} - {}", game.label, format_numbers(&game.numbers));
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        if self.store.is_empty() {
            println!("Aucun jeu à retirer.");
            return Ok(());
        }
        display_saved_games(self.store.list());
        let position: usize = prompt("Numéro du jeu à retirer : ")?
            .parse()
            .context("Position invalide")?;
        match self.store.remove(position) {
            Some(game) => println!("Jeu retiré : {}", game.label),
            None => println!("Aucun jeu en position {}.", position),
        }
        Ok(())
    }

    fn change_range(&mut self) -> Result<()> {
        let start = prompt_with_default("Concours de début", &self.range.start.to_string())?;
        let end = prompt_with_default("Concours de fin", &self.range.end.to_string())?;
        let range = parse_range(&start, &end)?;
        self.range = self.engine.repository().validate_range(range)?;
        println!("Plage : {}", self.range);
        Ok(())
    }
}

pub fn run_interactive(engine: &AnalysisEngine, range: DrawRange, config: &Config) -> Result<()> {
    println!("Bienvenue dans le mode interactif de megasena !");

    let mut session = Session {
        engine,
        config,
        range,
        store: SessionStore::new(),
        last_game: None,
    };
    let top_n = config.analysis.top_n;

    loop {
        display_menu(session.range, session.store.len());
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Stats) => super::cmd_stats(engine, session.range, 10, false, false),
            Some(InteractiveCommand::Patterns) => super::cmd_patterns(engine, session.range, false),
            Some(InteractiveCommand::Pairs) => super::cmd_pairs(engine, session.range, top_n, false),
            Some(InteractiveCommand::Cycles) => super::cmd_cycles(engine, session.range, top_n, false),
            Some(InteractiveCommand::Succession) => session.succession(),
            Some(InteractiveCommand::Generate) => session.generate(),
            Some(InteractiveCommand::Save) => session.save(),
            Some(InteractiveCommand::Games) => {
                display_saved_games(session.store.list());
                Ok(())
            }
            Some(InteractiveCommand::Remove) => session.remove(),
            Some(InteractiveCommand::Clear) => {
                println!("{} jeu(x) retiré(s).", session.store.clear());
                Ok(())
            }
            Some(InteractiveCommand::Range) => session.change_range(),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-12) ou un nom de commande.", input);
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
