use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::{Chart, Plot, Shape};

use crate::import::ImportResult;
use crate::session::SavedGame;
use megasena_analysis::cooccurrence::Combination;
use megasena_analysis::cycles::{CycleClass, CycleRecord};
use megasena_analysis::engine::{Analysis, Strategy};
use megasena_analysis::frequency::{by_delay, by_frequency, FrequencyRecord};
use megasena_analysis::patterns::{is_prime, PatternSummary};
use megasena_analysis::succession::SuccessionRecord;
use megasena_db::models::Draw;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Numéros"]);
    for draw in draws {
        table.add_row(vec![
            draw.contest.to_string(),
            draw.date.clone(),
            format_numbers(&draw.sorted_numbers()),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Tirages lus       : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_dashboard(analysis: &Analysis, latest: Option<&Draw>) {
    let summary = analysis.summary();
    println!("\n📊 Analyse des concours {} ({} tirages)\n", analysis.range, summary.draws);

    let mut table = new_table(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Numéros tirés".to_string(), summary.total_numbers.to_string()]);
    table.add_row(vec![
        "Numéros distincts".to_string(),
        format!("{} / 60", summary.distinct_numbers),
    ]);
    table.add_row(vec![
        "Fréquence moyenne".to_string(),
        format!("{:.2}", summary.mean_frequency),
    ]);
    table.add_row(vec!["Retard moyen".to_string(), format!("{:.2}", summary.mean_delay)]);
    if let Some(draw) = latest {
        table.add_row(vec![
            "Dernier tirage".to_string(),
            format!("#{} ({}) : {}", draw.contest, draw.date, format_numbers(&draw.sorted_numbers())),
        ]);
    }
    println!("{table}");
}

fn parity_label(number: u8) -> &'static str {
    if number % 2 == 0 {
        "Pair"
    } else {
        "Impair"
    }
}

fn prime_label(number: u8) -> &'static str {
    if is_prime(number) {
        "Oui"
    } else {
        "Non"
    }
}

pub fn display_frequency_table(table_rows: &[FrequencyRecord]) {
    println!("\n── Fréquence et retard (1-60) ──");
    let mut table = new_table(vec!["Numéro", "Vezes", "Atraso", "Pair/Impair", "Premier"]);
    for record in by_frequency(table_rows) {
        table.add_row(vec![
            format!("{:2}", record.number),
            record.vezes.to_string(),
            record.atraso.to_string(),
            parity_label(record.number).to_string(),
            prime_label(record.number).to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_hot_and_overdue(records: &[FrequencyRecord], limit: usize) {
    println!("\n🔥 Top {} les plus fréquents", limit);
    let mut table = new_table(vec!["Numéro", "Vezes", "Atraso"]);
    for record in by_frequency(records).iter().take(limit) {
        table.add_row(vec![
            Cell::new(format!("{:2}", record.number)).fg(Color::Green),
            Cell::new(record.vezes),
            Cell::new(record.atraso),
        ]);
    }
    println!("{table}");

    println!("\n⏳ Top {} les plus en retard", limit);
    let mut table = new_table(vec!["Numéro", "Atraso", "Vezes"]);
    for record in by_delay(records).iter().take(limit) {
        table.add_row(vec![
            Cell::new(format!("{:2}", record.number)).fg(Color::Red),
            Cell::new(record.atraso),
            Cell::new(record.vezes),
        ]);
    }
    println!("{table}");
}

pub fn display_frequency_chart(records: &[FrequencyRecord]) {
    if records.is_empty() {
        return;
    }

    let frequency: Vec<(f32, f32)> = records
        .iter()
        .map(|r| (r.number as f32, r.vezes as f32))
        .collect();
    let delay: Vec<(f32, f32)> = records
        .iter()
        .map(|r| (r.number as f32, r.atraso as f32))
        .collect();

    let max_freq = records.iter().map(|r| r.vezes).max().unwrap_or(0) as f32;
    let max_delay = records.iter().map(|r| r.atraso).max().unwrap_or(0) as f32;

    println!("\n== Fréquence par numéro ==\n");
    Chart::new_with_y_range(120, 40, 1.0, 60.0, 0.0, max_freq + 1.0)
        .lineplot(&Shape::Lines(&frequency))
        .display();

    println!("\n== Retard par numéro ==\n");
    Chart::new_with_y_range(120, 40, 1.0, 60.0, 0.0, max_delay + 1.0)
        .lineplot(&Shape::Lines(&delay))
        .display();
}

pub fn display_patterns(summary: &PatternSummary) {
    println!("\n🔢 Motifs moyens sur {} tirages\n", summary.draws);
    let mut table = new_table(vec!["Motif", "Moyenne par tirage"]);
    table.add_row(vec!["Pairs".to_string(), format!("{:.2}", summary.mean_even)]);
    table.add_row(vec!["Impairs".to_string(), format!("{:.2}", summary.mean_odd)]);
    table.add_row(vec!["Premiers".to_string(), format!("{:.2}", summary.mean_prime)]);
    table.add_row(vec!["Somme".to_string(), format!("{:.1}", summary.mean_sum)]);
    println!("{table}");
}

pub fn display_combinations<const K: usize>(title: &str, records: &[Combination<K>], limit: usize) {
    println!("\n🤝 {}\n", title);
    if records.is_empty() {
        println!("  (Aucune combinaison sur cette plage)");
        return;
    }

    let mut table = new_table(vec!["#", "Numéros", "Apparitions"]);
    for (i, record) in records.iter().take(limit).enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_numbers(&record.numbers),
            record.count.to_string(),
        ]);
    }
    println!("{table}");
}

fn class_color(class: CycleClass) -> Color {
    match class {
        CycleClass::VeryHot => Color::Magenta,
        CycleClass::Hot => Color::Green,
        CycleClass::Cold => Color::Blue,
        CycleClass::Neutral => Color::White,
    }
}

pub fn display_cycles(title: &str, cycles: &[CycleRecord]) {
    println!("\n── {} ──", title);
    if cycles.is_empty() {
        println!("  (Aucun numéro)");
        return;
    }

    let mut table = new_table(vec!["Numéro", "Vezes", "Atraso", "Cycle"]);
    for cycle in cycles {
        table.add_row(vec![
            Cell::new(format!("{:2}", cycle.number)),
            Cell::new(cycle.vezes),
            Cell::new(cycle.atraso),
            Cell::new(cycle.class.to_string()).fg(class_color(cycle.class)),
        ]);
    }
    println!("{table}");
}

pub fn display_succession(reference: u8, records: &[SuccessionRecord]) {
    println!("\n➡️  Après la sortie du {:02}\n", reference);
    if records.is_empty() {
        println!("  (Aucun tirage suivant dans la plage)");
        return;
    }

    let mut table = new_table(vec!["Numéro", "Fois", "%", "Atraso"]);
    for record in records {
        table.add_row(vec![
            format!("{:2}", record.number),
            record.count.to_string(),
            format!("{:.1} %", record.percentage),
            record.delay.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_games(games: &[(Strategy, Vec<u8>)]) {
    println!("\n🎲 Grilles générées\n");
    let mut table = new_table(vec!["Stratégie", "Numéros"]);
    for (strategy, numbers) in games {
        table.add_row(vec![strategy.to_string(), format_numbers(numbers)]);
    }
    println!("{table}");
}

pub fn display_saved_games(games: &[SavedGame]) {
    if games.is_empty() {
        println!("Aucun jeu sauvegardé dans cette session.");
        return;
    }

    let mut table = new_table(vec!["#", "Libellé", "Numéros"]);
    for (i, game) in games.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            game.label.clone(),
            format_numbers(&game.numbers),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_and_prime_labels() {
        assert_eq!(parity_label(2), "Pair");
        assert_eq!(parity_label(59), "Impair");
        assert_eq!(prime_label(2), "Oui");
        assert_eq!(prime_label(59), "Oui");
        assert_eq!(prime_label(1), "Non");
        assert_eq!(prime_label(60), "Non");
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_numbers(&[1, 2, 33, 60]), "01 - 02 - 33 - 60");
        assert_eq!(format_numbers(&[]), "");
    }
}
