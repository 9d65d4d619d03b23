use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use lotto_analysis::{FrequencyResult, HotColdResult, NumberScore, PatternResult, StatisticsSummary};
use lotto_db::models::{DrawRecord, PICK_COUNT, bucket_index};

/// Couleur officielle des boules par tranche de dix.
fn ball_color(n: u8) -> Color {
    match bucket_index(n) {
        0 => Color::Yellow,
        1 => Color::Blue,
        2 => Color::Red,
        3 => Color::DarkGrey,
        _ => Color::Green,
    }
}

fn ball_cell(n: u8) -> Cell {
    Cell::new(format!("{:2}", n)).fg(ball_color(n))
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Numéros", "Bonus"]);

    for draw in draws {
        let numbers_str = draw.numbers
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");

        let bonus = match draw.bonus_number {
            Some(b) => format!("{:2}", b),
            None => "—".to_string(),
        };

        table.add_row(vec![
            &draw.round.to_string(),
            &draw.draw_date,
            &numbers_str,
            &bonus,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total entrées lues : {}", result.total_records);
    println!("  Insérés            : {}", result.inserted);
    println!("  Doublons ignorés   : {}", result.skipped);
    if result.not_drawn > 0 {
        println!("  Pas encore tirés   : {}", result.not_drawn);
    }
    if result.errors > 0 {
        println!("  Erreurs            : {}", result.errors);
    }
}

pub fn display_status(count: u32, latest: Option<u32>, updated: Option<DateTime<Utc>>, fresh: bool) {
    println!("Tirages en base   : {}", count);
    match latest {
        Some(r) => println!("Dernier tirage    : {}", r),
        None => println!("Dernier tirage    : —"),
    }
    match updated {
        Some(ts) => println!("Mis à jour        : {}", ts.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Mis à jour        : jamais"),
    }
    println!("Cache             : {}", if fresh { "à jour (< 24 h)" } else { "périmé" });
}

pub fn display_statistics(stats: &StatisticsSummary) {
    println!("\n📊 Synthèse sur {} tirages\n", stats.total_rounds);

    let mut table = new_table(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Tirages analysés".to_string(), stats.total_rounds.to_string()]);
    table.add_row(vec![
        "Numéro le plus fréquent".to_string(),
        format!("{} ({} fois)", stats.most_frequent.number, stats.most_frequent.count),
    ]);
    table.add_row(vec![
        "Numéro le moins fréquent".to_string(),
        format!("{} ({} fois)", stats.least_frequent.number, stats.least_frequent.count),
    ]);
    table.add_row(vec!["Parité".to_string(), stats.avg_odd_even.clone()]);
    table.add_row(vec!["Somme moyenne".to_string(), stats.avg_sum.to_string()]);
    table.add_row(vec!["Plage des sommes".to_string(), stats.sum_range.clone()]);
    table.add_row(vec!["Tirages avec consécutifs".to_string(), stats.consecutive_rate.clone()]);
    println!("{table}");
}

pub fn display_frequency(frequency: &FrequencyResult, rounds: usize) {
    println!("\n🔢 Fréquences sur {} tirages\n", rounds);

    println!("── Top 10 ──");
    let mut table = new_table(vec!["Numéro", "Sorties", "Taux"]);
    for item in &frequency.top10 {
        table.add_row(vec![
            ball_cell(item.number),
            Cell::new(item.count),
            Cell::new(format!("{:.0}%", item.count as f64 / rounds as f64 * 100.0)),
        ]);
    }
    println!("{table}");

    println!("\n── Les 10 moins sortis ──");
    let mut table = new_table(vec!["Numéro", "Sorties"]);
    for item in &frequency.bottom10 {
        table.add_row(vec![ball_cell(item.number), Cell::new(item.count)]);
    }
    println!("{table}");
}

pub fn display_hot_cold(hot_cold: &HotColdResult) {
    println!("\n🔥 Numéros chauds / ❄ froids sur les {} derniers tirages\n", hot_cold.window);

    let mut table = new_table(vec!["Chaud", "Sorties", "Froid", "Dernière sortie"]);
    for (hot, cold) in hot_cold.hot.iter().zip(hot_cold.cold.iter()) {
        let since = match hot_cold.last_seen(cold.number) {
            Some(0) => "dernier tirage".to_string(),
            Some(i) => format!("il y a {} tirages", i),
            None => "jamais".to_string(),
        };
        table.add_row(vec![
            ball_cell(hot.number),
            Cell::new(hot.count),
            ball_cell(cold.number),
            Cell::new(since),
        ]);
    }
    println!("{table}");
}

pub fn display_pattern(pattern: &PatternResult, rounds: usize) {
    println!("\n🧩 Motifs sur {} tirages\n", rounds);

    let odd_even = &pattern.odd_even;
    println!(
        "Parité      : impairs {} ({:.1}%) / pairs {} ({:.1}%)",
        odd_even.odd, odd_even.odd_percent, odd_even.even, odd_even.even_percent
    );
    println!(
        "Consécutifs : {:.1}% ({}/{} tirages)",
        pattern.consecutive_percent, pattern.consecutive, rounds
    );
    println!(
        "Sommes      : {} ~ {} (moyenne {})",
        pattern.sum_range.min, pattern.sum_range.max, pattern.sum_range.avg
    );

    println!("\n── Répartition par tranche ──");
    let total: u32 = pattern.ranges.iter().map(|r| r.count).sum();
    let mut table = new_table(vec!["Tranche", "Numéros sortis", "Part"]);
    for bucket in &pattern.ranges {
        let bar = "█".repeat((bucket.count as f64 / total.max(1) as f64 * 40.0).round() as usize);
        table.add_row(vec![
            Cell::new(bucket.label()).fg(ball_color(bucket.lower)),
            Cell::new(bucket.count),
            Cell::new(bar),
        ]);
    }
    println!("{table}");
}

pub fn display_candidates(candidates: &[NumberScore], fixed_picks: usize) {
    println!("\n🎯 Candidats (score heuristique)\n");

    let mut table = new_table(vec!["Rang", "Numéro", "Score", ""]);
    for (i, c) in candidates.iter().enumerate() {
        let tag = if i < fixed_picks { "retenu" } else { "" };
        table.add_row(vec![
            Cell::new(i + 1),
            ball_cell(c.number),
            Cell::new(format!("{:.2}", c.score)),
            Cell::new(tag),
        ]);
    }
    println!("{table}");
}

pub fn display_predictions(predictions: &[[u8; PICK_COUNT]]) {
    println!("\n🎲 Grilles suggérées\n");

    let mut header = vec!["#".to_string()];
    header.extend((1..=PICK_COUNT).map(|i| format!("N{}", i)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (i, grid) in predictions.iter().enumerate() {
        let mut row = vec![Cell::new(i + 1)];
        row.extend(grid.iter().map(|&n| ball_cell(n)));
        table.add_row(row);
    }
    println!("{table}");
}
