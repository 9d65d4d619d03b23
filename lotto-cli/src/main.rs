mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use lotto_analysis::analyzer::DEFAULT_RECENT_ROUNDS;
use lotto_analysis::prediction::DEFAULT_PREDICTION_SETS;
use lotto_analysis::{Analyzer, NumberScore, PredictionConfig};
use lotto_db::db::{
    count_draws, db_path, fetch_last_draws, insert_draw, is_cache_valid, last_updated,
    latest_round, migrate, open_db,
};
use lotto_db::models::{DrawRecord, PICK_COUNT, validate_draw};
use lotto_db::rusqlite::Connection;

use crate::display::{
    display_candidates, display_draws, display_frequency, display_hot_cold,
    display_import_summary, display_pattern, display_predictions, display_statistics,
    display_status,
};
use crate::import::ImportFormat;

#[derive(Parser)]
#[command(name = "lotto", about = "Analyseur statistique du Lotto 6/45")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone, Copy)]
struct Scope {
    /// Nombre de tirages récents à analyser
    #[arg(short, long, default_value = "100")]
    rounds: u32,

    /// Sortie JSON au lieu des tableaux
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages (réponses JSON du site officiel ou CSV)
    Import {
        /// Chemin vers le fichier
        #[arg(short, long)]
        file: PathBuf,

        /// Format du fichier (déduit de l'extension par défaut)
        #[arg(long, default_value = "auto")]
        format: ImportFormat,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// État du cache local
    Status,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Synthèse statistique
    Stats {
        #[command(flatten)]
        scope: Scope,
    },

    /// Fréquence de sortie de chaque numéro
    Frequency {
        #[command(flatten)]
        scope: Scope,
    },

    /// Numéros chauds et froids
    HotCold {
        #[command(flatten)]
        scope: Scope,

        /// Fenêtre récente (nombre de tirages)
        #[arg(short, long, default_value_t = DEFAULT_RECENT_ROUNDS)]
        window: usize,
    },

    /// Parité, tranches, consécutifs et sommes
    Pattern {
        #[command(flatten)]
        scope: Scope,
    },

    /// Suggérer des grilles (heuristique, sans valeur prédictive)
    Predict {
        #[command(flatten)]
        scope: Scope,

        /// Nombre de grilles à suggérer
        #[arg(short, long, default_value_t = DEFAULT_PREDICTION_SETS)]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Fichier JSON de configuration des poids
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Ajouter un tirage manuellement
    Add,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file, format } => cmd_import(&conn, &file, format),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Status => cmd_status(&conn),
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { scope } => cmd_stats(&conn, scope),
        Command::Frequency { scope } => cmd_frequency(&conn, scope),
        Command::HotCold { scope, window } => cmd_hot_cold(&conn, scope, window),
        Command::Pattern { scope } => cmd_pattern(&conn, scope),
        Command::Predict {
            scope,
            count,
            seed,
            config,
        } => cmd_predict(&conn, scope, count, seed, config.as_deref()),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &Connection, file: &Path, format: ImportFormat) -> Result<()> {
    let result = import::import_file(conn, file, format)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_status(conn: &Connection) -> Result<()> {
    let n = count_draws(conn)?;
    let latest = latest_round(conn)?;
    let updated = last_updated(conn)?;
    display_status(n, latest, updated, is_cache_valid(updated, Utc::now()));
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

/// Charge les `rounds` derniers tirages ; `None` si la base est vide.
fn load_analyzer(conn: &Connection, rounds: u32) -> Result<Option<Analyzer>> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto import");
        return Ok(None);
    }
    if rounds == 0 {
        bail!("--rounds doit être au moins 1");
    }
    if !is_cache_valid(last_updated(conn)?, Utc::now()) {
        log::warn!("Données locales de plus de 24 h, pensez à réimporter les derniers tirages");
    }

    let effective = rounds.min(n);
    let draws = fetch_last_draws(conn, effective)?;
    log::info!("{} tirages chargés pour l'analyse", draws.len());
    Ok(Some(Analyzer::new(draws)?))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_stats(conn: &Connection, scope: Scope) -> Result<()> {
    let Some(analyzer) = load_analyzer(conn, scope.rounds)? else {
        return Ok(());
    };
    let stats = analyzer.statistics();
    if scope.json {
        return print_json(&stats);
    }
    display_statistics(&stats);
    Ok(())
}

fn cmd_frequency(conn: &Connection, scope: Scope) -> Result<()> {
    let Some(analyzer) = load_analyzer(conn, scope.rounds)? else {
        return Ok(());
    };
    let frequency = analyzer.frequency();
    if scope.json {
        return print_json(&frequency);
    }
    display_frequency(&frequency, analyzer.total_rounds());
    Ok(())
}

fn cmd_hot_cold(conn: &Connection, scope: Scope, window: usize) -> Result<()> {
    let Some(analyzer) = load_analyzer(conn, scope.rounds)? else {
        return Ok(());
    };
    let hot_cold = analyzer.hot_cold(window)?;
    if scope.json {
        return print_json(&hot_cold);
    }
    display_hot_cold(&hot_cold);
    Ok(())
}

fn cmd_pattern(conn: &Connection, scope: Scope) -> Result<()> {
    let Some(analyzer) = load_analyzer(conn, scope.rounds)? else {
        return Ok(());
    };
    let pattern = analyzer.pattern();
    if scope.json {
        return print_json(&pattern);
    }
    display_pattern(&pattern, analyzer.total_rounds());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PredictionConfig> {
    let Some(path) = path else {
        return Ok(PredictionConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config: PredictionConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
struct PredictionOutput<'a> {
    seed: Option<u64>,
    candidates: &'a [NumberScore],
    predictions: &'a [[u8; PICK_COUNT]],
}

fn cmd_predict(
    conn: &Connection,
    scope: Scope,
    count: usize,
    seed: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(analyzer) = load_analyzer(conn, scope.rounds)? else {
        return Ok(());
    };

    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let candidates = analyzer.candidates(&config)?;
    let predictions = analyzer.predict_many_with(count, &config, &mut rng)?;

    if scope.json {
        return print_json(&PredictionOutput {
            seed,
            candidates: &candidates,
            predictions: &predictions,
        });
    }

    display_candidates(&candidates, config.fixed_picks);
    display_predictions(&predictions);
    println!("\nRappel : chaque tirage est indépendant, ces grilles n'augmentent pas les chances de gain.");
    Ok(())
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let round: u32 = prompt("Numéro du tirage (ex: 1150) : ")?
        .parse()
        .context("Numéro de tirage invalide")?;
    let raw_date = prompt("Date (JJ/MM/AAAA ou AAAA-MM-JJ) : ")?;
    let draw_date = import::parse_date(&raw_date)?;

    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    let draw = DrawRecord::new(round, numbers, bonus, draw_date)?;

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt("6 numéros (séparés par des espaces, 1-45) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == PICK_COUNT => {
                let mut arr = [0u8; PICK_COUNT];
                arr.copy_from_slice(&v);
                arr.sort();
                if validate_draw(&arr, None).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-45, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 6 numéros. Réessayez."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; PICK_COUNT]) -> Result<Option<u8>> {
    loop {
        let input = prompt("Numéro bonus (vide si inconnu) : ")?;
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse::<u8>() {
            Ok(b) if validate_draw(numbers, Some(b)).is_ok() => return Ok(Some(b)),
            _ => println!("Bonus invalide (1-45, hors des 6 numéros). Réessayez."),
        }
    }
}
