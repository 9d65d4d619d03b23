use rand::Rng;
use serde::Serialize;

use lotto_db::models::{MAX_NUMBER, PICK_COUNT, bucket_index};

use crate::analyzer::Analyzer;
use crate::config::PredictionConfig;
use crate::error::Result;

pub const DEFAULT_PREDICTION_SETS: usize = 3;
const RANKING_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberScore {
    pub number: u8,
    pub score: f64,
}

impl Analyzer {
    /// Score heuristique de chaque numéro, `table[0]` = numéro 1.
    pub fn score_table(&self, config: &PredictionConfig) -> Result<Vec<NumberScore>> {
        config.validate()?;

        let frequency = self.frequency();
        let hot_cold = self.hot_cold(config.hot_window)?;
        let pattern = self.pattern();

        let mut scores = vec![0.0f64; MAX_NUMBER as usize];

        for (rank, item) in frequency.top10.iter().enumerate() {
            scores[(item.number - 1) as usize] += (RANKING_SIZE - rank) as f64 * config.frequency_weight;
        }

        for (rank, item) in hot_cold.hot.iter().enumerate() {
            scores[(item.number - 1) as usize] += (RANKING_SIZE - rank) as f64 * config.hot_weight;
        }

        // Contre-courant : léger bonus aux plus froids
        for (rank, item) in hot_cold.cold.iter().take(config.cold_count).enumerate() {
            scores[(item.number - 1) as usize] += (config.cold_count - rank) as f64 * config.cold_weight;
        }

        let ratio = pattern.odd_even.ratio();
        for (i, score) in scores.iter_mut().enumerate() {
            let n = (i + 1) as u8;
            *score *= config.range_weights[bucket_index(n)];

            let even = n % 2 == 0;
            if even && ratio > config.odd_heavy_ratio {
                *score *= config.balance_boost;
            } else if !even && ratio < config.even_heavy_ratio {
                *score *= config.balance_boost;
            }
        }

        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(i, score)| NumberScore { number: (i + 1) as u8, score })
            .collect())
    }

    /// Les `candidate_pool` meilleurs scores, du plus haut au plus bas (tri stable).
    pub fn candidates(&self, config: &PredictionConfig) -> Result<Vec<NumberScore>> {
        let mut ranked = self.score_table(config)?;
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(config.candidate_pool);
        log::debug!(
            "Candidats : {}",
            ranked
                .iter()
                .map(|c| format!("{}={:.2}", c.number, c.score))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(ranked)
    }

    /// Une grille de 6 numéros distincts, triés. Le contenu dépend de `rng`.
    pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<[u8; PICK_COUNT]> {
        self.predict_with(&PredictionConfig::default(), rng)
    }

    pub fn predict_with<R: Rng + ?Sized>(
        &self,
        config: &PredictionConfig,
        rng: &mut R,
    ) -> Result<[u8; PICK_COUNT]> {
        let pool = self.candidates(config)?;
        Ok(select_numbers(&pool, config, rng))
    }

    pub fn predict_many<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<[u8; PICK_COUNT]>> {
        self.predict_many_with(count, &PredictionConfig::default(), rng)
    }

    /// `count` grilles tirées indépendamment, sans dédoublonnage entre elles.
    pub fn predict_many_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        config: &PredictionConfig,
        rng: &mut R,
    ) -> Result<Vec<[u8; PICK_COUNT]>> {
        let pool = self.candidates(config)?;
        Ok((0..count).map(|_| select_numbers(&pool, config, &mut *rng)).collect())
    }
}

/// Les `fixed_picks` premiers candidats sont retenus d'office, le reste est
/// tiré uniformément dans le pool avec rejet des doublons. `validate` garantit
/// `pool.len() >= PICK_COUNT`, le remplissage final ne peut donc pas échouer.
fn select_numbers<R: Rng + ?Sized>(
    pool: &[NumberScore],
    config: &PredictionConfig,
    rng: &mut R,
) -> [u8; PICK_COUNT] {
    let mut selected: Vec<u8> = pool.iter().take(config.fixed_picks).map(|c| c.number).collect();

    let mut attempts = 0;
    while selected.len() < PICK_COUNT && attempts < config.max_draw_attempts {
        attempts += 1;
        let candidate = pool[rng.random_range(0..pool.len())].number;
        if !selected.contains(&candidate) {
            selected.push(candidate);
        }
    }

    if selected.len() < PICK_COUNT {
        log::warn!(
            "Tirage aléatoire abandonné après {} essais, complétion par rang",
            attempts
        );
        for c in pool {
            if selected.len() >= PICK_COUNT {
                break;
            }
            if !selected.contains(&c.number) {
                selected.push(c.number);
            }
        }
    }

    let mut grid = [0u8; PICK_COUNT];
    grid.copy_from_slice(&selected[..PICK_COUNT]);
    grid.sort();
    grid
}
