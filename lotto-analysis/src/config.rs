use serde::{Deserialize, Serialize};

use lotto_db::models::{MAX_NUMBER, PICK_COUNT};

use crate::error::{AnalysisError, Result};

/// Poids et tailles de l'heuristique de suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Multiplicateur du rang dans le top 10 des fréquences.
    pub frequency_weight: f64,
    pub hot_weight: f64,
    /// Bonus à contre-courant pour les numéros les plus froids.
    pub cold_weight: f64,
    pub cold_count: usize,
    /// Fenêtre (en tirages) des numéros chauds et froids.
    pub hot_window: usize,
    pub range_weights: [f64; 5],
    /// Au-dessus de ce rapport impairs/pairs, les pairs sont favorisés.
    pub odd_heavy_ratio: f64,
    /// En dessous de ce rapport, les impairs sont favorisés.
    pub even_heavy_ratio: f64,
    pub balance_boost: f64,
    pub candidate_pool: usize,
    pub fixed_picks: usize,
    pub max_draw_attempts: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            frequency_weight: 2.0,
            hot_weight: 1.5,
            cold_weight: 0.5,
            cold_count: 5,
            hot_window: 10,
            range_weights: [1.2, 1.2, 1.2, 1.2, 1.0],
            odd_heavy_ratio: 1.2,
            even_heavy_ratio: 0.8,
            balance_boost: 1.1,
            candidate_pool: 15,
            fixed_picks: 3,
            max_draw_attempts: 1000,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("frequency_weight", self.frequency_weight),
            ("hot_weight", self.hot_weight),
            ("cold_weight", self.cold_weight),
            ("balance_boost", self.balance_boost),
            ("odd_heavy_ratio", self.odd_heavy_ratio),
            ("even_heavy_ratio", self.even_heavy_ratio),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return invalid(format!("{name} doit être un réel positif (reçu {w})"));
            }
        }
        if self.range_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid(format!("range_weights invalides : {:?}", self.range_weights));
        }
        if self.even_heavy_ratio > self.odd_heavy_ratio {
            return invalid(format!(
                "even_heavy_ratio ({}) doit être <= odd_heavy_ratio ({})",
                self.even_heavy_ratio, self.odd_heavy_ratio
            ));
        }
        if self.hot_window == 0 {
            return invalid("hot_window doit être >= 1".into());
        }
        if self.cold_count > 10 {
            return invalid(format!("cold_count doit être <= 10 (reçu {})", self.cold_count));
        }
        if self.candidate_pool < PICK_COUNT || self.candidate_pool > MAX_NUMBER as usize {
            return invalid(format!(
                "candidate_pool doit être entre {} et {} (reçu {})",
                PICK_COUNT, MAX_NUMBER, self.candidate_pool
            ));
        }
        if self.fixed_picks > PICK_COUNT {
            return invalid(format!(
                "fixed_picks doit être <= {} (reçu {})",
                PICK_COUNT, self.fixed_picks
            ));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Result<()> {
    Err(AnalysisError::InvalidConfig(msg))
}
