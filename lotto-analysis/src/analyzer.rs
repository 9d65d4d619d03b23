use std::collections::HashSet;

use serde::Serialize;

use lotto_db::models::{DrawRecord, MAX_NUMBER};

use crate::error::{AnalysisError, Result};

pub const DEFAULT_RECENT_ROUNDS: usize = 10;
const RANKING_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyResult {
    /// Une entrée par numéro, de 1 à 45.
    pub table: Vec<NumberCount>,
    pub top10: Vec<NumberCount>,
    pub bottom10: Vec<NumberCount>,
}

impl FrequencyResult {
    /// `None` hors de 1..=45.
    pub fn count(&self, number: u8) -> Option<u32> {
        let idx = number.checked_sub(1)? as usize;
        self.table.get(idx).map(|c| c.count)
    }

    pub fn total(&self) -> u32 {
        self.table.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HotColdResult {
    /// Nombre de tirages réellement couverts par la fenêtre.
    pub window: usize,
    pub hot: Vec<NumberCount>,
    pub cold: Vec<NumberCount>,
    /// Index (0 = plus récent) du dernier tirage contenant le numéro, sur tout l'historique.
    pub last_appearance: Vec<Option<usize>>,
}

impl HotColdResult {
    /// `None` si le numéro n'est jamais sorti ou hors de 1..=45.
    pub fn last_seen(&self, number: u8) -> Option<usize> {
        let idx = number.checked_sub(1)? as usize;
        self.last_appearance.get(idx).copied().flatten()
    }
}

/// Analyse d'un historique de tirages, `draws[0]` = le plus récent.
#[derive(Debug, Clone)]
pub struct Analyzer {
    draws: Vec<DrawRecord>,
    all_numbers: Vec<u8>,
}

impl Analyzer {
    pub fn new(draws: Vec<DrawRecord>) -> Result<Self> {
        if draws.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "historique vide, au moins un tirage est nécessaire".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(draws.len());
        for draw in &draws {
            if !seen.insert(draw.round) {
                return Err(AnalysisError::DuplicateRound(draw.round));
            }
            draw.validate().map_err(|e| {
                AnalysisError::InvalidInput(format!("tirage {} : {}", draw.round, e))
            })?;
        }

        let all_numbers = draws.iter().flat_map(|d| d.numbers).collect();
        Ok(Self { draws, all_numbers })
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn total_rounds(&self) -> usize {
        self.draws.len()
    }

    pub(crate) fn all_numbers(&self) -> &[u8] {
        &self.all_numbers
    }

    /// Fréquence de chaque numéro sur tout l'historique.
    ///
    /// `top10` : tri stable par fréquence décroissante, les ex-aequo restent
    /// par numéro croissant. `bottom10` : les dix dernières entrées de ce même
    /// classement, inversées (le moins fréquent d'abord ; à égalité, le plus
    /// grand numéro d'abord).
    pub fn frequency(&self) -> FrequencyResult {
        let table = count_table(self.all_numbers.iter().copied());

        let mut sorted = table.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));

        let top10 = sorted.iter().take(RANKING_SIZE).copied().collect();
        let bottom10 = sorted.iter().rev().take(RANKING_SIZE).copied().collect();

        FrequencyResult { table, top10, bottom10 }
    }

    /// Numéros chauds et froids sur les `recent_rounds` derniers tirages.
    pub fn hot_cold(&self, recent_rounds: usize) -> Result<HotColdResult> {
        if recent_rounds == 0 {
            return Err(AnalysisError::InvalidInput(
                "la fenêtre récente doit contenir au moins un tirage".into(),
            ));
        }

        let window = recent_rounds.min(self.draws.len());
        let recent = count_table(self.draws[..window].iter().flat_map(|d| d.numbers));

        let mut hot = recent.clone();
        hot.sort_by(|a, b| b.count.cmp(&a.count));
        hot.truncate(RANKING_SIZE);

        let mut cold = recent;
        cold.sort_by(|a, b| a.count.cmp(&b.count));
        cold.truncate(RANKING_SIZE);

        let mut last_appearance = vec![None; MAX_NUMBER as usize];
        for (i, draw) in self.draws.iter().enumerate() {
            for &n in &draw.numbers {
                let slot = &mut last_appearance[(n - 1) as usize];
                if slot.is_none() {
                    *slot = Some(i);
                }
            }
        }

        Ok(HotColdResult { window, hot, cold, last_appearance })
    }
}

fn count_table(numbers: impl Iterator<Item = u8>) -> Vec<NumberCount> {
    let mut table: Vec<NumberCount> = (1..=MAX_NUMBER)
        .map(|number| NumberCount { number, count: 0 })
        .collect();
    for n in numbers {
        table[(n - 1) as usize].count += 1;
    }
    table
}

/// Arrondi au dixième, demi vers le haut.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn percent(part: u32, total: usize) -> f64 {
    round_tenth(part as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_db::models::{PICK_COUNT, make_test_draws};

    fn expected_total(rounds: usize) -> u32 {
        (rounds * PICK_COUNT) as u32
    }

    fn repeated(numbers: [u8; 6], n: usize) -> Vec<DrawRecord> {
        (0..n)
            .map(|i| DrawRecord {
                round: (n - i) as u32,
                numbers,
                bonus_number: None,
                draw_date: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_empty_history_rejected() {
        let err = Analyzer::new(vec![]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)), "{err}");
    }

    #[test]
    fn test_duplicate_round_rejected() {
        let mut draws = make_test_draws(5);
        draws[3].round = draws[1].round;
        let dup = draws[1].round;
        assert_eq!(Analyzer::new(draws).unwrap_err(), AnalysisError::DuplicateRound(dup));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut draws = make_test_draws(3);
        draws[0].numbers = [0, 2, 3, 4, 5, 6];
        assert!(matches!(Analyzer::new(draws), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_unsorted_numbers_rejected() {
        let draws = vec![DrawRecord {
            round: 1,
            numbers: [2, 1, 10, 20, 30, 40],
            bonus_number: None,
            draw_date: String::new(),
        }];
        assert!(matches!(Analyzer::new(draws), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_round_zero_rejected() {
        let draws = vec![DrawRecord {
            round: 0,
            numbers: [1, 2, 10, 20, 30, 40],
            bonus_number: None,
            draw_date: String::new(),
        }];
        assert!(matches!(Analyzer::new(draws), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_frequency_sums_to_six_per_round() {
        for n in [1, 7, 45, 120] {
            let analyzer = Analyzer::new(make_test_draws(n)).unwrap();
            let freq = analyzer.frequency();
            assert_eq!(freq.table.len(), 45);
            assert_eq!(freq.total(), expected_total(n));
        }
    }

    #[test]
    fn test_frequency_every_number_present() {
        let analyzer = Analyzer::new(make_test_draws(3)).unwrap();
        let freq = analyzer.frequency();
        let numbers: Vec<u8> = freq.table.iter().map(|c| c.number).collect();
        assert_eq!(numbers, (1..=45).collect::<Vec<u8>>());
    }

    #[test]
    fn test_frequency_identical_records() {
        let analyzer = Analyzer::new(repeated([1, 2, 3, 4, 5, 6], 10)).unwrap();
        let freq = analyzer.frequency();
        for n in 1..=6 {
            assert_eq!(freq.count(n), Some(10));
        }
        for n in 7..=45 {
            assert_eq!(freq.count(n), Some(0));
        }

        let top: Vec<u8> = freq.top10.iter().map(|c| c.number).collect();
        assert_eq!(top, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        // Ex-aequo à 0 : le plus grand numéro sort en premier du bas de classement.
        let bottom: Vec<u8> = freq.bottom10.iter().map(|c| c.number).collect();
        assert_eq!(bottom, vec![45, 44, 43, 42, 41, 40, 39, 38, 37, 36]);
    }

    #[test]
    fn test_top_and_bottom_disjoint() {
        let analyzer = Analyzer::new(make_test_draws(60)).unwrap();
        let freq = analyzer.frequency();
        for c in &freq.top10 {
            assert!(!freq.bottom10.iter().any(|b| b.number == c.number));
        }
        assert!(freq.top10[0].count >= freq.top10[9].count);
        assert!(freq.bottom10[0].count <= freq.bottom10[9].count);
    }

    #[test]
    fn test_hot_cold_window() {
        let mut draws: Vec<DrawRecord> = repeated([1, 2, 3, 4, 5, 6], 3)
            .into_iter()
            .map(|mut d| {
                d.round += 100;
                d
            })
            .collect();
        draws.extend(repeated([40, 41, 42, 43, 44, 45], 5));
        // Ordre de récence : les trois premiers tirages sont les plus récents.
        let analyzer = Analyzer::new(draws).unwrap();
        let hc = analyzer.hot_cold(3).unwrap();
        assert_eq!(hc.window, 3);
        let hot: Vec<u8> = hc.hot.iter().take(6).map(|c| c.number).collect();
        assert_eq!(hot, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(hc.hot[0].count, 3);
        assert!(hc.cold.iter().all(|c| c.count == 0));
        let cold: Vec<u8> = hc.cold.iter().map(|c| c.number).collect();
        assert_eq!(cold, vec![7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_hot_cold_window_clamped() {
        let analyzer = Analyzer::new(make_test_draws(4)).unwrap();
        let hc = analyzer.hot_cold(50).unwrap();
        assert_eq!(hc.window, 4);
        let total: u32 = hc.hot.iter().map(|c| c.count).sum();
        assert!(total <= 24);
    }

    #[test]
    fn test_hot_cold_zero_window_rejected() {
        let analyzer = Analyzer::new(make_test_draws(4)).unwrap();
        assert!(matches!(analyzer.hot_cold(0), Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_last_appearance_first_match_wins() {
        let draws = vec![
            DrawRecord { round: 3, numbers: [1, 2, 3, 4, 5, 6], bonus_number: None, draw_date: String::new() },
            DrawRecord { round: 2, numbers: [1, 7, 8, 9, 10, 11], bonus_number: None, draw_date: String::new() },
            DrawRecord { round: 1, numbers: [7, 20, 21, 22, 23, 24], bonus_number: None, draw_date: String::new() },
        ];
        let analyzer = Analyzer::new(draws).unwrap();
        // Fenêtre d'un seul tirage : la dernière apparition reste calculée sur tout l'historique.
        let hc = analyzer.hot_cold(1).unwrap();
        assert_eq!(hc.last_seen(1), Some(0));
        assert_eq!(hc.last_seen(7), Some(1));
        assert_eq!(hc.last_seen(24), Some(2));
        assert_eq!(hc.last_seen(45), None);
    }

    #[test]
    fn test_lookups_out_of_range() {
        let analyzer = Analyzer::new(make_test_draws(5)).unwrap();
        let freq = analyzer.frequency();
        assert_eq!(freq.count(0), None);
        assert_eq!(freq.count(46), None);
        assert!(freq.count(45).is_some());

        let hc = analyzer.hot_cold(DEFAULT_RECENT_ROUNDS).unwrap();
        assert_eq!(hc.last_seen(0), None);
        assert_eq!(hc.last_seen(46), None);
    }

    #[test]
    fn test_last_appearance_none_iff_absent() {
        let analyzer = Analyzer::new(make_test_draws(8)).unwrap();
        let freq = analyzer.frequency();
        let hc = analyzer.hot_cold(DEFAULT_RECENT_ROUNDS).unwrap();
        for n in 1..=45u8 {
            assert_eq!(hc.last_seen(n).is_none(), freq.count(n) == Some(0), "numéro {n}");
        }
    }

    #[test]
    fn test_round_tenth_half_up() {
        assert_eq!(round_tenth(12.25), 12.3);
        assert_eq!(round_tenth(66.64), 66.6);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(3, 3), 100.0);
    }
}
