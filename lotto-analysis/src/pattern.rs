use serde::Serialize;

use lotto_db::models::{BUCKETS, bucket_index};

use crate::analyzer::{Analyzer, NumberCount, percent};

#[derive(Debug, Clone, Serialize)]
pub struct OddEven {
    pub odd: u32,
    pub even: u32,
    pub odd_percent: f64,
    pub even_percent: f64,
}

impl OddEven {
    /// Rapport impairs / pairs ; infini si aucun numéro pair n'est sorti.
    pub fn ratio(&self) -> f64 {
        self.odd as f64 / self.even as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeBucket {
    pub lower: u8,
    pub upper: u8,
    pub count: u32,
}

impl RangeBucket {
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SumRange {
    pub min: u32,
    pub max: u32,
    pub avg: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternResult {
    pub odd_even: OddEven,
    pub ranges: Vec<RangeBucket>,
    /// Nombre de tirages contenant au moins deux numéros consécutifs.
    pub consecutive: u32,
    pub consecutive_percent: f64,
    pub sum_range: SumRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSummary {
    pub total_rounds: usize,
    pub most_frequent: NumberCount,
    pub least_frequent: NumberCount,
    pub odd_percent: f64,
    pub even_percent: f64,
    pub avg_odd_even: String,
    pub avg_sum: u32,
    pub sum_range: String,
    pub consecutive_rate: String,
}

impl Analyzer {
    pub fn pattern(&self) -> PatternResult {
        let numbers = self.all_numbers();

        let odd = numbers.iter().filter(|&&n| n % 2 == 1).count() as u32;
        let even = numbers.len() as u32 - odd;
        let odd_even = OddEven {
            odd,
            even,
            odd_percent: percent(odd, numbers.len()),
            even_percent: percent(even, numbers.len()),
        };

        let mut ranges: Vec<RangeBucket> = BUCKETS
            .iter()
            .map(|&(lower, upper)| RangeBucket { lower, upper, count: 0 })
            .collect();
        for &n in numbers {
            ranges[bucket_index(n)].count += 1;
        }

        let draws = self.draws();
        let consecutive = draws.iter().filter(|d| d.has_consecutive()).count() as u32;

        let mut min = u32::MAX;
        let mut max = 0u32;
        let mut total_sum = 0u64;
        for draw in draws {
            let sum = draw.sum();
            min = min.min(sum);
            max = max.max(sum);
            total_sum += sum as u64;
        }
        let avg = (total_sum as f64 / draws.len() as f64).round() as u32;

        PatternResult {
            odd_even,
            ranges,
            consecutive,
            consecutive_percent: percent(consecutive, draws.len()),
            sum_range: SumRange { min, max, avg },
        }
    }

    /// Synthèse affichable, composée à partir de la fréquence et des motifs.
    pub fn statistics(&self) -> StatisticsSummary {
        let frequency = self.frequency();
        let pattern = self.pattern();

        StatisticsSummary {
            total_rounds: self.total_rounds(),
            most_frequent: frequency.top10[0],
            least_frequent: frequency.bottom10[0],
            odd_percent: pattern.odd_even.odd_percent,
            even_percent: pattern.odd_even.even_percent,
            avg_odd_even: format!(
                "Impairs {:.1}% / Pairs {:.1}%",
                pattern.odd_even.odd_percent, pattern.odd_even.even_percent
            ),
            avg_sum: pattern.sum_range.avg,
            sum_range: format!("{} ~ {}", pattern.sum_range.min, pattern.sum_range.max),
            consecutive_rate: format!("{:.1}%", pattern.consecutive_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_db::models::{DrawRecord, make_test_draws};

    fn draw(round: u32, numbers: [u8; 6]) -> DrawRecord {
        DrawRecord::new(round, numbers, None, "2024-01-06").unwrap()
    }

    #[test]
    fn test_single_record_odd_even() {
        let analyzer = Analyzer::new(vec![draw(1, [5, 12, 23, 34, 44, 45])]).unwrap();
        let p = analyzer.pattern();
        assert_eq!(p.odd_even.odd, 3);
        assert_eq!(p.odd_even.even, 3);
        assert_eq!(p.odd_even.odd_percent, 50.0);
        assert_eq!(p.odd_even.even_percent, 50.0);
        assert!((p.odd_even.ratio() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_records_pattern() {
        let draws: Vec<DrawRecord> = (1..=10).rev().map(|r| draw(r, [1, 2, 3, 4, 5, 6])).collect();
        let p = Analyzer::new(draws).unwrap().pattern();
        assert_eq!(p.consecutive, 10);
        assert_eq!(p.consecutive_percent, 100.0);
        assert_eq!(p.sum_range, SumRange { min: 21, max: 21, avg: 21 });
        assert_eq!(p.ranges[0].count, 60);
        assert!(p.ranges[1..].iter().all(|r| r.count == 0));
    }

    #[test]
    fn test_ranges_partition_all_numbers() {
        for n in [1, 13, 45, 90] {
            let p = Analyzer::new(make_test_draws(n)).unwrap().pattern();
            let total: u32 = p.ranges.iter().map(|r| r.count).sum();
            assert_eq!(total, (n * 6) as u32);
            let labels: Vec<String> = p.ranges.iter().map(|r| r.label()).collect();
            assert_eq!(labels, vec!["1-10", "11-20", "21-30", "31-40", "41-45"]);
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        let p = Analyzer::new(vec![draw(1, [10, 11, 20, 21, 40, 41])]).unwrap().pattern();
        let counts: Vec<u32> = p.ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 1, 1]);
    }

    #[test]
    fn test_odd_even_percent_sums_to_hundred() {
        for n in [1, 3, 7, 50] {
            let p = Analyzer::new(make_test_draws(n)).unwrap().pattern();
            let total = p.odd_even.odd_percent + p.odd_even.even_percent;
            assert!((total - 100.0).abs() <= 0.1 + 1e-9, "n={n} total={total}");
            assert_eq!(p.odd_even.odd + p.odd_even.even, (n * 6) as u32);
        }
    }

    #[test]
    fn test_consecutive_rate_and_sums() {
        let draws = vec![
            draw(3, [1, 3, 5, 7, 9, 11]),
            draw(2, [2, 3, 10, 20, 30, 40]),
            draw(1, [40, 41, 42, 43, 44, 45]),
        ];
        let p = Analyzer::new(draws).unwrap().pattern();
        assert_eq!(p.consecutive, 2);
        assert_eq!(p.consecutive_percent, 66.7);
        assert_eq!(p.sum_range.min, 36);
        assert_eq!(p.sum_range.max, 255);
        // (36 + 105 + 255) / 3 = 132
        assert_eq!(p.sum_range.avg, 132);
    }

    #[test]
    fn test_average_sum_rounds_half_up() {
        // Sommes 21 et 22 : moyenne 21.5 -> 22
        let draws = vec![draw(2, [1, 2, 3, 4, 5, 6]), draw(1, [1, 2, 3, 4, 5, 7])];
        let p = Analyzer::new(draws).unwrap().pattern();
        assert_eq!(p.sum_range.avg, 22);
    }

    #[test]
    fn test_statistics_summary() {
        let draws: Vec<DrawRecord> = (1..=10).rev().map(|r| draw(r, [1, 2, 3, 4, 5, 6])).collect();
        let stats = Analyzer::new(draws).unwrap().statistics();
        assert_eq!(stats.total_rounds, 10);
        assert_eq!(stats.most_frequent, NumberCount { number: 1, count: 10 });
        assert_eq!(stats.least_frequent, NumberCount { number: 45, count: 0 });
        assert_eq!(stats.avg_odd_even, "Impairs 50.0% / Pairs 50.0%");
        assert_eq!(stats.avg_sum, 21);
        assert_eq!(stats.sum_range, "21 ~ 21");
        assert_eq!(stats.consecutive_rate, "100.0%");
    }
}
