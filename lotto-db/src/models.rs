use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const MAX_NUMBER: u8 = 45;
pub const PICK_COUNT: usize = 6;

/// Tranches fixes utilisées pour l'histogramme et la couleur des boules.
pub const BUCKETS: [(u8, u8); 5] = [(1, 10), (11, 20), (21, 30), (31, 40), (41, 45)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub round: u32,
    pub numbers: [u8; PICK_COUNT],
    pub bonus_number: Option<u8>,
    pub draw_date: String,
}

impl DrawRecord {
    /// Construit un tirage validé, numéros triés par ordre croissant.
    pub fn new(
        round: u32,
        mut numbers: [u8; PICK_COUNT],
        bonus_number: Option<u8>,
        draw_date: impl Into<String>,
    ) -> Result<Self> {
        numbers.sort();
        let draw = Self {
            round,
            numbers,
            bonus_number,
            draw_date: draw_date.into(),
        };
        draw.validate()?;
        Ok(draw)
    }

    /// Vérifie un tirage construit champ par champ : round > 0, numéros
    /// strictement croissants, puis `validate_draw`.
    pub fn validate(&self) -> Result<()> {
        if self.round == 0 {
            bail!("Numéro de tirage invalide : 0");
        }
        validate_draw(&self.numbers, self.bonus_number)?;
        if !self.numbers.windows(2).all(|w| w[0] < w[1]) {
            bail!("Numéros non triés : {:?}", self.numbers);
        }
        Ok(())
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }

    pub fn has_consecutive(&self) -> bool {
        self.numbers.windows(2).any(|w| w[1] == w[0] + 1)
    }
}

/// Index de tranche (0..5) d'un numéro 1..=45.
pub fn bucket_index(n: u8) -> usize {
    match n {
        0..=10 => 0,
        11..=20 => 1,
        21..=30 => 2,
        31..=40 => 3,
        _ => 4,
    }
}

pub fn validate_draw(numbers: &[u8; PICK_COUNT], bonus_number: Option<u8>) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > MAX_NUMBER {
            bail!("Numéro {} hors limites (1-{})", n, MAX_NUMBER);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    if let Some(bonus) = bonus_number {
        if bonus < 1 || bonus > MAX_NUMBER {
            bail!("Numéro bonus {} hors limites (1-{})", bonus, MAX_NUMBER);
        }
        if numbers.contains(&bonus) {
            bail!("Le numéro bonus {} figure déjà dans le tirage", bonus);
        }
    }
    Ok(())
}

/// Historique synthétique, du plus récent (round le plus haut) au plus ancien.
pub fn make_test_draws(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let base = ((i * 7) % 40) as u8;
            let mut numbers = [
                base + 1,
                (base + 4) % 45 + 1,
                (base + 11) % 45 + 1,
                (base + 19) % 45 + 1,
                (base + 27) % 45 + 1,
                (base + 36) % 45 + 1,
            ];
            numbers.sort();
            DrawRecord {
                round: (n - i) as u32,
                numbers,
                bonus_number: None,
                draw_date: format!("2024-{:02}-{:02}", (i / 28) % 12 + 1, (i % 28) + 1),
            }
        })
        .collect()
}
