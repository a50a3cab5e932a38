//! Procedural generation of obstacle rows and coin clusters
//!
//! Rows split the panel into equal slots, each an obstacle with some
//! probability. Every row keeps at least one gap wide enough for the player.
//! Coins are rejection-sampled into the band above a fresh row.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::Difficulty;
use super::state::Entity;
use crate::consts::{MAX_COIN_ATTEMPTS, MAX_COINS_PER_ROW};
use crate::settings::GameConfig;

/// Horizontal extent of one obstacle in a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpan {
    pub x: f32,
    pub width: f32,
}

/// Inputs to row generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowParams {
    pub panel_width: f32,
    /// Nominal slot width (two player widths plus a margin)
    pub slot_width: f32,
    pub obstacle_probability: f32,
    pub min_gap_width: f32,
}

impl RowParams {
    pub fn new(config: &GameConfig, difficulty: &Difficulty) -> Self {
        Self {
            panel_width: config.panel_width,
            slot_width: config.slot_width(),
            obstacle_probability: difficulty.obstacle_probability,
            min_gap_width: difficulty.min_gap_width,
        }
    }

    /// Number of slots the panel splits into
    pub fn slot_count(&self) -> usize {
        if !(self.panel_width > 0.0 && self.slot_width > 0.0) || !self.panel_width.is_finite() {
            return 0;
        }
        (self.panel_width / self.slot_width).floor() as usize
    }
}

/// Seeded generator for rows and coins
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restart the random sequence
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    fn coinflip(&mut self, probability: f32) -> bool {
        if probability >= 1.0 {
            return true;
        }
        self.rng.random::<f32>() < probability
    }

    /// Generate one row of obstacle spans.
    ///
    /// Spans are disjoint, sorted by `x`, and never cover the whole panel.
    /// A panel narrower than one slot yields no spans.
    pub fn generate_row(&mut self, params: &RowParams) -> Vec<ObstacleSpan> {
        let n = params.slot_count();
        if n == 0 {
            log::debug!(
                "Panel width {} too narrow for a {}px slot, empty row",
                params.panel_width,
                params.slot_width
            );
            return Vec::new();
        }

        let probability = if params.obstacle_probability.is_nan() {
            0.0
        } else {
            params.obstacle_probability.clamp(0.0, 1.0)
        };
        let part_width = params.panel_width / n as f32;

        let mut is_obstacle: Vec<bool> = (0..n).map(|_| self.coinflip(probability)).collect();

        // At least one gap
        if is_obstacle.iter().all(|&o| o) {
            let slot = self.rng.random_range(0..n);
            is_obstacle[slot] = false;
        }

        let needed = slots_for_gap(params.min_gap_width, part_width, n);
        if widest_gap(&is_obstacle) < needed {
            self.widen_gap(&mut is_obstacle, needed);
        }

        coalesce(&is_obstacle, part_width)
    }

    /// Grow a run of gap slots around a random existing gap until it spans
    /// `needed` slots
    fn widen_gap(&mut self, is_obstacle: &mut [bool], needed: usize) {
        let gaps: Vec<usize> = (0..is_obstacle.len()).filter(|&i| !is_obstacle[i]).collect();
        let Some(&anchor) = gaps.get(self.rng.random_range(0..gaps.len().max(1))) else {
            return;
        };

        let last = is_obstacle.len() - 1;
        let (mut lo, mut hi) = gap_run_around(is_obstacle, anchor);
        while hi - lo + 1 < needed {
            let grow_right = match (lo > 0, hi < last) {
                (true, true) => self.rng.random::<bool>(),
                (false, true) => true,
                (true, false) => false,
                (false, false) => break,
            };
            if grow_right {
                is_obstacle[hi + 1] = false;
            } else {
                is_obstacle[lo - 1] = false;
            }
            (lo, hi) = gap_run_around(is_obstacle, if grow_right { hi + 1 } else { lo - 1 });
        }
    }

    /// Generate a batch of non-overlapping coins above a fresh row.
    ///
    /// Count is `min_coins + [0, extra_coins_max]`, at most
    /// `MAX_COINS_PER_ROW`. Coins are only checked
    /// against this batch. A coin that cannot be placed within
    /// `coin_max_attempts` candidates truncates the batch.
    pub fn generate_coins(
        &mut self,
        config: &GameConfig,
        area_height: f32,
        min_coins: u32,
    ) -> Vec<Entity> {
        let count = min_coins
            .saturating_add(self.rng.random_range(0..=config.extra_coins_max))
            .min(MAX_COINS_PER_ROW);
        if count == 0 {
            return Vec::new();
        }

        let d = config.coin_diameter;
        let min = Vec2::new(d, -(config.row_height + area_height - d));
        let max = Vec2::new(config.panel_width - 2.0 * d, -(config.row_height + 2.0 * d));
        if !(d > 0.0 && min.is_finite() && max.is_finite() && max.x > min.x && max.y > min.y) {
            log::debug!("No room for coins (area {area_height}, panel {})", config.panel_width);
            return Vec::new();
        }

        let mut batch: Vec<Entity> = Vec::new();
        'coins: for _ in 0..count {
            for _ in 0..config.coin_max_attempts.clamp(1, MAX_COIN_ATTEMPTS) {
                let pos = Vec2::new(
                    self.rng.random_range(min.x..max.x),
                    self.rng.random_range(min.y..max.y),
                );
                let candidate = Entity::coin(pos, d);
                if !batch.iter().any(|coin| candidate.collides_with(coin)) {
                    batch.push(candidate);
                    continue 'coins;
                }
            }
            log::debug!("Coin batch truncated to {} of {}", batch.len(), count);
            break;
        }
        batch
    }
}

/// Slots needed for a gap of `min_gap_width`, at least one and at most all
fn slots_for_gap(min_gap_width: f32, part_width: f32, n: usize) -> usize {
    if !(min_gap_width > 0.0) || !min_gap_width.is_finite() {
        return 1;
    }
    ((min_gap_width / part_width).ceil() as usize).clamp(1, n)
}

/// Length of the longest run of gap slots
fn widest_gap(is_obstacle: &[bool]) -> usize {
    let mut widest = 0;
    let mut run = 0;
    for &obstacle in is_obstacle {
        run = if obstacle { 0 } else { run + 1 };
        widest = widest.max(run);
    }
    widest
}

/// Inclusive bounds of the gap run containing `index`
fn gap_run_around(is_obstacle: &[bool], index: usize) -> (usize, usize) {
    let mut lo = index;
    while lo > 0 && !is_obstacle[lo - 1] {
        lo -= 1;
    }
    let mut hi = index;
    while hi + 1 < is_obstacle.len() && !is_obstacle[hi + 1] {
        hi += 1;
    }
    (lo, hi)
}

/// Merge consecutive obstacle slots into spans
fn coalesce(is_obstacle: &[bool], part_width: f32) -> Vec<ObstacleSpan> {
    let n = is_obstacle.len();
    let mut spans = Vec::new();
    let mut run = 0usize;
    for i in 0..=n {
        if i < n && is_obstacle[i] {
            run += 1;
        } else if run > 0 {
            spans.push(ObstacleSpan {
                x: (i - run) as f32 * part_width,
                width: run as f32 * part_width,
            });
            run = 0;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(panel_width: f32, probability: f32, min_gap_width: f32) -> RowParams {
        RowParams {
            panel_width,
            slot_width: 100.0,
            obstacle_probability: probability,
            min_gap_width,
        }
    }

    fn covered(spans: &[ObstacleSpan]) -> f32 {
        spans.iter().map(|s| s.width).sum()
    }

    #[test]
    fn test_full_probability_leaves_one_gap() {
        let mut spawner = Spawner::new(42);
        for _ in 0..50 {
            let spans = spawner.generate_row(&params(800.0, 1.0, 0.0));
            let width = covered(&spans);
            assert!((width - 700.0).abs() < 1e-3, "covered {width}");
        }
    }

    #[test]
    fn test_zero_probability_is_empty_row() {
        let mut spawner = Spawner::new(42);
        assert!(spawner.generate_row(&params(800.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_narrow_panel() {
        let mut spawner = Spawner::new(1);
        assert!(spawner.generate_row(&params(60.0, 1.0, 0.0)).is_empty());
        assert!(spawner.generate_row(&params(0.0, 1.0, 0.0)).is_empty());
        assert!(spawner.generate_row(&params(-10.0, 1.0, 0.0)).is_empty());
        // A single slot is always the forced gap
        assert!(spawner.generate_row(&params(150.0, 1.0, 0.0)).is_empty());
    }

    #[test]
    fn test_adjacent_slots_merge() {
        let spans = coalesce(&[true, true, false, true, false, true, true, true], 100.0);
        assert_eq!(
            spans,
            vec![
                ObstacleSpan { x: 0.0, width: 200.0 },
                ObstacleSpan { x: 300.0, width: 100.0 },
                ObstacleSpan { x: 500.0, width: 300.0 },
            ]
        );
    }

    #[test]
    fn test_leftover_width_is_spread_over_slots() {
        let mut spawner = Spawner::new(5);
        let spans = spawner.generate_row(&params(850.0, 1.0, 0.0));
        // 8 slots of 106.25
        assert!((covered(&spans) - 7.0 * 106.25).abs() < 1e-3);
    }

    #[test]
    fn test_min_gap_is_widened() {
        let mut spawner = Spawner::new(9);
        for _ in 0..50 {
            let spans = spawner.generate_row(&params(800.0, 1.0, 149.0));
            // Rebuild slot occupancy from slot centres
            let is_obstacle: Vec<bool> = (0..8)
                .map(|i| {
                    let center = (i as f32 + 0.5) * 100.0;
                    spans.iter().any(|s| s.x < center && center < s.x + s.width)
                })
                .collect();
            assert!(widest_gap(&is_obstacle) >= 2);
            assert!((covered(&spans) - 600.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_gap_wider_than_panel_clears_row() {
        let mut spawner = Spawner::new(3);
        assert!(spawner.generate_row(&params(400.0, 1.0, 10_000.0)).is_empty());
    }

    #[test]
    fn test_reseed_is_deterministic() {
        let mut a = Spawner::new(77);
        let first = a.generate_row(&params(800.0, 0.6, 51.0));
        a.reseed(77);
        let again = a.generate_row(&params(800.0, 0.6, 51.0));
        assert_eq!(first, again);

        let config = GameConfig::default();
        let mut b = Spawner::new(12);
        let mut c = Spawner::new(12);
        assert_eq!(
            b.generate_coins(&config, 500.0, 4),
            c.generate_coins(&config, 500.0, 4)
        );
    }

    #[test]
    fn test_coin_count_and_band() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(21);
        for _ in 0..50 {
            let coins = spawner.generate_coins(&config, 500.0, 2);
            assert!((2..=5).contains(&coins.len()));
            for coin in &coins {
                assert!(coin.x() >= 32.0 && coin.x() < 800.0 - 64.0);
                assert!(coin.y() >= -(10.0 + 500.0 - 32.0) && coin.y() < -(10.0 + 64.0));
            }
        }
    }

    #[test]
    fn test_coin_area_too_small() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(2);
        // Band needs more than 3 diameters of height
        assert!(spawner.generate_coins(&config, 90.0, 4).is_empty());
    }

    #[test]
    fn test_coin_batch_truncates_when_crowded() {
        let config = GameConfig {
            panel_width: 100.0,
            coin_max_attempts: 16,
            ..GameConfig::default()
        };
        let mut spawner = Spawner::new(8);
        // Band is 4px wide and 60px tall: at most a couple of coins fit
        let coins = spawner.generate_coins(&config, 160.0, 50);
        assert!(!coins.is_empty());
        assert!(coins.len() < 50);
    }

    #[test]
    fn test_unvalidated_coin_counts_are_capped() {
        let config = GameConfig {
            extra_coins_max: u32::MAX,
            coin_max_attempts: 8,
            ..GameConfig::default()
        };
        let mut spawner = Spawner::new(13);
        let coins = spawner.generate_coins(&config, 500.0, u32::MAX);
        assert!(!coins.is_empty());
        assert!(coins.len() <= MAX_COINS_PER_ROW as usize);
    }

    proptest! {
        #[test]
        fn prop_row_always_has_gap(
            seed in any::<u64>(),
            panel_width in 100.0f32..4000.0,
            probability in 0.0f32..=1.0,
            min_gap in 0.0f32..200.0,
        ) {
            let mut spawner = Spawner::new(seed);
            let spans = spawner.generate_row(&params(panel_width, probability, min_gap));
            prop_assert!(covered(&spans) < panel_width - 1e-3);

            let mut end = 0.0f32;
            for span in &spans {
                prop_assert!(span.x >= end - 1e-3);
                prop_assert!(span.width > 0.0);
                end = span.x + span.width;
            }
            prop_assert!(end <= panel_width + 1e-2);
        }

        #[test]
        fn prop_coin_batch_never_overlaps(
            seed in any::<u64>(),
            area in 100.0f32..800.0,
            min_coins in 0u32..12,
        ) {
            let config = GameConfig::default();
            let mut spawner = Spawner::new(seed);
            let coins = spawner.generate_coins(&config, area, min_coins);
            prop_assert!(coins.len() as u32 <= min_coins + config.extra_coins_max);
            for (i, a) in coins.iter().enumerate() {
                for b in &coins[i + 1..] {
                    prop_assert!(!a.collides_with(b));
                    prop_assert!(!b.collides_with(a));
                }
            }
        }
    }
}
