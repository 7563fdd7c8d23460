use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Round to 2 decimal places, the smallest currency unit used throughout the dataset.
pub fn round2(value: f64) -> f64 {
    round_dp(value, 2)
}

pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Uniform date in the closed window `[base - days_back, base]`.
pub fn random_date_within_days<R: Rng + ?Sized>(
    rng: &mut R,
    base: NaiveDate,
    days_back: i64,
) -> NaiveDate {
    let delta = rng.gen_range(0..=days_back.max(0));
    base - Duration::days(delta)
}

/// Uniform choice from a non-empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}
