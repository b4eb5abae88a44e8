// Rates module - Banco Central series, cache and fallback policy

pub mod bcb;
pub mod fx;
pub mod provider;
pub mod refresh;
pub mod source;

pub use provider::{
    Clock, ManualClock, ProductRates, RateCache, RateProvider, RateSet, SeriesValue, SystemClock,
};
pub use refresh::RefreshTask;
pub use source::{OfflineSource, RateObservation, RateSource, SeriesId};

/// Convert an annualized percent to the equivalent compounding monthly
/// percent, rounded to 4 decimal places.
///
/// ```
/// use rendimentos::rates::monthly_from_annual;
///
/// assert_eq!(monthly_from_annual(15.0), 1.1715);
/// ```
pub fn monthly_from_annual(annual_percent: f64) -> f64 {
    let monthly = ((1.0 + annual_percent / 100.0).powf(1.0 / 12.0) - 1.0) * 100.0;
    round_dp(monthly, 4)
}

/// A usable monthly rate is finite and strictly positive
pub fn is_valid_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Round half away from zero to `dp` decimal places
pub fn round_dp(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}
