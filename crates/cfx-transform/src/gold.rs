//! Gold aggregation: silver countries joined with silver rates.

use std::collections::HashMap;

use chrono::NaiveDate;
use cfx_model::currency::EUR;
use cfx_model::{CountryEntity, ExchangeRateObservation, GoldAggregate, RateTimeseriesRow};
use tracing::debug;

/// Both gold datasets of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldDatasets {
    /// One row per silver country, in silver order.
    pub summary: Vec<GoldAggregate>,
    /// One row per (country, observation of its currency), sorted by date,
    /// region and country name.
    pub timeseries: Vec<RateTimeseriesRow>,
    /// Countries with no matching observation.
    pub unmatched: usize,
}

/// Statistics of one currency's series over the window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SeriesStats {
    first_rate: f64,
    latest_date: NaiveDate,
    latest_rate: f64,
    average: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl SeriesStats {
    /// `series` must be non-empty and sorted by date.
    fn of(series: &[&ExchangeRateObservation]) -> Option<Self> {
        let first = series.first()?;
        let latest = series.last()?;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for obs in series {
            sum += obs.rate;
            min = min.min(obs.rate);
            max = max.max(obs.rate);
        }
        Some(Self {
            first_rate: first.rate,
            latest_date: latest.date,
            latest_rate: latest.rate,
            average: sum / series.len() as f64,
            min,
            max,
            count: series.len(),
        })
    }

    fn pct_change(&self) -> Option<f64> {
        (self.first_rate != 0.0)
            .then(|| (self.latest_rate - self.first_rate) / self.first_rate * 100.0)
    }
}

/// Join countries with the observations of their canonical currency.
///
/// Every country yields exactly one summary row; countries without a
/// currency, or whose currency has no observation, keep null metrics and an
/// `observation_count` of zero.
pub fn build_gold(
    countries: &[CountryEntity],
    observations: &[ExchangeRateObservation],
    base: &str,
) -> GoldDatasets {
    let base = base.trim().to_ascii_uppercase();

    let mut by_currency: HashMap<&str, Vec<&ExchangeRateObservation>> = HashMap::new();
    for obs in observations {
        by_currency
            .entry(obs.target_currency.as_str())
            .or_default()
            .push(obs);
    }
    for series in by_currency.values_mut() {
        series.sort_by_key(|obs| obs.date);
    }
    let stats: HashMap<&str, SeriesStats> = by_currency
        .iter()
        .filter_map(|(code, series)| SeriesStats::of(series).map(|s| (*code, s)))
        .collect();
    let eur_by_date: HashMap<NaiveDate, f64> = by_currency
        .get(EUR)
        .map(|series| series.iter().map(|obs| (obs.date, obs.rate)).collect())
        .unwrap_or_default();

    let mut summary = Vec::with_capacity(countries.len());
    let mut timeseries = Vec::new();
    let mut unmatched = 0;

    for country in countries {
        let code = country.currency_code.as_deref();
        let series_stats = code.and_then(|code| stats.get(code)).copied();
        if series_stats.is_none() {
            unmatched += 1;
        }

        let rate_vs_eur = match (code, series_stats) {
            (Some(EUR), _) => Some(1.0),
            (_, Some(s)) if base == EUR => Some(s.latest_rate),
            (_, Some(s)) => eur_by_date
                .get(&s.latest_date)
                .filter(|eur| **eur > 0.0)
                .map(|eur| s.latest_rate / eur),
            (_, None) => None,
        };

        summary.push(GoldAggregate {
            country_name: country.country_name.clone(),
            cca2: country.cca2.clone(),
            cca3: country.cca3.clone(),
            region: country.region.clone(),
            subregion: country.subregion.clone(),
            population: country.population,
            currency_code: country.currency_code.clone(),
            base_currency: base.clone(),
            latest_date: series_stats.map(|s| s.latest_date),
            latest_rate: series_stats.map(|s| s.latest_rate),
            average_rate: series_stats.map(|s| s.average),
            min_rate: series_stats.map(|s| s.min),
            max_rate: series_stats.map(|s| s.max),
            observation_count: series_stats.map_or(0, |s| s.count as i64),
            rate_vs_eur,
            pct_change: series_stats.and_then(|s| s.pct_change()),
        });

        if let Some((code, series)) = code.and_then(|code| by_currency.get_key_value(code)) {
            for obs in series {
                timeseries.push(RateTimeseriesRow {
                    date: obs.date,
                    country_name: country.country_name.clone(),
                    cca3: country.cca3.clone(),
                    region: country.region.clone(),
                    subregion: country.subregion.clone(),
                    currency_code: (*code).to_string(),
                    base_currency: base.clone(),
                    rate: obs.rate,
                });
            }
        }
    }

    timeseries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.region.cmp(&b.region))
            .then_with(|| a.country_name.cmp(&b.country_name))
    });

    debug!(
        countries = summary.len(),
        timeseries_rows = timeseries.len(),
        unmatched,
        "gold built"
    );
    GoldDatasets {
        summary,
        timeseries,
        unmatched,
    }
}
