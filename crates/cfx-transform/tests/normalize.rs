//! Behavioral tests for country normalization and the gold join.

use cfx_model::{CountryEntity, RawRecord, UNKNOWN, parse_date};
use cfx_model::{ExchangeRateObservation, GoldAggregate};
use cfx_transform::{SchemaError, build_gold, normalize_countries};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("test records are objects"),
    }
}

#[test]
fn brazil_is_normalized_and_joined() {
    let countries = normalize_countries(&[record(json!({
        "country_name": "Brazil",
        "cca2": "BR",
        "cca3": "BRA",
        "region": "Americas",
        "subregion": "South America",
        "population": 203062512,
        "lat": -10,
        "lng": -55,
        "currencies": {"BRL": {"name": "Brazilian real", "symbol": "R$"}}
    }))]);

    assert_eq!(
        countries.countries,
        vec![CountryEntity {
            country_name: "Brazil".to_string(),
            cca2: Some("BR".to_string()),
            cca3: Some("BRA".to_string()),
            region: "Americas".to_string(),
            subregion: "South America".to_string(),
            population: Some(203_062_512),
            lat: Some(-10.0),
            lng: Some(-55.0),
            currency_code: Some("BRL".to_string()),
        }]
    );

    let observations = vec![ExchangeRateObservation {
        base_currency: "EUR".to_string(),
        target_currency: "BRL".to_string(),
        date: parse_date("2024-03-05").unwrap(),
        rate: 5.41,
    }];
    let gold = build_gold(&countries.countries, &observations, "EUR");
    let row = &gold.summary[0];
    assert_eq!(row.currency_code.as_deref(), Some("BRL"));
    assert_eq!(row.latest_rate, Some(5.41));
    assert_eq!(row.observation_count, 1);
    assert_eq!(row.pct_change, Some(0.0));
}

#[test]
fn null_region_and_string_population_are_normalized() {
    let countries = normalize_countries(&[record(json!({
        "cca2": "BR",
        "cca3": "BRA",
        "region": null,
        "population": "203062512",
        "currencies": {"BRL": {"name": "Brazilian real", "symbol": "R$"}}
    }))]);

    assert_eq!(countries.countries.len(), 1);
    let brazil = &countries.countries[0];
    assert_eq!(brazil.cca2.as_deref(), Some("BR"));
    assert_eq!(brazil.cca3.as_deref(), Some("BRA"));
    assert_eq!(brazil.region, "Unknown");
    assert_eq!(brazil.population, Some(203_062_512));
    assert_eq!(brazil.currency_code.as_deref(), Some("BRL"));
    assert_eq!(countries.report.defaulted_region, 1);
    assert_eq!(countries.report.dropped_count(), 0);
}

#[test]
fn country_without_currencies_keeps_a_null_metric_gold_row() {
    let countries = normalize_countries(&[record(json!({
        "country_name": "Antarctica",
        "cca2": "AQ",
        "cca3": "ATA",
        "region": "Antarctic",
        "currencies": {}
    }))]);
    assert_eq!(countries.countries.len(), 1);
    assert_eq!(countries.countries[0].currency_code, None);
    assert_eq!(countries.countries[0].subregion, UNKNOWN);

    let gold = build_gold(&countries.countries, &[], "EUR");
    assert_eq!(gold.summary.len(), 1);
    let row: &GoldAggregate = &gold.summary[0];
    assert_eq!(row.cca3.as_deref(), Some("ATA"));
    assert!(row.is_unmatched());
    assert_eq!(row.latest_rate, None);
    assert_eq!(row.average_rate, None);
    assert_eq!(row.rate_vs_eur, None);
}

#[test]
fn records_without_codes_are_excluded_and_counted() {
    let out = normalize_countries(&[
        record(json!({"country_name": "Nowhere"})),
        record(json!({"cca2": "", "cca3": null, "region": "Europe"})),
        record(json!({"cca3": "DEU", "country_name": "Germany"})),
    ]);
    assert_eq!(out.countries.len(), 1);
    assert_eq!(out.report.input_rows, 3);
    assert_eq!(out.report.output_rows, 1);
    assert_eq!(out.report.dropped_of("unidentifiable"), 2);
    assert_eq!(
        out.report.dropped.iter().map(SchemaError::row).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn population_coercion_never_fails_the_record() {
    let out = normalize_countries(&[
        record(json!({"cca3": "AAA", "population": "1,000"})),
        record(json!({"cca3": "BBB", "population": -5})),
        record(json!({"cca3": "CCC", "population": "lots"})),
        record(json!({"cca3": "DDD", "population": 2.5})),
    ]);
    let populations: Vec<Option<i64>> = out.countries.iter().map(|c| c.population).collect();
    assert_eq!(populations, vec![Some(1_000), None, None, None]);
}

fn region_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(json!(""))),
        Just(Some(json!("   "))),
        Just(Some(json!(17))),
        Just(Some(json!(["Europe"]))),
    ]
}

proptest! {
    #[test]
    fn missing_region_becomes_unknown(region in region_value(), code in "[A-Z]{3}") {
        let mut raw = Map::new();
        raw.insert("cca3".to_string(), json!(code));
        if let Some(value) = region {
            raw.insert("region".to_string(), value);
        }
        let out = normalize_countries(&[raw]);
        prop_assert_eq!(out.countries.len(), 1);
        prop_assert_eq!(out.countries[0].region.as_str(), UNKNOWN);
        prop_assert_eq!(out.report.defaulted_region, 1);
    }

    #[test]
    fn several_currencies_resolve_to_the_smallest(
        codes in prop::collection::btree_set("[a-zA-Z]{3}", 2..6),
        as_array in any::<bool>(),
    ) {
        let currencies = if as_array {
            Value::Array(codes.iter().rev().map(|c| json!(c)).collect())
        } else {
            Value::Object(codes.iter().map(|c| (c.clone(), json!({}))).collect())
        };
        let expected = codes.iter().map(|c| c.to_ascii_uppercase()).min();
        let out = normalize_countries(&[record(json!({"cca3": "XXX", "currencies": currencies}))]);
        prop_assert_eq!(out.countries[0].currency_code.clone(), expected);
    }
}
