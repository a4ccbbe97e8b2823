use super::model::{Dataset, RawRecord, Record};

/// Normalise raw rows into the immutable [`Dataset`].
///
/// Every missing value becomes 0 (an absent country becomes the empty
/// string) and `gdp_per_capita` is derived. Rows are never rejected.
pub fn prepare(raw: Vec<RawRecord>) -> Dataset {
    let records: Vec<Record> = raw.into_iter().map(prepare_record).collect();
    Dataset::from_records(records)
}

fn prepare_record(raw: RawRecord) -> Record {
    let population = raw.population.unwrap_or(0.0);
    let gdp = raw.gdp.unwrap_or(0.0);
    Record {
        country: raw.country.unwrap_or_default(),
        year: raw.year.unwrap_or(0),
        population,
        gdp,
        co2: raw.co2.unwrap_or(0.0),
        co2_per_capita: raw.co2_per_capita.unwrap_or(0.0),
        coal_co2: raw.coal_co2.unwrap_or(0.0),
        gas_co2: raw.gas_co2.unwrap_or(0.0),
        oil_co2: raw.oil_co2.unwrap_or(0.0),
        gdp_per_capita: gdp_per_capita(gdp, population),
    }
}

/// Zero-guarded ratio: a zero population reports 0 instead of inf/NaN.
pub fn gdp_per_capita(gdp: f64, population: f64) -> f64 {
    if population != 0.0 {
        gdp / population
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(country: &str, year: i32) -> RawRecord {
        RawRecord {
            country: Some(country.to_string()),
            year: Some(year),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_values_become_zero() {
        let ds = prepare(vec![raw("France", 1900)]);
        let r = &ds.records()[0];
        assert_eq!(r.country, "France");
        assert_eq!(r.year, 1900);
        assert_eq!(r.population, 0.0);
        assert_eq!(r.gdp, 0.0);
        assert_eq!(r.co2, 0.0);
        assert_eq!(r.co2_per_capita, 0.0);
        assert_eq!(r.coal_co2, 0.0);
        assert_eq!(r.gas_co2, 0.0);
        assert_eq!(r.oil_co2, 0.0);
        assert_eq!(r.gdp_per_capita, 0.0);
    }

    #[test]
    fn test_gdp_per_capita_zero_population() {
        let mut row = raw("Atlantis", 1950);
        row.gdp = Some(1.0e9);
        row.population = Some(0.0);
        let ds = prepare(vec![row]);
        let value = ds.records()[0].gdp_per_capita;
        assert_eq!(value, 0.0);
        assert!(value.is_finite());
    }

    #[test]
    fn test_gdp_per_capita_ratio() {
        let mut row = raw("France", 2000);
        row.gdp = Some(1.5e12);
        row.population = Some(6.0e7);
        let ds = prepare(vec![row]);
        assert_eq!(ds.records()[0].gdp_per_capita, 25_000.0);
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let mut a = raw("World", 1800);
        a.co2 = Some(10.0);
        a.gdp = Some(200.0);
        a.population = Some(4.0);
        let b = RawRecord::default();
        let once = prepare(vec![a, b]);
        let again = prepare(once.records().iter().map(RawRecord::from).collect());
        assert_eq!(once, again);
    }

    #[test]
    fn test_row_order_preserved() {
        let ds = prepare(vec![raw("B", 1900), raw("A", 1800), raw("C", 1850)]);
        let names: Vec<&str> = ds.records().iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(ds.year_range(), Some((1800, 1900)));
    }
}
