use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{
    is_aggregate, is_continent, Dataset, EmissionSource, RangeOption, Record, ViewInput, WORLD,
};

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Mean total CO2 of an aggregate region in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub region: String,
    pub year: i32,
    pub co2: f64,
}

/// Mean total CO2 of a country at one GDP-per-capita value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub region: String,
    pub year: i32,
    pub gdp_per_capita: f64,
    pub co2: f64,
}

/// Summed emissions of the selected fuel source for one continent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceBar {
    pub year: i32,
    pub region: String,
    pub source: EmissionSource,
    pub value: f64,
}

/// Summed per-capita CO2 for one continent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub region: String,
    pub co2_per_capita: f64,
}

/// The five result sets rendered for one [`ViewInput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewOutput {
    pub timeline: Vec<TimelinePoint>,
    pub scatter: Vec<ScatterPoint>,
    pub source_bar: Vec<SourceBar>,
    pub per_capita_pie: Vec<PieSlice>,
    pub range_text: String,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Derive every output for `input`. Pure: identical arguments give identical
/// results, and a year with no matching rows gives empty sets.
pub fn query(dataset: &Dataset, input: &ViewInput) -> ViewOutput {
    ViewOutput {
        timeline: timeline(dataset, input.year),
        scatter: scatter(dataset, input.year),
        source_bar: source_bar(dataset, input.year, input.source),
        per_capita_pie: per_capita_pie(dataset, input.year),
        range_text: range_text(dataset, &input.range_options),
    }
}

// ---------------------------------------------------------------------------
// Aggregation helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group key for the scatter set. `f64` has no total order of its own, so
/// compare with `total_cmp`.
#[derive(Debug, Clone)]
struct ScatterKey {
    region: String,
    year: i32,
    gdp_per_capita: f64,
}

impl PartialEq for ScatterKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScatterKey {}

impl PartialOrd for ScatterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScatterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.region
            .cmp(&other.region)
            .then(self.year.cmp(&other.year))
            .then(self.gdp_per_capita.total_cmp(&other.gdp_per_capita))
    }
}

fn rows_in_year(dataset: &Dataset, year: i32) -> impl Iterator<Item = &Record> {
    dataset.records().iter().filter(move |r| r.year == year)
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Aggregate regions up to and including `year`, averaged per (region, year).
pub fn timeline(dataset: &Dataset, year: i32) -> Vec<TimelinePoint> {
    let mut groups: BTreeMap<(&str, i32), Mean> = BTreeMap::new();
    for r in dataset.records() {
        if r.year <= year && is_aggregate(&r.country) {
            groups.entry((r.country.as_str(), r.year)).or_default().push(r.co2);
        }
    }
    groups
        .into_iter()
        .map(|((region, year), mean)| TimelinePoint {
            region: region.to_string(),
            year,
            co2: mean.value(),
        })
        .collect()
}

/// Split a timeline into one `[year, co2]` series per region.
pub fn timeline_series(points: &[TimelinePoint]) -> BTreeMap<String, Vec<[f64; 2]>> {
    let mut series: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        series
            .entry(p.region.clone())
            .or_default()
            .push([p.year as f64, p.co2]);
    }
    series
}

/// Individual countries in `year` with a non-zero GDP per capita.
pub fn scatter(dataset: &Dataset, year: i32) -> Vec<ScatterPoint> {
    let mut groups: BTreeMap<ScatterKey, Mean> = BTreeMap::new();
    for r in rows_in_year(dataset, year) {
        if is_aggregate(&r.country) || r.gdp_per_capita == 0.0 {
            continue;
        }
        let key = ScatterKey {
            region: r.country.clone(),
            year: r.year,
            gdp_per_capita: r.gdp_per_capita,
        };
        groups.entry(key).or_default().push(r.co2);
    }
    groups
        .into_iter()
        .map(|(key, mean)| ScatterPoint {
            region: key.region,
            year: key.year,
            gdp_per_capita: key.gdp_per_capita,
            co2: mean.value(),
        })
        .collect()
}

/// Continents (World excluded) in `year`, summing the selected source.
pub fn source_bar(dataset: &Dataset, year: i32, source: EmissionSource) -> Vec<SourceBar> {
    let mut groups: BTreeMap<(i32, &str), f64> = BTreeMap::new();
    for r in rows_in_year(dataset, year) {
        if is_continent(&r.country) {
            *groups.entry((r.year, r.country.as_str())).or_default() += r.source_value(source);
        }
    }
    groups
        .into_iter()
        .map(|((year, region), value)| SourceBar {
            year,
            region: region.to_string(),
            source,
            value,
        })
        .collect()
}

/// Aggregate regions other than World in `year`, summing per-capita CO2.
pub fn per_capita_pie(dataset: &Dataset, year: i32) -> Vec<PieSlice> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows_in_year(dataset, year) {
        if is_aggregate(&r.country) && r.country != WORLD {
            *groups.entry(r.country.as_str()).or_default() += r.co2_per_capita;
        }
    }
    groups
        .into_iter()
        .map(|(region, co2_per_capita)| PieSlice {
            region: region.to_string(),
            co2_per_capita,
        })
        .collect()
}

/// Smallest and largest strictly positive total CO2 over the whole dataset,
/// regardless of year.
pub fn co2_range(dataset: &Dataset) -> Option<(f64, f64)> {
    dataset
        .records()
        .iter()
        .map(|r| r.co2)
        .filter(|&v| v > 0.0)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// One sentence per checked option, min before max.
pub fn range_text(dataset: &Dataset, options: &BTreeSet<RangeOption>) -> String {
    if options.is_empty() {
        return String::new();
    }
    let range = co2_range(dataset);
    let mut out = String::new();
    for option in options {
        let (name, value) = match option {
            RangeOption::Min => ("Min", range.map(|(lo, _)| lo)),
            RangeOption::Max => ("Max", range.map(|(_, hi)| hi)),
        };
        match value {
            Some(v) => out.push_str(&format!("The {name} CO2 is: {v}. ")),
            None => out.push_str(&format!("The {name} CO2 is: n/a. ")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawRecord;
    use crate::data::prepare::prepare;

    fn row(country: &str, year: i32, co2: f64) -> RawRecord {
        RawRecord {
            country: Some(country.to_string()),
            year: Some(year),
            co2: Some(co2),
            ..Default::default()
        }
    }

    /// World/Asia/France at 1800 and 1850.
    fn scenario() -> Dataset {
        prepare(vec![
            row("World", 1800, 10.0),
            row("World", 1850, 12.0),
            row("Asia", 1800, 3.0),
            row("Asia", 1850, 4.0),
            row("France", 1800, 1.0),
            row("France", 1850, 1.0),
        ])
    }

    fn input(year: i32, options: &[RangeOption]) -> ViewInput {
        ViewInput {
            year,
            range_options: options.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn tp(region: &str, year: i32, co2: f64) -> TimelinePoint {
        TimelinePoint {
            region: region.to_string(),
            year,
            co2,
        }
    }

    #[test]
    fn test_timeline_scenario() {
        let out = timeline(&scenario(), 1850);
        assert_eq!(
            out,
            vec![
                tp("Asia", 1800, 3.0),
                tp("Asia", 1850, 4.0),
                tp("World", 1800, 10.0),
                tp("World", 1850, 12.0),
            ]
        );
        assert!(out.iter().all(|p| p.region != "France"));
    }

    #[test]
    fn test_timeline_averages_duplicates() {
        let ds = prepare(vec![row("Europe", 1900, 2.0), row("Europe", 1900, 4.0)]);
        assert_eq!(timeline(&ds, 1900), vec![tp("Europe", 1900, 3.0)]);
    }

    #[test]
    fn test_timeline_monotonic_in_year() {
        let ds = scenario();
        let mut previous = 0;
        for year in [1750, 1800, 1825, 1850, 1900] {
            let count = timeline(&ds, year)
                .iter()
                .filter(|p| p.region == "World")
                .count();
            assert!(count >= previous);
            previous = count;
        }
        assert_eq!(previous, 2);
    }

    #[test]
    fn test_timeline_series_split() {
        let series = timeline_series(&timeline(&scenario(), 1850));
        assert_eq!(series.len(), 2);
        assert_eq!(series["World"], vec![[1800.0, 10.0], [1850.0, 12.0]]);
    }

    #[test]
    fn test_scatter_excludes_zero_gdp_and_aggregates() {
        let mut france = row("France", 1850, 5.0);
        france.gdp = Some(100.0);
        france.population = Some(10.0);
        let mut world = row("World", 1850, 50.0);
        world.gdp = Some(1000.0);
        world.population = Some(10.0);
        let spain = row("Spain", 1850, 2.0);
        let ds = prepare(vec![france, world, spain]);

        let out = scatter(&ds, 1850);
        assert_eq!(
            out,
            vec![ScatterPoint {
                region: "France".to_string(),
                year: 1850,
                gdp_per_capita: 10.0,
                co2: 5.0,
            }]
        );
        assert!(out.iter().all(|p| p.gdp_per_capita != 0.0));
        assert!(scatter(&ds, 1851).is_empty());
    }

    #[test]
    fn test_scatter_groups_by_gdp_per_capita() {
        let mk = |gdp: f64, co2: f64| {
            let mut r = row("Chile", 1990, co2);
            r.gdp = Some(gdp);
            r.population = Some(1.0);
            r
        };
        let ds = prepare(vec![mk(5.0, 1.0), mk(5.0, 3.0), mk(7.0, 9.0)]);
        let out = scatter(&ds, 1990);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].gdp_per_capita, 5.0);
        assert_eq!(out[0].co2, 2.0);
        assert_eq!(out[1].co2, 9.0);
    }

    #[test]
    fn test_source_bar_sums_selected_source() {
        let mut asia = row("Asia", 1900, 0.0);
        asia.coal_co2 = Some(4.0);
        asia.gas_co2 = Some(1.0);
        let mut asia_dup = row("Asia", 1900, 0.0);
        asia_dup.coal_co2 = Some(2.0);
        let mut world = row("World", 1900, 0.0);
        world.coal_co2 = Some(100.0);
        let mut france = row("France", 1900, 0.0);
        france.coal_co2 = Some(7.0);
        let ds = prepare(vec![asia, asia_dup, world, france]);

        let coal = source_bar(&ds, 1900, EmissionSource::Coal);
        assert_eq!(coal.len(), 1);
        assert_eq!(coal[0].region, "Asia");
        assert_eq!(coal[0].value, 6.0);

        let gas = source_bar(&ds, 1900, EmissionSource::Gas);
        assert_eq!(gas[0].value, 1.0);
        assert_eq!(gas[0].source, EmissionSource::Gas);
    }

    #[test]
    fn test_source_bar_independent_of_checklist() {
        let mut europe = row("Europe", 1850, 3.0);
        europe.oil_co2 = Some(2.5);
        let ds = prepare(vec![europe, row("Africa", 1850, 1.0)]);
        let total = |options: &[RangeOption]| -> f64 {
            let mut inp = input(1850, options);
            inp.source = EmissionSource::Oil;
            query(&ds, &inp).source_bar.iter().map(|b| b.value).sum()
        };
        assert_eq!(total(&[]), 2.5);
        assert_eq!(total(&[RangeOption::Min]), 2.5);
        assert_eq!(total(&[RangeOption::Min, RangeOption::Max]), 2.5);
    }

    #[test]
    fn test_per_capita_pie_excludes_world() {
        let mut world = row("World", 1850, 0.0);
        world.co2_per_capita = Some(9.0);
        let mut asia = row("Asia", 1850, 0.0);
        asia.co2_per_capita = Some(0.5);
        let mut oceania = row("Oceania", 1850, 0.0);
        oceania.co2_per_capita = Some(1.5);
        let ds = prepare(vec![world, asia, oceania, row("France", 1850, 0.0)]);

        let out = per_capita_pie(&ds, 1850);
        assert_eq!(
            out,
            vec![
                PieSlice {
                    region: "Asia".to_string(),
                    co2_per_capita: 0.5,
                },
                PieSlice {
                    region: "Oceania".to_string(),
                    co2_per_capita: 1.5,
                },
            ]
        );
    }

    #[test]
    fn test_range_text_scenario() {
        let out = query(&scenario(), &input(1850, &[RangeOption::Min, RangeOption::Max]));
        assert_eq!(out.range_text, "The Min CO2 is: 1. The Max CO2 is: 12. ");
    }

    #[test]
    fn test_range_text_single_and_empty() {
        let ds = scenario();
        assert_eq!(range_text(&ds, &BTreeSet::new()), "");
        let max_only: BTreeSet<_> = [RangeOption::Max].into_iter().collect();
        assert_eq!(range_text(&ds, &max_only), "The Max CO2 is: 12. ");
    }

    #[test]
    fn test_range_text_ignores_year_and_non_positive() {
        let ds = prepare(vec![
            row("World", 1750, 0.0),
            row("World", 1800, -3.0),
            row("World", 1900, 0.25),
        ]);
        let out = query(&ds, &input(1750, &[RangeOption::Min]));
        assert_eq!(out.range_text, "The Min CO2 is: 0.25. ");
    }

    #[test]
    fn test_range_text_without_positive_values() {
        let ds = prepare(vec![row("World", 1800, 0.0)]);
        let both: BTreeSet<_> = RangeOption::ALL.into_iter().collect();
        assert_eq!(
            range_text(&ds, &both),
            "The Min CO2 is: n/a. The Max CO2 is: n/a. "
        );
    }

    #[test]
    fn test_year_before_dataset_is_empty() {
        let out = query(&scenario(), &input(1750, &[]));
        assert_eq!(out, ViewOutput::default());
    }

    #[test]
    fn test_query_is_deterministic() {
        let ds = scenario();
        let inp = input(1850, &[RangeOption::Max]);
        assert_eq!(query(&ds, &inp), query(&ds, &inp));
    }
}
