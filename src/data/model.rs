use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Region classification
// ---------------------------------------------------------------------------

pub const WORLD: &str = "World";

/// Rollup labels: World plus the seven continents. Every other `country`
/// value is treated as an individual country.
pub const AGGREGATE_REGIONS: [&str; 8] = [
    WORLD,
    "Asia",
    "Oceania",
    "Europe",
    "Africa",
    "North America",
    "South America",
    "Antarctica",
];

/// Continent-level aggregates (everything in [`AGGREGATE_REGIONS`] but World).
pub const CONTINENTS: [&str; 7] = [
    "Asia",
    "Oceania",
    "Europe",
    "Africa",
    "North America",
    "South America",
    "Antarctica",
];

pub fn is_aggregate(region: &str) -> bool {
    AGGREGATE_REGIONS.contains(&region)
}

pub fn is_continent(region: &str) -> bool {
    CONTINENTS.contains(&region)
}

// ---------------------------------------------------------------------------
// RawRecord – one parsed row, any field may be missing
// ---------------------------------------------------------------------------

/// A row as it comes out of the loader, before normalisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub country: Option<String>,
    pub year: Option<i32>,
    pub population: Option<f64>,
    pub gdp: Option<f64>,
    pub co2: Option<f64>,
    pub co2_per_capita: Option<f64>,
    pub coal_co2: Option<f64>,
    pub gas_co2: Option<f64>,
    pub oil_co2: Option<f64>,
}

// ---------------------------------------------------------------------------
// Record – one prepared row of the dataset
// ---------------------------------------------------------------------------

/// A fully populated row. Missing inputs have already been replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    pub population: f64,
    pub gdp: f64,
    pub co2: f64,
    pub co2_per_capita: f64,
    pub coal_co2: f64,
    pub gas_co2: f64,
    pub oil_co2: f64,
    /// `gdp / population`, or 0 when population is 0.
    pub gdp_per_capita: f64,
}

impl Record {
    /// Value of the selected fuel-source column.
    pub fn source_value(&self, source: EmissionSource) -> f64 {
        match source {
            EmissionSource::Coal => self.coal_co2,
            EmissionSource::Gas => self.gas_co2,
            EmissionSource::Oil => self.oil_co2,
        }
    }
}

impl From<&Record> for RawRecord {
    fn from(r: &Record) -> Self {
        RawRecord {
            country: Some(r.country.clone()),
            year: Some(r.year),
            population: Some(r.population),
            gdp: Some(r.gdp),
            co2: Some(r.co2),
            co2_per_capita: Some(r.co2_per_capita),
            coal_co2: Some(r.coal_co2),
            gas_co2: Some(r.gas_co2),
            oil_co2: Some(r.oil_co2),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the prepared, immutable table
// ---------------------------------------------------------------------------

/// The prepared dataset. Built once by [`super::prepare::prepare`] and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    year_range: Option<(i32, i32)>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let year_range = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.year, r.year)),
            Some((lo, hi)) => Some((i32::min(lo, r.year), i32::max(hi, r.year))),
        });
        Dataset {
            records,
            year_range,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Smallest and largest year present, `None` for an empty dataset.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        self.year_range
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// View input
// ---------------------------------------------------------------------------

pub const YEAR_MIN: i32 = 1750;
pub const YEAR_MAX: i32 = 2020;
pub const YEAR_STEP: i32 = 5;
pub const YEAR_DEFAULT: i32 = 1850;
/// Spacing of labelled ticks under the year slider.
pub const YEAR_MARK_STEP: i32 = 25;

/// Fuel source plotted in the bar chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EmissionSource {
    #[default]
    #[serde(rename = "coal_co2")]
    Coal,
    #[serde(rename = "gas_co2")]
    Gas,
    #[serde(rename = "oil_co2")]
    Oil,
}

impl EmissionSource {
    pub const ALL: [EmissionSource; 3] = [Self::Coal, Self::Gas, Self::Oil];

    /// Dataset column holding this source.
    pub fn column(self) -> &'static str {
        match self {
            Self::Coal => "coal_co2",
            Self::Gas => "gas_co2",
            Self::Oil => "oil_co2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Coal => "Coal",
            Self::Gas => "Gas",
            Self::Oil => "Oil",
        }
    }
}

impl fmt::Display for EmissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Checklist toggles for the range readout. Ordering is min before max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOption {
    Min,
    Max,
}

impl RangeOption {
    pub const ALL: [RangeOption; 2] = [Self::Min, Self::Max];

    pub fn label(self) -> &'static str {
        match self {
            Self::Min => "Min CO2",
            Self::Max => "Max CO2",
        }
    }
}

/// Everything the controls feed into a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewInput {
    pub year: i32,
    pub source: EmissionSource,
    pub range_options: BTreeSet<RangeOption>,
}

impl Default for ViewInput {
    fn default() -> Self {
        Self {
            year: YEAR_DEFAULT,
            source: EmissionSource::default(),
            range_options: BTreeSet::new(),
        }
    }
}

impl ViewInput {
    /// Clamp into the slider domain and snap onto its step grid.
    pub fn snap_year(year: i32) -> i32 {
        let clamped = year.clamp(YEAR_MIN, YEAR_MAX);
        let offset = (clamped - YEAR_MIN + YEAR_STEP / 2) / YEAR_STEP * YEAR_STEP;
        (YEAR_MIN + offset).min(YEAR_MAX)
    }

    pub fn toggle(&mut self, option: RangeOption) {
        if !self.range_options.remove(&option) {
            self.range_options.insert(option);
        }
    }
}
