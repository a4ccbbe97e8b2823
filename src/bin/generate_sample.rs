//! Writes a synthetic OWID-shaped emissions table for trying the dashboard
//! without the real download.
//!
//! Usage: `generate_sample [--seed N] [output.csv|output.parquet]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

#[derive(Parser)]
#[command(name = "generate_sample", about = "Write a synthetic CO2 emissions table")]
struct Args {
    /// Output file; the extension picks the format (.csv, .parquet, .pq)
    #[arg(default_value = "owid-co2-data.csv")]
    output: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative noise around 1.0.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + (self.next_f64() - 0.5) * 2.0 * spread
    }
}

/// (name, population in 2020, co2 in 2020 [Mt], first year with data)
const REGIONS: [(&str, f64, f64, i32); 18] = [
    ("World", 7.8e9, 34_800.0, 1750),
    ("Asia", 4.6e9, 20_000.0, 1750),
    ("Europe", 7.5e8, 5_300.0, 1750),
    ("North America", 5.9e8, 6_000.0, 1785),
    ("South America", 4.3e8, 1_000.0, 1820),
    ("Africa", 1.3e9, 1_300.0, 1840),
    ("Oceania", 4.3e7, 450.0, 1850),
    ("Antarctica", 0.0, 0.0, 1950),
    ("United Kingdom", 6.7e7, 330.0, 1750),
    ("France", 6.5e7, 280.0, 1790),
    ("Germany", 8.3e7, 640.0, 1790),
    ("United States", 3.3e8, 4_700.0, 1800),
    ("China", 1.4e9, 10_700.0, 1900),
    ("India", 1.38e9, 2_400.0, 1860),
    ("Brazil", 2.1e8, 470.0, 1900),
    ("Nigeria", 2.06e8, 120.0, 1950),
    ("Australia", 2.5e7, 390.0, 1860),
    ("Japan", 1.26e8, 1_030.0, 1870),
];

#[derive(Default)]
struct Columns {
    country: Vec<String>,
    year: Vec<i64>,
    population: Vec<Option<f64>>,
    gdp: Vec<Option<f64>>,
    co2: Vec<Option<f64>>,
    co2_per_capita: Vec<Option<f64>>,
    coal_co2: Vec<Option<f64>>,
    gas_co2: Vec<Option<f64>>,
    oil_co2: Vec<Option<f64>>,
}

impl Columns {
    fn len(&self) -> usize {
        self.year.len()
    }

    fn numeric(&self) -> [(&'static str, &Vec<Option<f64>>); 7] {
        [
            ("population", &self.population),
            ("gdp", &self.gdp),
            ("co2", &self.co2),
            ("co2_per_capita", &self.co2_per_capita),
            ("coal_co2", &self.coal_co2),
            ("gas_co2", &self.gas_co2),
            ("oil_co2", &self.oil_co2),
        ]
    }
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for &(name, pop_2020, co2_2020, first_year) in &REGIONS {
        for year in 1750..=2020 {
            // Growth curves normalised to 1.0 in 2020.
            let t = (year - 1750) as f64 / 270.0;
            let population = pop_2020 * (0.1 + 0.9 * t.powi(3));
            let emitting = year >= first_year;
            let co2 = emitting.then(|| co2_2020 * t.powi(4) * rng.jitter(0.05));

            cols.country.push(name.to_string());
            cols.year.push(year as i64);
            cols.population.push(Some(population));
            let gdp = (year >= 1820).then(|| population * 12_000.0 * t.powi(2) * rng.jitter(0.1));

            cols.gdp.push(gdp);
            cols.co2.push(co2);
            cols.co2_per_capita
                .push(co2.filter(|_| population > 0.0).map(|c| c * 1e6 / population));
            cols.coal_co2.push(co2.map(|c| c * (0.9 - 0.5 * t)));
            cols.gas_co2.push(co2.filter(|_| year >= 1885).map(|c| c * 0.25 * t));
            cols.oil_co2.push(co2.filter(|_| year >= 1870).map(|c| c * 0.35 * t));
        }
    }

    cols
}

fn write_csv(path: &Path, cols: &Columns) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    let mut header = vec!["country", "year"];
    header.extend(cols.numeric().iter().map(|(name, _)| *name));
    writer.write_record(&header)?;

    let cell = |v: Option<f64>| v.map(|x| format!("{x:.3}")).unwrap_or_default();
    for i in 0..cols.len() {
        let mut row = vec![cols.country[i].clone(), cols.year[i].to_string()];
        row.extend(cols.numeric().iter().map(|(_, values)| cell(values[i])));
        writer.write_record(&row)?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, cols: &Columns) -> Result<()> {
    let mut fields = vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
    ];
    fields.extend(
        cols.numeric()
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            cols.country.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(cols.year.clone())),
    ];
    arrays.extend(
        cols.numeric()
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from((*values).clone())) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path = args.output.as_path();

    let mut rng = SimpleRng::new(args.seed);
    let cols = generate(&mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &cols)?,
        Some("parquet") | Some("pq") => write_parquet(path, &cols)?,
        _ => bail!("output must end in .csv or .parquet: {}", path.display()),
    }

    println!(
        "Wrote {} rows for {} regions to {}",
        cols.len(),
        REGIONS.len(),
        path.display()
    );
    Ok(())
}
