use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use vitals_vault::data::model::RawRecord;

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// `"bed7"` → `"bed77deb"`
fn mirrored_id(stem: &str) -> String {
    let tail: String = stem.chars().rev().collect();
    format!("{stem}{tail}")
}

/// Heart-rate-like readings around `baseline`, with a spike now and then.
fn generate_vitals(baseline: f64, len: usize, rng: &mut SimpleRng) -> String {
    (0..len)
        .map(|i| {
            let mut v = baseline + rng.uniform(-5.0, 5.0);
            if i >= 3 && rng.next_f64() < 0.1 {
                v *= 10.0;
            }
            format!("{v:.1}")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn build_records(rng: &mut SimpleRng) -> Vec<RawRecord> {
    let wards = ["bed", "icu", "ward"];
    let mut records = Vec::new();

    for (w, ward) in wards.iter().enumerate() {
        for n in 1..=4 {
            let id = mirrored_id(&format!("{ward}{n}"));
            let baseline = 60.0 + 10.0 * w as f64 + n as f64;
            records.push(RawRecord::new(id, generate_vitals(baseline, 12, rng)));
        }
    }

    // One of each rejection kind.
    let first = records[0].clone();
    records.push(RawRecord::new(first.id, "70,71,72"));
    records.push(RawRecord::new("bed-42", "70,71,72"));
    records.push(RawRecord::new("level", "72,n/a,70"));
    records.push(RawRecord::new("race car", "1,2,3,2,1000"));

    records
}

fn write_csv(path: &str, records: &[RawRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    for record in records {
        writer.serialize(record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(path: &str, records: &[RawRecord]) -> Result<()> {
    let ids = StringArray::from(records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>());
    let vitals = StringArray::from(records.iter().map(|r| r.vitals.as_str()).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("vitals", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(ids), Arc::new(vitals)])
        .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = SimpleRng::new(42);
    let records = build_records(&mut rng);

    write_csv("sample_vitals.csv", &records)?;
    write_parquet("sample_vitals.parquet", &records)?;

    log::info!(
        "Wrote {} records to sample_vitals.csv and sample_vitals.parquet",
        records.len()
    );
    Ok(())
}
