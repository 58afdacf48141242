use anyhow::{Context, Result};
use serde::Serialize;

/// One respirometry row. `None` fields are written as empty cells.
#[derive(Serialize)]
struct RespirometryRow {
    #[serde(rename = "Subject_ID")]
    subject_id: String,
    #[serde(rename = "RQ")]
    rq: Option<f64>,
    #[serde(rename = "VO2")]
    vo2: Option<f64>,
    #[serde(rename = "VCO2")]
    vco2: Option<f64>,
    #[serde(rename = "GT_BGL")]
    gt_bgl: Option<f64>,
}

#[derive(Serialize)]
struct TraceRow {
    ticks: u32,
    co2_concentration: f64,
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn respirometry_rows(rng: &mut SimpleRng) -> Vec<RespirometryRow> {
    let mut rows: Vec<RespirometryRow> = (1..=12)
        .map(|i| {
            let vo2 = round3(rng.uniform(0.22, 0.38));
            let rq = round3(rng.uniform(0.72, 1.0));
            RespirometryRow {
                subject_id: format!("S{i}.csv"),
                rq: Some(rq),
                vo2: Some(vo2),
                vco2: Some(round3(vo2 * rq)),
                gt_bgl: Some(rng.uniform(70.0, 140.0).round()),
            }
        })
        .collect();

    // Incomplete rows are dropped by validation; the zero glucose row
    // produces an infinite Ratio UT/GT.
    rows[3].vco2 = None;
    rows[7].rq = None;
    rows[10].gt_bgl = Some(0.0);
    rows
}

fn trace_rows(rng: &mut SimpleRng) -> Vec<TraceRow> {
    (0..200)
        .map(|tick| TraceRow {
            ticks: tick,
            co2_concentration: round3(410.0 + 0.35 * tick as f64 + rng.uniform(-1.5, 1.5)),
        })
        .collect()
}

fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let respirometry = respirometry_rows(&mut rng);
    write_csv("sample_respirometry.csv", &respirometry)?;
    let trace = trace_rows(&mut rng);
    write_csv("sample_co2_trace.csv", &trace)?;

    println!(
        "Wrote {} respirometry rows to sample_respirometry.csv \
         and {} trace points to sample_co2_trace.csv",
        respirometry.len(),
        trace.len()
    );
    Ok(())
}
