use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One synthetic patient, in the column order of the public heart dataset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Patient {
    age: i64,
    sex: &'static str,
    chest_pain_type: &'static str,
    #[serde(rename = "RestingBP")]
    resting_bp: i64,
    cholesterol: i64,
    #[serde(rename = "FastingBS")]
    fasting_bs: i64,
    #[serde(rename = "RestingECG")]
    resting_ecg: &'static str,
    #[serde(rename = "MaxHR")]
    max_hr: i64,
    exercise_angina: &'static str,
    oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    st_slope: &'static str,
    heart_disease: i64,
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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }
}

fn patient(rng: &mut SimpleRng) -> Patient {
    let age = rng.gauss(53.5, 9.4).round().clamp(28.0, 77.0) as i64;
    let sex = if rng.chance(0.79) { "M" } else { "F" };

    // Latent risk drives the outcome and the correlated measurements.
    let mut risk = (age as f64 - 53.5) / 20.0 + if sex == "M" { 0.3 } else { -0.4 };
    risk += rng.gauss(0.0, 0.6);
    let heart_disease = i64::from(risk > 0.0);
    let sick = heart_disease == 1;

    let chest_pain_type = if sick && rng.chance(0.75) {
        "ASY"
    } else {
        rng.pick(&["ATA", "NAP", "ASY", "TA"])
    };
    let exercise_angina = if rng.chance(if sick { 0.62 } else { 0.13 }) { "Y" } else { "N" };
    let st_slope = if sick {
        rng.pick(&["Flat", "Flat", "Flat", "Down", "Up"])
    } else {
        rng.pick(&["Up", "Up", "Up", "Flat"])
    };
    let oldpeak = if sick { rng.gauss(1.3, 1.1) } else { rng.gauss(0.4, 0.7) };

    Patient {
        age,
        sex,
        chest_pain_type,
        resting_bp: rng.gauss(132.0, 18.0).round().max(80.0) as i64,
        cholesterol: if rng.chance(0.08) {
            0
        } else {
            rng.gauss(240.0, 55.0).round().max(85.0) as i64
        },
        fasting_bs: i64::from(rng.chance(if sick { 0.33 } else { 0.11 })),
        resting_ecg: rng.pick(&["Normal", "Normal", "Normal", "ST", "LVH"]),
        max_hr: (rng.gauss(if sick { 127.0 } else { 148.0 }, 23.0) - (age as f64 - 53.5) * 0.5)
            .round()
            .clamp(60.0, 202.0) as i64,
        exercise_angina,
        oldpeak: (oldpeak.max(-2.6) * 10.0).round() / 10.0,
        st_slope,
        heart_disease,
    }
}

fn write_csv(path: &str, patients: &[Patient]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for p in patients {
        writer.serialize(p).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &str, patients: &[Patient]) -> Result<()> {
    let ints = |f: fn(&Patient) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(patients.iter().map(f).collect::<Vec<_>>()))
    };
    let strs = |f: fn(&Patient) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(patients.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("Age", ints(|p| p.age)),
        ("Sex", strs(|p| p.sex)),
        ("ChestPainType", strs(|p| p.chest_pain_type)),
        ("RestingBP", ints(|p| p.resting_bp)),
        ("Cholesterol", ints(|p| p.cholesterol)),
        ("FastingBS", ints(|p| p.fasting_bs)),
        ("RestingECG", strs(|p| p.resting_ecg)),
        ("MaxHR", ints(|p| p.max_hr)),
        ("ExerciseAngina", strs(|p| p.exercise_angina)),
        (
            "Oldpeak",
            Arc::new(Float64Array::from(patients.iter().map(|p| p.oldpeak).collect::<Vec<_>>()))
                as ArrayRef,
        ),
        ("ST_Slope", strs(|p| p.st_slope)),
        ("HeartDisease", ints(|p| p.heart_disease)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
        .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let patients: Vec<Patient> = (0..918).map(|_| patient(&mut rng)).collect();

    write_csv("heart.csv", &patients)?;
    write_parquet("heart.parquet", &patients)?;

    let sick = patients.iter().filter(|p| p.heart_disease == 1).count();
    println!(
        "Wrote {} patients ({sick} with heart disease) to heart.csv and heart.parquet",
        patients.len()
    );
    Ok(())
}
