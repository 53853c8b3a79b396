use rebalance_core::RebalanceResult;
use rebalance_io::{Column, Frame};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Feature columns of the abalone layout, in file order (after `Sex`).
pub const ABALONE_NUMERIC: [&str; 7] = [
    "Length",
    "Diameter",
    "Height",
    "Whole_weight",
    "Shucked_weight",
    "Viscera_weight",
    "Shell_weight",
];

// Box-Muller for normal distribution
fn normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z * std
}

fn round4(v: f64) -> f64 {
    (v.max(0.001) * 1e4).round() / 1e4
}

struct Profile {
    length: (f64, f64),
    shell_weight: (f64, f64),
    sex_weights: [f64; 3],
}

const NEGATIVE: Profile = Profile {
    length: (0.54, 0.08),
    shell_weight: (0.24, 0.07),
    sex_weights: [0.32, 0.30, 0.38],
};

const POSITIVE: Profile = Profile {
    length: (0.60, 0.07),
    shell_weight: (0.38, 0.09),
    sex_weights: [0.45, 0.45, 0.10],
};

/// Generate an abalone-shaped imbalanced dataset.
///
/// Columns: `Sex` (`M`/`F`/`I`), seven measurements and `Class`
/// (`negative`/`positive`). Positive rows are larger and carry heavier
/// shells, so the classes are learnable but overlap. Rows are shuffled.
pub fn make_abalone(n_negative: usize, n_positive: usize, seed: Option<u64>) -> RebalanceResult<Frame> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut rows: Vec<(&'static str, [f64; 7], &'static str)> = Vec::with_capacity(n_negative + n_positive);
    for (profile, label, count) in [(&NEGATIVE, "negative", n_negative), (&POSITIVE, "positive", n_positive)] {
        for _ in 0..count {
            let u: f64 = rng.gen();
            let sex = if u < profile.sex_weights[0] {
                "F"
            } else if u < profile.sex_weights[0] + profile.sex_weights[1] {
                "M"
            } else {
                "I"
            };

            let length = normal(&mut rng, profile.length.0, profile.length.1).clamp(0.1, 0.8);
            let diameter = length * 0.79 + normal(&mut rng, 0.0, 0.012);
            let height = length * 0.27 + normal(&mut rng, 0.0, 0.015);
            // weight grows with volume
            let whole = 3.2 * length.powi(3) * (1.0 + normal(&mut rng, 0.0, 0.12));
            let shucked = whole * (0.43 + normal(&mut rng, 0.0, 0.04));
            let viscera = whole * (0.22 + normal(&mut rng, 0.0, 0.02));
            let shell = normal(&mut rng, profile.shell_weight.0, profile.shell_weight.1)
                .max(whole * 0.15);

            let values = [length, diameter, height, whole, shucked, viscera, shell].map(round4);
            rows.push((sex, values, label));
        }
    }
    rows.shuffle(&mut rng);

    let mut columns = Vec::with_capacity(9);
    columns.push(Column::categorical(
        "Sex",
        rows.iter().map(|r| r.0.to_string()).collect(),
    ));
    for (j, name) in ABALONE_NUMERIC.iter().enumerate() {
        columns.push(Column::numeric(*name, rows.iter().map(|r| r.1[j]).collect()));
    }
    columns.push(Column::categorical(
        "Class",
        rows.iter().map(|r| r.2.to_string()).collect(),
    ));
    Frame::new(columns)
}

/// The class sizes of the KEEL `abalone9-18` set: 689 negative, 42 positive.
pub fn load_abalone_like(seed: Option<u64>) -> RebalanceResult<Frame> {
    make_abalone(689, 42, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_counts() {
        let frame = make_abalone(60, 6, Some(3)).unwrap();
        assert_eq!(frame.shape(), (66, 9));
        assert_eq!(frame.column_names()[0], "Sex");
        assert_eq!(frame.column_names()[8], "Class");
        let classes = frame.column("Class").unwrap().as_categorical().unwrap();
        assert_eq!(classes.iter().filter(|c| *c == "positive").count(), 6);
        let sexes = frame.column("Sex").unwrap().as_categorical().unwrap();
        assert!(sexes.iter().all(|s| ["M", "F", "I"].contains(&s.as_str())));
    }

    #[test]
    fn test_measurements_positive() {
        let frame = load_abalone_like(Some(50)).unwrap();
        assert_eq!(frame.n_rows(), 731);
        for name in ABALONE_NUMERIC {
            let values = frame.column(name).unwrap().as_numeric().unwrap();
            assert!(values.iter().all(|v| *v > 0.0), "{name}");
        }
    }

    #[test]
    fn test_positive_shells_heavier_on_average() {
        let frame = make_abalone(400, 100, Some(1)).unwrap();
        let shell = frame.column("Shell_weight").unwrap().as_numeric().unwrap();
        let class = frame.column("Class").unwrap().as_categorical().unwrap();
        let mean = |label: &str| {
            let v: Vec<f64> = shell
                .iter()
                .zip(class)
                .filter(|(_, c)| *c == label)
                .map(|(s, _)| *s)
                .collect();
            v.iter().sum::<f64>() / v.len() as f64
        };
        assert!(mean("positive") > mean("negative"));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        assert_eq!(
            make_abalone(30, 5, Some(9)).unwrap(),
            make_abalone(30, 5, Some(9)).unwrap()
        );
    }
}
