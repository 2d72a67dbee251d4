use super::sample::SampleType;

/// Floor used when converting silence to decibels
pub const DB_EPS: f64 = 1e-12;

pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

pub fn gain_to_db(gain: f64) -> f64 {
    20.0 * gain.abs().max(DB_EPS).log10()
}

pub fn frame_rms<T: SampleType>(x: &[T]) -> f64 {
    let mut s = 0.0_f64;
    for &v in x {
        let v = v.into_f64();
        s += v * v;
    }
    (s / (x.len().max(1) as f64)).sqrt()
}
