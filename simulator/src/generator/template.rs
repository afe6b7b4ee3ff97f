use std::f64::consts::PI;

/// Gaussian-windowed cosine centred on `t = 0`.
pub fn gaussian_pulse(t: f64, frequency: f64, width: f64) -> f64 {
    (-(t / width).powi(2)).exp() * (2.0 * PI * frequency * t).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_peaks_at_origin_and_decays() {
        assert_eq!(gaussian_pulse(0.0, 0.1, 10.0), 1.0);
        assert!(gaussian_pulse(60.0, 0.1, 10.0).abs() < 1e-12);
    }
}
