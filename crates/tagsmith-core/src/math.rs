//! Shared math utilities.

/// Logistic sigmoid that does not overflow for large-magnitude inputs.
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Apply [`sigmoid`] to every logit in place.
pub fn sigmoid_in_place(v: &mut [f32]) {
    for x in v.iter_mut() {
        *x = sigmoid(*x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for x in [0.1_f32, 1.0, 3.5, 10.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sigmoid_extremes_are_finite() {
        let hi = sigmoid(1000.0);
        let lo = sigmoid(-1000.0);
        assert!(hi.is_finite() && lo.is_finite());
        assert!((hi - 1.0).abs() < 1e-6);
        assert!(lo >= 0.0 && lo < 1e-6);
    }

    #[test]
    fn test_sigmoid_in_place() {
        let mut v = vec![0.0, 100.0, -100.0];
        sigmoid_in_place(&mut v);
        assert!((v[0] - 0.5).abs() < 1e-7);
        assert!(v[1] > 0.999);
        assert!(v[2] < 0.001);
    }
}
