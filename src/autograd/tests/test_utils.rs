//! Shared helpers for gradient checks

/// Central-difference gradient of `f` at `x`
pub fn numeric_grad(f: impl Fn(&[f32]) -> f32, x: &[f32], h: f32) -> Vec<f32> {
    let mut probe = x.to_vec();
    (0..x.len())
        .map(|i| {
            probe[i] = x[i] + h;
            let up = f(&probe);
            probe[i] = x[i] - h;
            let down = f(&probe);
            probe[i] = x[i];
            (up - down) / (2.0 * h)
        })
        .collect()
}

/// Deterministic values in roughly [-2, 2) derived from `seed`
pub fn seeded_values(seed: u64, len: usize) -> Vec<f32> {
    (0..len as u64)
        .map(|i| {
            let mixed = seed.wrapping_mul(6364136223846793005).wrapping_add(i.wrapping_mul(1442695040888963407));
            ((mixed >> 40) % 400) as f32 / 100.0 - 2.0
        })
        .collect()
}

/// Weighted sum used as a scalar objective so upstream gradients are not all ones
pub fn weighted_sum(values: &[f32], weights: &[f32]) -> f32 {
    values.iter().zip(weights).map(|(v, w)| v * w).sum()
}

#[test]
fn test_seeded_values_cover_long_buffers() {
    // Wide heads need hundreds of values from a single seed
    for seed in [0, 999, u64::MAX] {
        let values = seeded_values(seed, 512);
        assert_eq!(values.len(), 512);
        assert!(values.iter().all(|v| (-2.0..2.0).contains(v)));
    }
    assert_ne!(seeded_values(1, 16), seeded_values(2, 16));
}
