//! Common test utilities
#![allow(dead_code)]

use edgewise::runtime::cpu::{CpuClient, CpuDevice};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuClient::new(device.clone());
    (client, device)
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Deterministic feature values in [-1, 1]
pub fn features_f32(len: usize, seed: u32) -> Vec<f32> {
    let mut state = seed.wrapping_mul(2_654_435_761) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % 2001) as f32 / 1000.0 - 1.0
        })
        .collect()
}

/// Serial elementwise product over an edge list with `feat`-wide rows
pub fn reference_mul_f32(row: &[i64], col: &[i64], lhs: &[f32], rhs: &[f32], feat: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(row.len() * feat);
    for (&s, &d) in row.iter().zip(col) {
        let (s, d) = (s as usize, d as usize);
        for k in 0..feat {
            out.push(lhs[s * feat + k] * rhs[d * feat + k]);
        }
    }
    out
}

/// Source-sorted CSR arrays for a COO edge list, or `None` if unsorted
pub fn csr_from_sorted_coo(row: &[i64], col: &[i64], num_src: usize) -> Option<(Vec<i64>, Vec<i64>)> {
    if row.windows(2).any(|w| w[0] > w[1]) {
        return None;
    }
    let mut row_ptrs = vec![0i64; num_src + 1];
    for &r in row {
        row_ptrs[r as usize + 1] += 1;
    }
    for i in 0..num_src {
        row_ptrs[i + 1] += row_ptrs[i];
    }
    Some((row_ptrs, col.to_vec()))
}
