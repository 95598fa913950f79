//! Compute-backend seam for the amplitude-update kernel
//!
//! The gate layer targets only [`ComputeBackend`]; the bundled
//! [`CpuBackend`] fans the kernel out on rayon. A device-accelerated
//! implementation can be slotted in by the host without touching the gate
//! layer — registers hold a shared handle threaded through their
//! constructors, so there is no process-wide backend state.

use crate::parallel::{self, SharedSlice, DEFAULT_PARALLEL_THRESHOLD};
use num_complex::Complex64;
use pseudoq_gates::Matrix2x2;
use std::sync::Arc;

/// Options recognized by backend constructors.
///
/// The platform and device indices select hardware for accelerated
/// backends; the CPU backend consumes only the parallel threshold.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Compute platform index for device-accelerated backends
    pub platform_index: usize,

    /// Device index within the platform
    pub device_index: usize,

    /// State dimension at which kernels go parallel
    pub parallel_threshold: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            platform_index: 0,
            device_index: 0,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// The amplitude-update kernel contract.
///
/// For every basis index with all involved bits clear (enumerated from the
/// sorted bit powers), the kernel maps the amplitude pair at
/// `(base + offset1, base + offset2)` through the 2×2 matrix, optionally
/// scaled by `norm_scale`. Implementations also provide the norm reduction
/// and rescale used by the normalization discipline.
pub trait ComputeBackend: Send + Sync {
    /// Apply a 2×2 matrix to every amplitude pair selected by the sorted
    /// bit powers and the two offsets.
    fn apply_2x2(
        &self,
        state: &mut [Complex64],
        offset1: usize,
        offset2: usize,
        matrix: &Matrix2x2,
        sorted_powers: &[usize],
        norm_scale: f64,
    );

    /// Sum of squared amplitude magnitudes
    fn norm_sqr(&self, state: &[Complex64]) -> f64;

    /// Scale every amplitude by a real factor
    fn scale(&self, state: &mut [Complex64], factor: f64);

    /// The dimension at which this backend's kernels go parallel
    fn parallel_threshold(&self) -> usize;
}

/// Kernel execution on the host CPU via rayon
#[derive(Debug, Clone)]
pub struct CpuBackend {
    parallel_threshold: usize,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::with_config(&BackendConfig::default())
    }

    pub fn with_config(config: &BackendConfig) -> Self {
        Self {
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Shared handle to a default CPU backend
    pub fn shared() -> Arc<dyn ComputeBackend> {
        Arc::new(Self::new())
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn apply_2x2(
        &self,
        state: &mut [Complex64],
        offset1: usize,
        offset2: usize,
        matrix: &Matrix2x2,
        sorted_powers: &[usize],
        norm_scale: f64,
    ) {
        let dimension = state.len();
        let count = dimension >> sorted_powers.len();

        let m00 = matrix[0][0];
        let m01 = matrix[0][1];
        let m10 = matrix[1][0];
        let m11 = matrix[1][1];

        let amps = SharedSlice::new(state);
        parallel::par_for_masked(
            count,
            dimension,
            sorted_powers,
            self.parallel_threshold,
            |base| {
                // Pairs at distinct base indices are disjoint because the
                // offsets only ever set involved bits, which are clear in
                // every expanded base.
                let i0 = base + offset1;
                let i1 = base + offset2;
                unsafe {
                    let a = amps.read(i0);
                    let b = amps.read(i1);
                    amps.write(i0, (m00 * a + m01 * b) * norm_scale);
                    amps.write(i1, (m10 * a + m11 * b) * norm_scale);
                }
            },
        );
    }

    fn norm_sqr(&self, state: &[Complex64]) -> f64 {
        parallel::par_norm_sqr(state, self.parallel_threshold)
    }

    fn scale(&self, state: &mut [Complex64], factor: f64) {
        parallel::par_scale(state, factor, self.parallel_threshold);
    }

    fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pseudoq_gates::{HADAMARD, PAULI_X};

    fn basis(dimension: usize, index: usize) -> Vec<Complex64> {
        let mut state = vec![Complex64::new(0.0, 0.0); dimension];
        state[index] = Complex64::new(1.0, 0.0);
        state
    }

    #[test]
    fn single_bit_x_flips_target() {
        let backend = CpuBackend::new();
        let mut state = basis(4, 0);

        // X on qubit 0: powers {1}, offsets (1, 0)
        backend.apply_2x2(&mut state, 1, 0, &PAULI_X, &[1], 1.0);

        assert_relative_eq!(state[1].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state[0].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn controlled_offsets_leave_control_zero_subspace() {
        let backend = CpuBackend::new();

        // CNOT with control 0, target 1: powers {1, 2}, offsets (3, 1).
        // |01⟩ (control set) flips to |11⟩ ...
        let mut state = basis(4, 1);
        backend.apply_2x2(&mut state, 3, 1, &PAULI_X, &[1, 2], 1.0);
        assert_relative_eq!(state[3].re, 1.0, epsilon = 1e-12);

        // ... while |00⟩ is untouched.
        let mut state = basis(4, 0);
        backend.apply_2x2(&mut state, 3, 1, &PAULI_X, &[1, 2], 1.0);
        assert_relative_eq!(state[0].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hadamard_splits_amplitude() {
        let backend = CpuBackend::new();
        let mut state = basis(2, 0);

        backend.apply_2x2(&mut state, 1, 0, &HADAMARD, &[1], 1.0);

        assert_relative_eq!(state[0].norm_sqr(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(state[1].norm_sqr(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(backend.norm_sqr(&state), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn norm_scale_folds_into_kernel() {
        let backend = CpuBackend::new();
        let mut state = vec![Complex64::new(2.0, 0.0), Complex64::new(0.0, 0.0)];

        // Identity-shaped X∘X via two applications with scale 0.5 total
        backend.apply_2x2(&mut state, 1, 0, &PAULI_X, &[1], 0.5);
        assert_relative_eq!(state[1].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(backend.norm_sqr(&state), 1.0, epsilon = 1e-12);
    }
}
