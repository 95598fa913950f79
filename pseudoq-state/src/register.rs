//! The coherent register
//!
//! A [`CoherentUnit`] owns the full amplitude vector of an n-qubit pure
//! state and mutates it in place through gates, measurement, composition,
//! and the arithmetic opcodes. The register is deliberately pseudo-quantum:
//! the exact state can be cloned and probabilities can be read directly,
//! which a physical device cannot offer.
//!
//! # Example
//!
//! ```
//! use pseudoq_state::CoherentUnit;
//!
//! // Bell pair: H on qubit 0, then CNOT 0 → 1
//! let mut unit = CoherentUnit::with_seed(2, 0, 7).unwrap();
//! unit.h(0).unwrap();
//! unit.cnot(0, 1).unwrap();
//!
//! assert!((unit.prob(0).unwrap() - 0.5).abs() < 1e-10);
//! ```

use crate::backend::{BackendConfig, ComputeBackend, CpuBackend};
use crate::error::{RegisterError, Result};
use crate::state_vector::StateVector;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Coherent register of `qubit_count` qubits holding a dense pure state.
pub struct CoherentUnit {
    /// Owned amplitude buffer, `2^qubit_count` entries
    pub(crate) state: StateVector,

    /// Tracked Euclidean norm of the buffer. The invariant
    /// `Σ|amp|² == running_norm²` holds after every operation; observables
    /// restore it to 1 before reading.
    pub(crate) running_norm: f64,

    /// Per-register random source for global phases and measurement draws
    pub(crate) rng: StdRng,

    /// Kernel execution backend, shared between registers
    pub(crate) backend: Arc<dyn ComputeBackend>,
}

impl CoherentUnit {
    /// Create a register with all amplitude in `|0…0⟩`, modulo a random
    /// global phase.
    pub fn new(qubit_count: usize) -> Result<Self> {
        Self::with_permutation(qubit_count, 0)
    }

    /// Create a register with all amplitude in the basis state `perm`,
    /// modulo a random global phase.
    pub fn with_permutation(qubit_count: usize, perm: usize) -> Result<Self> {
        Self::with_backend(qubit_count, perm, CpuBackend::shared())
    }

    /// Create a register with a deterministic random source. Fixed seeds
    /// make the amplitude vector reproducible run to run.
    pub fn with_seed(qubit_count: usize, perm: usize, seed: u64) -> Result<Self> {
        Self::build(
            qubit_count,
            perm,
            StdRng::seed_from_u64(seed),
            CpuBackend::shared(),
        )
    }

    /// Create a register on an explicit compute backend.
    pub fn with_backend(
        qubit_count: usize,
        perm: usize,
        backend: Arc<dyn ComputeBackend>,
    ) -> Result<Self> {
        Self::build(qubit_count, perm, StdRng::from_entropy(), backend)
    }

    /// Create a register from backend configuration options.
    pub fn with_config(qubit_count: usize, perm: usize, config: &BackendConfig) -> Result<Self> {
        Self::with_backend(qubit_count, perm, Arc::new(CpuBackend::with_config(config)))
    }

    fn build(
        qubit_count: usize,
        perm: usize,
        mut rng: StdRng,
        backend: Arc<dyn ComputeBackend>,
    ) -> Result<Self> {
        let angle = rng.gen::<f64>() * 2.0 * PI;
        let state = StateVector::new(qubit_count, perm, Complex64::from_polar(1.0, angle))?;

        Ok(Self {
            state,
            running_norm: 1.0,
            rng,
            backend,
        })
    }

    /// PSEUDO-QUANTUM: exact copy of this register's quantum state, with an
    /// independent random source.
    pub fn clone_state(&self) -> Self {
        Self {
            state: self.state.clone(),
            running_norm: self.running_norm,
            rng: StdRng::from_entropy(),
            backend: Arc::clone(&self.backend),
        }
    }

    /// Number of qubits in this register
    #[inline]
    pub fn qubit_count(&self) -> usize {
        self.state.qubit_count()
    }

    /// Size of the amplitude vector, `2^qubit_count`
    #[inline]
    pub fn max_q_power(&self) -> usize {
        self.state.dimension()
    }

    /// PSEUDO-QUANTUM: read the exact amplitude vector, normalized first.
    pub fn clone_raw_state(&mut self) -> Vec<Complex64> {
        self.normalize_if_dirty();
        self.state.amplitudes().to_vec()
    }

    /// Draw a uniform random double in `[0, 1)` from this register's source
    pub fn rand(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Set a pure permutation state, with a fresh random global phase.
    pub fn set_permutation(&mut self, perm: usize) -> Result<()> {
        let angle = self.rng.gen::<f64>() * 2.0 * PI;
        self.state
            .reset_to_permutation(perm, Complex64::from_polar(1.0, angle))?;
        self.running_norm = 1.0;
        Ok(())
    }

    /// Set an arbitrary pure state in the permutation basis.
    pub fn set_quantum_state(&mut self, amplitudes: &[Complex64]) -> Result<()> {
        if amplitudes.len() != self.max_q_power() {
            return Err(RegisterError::DimensionMismatch {
                expected: self.max_q_power(),
                actual: amplitudes.len(),
            });
        }

        self.state.amplitudes_mut().copy_from_slice(amplitudes);
        self.update_running_norm();
        Ok(())
    }

    /// Force an individual bit to `|0⟩` or `|1⟩` by measuring and
    /// conditionally flipping.
    pub fn set_bit(&mut self, qubit: usize, value: bool) -> Result<()> {
        if self.m(qubit)? != value {
            self.x(qubit)?;
        }
        Ok(())
    }

    // ---- norm discipline -------------------------------------------------

    /// Rescale so the tracked norm is exactly 1.
    pub(crate) fn normalize_state(&mut self) {
        let threshold = self.backend.parallel_threshold();
        self.state.scale(1.0 / self.running_norm, threshold);
        self.running_norm = 1.0;
    }

    /// Restore `running_norm == 1` if a norm-changing kernel left drift.
    pub(crate) fn normalize_if_dirty(&mut self) {
        if self.running_norm != 1.0 {
            self.normalize_state();
        }
    }

    /// Recompute the tracked norm from the buffer.
    pub(crate) fn update_running_norm(&mut self) {
        self.running_norm = self.backend.norm_sqr(self.state.amplitudes()).sqrt();
    }

    /// Current tracked norm
    pub fn running_norm(&self) -> f64 {
        self.running_norm
    }

    // ---- argument validation --------------------------------------------

    pub(crate) fn check_qubit(&self, index: usize) -> Result<()> {
        if index >= self.qubit_count() {
            return Err(RegisterError::InvalidQubitIndex {
                index,
                qubit_count: self.qubit_count(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_range(&self, start: usize, length: usize) -> Result<()> {
        if start.checked_add(length).map_or(true, |end| end > self.qubit_count()) {
            return Err(RegisterError::InvalidRange {
                start,
                length,
                qubit_count: self.qubit_count(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_distinct(&self, indices: &[usize]) -> Result<()> {
        for (i, &a) in indices.iter().enumerate() {
            for &b in &indices[i + 1..] {
                if a == b {
                    return Err(RegisterError::DuplicateQubit { index: a });
                }
            }
        }
        Ok(())
    }

    /// Random unit phase factor drawn from this register's source
    pub(crate) fn random_phase(&mut self) -> Complex64 {
        let angle = self.rng.gen::<f64>() * 2.0 * PI;
        Complex64::from_polar(1.0, angle)
    }

    /// Bit mask covering the sub-register `[start, start+length)`
    pub(crate) fn reg_mask(start: usize, length: usize) -> usize {
        ((1usize << length) - 1) << start
    }
}

impl fmt::Debug for CoherentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoherentUnit")
            .field("qubit_count", &self.qubit_count())
            .field("max_q_power", &self.max_q_power())
            .field("running_norm", &self.running_norm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_register_is_basis_state_with_unit_phase() {
        let mut unit = CoherentUnit::with_seed(3, 5, 42).unwrap();
        assert_eq!(unit.qubit_count(), 3);
        assert_eq!(unit.max_q_power(), 8);

        let amps = unit.clone_raw_state();
        assert_relative_eq!(amps[5].norm(), 1.0, epsilon = 1e-12);
        for (i, amp) in amps.iter().enumerate() {
            if i != 5 {
                assert_relative_eq!(amp.norm(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn fixed_seed_reproduces_state() {
        let mut a = CoherentUnit::with_seed(4, 3, 99).unwrap();
        let mut b = CoherentUnit::with_seed(4, 3, 99).unwrap();

        a.h(0).unwrap();
        b.h(0).unwrap();
        a.cnot(0, 2).unwrap();
        b.cnot(0, 2).unwrap();

        assert_eq!(a.clone_raw_state(), b.clone_raw_state());
    }

    #[test]
    fn clone_state_copies_amplitudes_exactly() {
        let mut unit = CoherentUnit::with_seed(2, 1, 5).unwrap();
        unit.h(0).unwrap();

        let mut copy = unit.clone_state();
        assert_eq!(unit.clone_raw_state(), copy.clone_raw_state());
    }

    #[test]
    fn set_permutation_moves_all_mass() {
        let mut unit = CoherentUnit::with_seed(3, 0, 1).unwrap();
        unit.set_permutation(6).unwrap();

        assert_relative_eq!(unit.prob_all(6).unwrap(), 1.0, epsilon = 1e-12);
        assert!(unit.set_permutation(8).is_err());
    }

    #[test]
    fn set_quantum_state_tracks_norm() {
        let mut unit = CoherentUnit::with_seed(1, 0, 1).unwrap();
        let amps = vec![Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)];
        unit.set_quantum_state(&amps).unwrap();

        assert_relative_eq!(unit.running_norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(unit.prob(0).unwrap(), 0.64, epsilon = 1e-12);
    }

    #[test]
    fn set_quantum_state_checks_dimension() {
        let mut unit = CoherentUnit::with_seed(2, 0, 1).unwrap();
        let amps = vec![Complex64::new(1.0, 0.0); 2];
        assert!(matches!(
            unit.set_quantum_state(&amps),
            Err(RegisterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn set_bit_forces_value() {
        let mut unit = CoherentUnit::with_seed(2, 0, 3).unwrap();
        unit.set_bit(1, true).unwrap();
        assert_relative_eq!(unit.prob(1).unwrap(), 1.0, epsilon = 1e-12);

        unit.set_bit(1, false).unwrap();
        assert_relative_eq!(unit.prob(1).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn capacity_check_rejects_oversized_register() {
        assert!(matches!(
            CoherentUnit::new(usize::BITS as usize),
            Err(RegisterError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn index_validation() {
        let mut unit = CoherentUnit::with_seed(2, 0, 1).unwrap();
        assert!(matches!(
            unit.x(2),
            Err(RegisterError::InvalidQubitIndex { .. })
        ));
        assert!(matches!(
            unit.cnot(0, 0),
            Err(RegisterError::DuplicateQubit { .. })
        ));
    }
}
