//! Owned amplitude buffer for a coherent register
//!
//! The buffer is exclusively owned by one register. Operations that change
//! the register width (compose, decompose, dispose) or that permute
//! amplitudes into a fresh buffer replace the whole allocation through
//! [`StateVector::replace`]; the old buffer is dropped on every exit path.

use crate::error::{RegisterError, Result};
use crate::parallel;
use num_complex::Complex64;

/// Widest register the engine can address: basis indices are `usize`, and
/// `1 << qubit_count` must not overflow.
pub const MAX_QUBITS: usize = usize::BITS as usize - 1;

/// Contiguous vector of `2^n` complex amplitudes indexed by the permutation
/// integer (bit `i` of the index is the classical value of qubit `i`).
#[derive(Clone, Debug)]
pub struct StateVector {
    qubit_count: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// Create a state vector holding all amplitude in basis state `perm`,
    /// scaled by `phase` (a unit complex global-phase factor).
    pub fn new(qubit_count: usize, perm: usize, phase: Complex64) -> Result<Self> {
        if qubit_count == 0 || qubit_count > MAX_QUBITS {
            return Err(RegisterError::CapacityExceeded {
                qubits: qubit_count,
                max: MAX_QUBITS,
            });
        }

        let dimension = 1usize << qubit_count;
        if perm >= dimension {
            return Err(RegisterError::InvalidPermutation {
                permutation: perm,
                dimension,
            });
        }

        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dimension];
        amplitudes[perm] = phase;

        Ok(Self {
            qubit_count,
            amplitudes,
        })
    }

    /// Create a state vector from raw amplitude data.
    pub fn from_amplitudes(qubit_count: usize, amplitudes: &[Complex64]) -> Result<Self> {
        if qubit_count == 0 || qubit_count > MAX_QUBITS {
            return Err(RegisterError::CapacityExceeded {
                qubits: qubit_count,
                max: MAX_QUBITS,
            });
        }

        let dimension = 1usize << qubit_count;
        if amplitudes.len() != dimension {
            return Err(RegisterError::DimensionMismatch {
                expected: dimension,
                actual: amplitudes.len(),
            });
        }

        Ok(Self {
            qubit_count,
            amplitudes: amplitudes.to_vec(),
        })
    }

    #[inline]
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// State dimension, `2^qubit_count`
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Zero the buffer and place all amplitude on `perm` with the given
    /// global-phase factor.
    pub fn reset_to_permutation(&mut self, perm: usize, phase: Complex64) -> Result<()> {
        if perm >= self.dimension() {
            return Err(RegisterError::InvalidPermutation {
                permutation: perm,
                dimension: self.dimension(),
            });
        }

        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[perm] = phase;
        Ok(())
    }

    /// Replace the owned buffer, possibly changing the register width.
    ///
    /// The new buffer length must be a power of two; the previous buffer is
    /// dropped.
    pub fn replace(&mut self, amplitudes: Vec<Complex64>) {
        debug_assert!(amplitudes.len().is_power_of_two());
        self.qubit_count = amplitudes.len().trailing_zeros() as usize;
        self.amplitudes = amplitudes;
    }

    /// Squared Euclidean norm of the amplitude vector
    pub fn norm_sqr(&self, parallel_threshold: usize) -> f64 {
        parallel::par_norm_sqr(&self.amplitudes, parallel_threshold)
    }

    /// Euclidean norm of the amplitude vector
    pub fn norm(&self, parallel_threshold: usize) -> f64 {
        self.norm_sqr(parallel_threshold).sqrt()
    }

    /// Scale every amplitude by a real factor
    pub fn scale(&mut self, factor: f64, parallel_threshold: usize) {
        parallel::par_scale(&mut self.amplitudes, factor, parallel_threshold);
    }

    /// True if `|norm - 1| < epsilon`
    pub fn is_normalized(&self, epsilon: f64, parallel_threshold: usize) -> bool {
        (self.norm(parallel_threshold) - 1.0).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_places_phase_on_permutation() {
        let phase = Complex64::from_polar(1.0, 0.7);
        let sv = StateVector::new(3, 5, phase).unwrap();

        assert_eq!(sv.qubit_count(), 3);
        assert_eq!(sv.dimension(), 8);
        assert_eq!(sv.amplitudes()[5], phase);
        for (i, amp) in sv.amplitudes().iter().enumerate() {
            if i != 5 {
                assert_eq!(*amp, Complex64::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn zero_width_rejected() {
        let result = StateVector::new(0, 0, Complex64::new(1.0, 0.0));
        assert!(matches!(
            result,
            Err(RegisterError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn permutation_out_of_range_rejected() {
        let result = StateVector::new(2, 4, Complex64::new(1.0, 0.0));
        assert!(matches!(
            result,
            Err(RegisterError::InvalidPermutation { .. })
        ));
    }

    #[test]
    fn from_amplitudes_checks_dimension() {
        let amps = vec![Complex64::new(1.0, 0.0); 3];
        assert!(StateVector::from_amplitudes(2, &amps).is_err());
    }

    #[test]
    fn norm_of_basis_state_is_one() {
        let sv = StateVector::new(4, 0, Complex64::from_polar(1.0, 1.3)).unwrap();
        assert_relative_eq!(sv.norm(usize::MAX), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn scale_rescales_norm() {
        let amps = vec![Complex64::new(1.0, 0.0); 4];
        let mut sv = StateVector::from_amplitudes(2, &amps).unwrap();
        assert_relative_eq!(sv.norm(usize::MAX), 2.0, epsilon = 1e-12);

        sv.scale(0.5, usize::MAX);
        assert_relative_eq!(sv.norm(usize::MAX), 1.0, epsilon = 1e-12);
        assert!(sv.is_normalized(1e-10, usize::MAX));
    }

    #[test]
    fn replace_adjusts_width() {
        let mut sv = StateVector::new(2, 0, Complex64::new(1.0, 0.0)).unwrap();
        sv.replace(vec![Complex64::new(0.0, 0.0); 16]);
        assert_eq!(sv.qubit_count(), 4);
        assert_eq!(sv.dimension(), 16);
    }
}
