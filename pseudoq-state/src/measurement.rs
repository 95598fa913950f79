//! Probability queries and projective measurement
//!
//! All observables restore `running_norm == 1` before reading the buffer.
//! Measurement is in-place and destructive: the losing branch is zeroed and
//! the surviving branch is rescaled by `e^(iφ)/√p` with a fresh random
//! global phase φ.

use crate::error::{RegisterError, Result};
use crate::parallel;
use crate::register::CoherentUnit;
use num_complex::Complex64;

impl CoherentUnit {
    /// PSEUDO-QUANTUM: probability of qubit `index` reading |1⟩.
    pub fn prob(&mut self, index: usize) -> Result<f64> {
        self.check_qubit(index)?;
        self.normalize_if_dirty();
        Ok(self.one_chance(index))
    }

    /// PSEUDO-QUANTUM: probability of the whole register reading the
    /// permutation `perm`.
    pub fn prob_all(&mut self, perm: usize) -> Result<f64> {
        if perm >= self.max_q_power() {
            return Err(RegisterError::InvalidPermutation {
                permutation: perm,
                dimension: self.max_q_power(),
            });
        }

        self.normalize_if_dirty();
        Ok(self.state.amplitudes()[perm].norm_sqr())
    }

    /// PSEUDO-QUANTUM: fill `probabilities` with every basis-state
    /// probability.
    pub fn prob_array(&mut self, probabilities: &mut [f64]) -> Result<()> {
        if probabilities.len() != self.max_q_power() {
            return Err(RegisterError::DimensionMismatch {
                expected: self.max_q_power(),
                actual: probabilities.len(),
            });
        }

        self.normalize_if_dirty();
        parallel::par_probabilities(
            self.state.amplitudes(),
            probabilities,
            self.backend.parallel_threshold(),
        );
        Ok(())
    }

    /// Measure a single qubit, collapsing the state.
    ///
    /// Returns the outcome. Fails with
    /// [`RegisterError::DegenerateMeasurement`] if floating-point drift
    /// selects a branch carrying no probability mass.
    pub fn m(&mut self, index: usize) -> Result<bool> {
        self.check_qubit(index)?;
        self.normalize_if_dirty();

        let one_chance = self.one_chance(index);
        let draw = self.rand();
        let outcome = draw < one_chance && one_chance > 0.0;

        let branch_prob = if outcome { one_chance } else { 1.0 - one_chance };
        if branch_prob <= 0.0 {
            return Err(RegisterError::DegenerateMeasurement {
                probability: branch_prob,
            });
        }

        let rescale = self.random_phase() / branch_prob.sqrt();
        let power = 1usize << index;
        let zero = Complex64::new(0.0, 0.0);
        parallel::par_update(
            self.state.amplitudes_mut(),
            self.backend.parallel_threshold(),
            |i, amp| {
                if ((i & power) != 0) == outcome {
                    amp * rescale
                } else {
                    zero
                }
            },
        );

        self.update_running_norm();
        Ok(outcome)
    }

    /// Measure the whole register against the permutation `perm`,
    /// collapsing either onto `|perm⟩` or onto its complement.
    pub fn m_all(&mut self, perm: usize) -> Result<bool> {
        let one_chance = self.prob_all(perm)?;
        let draw = self.rand();
        let outcome = draw < one_chance && one_chance > 0.0;

        let phase = self.random_phase();
        let zero = Complex64::new(0.0, 0.0);
        let threshold = self.backend.parallel_threshold();

        if outcome {
            parallel::par_update(self.state.amplitudes_mut(), threshold, |i, _| {
                if i == perm {
                    phase
                } else {
                    zero
                }
            });
        } else {
            let remainder = 1.0 - one_chance;
            if remainder <= 0.0 {
                return Err(RegisterError::DegenerateMeasurement {
                    probability: remainder,
                });
            }

            let rescale = phase / remainder.sqrt();
            parallel::par_update(self.state.amplitudes_mut(), threshold, |i, amp| {
                if i == perm {
                    zero
                } else {
                    amp * rescale
                }
            });
        }

        self.update_running_norm();
        Ok(outcome)
    }

    /// Probability of bit `index` being set, assuming a normalized buffer.
    fn one_chance(&self, index: usize) -> f64 {
        parallel::par_power_norm_sqr(
            self.state.amplitudes(),
            1usize << index,
            self.backend.parallel_threshold(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn prob_of_basis_state_is_deterministic() {
        let mut unit = CoherentUnit::with_seed(3, 0b101, 31).unwrap();
        assert_relative_eq!(unit.prob(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(unit.prob(1).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(unit.prob(2).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn prob_matches_sum_over_prob_all() {
        let mut unit = CoherentUnit::with_seed(3, 0, 31).unwrap();
        unit.h(0).unwrap();
        unit.cnot(0, 1).unwrap();
        unit.ry(0.4, 2).unwrap();

        for k in 0..3 {
            let direct = unit.prob(k).unwrap();
            let summed: f64 = (0..8)
                .filter(|i| i & (1 << k) != 0)
                .map(|i| unit.prob_all(i).unwrap())
                .sum();
            assert_relative_eq!(direct, summed, epsilon = 1e-10);
        }
    }

    #[test]
    fn prob_array_sums_to_one() {
        let mut unit = CoherentUnit::with_seed(3, 0, 47).unwrap();
        unit.h_range(0, 3).unwrap();
        unit.crz(0.9, 0, 2).unwrap();

        let mut probabilities = vec![0.0; 8];
        unit.prob_array(&mut probabilities).unwrap();
        let total: f64 = probabilities.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn measurement_of_deterministic_bit() {
        let mut unit = CoherentUnit::with_seed(2, 0b10, 3).unwrap();
        assert!(!unit.m(0).unwrap());
        assert!(unit.m(1).unwrap());

        // State survived collapse intact
        assert_relative_eq!(unit.prob_all(0b10).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn measurement_collapses_superposition() {
        let mut unit = CoherentUnit::with_seed(1, 0, 57).unwrap();
        unit.h(0).unwrap();

        let outcome = unit.m(0).unwrap();
        let expected = if outcome { 1 } else { 0 };
        assert_relative_eq!(unit.prob_all(expected).unwrap(), 1.0, epsilon = 1e-10);

        // Repeated measurement agrees with the collapsed state
        assert_eq!(unit.m(0).unwrap(), outcome);
    }

    #[test]
    fn measurement_of_entangled_pair_is_correlated() {
        let mut unit = CoherentUnit::with_seed(2, 0, 91).unwrap();
        unit.h(0).unwrap();
        unit.cnot(0, 1).unwrap();

        let first = unit.m(0).unwrap();
        let second = unit.m(1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn m_all_collapses_onto_permutation() {
        let mut unit = CoherentUnit::with_seed(2, 0b11, 3).unwrap();
        assert!(unit.m_all(0b11).unwrap());
        assert_relative_eq!(unit.prob_all(0b11).unwrap(), 1.0, epsilon = 1e-12);

        let mut unit = CoherentUnit::with_seed(2, 0b11, 3).unwrap();
        assert!(!unit.m_all(0b00).unwrap());
        assert_relative_eq!(unit.prob_all(0b11).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn prob_array_checks_dimension() {
        let mut unit = CoherentUnit::with_seed(2, 0, 3).unwrap();
        let mut too_small = vec![0.0; 2];
        assert!(matches!(
            unit.prob_array(&mut too_small),
            Err(RegisterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn norm_restored_after_measurement() {
        let mut unit = CoherentUnit::with_seed(3, 0, 77).unwrap();
        unit.h_range(0, 3).unwrap();
        unit.m(1).unwrap();

        let mut probabilities = vec![0.0; 8];
        unit.prob_array(&mut probabilities).unwrap();
        let total: f64 = probabilities.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-10);
    }
}
