//! Tensor-product composition and partial factoring
//!
//! `compose` joins two coherent registers into one; `decompose` splits a
//! contiguous sub-register out into a destination register; `dispose` drops
//! it. All three rebuild amplitudes from marginal probabilities with a fresh
//! random global phase, so per-amplitude phase is not preserved — marginal
//! probabilities are, exactly up to floating-point error.

use crate::error::{RegisterError, Result};
use crate::register::CoherentUnit;
use crate::state_vector::MAX_QUBITS;
use num_complex::Complex64;
use rayon::prelude::*;

impl CoherentUnit {
    /// Combine another register's state after the last bit of this one,
    /// growing this register by `other.qubit_count()` qubits.
    ///
    /// The combined state is assumed to factor: the composite amplitude at
    /// index `j` is `e^(iφ)·√(p_self(j & startMask) · p_other(j >> q))`,
    /// with one random global phase φ for the whole product.
    pub fn compose(&mut self, other: &CoherentUnit) -> Result<()> {
        let q = self.qubit_count();
        let new_qubit_count = q + other.qubit_count();
        if new_qubit_count > MAX_QUBITS {
            return Err(RegisterError::CapacityExceeded {
                qubits: new_qubit_count,
                max: MAX_QUBITS,
            });
        }

        self.normalize_if_dirty();
        // The other register's buffer is read-only here; fold its tracked
        // norm into the marginal instead of rescaling it.
        let other_norm_sqr = other.running_norm * other.running_norm;

        let start_mask = self.max_q_power() - 1;
        let phase = self.random_phase();

        let new_dimension = 1usize << new_qubit_count;
        let mut new_state = vec![Complex64::new(0.0, 0.0); new_dimension];

        let self_amps = self.state.amplitudes();
        let other_amps = other.state.amplitudes();
        let fill = |(j, out): (usize, &mut Complex64)| {
            let p_self = self_amps[j & start_mask].norm_sqr();
            let p_other = other_amps[j >> q].norm_sqr() / other_norm_sqr;
            *out = phase * (p_self * p_other).sqrt();
        };

        if new_dimension >= self.backend.parallel_threshold() {
            new_state.par_iter_mut().enumerate().for_each(fill);
        } else {
            new_state.iter_mut().enumerate().for_each(fill);
        }

        self.state.replace(new_state);
        self.update_running_norm();
        Ok(())
    }

    /// Minimally decohere the sub-register `[start, start+length)` out of
    /// this register and into `destination`, which must already hold
    /// exactly `length` qubits.
    ///
    /// This register shrinks by `length` qubits. Both results carry
    /// independent fresh global phases.
    pub fn decompose(
        &mut self,
        start: usize,
        length: usize,
        destination: &mut CoherentUnit,
    ) -> Result<()> {
        self.check_range(start, length)?;
        if destination.qubit_count() != length {
            return Err(RegisterError::DimensionMismatch {
                expected: 1usize << length,
                actual: destination.max_q_power(),
            });
        }

        let (part_prob, remainder_prob) = self.marginal_probabilities(start, length);

        let part_phase = self.random_phase();
        destination.fill_from_marginals(&part_prob, part_phase);

        let remainder_phase = self.random_phase();
        self.fill_from_marginals(&remainder_prob, remainder_phase);
        Ok(())
    }

    /// As [`CoherentUnit::decompose`], discarding the removed sub-register.
    pub fn dispose(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;

        let (_, remainder_prob) = self.marginal_probabilities(start, length);
        let phase = self.random_phase();
        self.fill_from_marginals(&remainder_prob, phase);
        Ok(())
    }

    /// Marginal probability arrays of the sub-register and of the rest.
    fn marginal_probabilities(&mut self, start: usize, length: usize) -> (Vec<f64>, Vec<f64>) {
        self.normalize_if_dirty();

        let mask = Self::reg_mask(start, length);
        let start_mask = (1usize << start) - 1;
        let end_mask = (self.max_q_power() - 1) ^ mask ^ start_mask;

        let mut part_prob = vec![0.0; 1usize << length];
        let mut remainder_prob = vec![0.0; 1usize << (self.qubit_count() - length)];

        for (i, amp) in self.state.amplitudes().iter().enumerate() {
            let prob = amp.norm_sqr();
            part_prob[(i & mask) >> start] += prob;
            remainder_prob[(i & start_mask) | ((i & end_mask) >> length)] += prob;
        }

        (part_prob, remainder_prob)
    }

    /// Replace this register's buffer with amplitudes rebuilt from a
    /// marginal probability array and a single global phase.
    fn fill_from_marginals(&mut self, marginals: &[f64], phase: Complex64) {
        let total: f64 = marginals.iter().sum();
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); marginals.len()];

        if total == 0.0 {
            // No mass survived the split; park everything on |0…0⟩.
            amplitudes[0] = phase;
        } else {
            for (amp, &prob) in amplitudes.iter_mut().zip(marginals) {
                *amp = phase * (prob / total).sqrt();
            }
        }

        self.state.replace(amplitudes);
        self.update_running_norm();
    }
}
