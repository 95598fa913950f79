//! Classical bitwise logic on qubits
//!
//! AND, OR, and XOR compare register bits and store the result in an output
//! bit, built from the controlled-NOT family. When the output aliases one
//! of the inputs the result is computed into a freshly composed ancilla
//! qubit, swapped into place, and the ancilla disposed.

use crate::error::Result;
use crate::register::CoherentUnit;

impl CoherentUnit {
    /// AND of two register bits into `output`.
    pub fn and(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        self.check_qubit(input1)?;
        self.check_qubit(input2)?;
        self.check_qubit(output)?;

        if input1 == input2 && input2 == output {
            // x AND x = x
            return Ok(());
        }

        if input1 == output || input2 == output {
            let ancilla = Self::with_backend(1, 0, self.backend.clone())?;
            self.compose(&ancilla)?;
            let last = self.qubit_count() - 1;
            self.ccnot(input1, input2, last)?;
            self.swap(last, output)?;
            self.dispose(last, 1)?;
        } else if input1 == input2 {
            self.set_bit(output, false)?;
            self.cnot(input1, output)?;
        } else {
            self.set_bit(output, false)?;
            self.ccnot(input1, input2, output)?;
        }
        Ok(())
    }

    /// OR of two register bits into `output`.
    pub fn or(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        self.check_qubit(input1)?;
        self.check_qubit(input2)?;
        self.check_qubit(output)?;

        if input1 == input2 && input2 == output {
            return Ok(());
        }

        if input1 == output || input2 == output {
            let ancilla = Self::with_backend(1, 1, self.backend.clone())?;
            self.compose(&ancilla)?;
            let last = self.qubit_count() - 1;
            self.anti_ccnot(input1, input2, last)?;
            self.swap(last, output)?;
            self.dispose(last, 1)?;
        } else if input1 == input2 {
            self.set_bit(output, true)?;
            self.anti_cnot(input1, output)?;
        } else {
            self.set_bit(output, true)?;
            self.anti_ccnot(input1, input2, output)?;
        }
        Ok(())
    }

    /// XOR of two register bits into `output`.
    pub fn xor(&mut self, input1: usize, input2: usize, output: usize) -> Result<()> {
        self.check_qubit(input1)?;
        self.check_qubit(input2)?;
        self.check_qubit(output)?;

        if input1 == input2 && input2 == output {
            // x XOR x = 0
            return self.set_bit(output, false);
        }

        if input1 == output || input2 == output {
            let ancilla = Self::with_backend(1, 0, self.backend.clone())?;
            self.compose(&ancilla)?;
            let last = self.qubit_count() - 1;
            self.cnot(input1, last)?;
            self.cnot(input2, last)?;
            self.swap(last, output)?;
            self.dispose(last, 1)?;
        } else {
            self.set_bit(output, false)?;
            self.cnot(input1, output)?;
            self.cnot(input2, output)?;
        }
        Ok(())
    }

    /// AND of a register bit with a classical bit into `output`.
    pub fn cland(&mut self, q_input: usize, classical_input: bool, output: usize) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_qubit(output)?;

        if q_input == output {
            // x AND 1 = x; x AND 0 = 0
            if !classical_input {
                self.set_bit(output, false)?;
            }
            return Ok(());
        }

        self.set_bit(output, false)?;
        if classical_input {
            self.cnot(q_input, output)?;
        }
        Ok(())
    }

    /// OR of a register bit with a classical bit into `output`.
    pub fn clor(&mut self, q_input: usize, classical_input: bool, output: usize) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_qubit(output)?;

        if q_input == output {
            // x OR 0 = x; x OR 1 = 1
            if classical_input {
                self.set_bit(output, true)?;
            }
            return Ok(());
        }

        if classical_input {
            self.set_bit(output, true)?;
        } else {
            self.set_bit(output, false)?;
            self.cnot(q_input, output)?;
        }
        Ok(())
    }

    /// XOR of a register bit with a classical bit into `output`.
    pub fn clxor(&mut self, q_input: usize, classical_input: bool, output: usize) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_qubit(output)?;

        if q_input == output {
            // x XOR 1 = NOT x; x XOR 0 = x
            if classical_input {
                self.x(output)?;
            }
            return Ok(());
        }

        self.set_bit(output, classical_input)?;
        self.cnot(q_input, output)?;
        Ok(())
    }

    /// Bitwise AND of two sub-registers into the output range.
    pub fn and_range(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;

        if input1_start == input2_start && input2_start == output_start {
            return Ok(());
        }
        for i in 0..length {
            self.and(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise OR of two sub-registers into the output range.
    pub fn or_range(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;

        if input1_start == input2_start && input2_start == output_start {
            return Ok(());
        }
        for i in 0..length {
            self.or(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// Bitwise XOR of two sub-registers into the output range.
    pub fn xor_range(
        &mut self,
        input1_start: usize,
        input2_start: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_range(input1_start, length)?;
        self.check_range(input2_start, length)?;
        self.check_range(output_start, length)?;

        for i in 0..length {
            self.xor(input1_start + i, input2_start + i, output_start + i)?;
        }
        Ok(())
    }

    /// AND of one register bit with each bit of a classical integer, into
    /// the output range. The quantum input is broadcast: output bit `i`
    /// reads `q_input AND classical_input[i]`.
    pub fn cland_range(
        &mut self,
        q_input: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_range(output_start, length)?;

        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.cland(q_input, bit, output_start + i)?;
        }
        Ok(())
    }

    /// OR of one register bit with each bit of a classical integer, into
    /// the output range. The quantum input is broadcast as in
    /// [`CoherentUnit::cland_range`].
    pub fn clor_range(
        &mut self,
        q_input: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_range(output_start, length)?;

        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.clor(q_input, bit, output_start + i)?;
        }
        Ok(())
    }

    /// XOR of one register bit with each bit of a classical integer, into
    /// the output range. The quantum input is broadcast as in
    /// [`CoherentUnit::cland_range`].
    pub fn clxor_range(
        &mut self,
        q_input: usize,
        classical_input: usize,
        output_start: usize,
        length: usize,
    ) -> Result<()> {
        self.check_qubit(q_input)?;
        self.check_range(output_start, length)?;

        for i in 0..length {
            let bit = classical_input & (1 << i) != 0;
            self.clxor(q_input, bit, output_start + i)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn truth(unit: &mut CoherentUnit, bit: usize) -> bool {
        let p = unit.prob(bit).unwrap();
        assert!(p < 1e-9 || p > 1.0 - 1e-9, "bit {bit} not classical: {p}");
        p > 0.5
    }

    #[test]
    fn and_truth_table() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(3, perm, 41).unwrap();
            unit.and(0, 1, 2).unwrap();
            assert_eq!(truth(&mut unit, 2), a && b, "a={a} b={b}");
        }
    }

    #[test]
    fn or_truth_table() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(3, perm, 43).unwrap();
            unit.or(0, 1, 2).unwrap();
            assert_eq!(truth(&mut unit, 2), a || b, "a={a} b={b}");
        }
    }

    #[test]
    fn xor_truth_table() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(3, perm, 47).unwrap();
            unit.xor(0, 1, 2).unwrap();
            assert_eq!(truth(&mut unit, 2), a ^ b, "a={a} b={b}");
        }
    }

    #[test]
    fn and_with_aliased_output() {
        // out = a AND b where out is a's own bit
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(2, perm, 53).unwrap();
            unit.and(0, 1, 0).unwrap();
            assert_eq!(truth(&mut unit, 0), a && b, "a={a} b={b}");
            assert_eq!(unit.qubit_count(), 2);
        }
    }

    #[test]
    fn or_with_aliased_output() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(2, perm, 59).unwrap();
            unit.or(0, 1, 1).unwrap();
            assert_eq!(truth(&mut unit, 1), a || b, "a={a} b={b}");
            assert_eq!(unit.qubit_count(), 2);
        }
    }

    #[test]
    fn xor_with_aliased_output() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let perm = (a as usize) | ((b as usize) << 1);
            let mut unit = CoherentUnit::with_seed(2, perm, 61).unwrap();
            unit.xor(0, 1, 0).unwrap();
            assert_eq!(truth(&mut unit, 0), a ^ b, "a={a} b={b}");
        }
    }

    #[test]
    fn xor_self_clears_bit() {
        let mut unit = CoherentUnit::with_seed(1, 1, 67).unwrap();
        unit.xor(0, 0, 0).unwrap();
        assert!(!truth(&mut unit, 0));
    }

    #[test]
    fn classical_logic_single_bits() {
        for value in [false, true] {
            for classical in [false, true] {
                let mut unit = CoherentUnit::with_seed(2, value as usize, 71).unwrap();
                unit.cland(0, classical, 1).unwrap();
                assert_eq!(truth(&mut unit, 1), value && classical);

                let mut unit = CoherentUnit::with_seed(2, value as usize, 73).unwrap();
                unit.clor(0, classical, 1).unwrap();
                assert_eq!(truth(&mut unit, 1), value || classical);

                let mut unit = CoherentUnit::with_seed(2, value as usize, 79).unwrap();
                unit.clxor(0, classical, 1).unwrap();
                assert_eq!(truth(&mut unit, 1), value ^ classical);
            }
        }
    }

    #[test]
    fn clxor_aliased_flips_on_set_bit() {
        let mut unit = CoherentUnit::with_seed(1, 0, 83).unwrap();
        unit.clxor(0, true, 0).unwrap();
        assert!(truth(&mut unit, 0));

        unit.clxor(0, false, 0).unwrap();
        assert!(truth(&mut unit, 0));
    }

    #[test]
    fn range_logic_operates_bitwise() {
        // [0,3) = 0b101, [3,6) = 0b011, output [6,9)
        let perm = 0b011_101;
        let mut unit = CoherentUnit::with_seed(9, perm, 89).unwrap();
        unit.and_range(0, 3, 6, 3).unwrap();

        let mut probabilities = vec![0.0; 1 << 9];
        unit.prob_array(&mut probabilities).unwrap();
        let expected = perm | (0b001 << 6);
        assert_relative_eq!(probabilities[expected], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn clxor_range_broadcasts_input_bit() {
        // q_input is bit 0 (set); output bit i = q XOR classical bit i, so
        // the constant 0b110 lands inverted: 0b001
        let mut unit = CoherentUnit::with_seed(6, 0b101, 97).unwrap();
        unit.clxor_range(0, 0b110, 3, 3).unwrap();

        let mut probabilities = vec![0.0; 64];
        unit.prob_array(&mut probabilities).unwrap();
        assert_relative_eq!(probabilities[0b001_101], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn cland_range_masks_broadcast_bit() {
        // q_input set: output copies the classical constant
        let mut unit = CoherentUnit::with_seed(5, 0b1, 101).unwrap();
        unit.cland_range(0, 0b1101, 1, 4).unwrap();

        let mut probabilities = vec![0.0; 32];
        unit.prob_array(&mut probabilities).unwrap();
        assert_relative_eq!(probabilities[0b1101_1], 1.0, epsilon = 1e-10);

        // q_input clear: output reads zero regardless of the constant
        let mut unit = CoherentUnit::with_seed(5, 0b0, 101).unwrap();
        unit.cland_range(0, 0b1101, 1, 4).unwrap();

        let mut probabilities = vec![0.0; 32];
        unit.prob_array(&mut probabilities).unwrap();
        assert_relative_eq!(probabilities[0b0000_0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn clor_range_saturates_on_broadcast_bit() {
        // q_input set: every output bit reads one
        let mut unit = CoherentUnit::with_seed(4, 0b1, 103).unwrap();
        unit.clor_range(0, 0b010, 1, 3).unwrap();

        let mut probabilities = vec![0.0; 16];
        unit.prob_array(&mut probabilities).unwrap();
        assert_relative_eq!(probabilities[0b111_1], 1.0, epsilon = 1e-10);
    }
}
