//! Integer arithmetic opcodes over sub-registers
//!
//! These operate by permuting amplitudes, not by applying 2×2 matrices.
//! INC/DEC rotate blocks of amplitude memory in place through the
//! register-rotate dispatcher; every other opcode copies each amplitude into
//! a fresh buffer at an index computed from the sub-register bit masks, then
//! swaps buffers. ADDC/SUBC are the one exception to pure permutation:
//! their two carry passes can collide on a destination index, so they
//! accumulate squared magnitudes and rebuild amplitudes as `√(Σ|a|²)` —
//! magnitudes survive collisions, phase does not.

use crate::error::{RegisterError, Result};
use crate::parallel::{self, SharedSlice};
use crate::register::CoherentUnit;
use num_complex::Complex64;
use rayon::prelude::*;

impl CoherentUnit {
    /// Replace the buffer through a permutation of basis indices.
    fn permute_into<F>(&mut self, map: F)
    where
        F: Fn(usize) -> usize + Sync,
    {
        let mut new_state = vec![Complex64::new(0.0, 0.0); self.max_q_power()];
        parallel::par_for_copy(
            self.state.amplitudes(),
            &mut new_state,
            self.backend.parallel_threshold(),
            map,
        );
        self.state.replace(new_state);
    }

    fn check_disjoint(masks: &[usize]) -> Result<()> {
        for (i, &a) in masks.iter().enumerate() {
            for &b in &masks[i + 1..] {
                if a & b != 0 {
                    return Err(RegisterError::OverlappingRegisters {
                        index: (a & b).trailing_zeros() as usize,
                    });
                }
            }
        }
        Ok(())
    }

    // ---- increment / decrement ------------------------------------------

    /// Add the classical constant `to_add` to the sub-register
    /// `[start, start+length)`, wrapping modulo `2^length`.
    pub fn inc(&mut self, to_add: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }

        let length_power = 1usize << length;
        let to_add = to_add & (length_power - 1);
        if to_add == 0 {
            return Ok(());
        }

        // Moving |v⟩ to |v + k⟩ is a left rotation of each block by 2^len − k.
        let threshold = self.backend.parallel_threshold();
        parallel::par_rotate_reg(
            self.state.amplitudes_mut(),
            start,
            length,
            length_power - to_add,
            threshold,
        );
        Ok(())
    }

    /// Subtract the classical constant `to_sub` from the sub-register
    /// `[start, start+length)`, wrapping modulo `2^length`.
    pub fn dec(&mut self, to_sub: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }

        let to_sub = to_sub & ((1usize << length) - 1);
        if to_sub == 0 {
            return Ok(());
        }

        let threshold = self.backend.parallel_threshold();
        parallel::par_rotate_reg(self.state.amplitudes_mut(), start, length, to_sub, threshold);
        Ok(())
    }

    // ---- circular shifts -------------------------------------------------

    /// Rotate the sub-register's integer value left by `shift` bits.
    pub fn rol(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if shift == 0 || shift >= length {
            return Err(RegisterError::InvalidShift { shift, length });
        }

        let reg_mask = Self::reg_mask(start, length);
        let other_mask = (self.max_q_power() - 1) ^ reg_mask;
        let length_mask = (1usize << length) - 1;

        self.permute_into(|i| {
            let other = i & other_mask;
            let reg = (i & reg_mask) >> start;
            let out = ((reg << shift) & length_mask) | (reg >> (length - shift));
            (out << start) | other
        });
        Ok(())
    }

    /// Rotate the sub-register's integer value right by `shift` bits.
    pub fn ror(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if shift == 0 || shift >= length {
            return Err(RegisterError::InvalidShift { shift, length });
        }

        let reg_mask = Self::reg_mask(start, length);
        let other_mask = (self.max_q_power() - 1) ^ reg_mask;
        let length_mask = (1usize << length) - 1;

        self.permute_into(|i| {
            let other = i & other_mask;
            let reg = (i & reg_mask) >> start;
            let out = (reg >> shift) | ((reg << (length - shift)) & length_mask);
            (out << start) | other
        });
        Ok(())
    }

    // ---- logical and arithmetic shifts -----------------------------------

    /// Logical shift left, filling vacated low bits with `|0⟩`.
    pub fn lsl(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }

        if shift >= length {
            return self.zero_range(start, length);
        }

        self.rol(shift, start, length)?;
        for i in 0..shift {
            self.set_bit(start + i, false)?;
        }
        Ok(())
    }

    /// Logical shift right, filling vacated high bits with `|0⟩`.
    pub fn lsr(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }

        if shift >= length {
            return self.zero_range(start, length);
        }

        let end = start + length;
        self.ror(shift, start, length)?;
        for i in 0..shift {
            self.set_bit(end - i - 1, false)?;
        }
        Ok(())
    }

    /// Arithmetic shift left. The top two bits of the window act as sign
    /// and carry and are swapped around the rotation to keep the sign in
    /// place.
    pub fn asl(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }

        if shift >= length {
            return self.zero_range(start, length);
        }

        let end = start + length;
        self.swap(end - 1, end - 2)?;
        self.rol(shift, start, length)?;
        self.swap(end - 1, end - 2)?;
        for i in 0..shift {
            self.set_bit(start + i, false)?;
        }
        Ok(())
    }

    /// Arithmetic shift right, sign and carry preserved as in
    /// [`CoherentUnit::asl`].
    pub fn asr(&mut self, shift: usize, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 || shift == 0 {
            return Ok(());
        }

        if shift >= length {
            return self.zero_range(start, length);
        }

        let end = start + length;
        self.swap(end - 1, end - 2)?;
        self.ror(shift, start, length)?;
        self.swap(end - 1, end - 2)?;
        for i in 0..shift {
            self.set_bit(end - i - 1, false)?;
        }
        Ok(())
    }

    fn zero_range(&mut self, start: usize, length: usize) -> Result<()> {
        for i in start..start + length {
            self.set_bit(i, false)?;
        }
        Ok(())
    }

    // ---- register-to-register addition and subtraction -------------------

    /// Add the integer in `[in_start, in_start+length)` to the integer in
    /// `[in_out_start, in_out_start+length)`, wrapping modulo `2^length`.
    pub fn add(&mut self, in_out_start: usize, in_start: usize, length: usize) -> Result<()> {
        self.check_range(in_out_start, length)?;
        self.check_range(in_start, length)?;
        if length == 0 {
            return Ok(());
        }

        let in_out_mask = Self::reg_mask(in_out_start, length);
        let in_mask = Self::reg_mask(in_start, length);
        Self::check_disjoint(&[in_out_mask, in_mask])?;

        let other_mask = (self.max_q_power() - 1) ^ in_out_mask ^ in_mask;
        let length_mask = (1usize << length) - 1;

        self.permute_into(|i| {
            let other = i & other_mask;
            let in_res = i & in_mask;
            let in_out_int = (i & in_out_mask) >> in_out_start;
            let in_int = in_res >> in_start;
            let out = (in_out_int + in_int) & length_mask;
            (out << in_out_start) | other | in_res
        });
        Ok(())
    }

    /// Subtract the integer in `[in_start, in_start+length)` from the
    /// integer in `[in_out_start, in_out_start+length)`, wrapping modulo
    /// `2^length`.
    pub fn sub(&mut self, in_out_start: usize, in_start: usize, length: usize) -> Result<()> {
        self.check_range(in_out_start, length)?;
        self.check_range(in_start, length)?;
        if length == 0 {
            return Ok(());
        }

        let in_out_mask = Self::reg_mask(in_out_start, length);
        let in_mask = Self::reg_mask(in_start, length);
        Self::check_disjoint(&[in_out_mask, in_mask])?;

        let other_mask = (self.max_q_power() - 1) ^ in_out_mask ^ in_mask;
        let length_mask = (1usize << length) - 1;
        let length_power = 1usize << length;

        self.permute_into(|i| {
            let other = i & other_mask;
            let in_res = i & in_mask;
            let in_out_int = (i & in_out_mask) >> in_out_start;
            let in_int = in_res >> in_start;
            let out = (in_out_int + length_power - in_int) & length_mask;
            (out << in_out_start) | other | in_res
        });
        Ok(())
    }

    /// Add with carry: carry-in is read from `carry_index` and the carry
    /// out of the `length`-bit sum is written back to it.
    pub fn addc(
        &mut self,
        in_out_start: usize,
        in_start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.carry_op(in_out_start, in_start, length, carry_index, false)
    }

    /// Subtract with borrow: the carry bit supplies the incoming borrow and
    /// receives the outgoing one.
    pub fn subc(
        &mut self,
        in_out_start: usize,
        in_start: usize,
        length: usize,
        carry_index: usize,
    ) -> Result<()> {
        self.carry_op(in_out_start, in_start, length, carry_index, true)
    }

    /// Two-pass carry kernel shared by ADDC and SUBC.
    ///
    /// Pass A walks the carry-clear half of the basis, pass B the carry-set
    /// half. Destination indices from the two passes may collide, so both
    /// passes accumulate squared magnitudes; the final write rebuilds
    /// amplitudes with zero phase.
    fn carry_op(
        &mut self,
        in_out_start: usize,
        in_start: usize,
        length: usize,
        carry_index: usize,
        subtract: bool,
    ) -> Result<()> {
        self.check_range(in_out_start, length)?;
        self.check_range(in_start, length)?;
        self.check_qubit(carry_index)?;
        if length == 0 {
            return Ok(());
        }

        let in_out_mask = Self::reg_mask(in_out_start, length);
        let in_mask = Self::reg_mask(in_start, length);
        let carry_mask = 1usize << carry_index;
        Self::check_disjoint(&[in_out_mask, in_mask, carry_mask])?;

        let dimension = self.max_q_power();
        let other_mask = (dimension - 1) ^ in_out_mask ^ in_mask ^ carry_mask;
        let length_power = 1usize << length;
        let half = dimension >> 1;
        let threshold = self.backend.parallel_threshold();

        let mut magnitudes = vec![0.0f64; dimension];
        let amplitudes = self.state.amplitudes();

        for carry_in in 0..2usize {
            let acc = SharedSlice::new(&mut magnitudes);
            let pass = |k: usize| {
                // Expand k over the carry power so the carry bit is clear
                let i_low = k & (carry_mask - 1);
                let base = i_low + ((k - i_low) << 1);
                let source = base | (carry_in * carry_mask);

                let other = base & other_mask;
                let in_res = base & in_mask;
                let in_out_int = (base & in_out_mask) >> in_out_start;
                let in_int = in_res >> in_start;

                let out_int = if subtract {
                    in_out_int + length_power - in_int - carry_in
                } else {
                    in_out_int + in_int + carry_in
                };

                // For addition the carry fires on overflow; for subtraction
                // the borrow fires when the minuend came up short.
                let out = if subtract {
                    if out_int < length_power {
                        (out_int << in_out_start) | other | in_res | carry_mask
                    } else {
                        ((out_int - length_power) << in_out_start) | other | in_res
                    }
                } else if out_int < length_power {
                    (out_int << in_out_start) | other | in_res
                } else {
                    ((out_int - length_power) << in_out_start) | other | in_res | carry_mask
                };

                // Within one pass the destination map is injective, so the
                // read-modify-write touches each slot once.
                let value = amplitudes[source].norm_sqr();
                unsafe { acc.write(out, acc.read(out) + value) };
            };

            if dimension >= threshold {
                (0..half).into_par_iter().for_each(pass);
            } else {
                (0..half).for_each(pass);
            }
        }

        let mut new_state = vec![Complex64::new(0.0, 0.0); dimension];
        if dimension >= threshold {
            new_state
                .par_iter_mut()
                .zip(magnitudes.par_iter())
                .for_each(|(amp, &m)| *amp = Complex64::new(m.sqrt(), 0.0));
        } else {
            for (amp, &m) in new_state.iter_mut().zip(&magnitudes) {
                *amp = Complex64::new(m.sqrt(), 0.0);
            }
        }

        self.state.replace(new_state);
        self.update_running_norm();
        Ok(())
    }

    // ---- binary-coded decimal --------------------------------------------

    /// Add two BCD numbers nibble-wise with decimal carry. States whose
    /// operand nibbles are not valid digits pass through unchanged.
    pub fn addbcd(&mut self, in_out_start: usize, in_start: usize, length: usize) -> Result<()> {
        self.bcd_op(in_out_start, in_start, length, false)
    }

    /// Subtract two BCD numbers nibble-wise with decimal borrow. States
    /// whose operand nibbles are not valid digits pass through unchanged.
    pub fn subbcd(&mut self, in_out_start: usize, in_start: usize, length: usize) -> Result<()> {
        self.bcd_op(in_out_start, in_start, length, true)
    }

    fn bcd_op(
        &mut self,
        in_out_start: usize,
        in_start: usize,
        length: usize,
        subtract: bool,
    ) -> Result<()> {
        if length % 4 != 0 {
            return Err(RegisterError::BcdLength { length });
        }
        self.check_range(in_out_start, length)?;
        self.check_range(in_start, length)?;
        if length == 0 {
            return Ok(());
        }

        let in_out_mask = Self::reg_mask(in_out_start, length);
        let in_mask = Self::reg_mask(in_start, length);
        Self::check_disjoint(&[in_out_mask, in_mask])?;

        let other_mask = (self.max_q_power() - 1) ^ in_out_mask ^ in_mask;
        let nibble_count = length / 4;

        self.permute_into(|i| {
            let other = i & other_mask;
            let in_res = i & in_mask;
            let in_out_int = (i & in_out_mask) >> in_out_start;
            let in_int = in_res >> in_start;

            for j in 0..nibble_count {
                if (in_out_int >> (4 * j)) & 15 > 9 || (in_int >> (4 * j)) & 15 > 9 {
                    return i;
                }
            }

            let mut out_int = 0usize;
            let mut carry = 0i64;
            for j in 0..nibble_count {
                let n1 = ((in_out_int >> (4 * j)) & 15) as i64;
                let n2 = ((in_int >> (4 * j)) & 15) as i64;
                let mut digit = if subtract {
                    n1 - n2 - carry
                } else {
                    n1 + n2 + carry
                };

                if subtract {
                    if digit < 0 {
                        digit += 10;
                        carry = 1;
                    } else {
                        carry = 0;
                    }
                } else if digit > 9 {
                    digit -= 10;
                    carry = 1;
                } else {
                    carry = 0;
                }

                out_int |= (digit as usize) << (4 * j);
            }

            (out_int << in_out_start) | other | in_res
        });
        Ok(())
    }

    // ---- sub-register NOT ------------------------------------------------

    /// Flip every bit of `[start, start+length)` in one amplitude
    /// permutation.
    pub fn x_range(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        if length == 0 {
            return Ok(());
        }

        let reg_mask = Self::reg_mask(start, length);
        let other_mask = (self.max_q_power() - 1) ^ reg_mask;
        self.permute_into(|i| (i & other_mask) | ((!i) & reg_mask));
        Ok(())
    }
}
