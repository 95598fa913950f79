//! Gate surface of the coherent register
//!
//! Every gate reduces to a 2×2 matrix plus a sorted list of involved bit
//! powers and two offsets, handed to the backend kernel. The offset pair
//! selects which amplitude of each expanded pair plays the role of |1⟩:
//!
//! | gate shape            | offset1             | offset2      |
//! |-----------------------|---------------------|--------------|
//! | single bit `t`        | `p_t`               | 0            |
//! | controlled `c → t`    | `p_c + p_t`         | `p_c`        |
//! | anti-controlled       | 0                   | `p_t`        |
//! | doubly controlled     | `p_c1 + p_c2 + p_t` | `p_c1 + p_c2`|
//! | anti-doubly controlled| 0                   | `p_t`        |
//! | swap `q1 ↔ q2`        | `p_q2`              | `p_q1`       |
//!
//! Gates that can change the norm (Hadamard, rotations) recompute the
//! running norm afterwards; pure permutation-plus-phase gates skip the
//! reduction and mark the norm as 1.

use crate::error::Result;
use crate::register::CoherentUnit;
use pseudoq_gates::{
    dyadic_angle, phase, rotation_x, rotation_y, rotation_z, Matrix2x2, HADAMARD, PAULI_X,
    PAULI_Y, PAULI_Z,
};

impl CoherentUnit {
    // ---- kernel plumbing -------------------------------------------------

    pub(crate) fn apply_2x2(
        &mut self,
        offset1: usize,
        offset2: usize,
        matrix: &Matrix2x2,
        sorted_powers: &[usize],
        apply_norm: bool,
        calc_norm: bool,
    ) {
        let norm_scale = if apply_norm && self.running_norm != 1.0 {
            1.0 / self.running_norm
        } else {
            1.0
        };

        self.backend.apply_2x2(
            self.state.amplitudes_mut(),
            offset1,
            offset2,
            matrix,
            sorted_powers,
            norm_scale,
        );

        if calc_norm {
            self.update_running_norm();
        } else {
            self.running_norm = 1.0;
        }
    }

    fn apply_single(&mut self, qubit: usize, matrix: &Matrix2x2, calc_norm: bool) -> Result<()> {
        self.check_qubit(qubit)?;

        let power = 1usize << qubit;
        self.apply_2x2(power, 0, matrix, &[power], true, calc_norm);
        Ok(())
    }

    fn apply_controlled(
        &mut self,
        control: usize,
        target: usize,
        matrix: &Matrix2x2,
        calc_norm: bool,
    ) -> Result<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        self.check_distinct(&[control, target])?;

        let pc = 1usize << control;
        let pt = 1usize << target;
        let sorted = [pc.min(pt), pc.max(pt)];
        self.apply_2x2(pc + pt, pc, matrix, &sorted, false, calc_norm);
        Ok(())
    }

    fn apply_anti_controlled(
        &mut self,
        control: usize,
        target: usize,
        matrix: &Matrix2x2,
        calc_norm: bool,
    ) -> Result<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        self.check_distinct(&[control, target])?;

        let pc = 1usize << control;
        let pt = 1usize << target;
        let sorted = [pc.min(pt), pc.max(pt)];
        self.apply_2x2(0, pt, matrix, &sorted, false, calc_norm);
        Ok(())
    }

    fn apply_doubly_controlled(
        &mut self,
        control1: usize,
        control2: usize,
        target: usize,
        matrix: &Matrix2x2,
        anti: bool,
    ) -> Result<()> {
        self.check_qubit(control1)?;
        self.check_qubit(control2)?;
        self.check_qubit(target)?;
        self.check_distinct(&[control1, control2, target])?;

        let pc1 = 1usize << control1;
        let pc2 = 1usize << control2;
        let pt = 1usize << target;
        let mut sorted = [pc1, pc2, pt];
        sorted.sort_unstable();

        if anti {
            self.apply_2x2(0, pt, matrix, &sorted, false, false);
        } else {
            self.apply_2x2(pc1 + pc2 + pt, pc1 + pc2, matrix, &sorted, false, false);
        }
        Ok(())
    }

    // ---- Pauli gates and Hadamard ---------------------------------------

    /// NOT gate (Pauli X)
    pub fn x(&mut self, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &PAULI_X, false)
    }

    /// Pauli Y
    pub fn y(&mut self, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &PAULI_Y, false)
    }

    /// Pauli Z
    pub fn z(&mut self, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &PAULI_Z, false)
    }

    /// Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &HADAMARD, true)
    }

    /// Pauli Y on each bit of `[start, start+length)`
    pub fn y_range(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.y(start + i)?;
        }
        Ok(())
    }

    /// Pauli Z on each bit of `[start, start+length)`
    pub fn z_range(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.z(start + i)?;
        }
        Ok(())
    }

    /// Hadamard on each bit of `[start, start+length)`
    pub fn h_range(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            self.h(start + i)?;
        }
        Ok(())
    }

    // ---- phase shift and axis rotations ---------------------------------

    /// Phase shift: rotates the |1⟩ component as e^(iθ/2)
    pub fn r1(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &phase(radians), true)
    }

    /// Dyadic-fraction phase shift, angle `(π·num·2)/den`.
    ///
    /// The dyadic phase gate keeps the radian-form sign; the dyadic axis
    /// rotations below reverse it.
    pub fn r1_dyad(&mut self, numerator: i32, denominator: i32, qubit: usize) -> Result<()> {
        self.r1(dyadic_angle(numerator, denominator), qubit)
    }

    /// Rotation around the Pauli X axis, e^(−iθσx/2)
    pub fn rx(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &rotation_x(radians), true)
    }

    /// Dyadic-fraction X rotation, angle `−(π·num·2)/den`
    pub fn rx_dyad(&mut self, numerator: i32, denominator: i32, qubit: usize) -> Result<()> {
        self.rx(dyadic_angle(-numerator, denominator), qubit)
    }

    /// Rotation around the Pauli Y axis, e^(−iθσy/2)
    pub fn ry(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &rotation_y(radians), true)
    }

    /// Dyadic-fraction Y rotation, angle `−(π·num·2)/den`
    pub fn ry_dyad(&mut self, numerator: i32, denominator: i32, qubit: usize) -> Result<()> {
        self.ry(dyadic_angle(-numerator, denominator), qubit)
    }

    /// Rotation around the Pauli Z axis, e^(−iθσz/2)
    pub fn rz(&mut self, radians: f64, qubit: usize) -> Result<()> {
        self.apply_single(qubit, &rotation_z(radians), true)
    }

    /// Dyadic-fraction Z rotation, angle `−(π·num·2)/den`
    pub fn rz_dyad(&mut self, numerator: i32, denominator: i32, qubit: usize) -> Result<()> {
        self.rz(dyadic_angle(-numerator, denominator), qubit)
    }

    // ---- swap ------------------------------------------------------------

    /// Swap the values of two bits. Swapping a bit with itself is a no-op.
    pub fn swap(&mut self, qubit1: usize, qubit2: usize) -> Result<()> {
        self.check_qubit(qubit1)?;
        self.check_qubit(qubit2)?;
        if qubit1 == qubit2 {
            return Ok(());
        }

        let p1 = 1usize << qubit1;
        let p2 = 1usize << qubit2;
        let sorted = [p1.min(p2), p1.max(p2)];
        self.apply_2x2(p2, p1, &PAULI_X, &sorted, false, false);
        Ok(())
    }

    // ---- controlled gates ------------------------------------------------

    /// Controlled NOT
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &PAULI_X, false)
    }

    /// Apply NOT to the target when the control bit is |0⟩
    pub fn anti_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_anti_controlled(control, target, &PAULI_X, false)
    }

    /// Doubly controlled NOT (Toffoli)
    pub fn ccnot(&mut self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.apply_doubly_controlled(control1, control2, target, &PAULI_X, false)
    }

    /// Apply NOT to the target when both control bits are |0⟩
    pub fn anti_ccnot(&mut self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.apply_doubly_controlled(control1, control2, target, &PAULI_X, true)
    }

    /// Controlled Pauli Y
    pub fn cy(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &PAULI_Y, false)
    }

    /// Controlled Pauli Z
    pub fn cz(&mut self, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &PAULI_Z, false)
    }

    /// Controlled phase shift
    pub fn crt(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &phase(radians), true)
    }

    /// Controlled dyadic phase shift, angle `−(π·num·2)/den`
    pub fn crt_dyad(
        &mut self,
        numerator: i32,
        denominator: i32,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crt(dyadic_angle(-numerator, denominator), control, target)
    }

    /// Controlled phase shift, radian-form sign convention
    pub fn cr1(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.crt(radians, control, target)
    }

    /// Controlled dyadic phase shift keeping the radian-form sign
    pub fn cr1_dyad(
        &mut self,
        numerator: i32,
        denominator: i32,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.cr1(dyadic_angle(numerator, denominator), control, target)
    }

    /// Controlled X-axis rotation
    pub fn crx(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &rotation_x(radians), true)
    }

    /// Controlled dyadic X rotation, angle `−(π·num·2)/den`
    pub fn crx_dyad(
        &mut self,
        numerator: i32,
        denominator: i32,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crx(dyadic_angle(-numerator, denominator), control, target)
    }

    /// Controlled Y-axis rotation
    pub fn cry(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &rotation_y(radians), true)
    }

    /// Controlled dyadic Y rotation, angle `−(π·num·2)/den`
    pub fn cry_dyad(
        &mut self,
        numerator: i32,
        denominator: i32,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.cry(dyadic_angle(-numerator, denominator), control, target)
    }

    /// Controlled Z-axis rotation
    pub fn crz(&mut self, radians: f64, control: usize, target: usize) -> Result<()> {
        self.apply_controlled(control, target, &rotation_z(radians), true)
    }

    /// Controlled dyadic Z rotation, angle `−(π·num·2)/den`
    pub fn crz_dyad(
        &mut self,
        numerator: i32,
        denominator: i32,
        control: usize,
        target: usize,
    ) -> Result<()> {
        self.crz(dyadic_angle(-numerator, denominator), control, target)
    }

    // ---- quantum Fourier transform --------------------------------------

    /// Quantum Fourier transform over `[start, start+length)`.
    ///
    /// H on each bit followed by the controlled dyadic phase ladder. The
    /// final bit reversal is left to the caller.
    pub fn qft(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;

        let end = start + length;
        for i in start..end {
            self.h(i)?;
            for j in 1..(end - i) {
                self.crt_dyad(1, 1 << j, i + j, i)?;
            }
        }
        Ok(())
    }

    /// Inverse quantum Fourier transform over `[start, start+length)`.
    ///
    /// Exact ladder inverse of [`CoherentUnit::qft`], so the two compose to
    /// the identity without any bit reversal.
    pub fn iqft(&mut self, start: usize, length: usize) -> Result<()> {
        self.check_range(start, length)?;

        let end = start + length;
        for i in (start..end).rev() {
            for j in (1..(end - i)).rev() {
                self.crt_dyad(-1, 1 << j, i + j, i)?;
            }
            self.h(i)?;
        }
        Ok(())
    }
}
