//! Pre-computed gate matrices and parameterized generators
//!
//! Constant matrices are built at compile time. Parameterized gates (phase
//! shift and axis rotations) are generated per call from the rotation angle.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Standard 2×2 gate matrix type, row-major
pub type Matrix2x2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Pauli-X gate matrix (NOT gate)
/// X = [[0, 1],
///      [1, 0]]
pub const PAULI_X: Matrix2x2 = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y gate matrix
/// Y = [[0, -i],
///      [i,  0]]
pub const PAULI_Y: Matrix2x2 = [[ZERO, NEG_I], [I, ZERO]];

/// Pauli-Z gate matrix
/// Z = [[1,  0],
///      [0, -1]]
pub const PAULI_Z: Matrix2x2 = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// Hadamard gate matrix
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: Matrix2x2 = [
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(INV_SQRT2, 0.0),
    ],
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(-INV_SQRT2, 0.0),
    ],
];

/// Identity gate matrix
pub const IDENTITY: Matrix2x2 = [[ONE, ZERO], [ZERO, ONE]];

/// Generate the phase-shift gate matrix for a given angle
///
/// Rotates around the |1⟩ state as e^(iθ/2):
/// R1(θ) = [[1, 0],
///          [0, e^(iθ/2)]]
#[inline]
pub fn phase(theta: f64) -> Matrix2x2 {
    let half_theta = theta / 2.0;

    [
        [ONE, ZERO],
        [ZERO, Complex64::new(half_theta.cos(), half_theta.sin())],
    ]
}

/// Generate the rotation-X gate matrix for a given angle
///
/// RX(θ) = [[cos(θ/2),    -i·sin(θ/2)],
///          [-i·sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_x(theta: f64) -> Matrix2x2 {
    let half_theta = theta / 2.0;
    let cos_val = half_theta.cos();
    let sin_val = half_theta.sin();

    [
        [Complex64::new(cos_val, 0.0), Complex64::new(0.0, -sin_val)],
        [Complex64::new(0.0, -sin_val), Complex64::new(cos_val, 0.0)],
    ]
}

/// Generate the rotation-Y gate matrix for a given angle
///
/// RY(θ) = [[cos(θ/2),  -sin(θ/2)],
///          [sin(θ/2),   cos(θ/2)]]
#[inline]
pub fn rotation_y(theta: f64) -> Matrix2x2 {
    let half_theta = theta / 2.0;
    let cos_val = half_theta.cos();
    let sin_val = half_theta.sin();

    [
        [Complex64::new(cos_val, 0.0), Complex64::new(-sin_val, 0.0)],
        [Complex64::new(sin_val, 0.0), Complex64::new(cos_val, 0.0)],
    ]
}

/// Generate the rotation-Z gate matrix for a given angle
///
/// RZ(θ) = [[e^(-iθ/2),  0       ],
///          [0,          e^(iθ/2)]]
#[inline]
pub fn rotation_z(theta: f64) -> Matrix2x2 {
    let half_theta = theta / 2.0;
    let cos_val = half_theta.cos();
    let sin_val = half_theta.sin();

    [
        [Complex64::new(cos_val, -sin_val), ZERO],
        [ZERO, Complex64::new(cos_val, sin_val)],
    ]
}

/// Convert a dyadic fraction to a rotation angle
///
/// The dyadic forms of the rotation gates express their angle as
/// `(π·numerator·2) / denominator`. The sign convention for the axis
/// rotations and the controlled phase is reversed relative to the radian
/// forms; callers negate the numerator where that applies.
#[inline]
pub fn dyadic_angle(numerator: i32, denominator: i32) -> f64 {
    (PI * numerator as f64 * 2.0) / denominator as f64
}
