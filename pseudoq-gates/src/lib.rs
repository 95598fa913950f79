//! Compile-time quantum gate matrices for the pseudoq register engine
//!
//! Every gate the register engine applies is ultimately a 2×2 complex matrix
//! handed to the amplitude-update kernel. This crate provides the constant
//! matrices for the fixed gates and generator functions for the parameterized
//! ones, along with the dyadic-fraction angle convention shared by the
//! register surface.

pub mod matrices;

pub use matrices::{
    dyadic_angle, phase, rotation_x, rotation_y, rotation_z, Matrix2x2, HADAMARD, IDENTITY,
    PAULI_X, PAULI_Y, PAULI_Z,
};
