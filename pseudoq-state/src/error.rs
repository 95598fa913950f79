//! Error types for coherent-register operations

use thiserror::Error;

/// Errors that can occur during register operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegisterError {
    /// Requested register width exceeds what basis indices can address
    #[error("cannot instantiate a {qubits}-qubit register, maximum width is {max} qubits")]
    CapacityExceeded { qubits: usize, max: usize },

    /// Qubit index out of range
    #[error("invalid qubit index {index} for a {qubit_count}-qubit register")]
    InvalidQubitIndex { index: usize, qubit_count: usize },

    /// Sub-register range out of bounds
    #[error("invalid sub-register [{start}, {start}+{length}) for a {qubit_count}-qubit register")]
    InvalidRange {
        start: usize,
        length: usize,
        qubit_count: usize,
    },

    /// Controls and targets of a controlled gate must be pairwise distinct
    #[error("control and target qubits must be distinct, got duplicate index {index}")]
    DuplicateQubit { index: usize },

    /// Arithmetic operand sub-registers (or the carry bit) must not overlap
    #[error("operand sub-registers overlap at qubit {index}")]
    OverlappingRegisters { index: usize },

    /// BCD opcodes operate on whole 4-bit nibbles
    #[error("BCD word bit length must be a multiple of 4, got {length}")]
    BcdLength { length: usize },

    /// Rotation shift outside the open interval (0, length)
    #[error("rotation shift {shift} must satisfy 0 < shift < {length}")]
    InvalidShift { shift: usize, length: usize },

    /// Supplied buffer or register has the wrong dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Permutation index outside the register's basis
    #[error("permutation {permutation} out of range for dimension {dimension}")]
    InvalidPermutation { permutation: usize, dimension: usize },

    /// Measurement forced into an outcome branch with no probability mass
    #[error("degenerate measurement: selected branch has probability {probability}")]
    DegenerateMeasurement { probability: f64 },
}

/// Result type for register operations
pub type Result<T> = std::result::Result<T, RegisterError>;
