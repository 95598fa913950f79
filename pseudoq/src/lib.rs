//! Pseudo-quantum coherent register simulator
//!
//! Facade over the workspace crates: the dense state-vector engine lives in
//! `pseudoq-state`, the gate matrix catalogue in `pseudoq-gates`.
//!
//! # Example
//!
//! ```
//! use pseudoq::CoherentUnit;
//!
//! // Bell pair
//! let mut unit = CoherentUnit::with_seed(2, 0, 42).unwrap();
//! unit.h(0).unwrap();
//! unit.cnot(0, 1).unwrap();
//!
//! let first = unit.m(0).unwrap();
//! let second = unit.m(1).unwrap();
//! assert_eq!(first, second);
//! ```

pub use pseudoq_gates as gates;
pub use pseudoq_state::{
    BackendConfig, CoherentUnit, ComputeBackend, CpuBackend, RegisterError, Result, StateVector,
    MAX_QUBITS,
};
