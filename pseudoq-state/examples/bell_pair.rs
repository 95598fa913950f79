//! Prepare a Bell pair and inspect it the pseudo-quantum way: exact
//! probabilities first, then a destructive measurement.

use pseudoq_state::CoherentUnit;

fn main() -> pseudoq_state::Result<()> {
    let mut unit = CoherentUnit::new(2)?;
    unit.h(0)?;
    unit.cnot(0, 1)?;

    println!("Bell pair probabilities:");
    let mut probabilities = vec![0.0; unit.max_q_power()];
    unit.prob_array(&mut probabilities)?;
    for (basis, probability) in probabilities.iter().enumerate() {
        println!("  |{basis:02b}⟩: {probability:.4}");
    }

    let first = unit.m(0)?;
    let second = unit.m(1)?;
    println!("measured: {} {}", first as u8, second as u8);
    assert_eq!(first, second);
    Ok(())
}
