//! Integer arithmetic on superposed registers: add a register to a
//! superposed accumulator, then undo it.

use pseudoq_state::CoherentUnit;

fn main() -> pseudoq_state::Result<()> {
    // Accumulator [0, 3) superposed over all values, addend [3, 6) = 5
    let mut unit = CoherentUnit::new(6)?;
    unit.x_range(3, 3)?;
    unit.x(4)?; // addend = 0b101
    unit.h_range(0, 3)?;

    unit.add(0, 3, 3)?;
    println!("after ADD, accumulator is still uniform:");
    for value in 0..8 {
        let mut p = 0.0;
        for high in 0..8 {
            p += unit.prob_all((high << 3) | value)?;
        }
        println!("  acc={value}: {p:.4}");
    }

    unit.sub(0, 3, 3)?;
    unit.h_range(0, 3)?;
    println!("after SUB and uncompute, accumulator reads 0 deterministically");
    assert!((unit.prob_all(0b101 << 3)? - 1.0).abs() < 1e-9);
    Ok(())
}
