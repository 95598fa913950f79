//! Parallel dispatch over amplitude index ranges
//!
//! Three kernel shapes run here. In-place kernels ([`par_for_masked`],
//! [`par_update`]) read and write the state buffer directly; copy-out
//! kernels ([`par_for_copy`]) permute amplitudes into a fresh buffer; the
//! register-rotate shape ([`par_rotate_reg`]) rotates strided blocks of
//! amplitude memory keyed by the value of the non-register bits.
//!
//! No kernel takes a lock. Safety is by disjoint-index construction: every
//! caller guarantees that distinct work items touch disjoint amplitudes (or,
//! for copy-out, that the index map is a permutation). Work is fanned out on
//! rayon's global pool; buffers below `threshold` amplitudes run
//! sequentially, since the fork overhead dominates at small dimensions.

use num_complex::Complex64;
use rayon::prelude::*;

/// Default dimension at which kernels switch from sequential to parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 12;

/// Raw view of an amplitude buffer shared across rayon workers.
///
/// Callers uphold the dispatcher contract: no two concurrent work items may
/// read or write the same element.
#[derive(Clone, Copy)]
pub(crate) struct SharedSlice<T> {
    ptr: *mut T,
    len: usize,
}

unsafe impl<T: Send> Send for SharedSlice<T> {}
unsafe impl<T: Send> Sync for SharedSlice<T> {}

impl<T: Copy> SharedSlice<T> {
    pub(crate) fn new(slice: &mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    #[inline]
    pub(crate) unsafe fn read(&self, index: usize) -> T {
        debug_assert!(index < self.len);
        *self.ptr.add(index)
    }

    #[inline]
    pub(crate) unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len);
        *self.ptr.add(index) = value;
    }
}

/// Expand a compact index into a basis index whose involved bits are all 0.
///
/// `sorted_powers` holds the bit powers (`1 << k`) of the involved qubits in
/// ascending order. Peeling the low bits at each power enumerates, over
/// `index` in `[0, 2^(q-k))`, exactly the `2^(q-k)` basis indices with every
/// involved bit clear.
#[inline]
pub(crate) fn expand_masked_index(index: usize, sorted_powers: &[usize]) -> usize {
    let mut i_high = index;
    let mut i = 0;
    for &power in sorted_powers {
        let i_low = i_high & (power - 1);
        i += i_low;
        i_high = (i_high - i_low) << 1;
    }
    i + i_high
}

/// In-place shape: run `body` once for every expanded base index.
///
/// `count` is the compact range length (`dimension >> sorted_powers.len()`);
/// `dimension` decides the sequential/parallel switch. The body receives
/// basis indices with all involved bits clear and must touch only amplitudes
/// derived from its own base index.
pub(crate) fn par_for_masked<F>(
    count: usize,
    dimension: usize,
    sorted_powers: &[usize],
    threshold: usize,
    body: F,
) where
    F: Fn(usize) + Sync,
{
    if dimension >= threshold {
        (0..count)
            .into_par_iter()
            .for_each(|i| body(expand_masked_index(i, sorted_powers)));
    } else {
        for i in 0..count {
            body(expand_masked_index(i, sorted_powers));
        }
    }
}

/// Copy-out shape: `dst[map(i)] = src[i]` for every source index.
///
/// The caller guarantees `map` is a permutation of `[0, src.len())` (or that
/// collisions are idempotent writes), so concurrent writes never race.
pub(crate) fn par_for_copy<F>(src: &[Complex64], dst: &mut [Complex64], threshold: usize, map: F)
where
    F: Fn(usize) -> usize + Sync,
{
    debug_assert_eq!(src.len(), dst.len());

    if src.len() >= threshold {
        let out = SharedSlice::new(dst);
        src.par_iter()
            .enumerate()
            .for_each(|(i, amp)| unsafe { out.write(map(i), *amp) });
    } else {
        for (i, amp) in src.iter().enumerate() {
            dst[map(i)] = *amp;
        }
    }
}

/// Elementwise in-place shape: `state[i] = f(i, state[i])`.
pub(crate) fn par_update<F>(state: &mut [Complex64], threshold: usize, f: F)
where
    F: Fn(usize, Complex64) -> Complex64 + Sync,
{
    if state.len() >= threshold {
        state
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, amp)| *amp = f(i, *amp));
    } else {
        for (i, amp) in state.iter_mut().enumerate() {
            *amp = f(i, *amp);
        }
    }
}

/// Swap-reverse a strided run of amplitudes; `last` is one past the end.
unsafe fn reverse_strided(amps: SharedSlice<Complex64>, mut first: usize, mut last: usize, stride: usize) {
    while first + stride < last {
        last -= stride;
        let head = amps.read(first);
        let tail = amps.read(last);
        amps.write(first, tail);
        amps.write(last, head);
        first += stride;
    }
}

/// Rotate a strided run left so the element at `middle` lands on `first`.
/// Three reversals; `first`/`middle`/`last` are element indices with `last`
/// one past the end.
unsafe fn rotate_strided(
    amps: SharedSlice<Complex64>,
    first: usize,
    middle: usize,
    last: usize,
    stride: usize,
) {
    reverse_strided(amps, first, middle, stride);
    reverse_strided(amps, middle, last, stride);
    reverse_strided(amps, first, last, stride);
}

/// Register-rotate shape: for every value of the bits outside the
/// sub-register `[start, start+length)`, rotate that block's `2^length`
/// amplitudes (spaced by the start bit power) left by `left_rotate`
/// positions.
pub(crate) fn par_rotate_reg(
    state: &mut [Complex64],
    start: usize,
    length: usize,
    left_rotate: usize,
    threshold: usize,
) {
    let dimension = state.len();
    let start_power = 1usize << start;
    let end_power = 1usize << (start + length);
    let length_power = 1usize << length;
    let block_count = dimension >> length;

    let amps = SharedSlice::new(state);
    let rotate_block = |block: usize| {
        let low = block & (start_power - 1);
        let base = low + ((block >> start) * end_power);
        unsafe {
            rotate_strided(
                amps,
                base,
                base + left_rotate * start_power,
                base + length_power * start_power,
                start_power,
            );
        }
    };

    if dimension >= threshold {
        (0..block_count).into_par_iter().for_each(rotate_block);
    } else {
        (0..block_count).for_each(rotate_block);
    }
}

/// Sum of squared amplitude magnitudes
pub(crate) fn par_norm_sqr(state: &[Complex64], threshold: usize) -> f64 {
    if state.len() >= threshold {
        state.par_iter().map(|amp| amp.norm_sqr()).sum()
    } else {
        state.iter().map(|amp| amp.norm_sqr()).sum()
    }
}

/// Sum of squared magnitudes over the half-space where the given bit power
/// is set. Enumerates the bit-clear bases through the peel expansion and
/// reads each at the set-bit offset.
pub(crate) fn par_power_norm_sqr(state: &[Complex64], power: usize, threshold: usize) -> f64 {
    let count = state.len() >> 1;
    let powers = [power];

    if state.len() >= threshold {
        (0..count)
            .into_par_iter()
            .map(|i| state[expand_masked_index(i, &powers) + power].norm_sqr())
            .sum()
    } else {
        (0..count)
            .map(|i| state[expand_masked_index(i, &powers) + power].norm_sqr())
            .sum()
    }
}

/// Scale every amplitude by a real factor
pub(crate) fn par_scale(state: &mut [Complex64], factor: f64, threshold: usize) {
    if state.len() >= threshold {
        state.par_iter_mut().for_each(|amp| *amp *= factor);
    } else {
        for amp in state {
            *amp *= factor;
        }
    }
}

/// Fill `probabilities` with the squared magnitude of every amplitude
pub(crate) fn par_probabilities(state: &[Complex64], probabilities: &mut [f64], threshold: usize) {
    debug_assert_eq!(state.len(), probabilities.len());

    if state.len() >= threshold {
        probabilities
            .par_iter_mut()
            .zip(state.par_iter())
            .for_each(|(p, amp)| *p = amp.norm_sqr());
    } else {
        for (p, amp) in probabilities.iter_mut().zip(state) {
            *p = amp.norm_sqr();
        }
    }
}
