//! Kani proofs for the zero-fee constant product swap
//!
//! - **A1: Invariant Preserved** - k shrinks by less than one new_in step
//! - **A2: No Full Drain** - amount_out < balance_out
//! - **A3: Rounding Direction** - new_in · new_out never exceeds k
//! - **A4: Deterministic** - same reserves and input give the same quote

use amm_model::quote_swap;
use spotlend_common::math::wide_mul;
use spotlend_common::U256;

/// A1: x·y after a swap is k up to flooring of new_out
#[kani::proof]
#[kani::unwind(3)]
fn a1_invariant_preserved() {
    let b_in: u64 = kani::any();
    let b_out: u64 = kani::any();
    let dx: u64 = kani::any();
    kani::assume(b_in > 0 && b_out > 0 && dx > 0);

    if let Ok(q) = quote_swap(b_in as u128, b_out as u128, dx as u128) {
        let k0 = wide_mul(b_in as u128, b_out as u128);
        let k1 = wide_mul(q.new_in, q.new_out);
        assert!(k1 <= k0, "A1: invariant must not grow");
        assert!(k0 - k1 < U256::from(q.new_in), "A1: loss below one new_in step");
    }
}

/// A2: a successful swap never pays out the whole out reserve
#[kani::proof]
#[kani::unwind(3)]
fn a2_no_full_drain() {
    let b_in: u64 = kani::any();
    let b_out: u64 = kani::any();
    let dx: u64 = kani::any();

    if let Ok(q) = quote_swap(b_in as u128, b_out as u128, dx as u128) {
        assert!(q.amount_out < b_out as u128, "A2: out reserve must stay positive");
        assert!(q.new_out > 0, "A2: new_out must stay positive");
        assert_eq!(q.new_out + q.amount_out, b_out as u128);
    }
}

/// A3: flooring new_out never hands the pool more than k
#[kani::proof]
#[kani::unwind(3)]
fn a3_rounding_direction() {
    let b_in: u32 = kani::any();
    let b_out: u32 = kani::any();
    let dx: u32 = kani::any();
    kani::assume(b_in > 0 && dx > 0);

    if let Ok(q) = quote_swap(b_in as u128, b_out as u128, dx as u128) {
        let k0 = (b_in as u128) * (b_out as u128);
        let k1 = q.new_in * q.new_out;
        assert!(k1 <= k0, "A3: rounding must favour the caller");
    }
}

/// A4: quoting is a pure function of its inputs
#[kani::proof]
#[kani::unwind(3)]
fn a4_deterministic() {
    let b_in: u64 = kani::any();
    let b_out: u64 = kani::any();
    let dx: u64 = kani::any();

    let first = quote_swap(b_in as u128, b_out as u128, dx as u128);
    let second = quote_swap(b_in as u128, b_out as u128, dx as u128);
    assert_eq!(first, second, "A4: quote must be deterministic");
}
