use crate::U256_128;
use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// log_sqrt(1.0001)(2) as Q128.128, and the error bounds of the log2
// approximation expressed in ticks.
const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

const SHIFT_32: usize = 32;
const SHIFT_127: usize = 127;
const SHIFT_128: usize = 128;

/// Returns `sqrt(1.0001^tick) * 2^96` rounded up, or
/// `StateError::TickOutOfBounds` outside `[MIN_TICK, MAX_TICK]`.
///
/// The ratio is assembled from one precomputed `1/sqrt(1.0001^(2^i))`
/// factor per set bit of `|tick|`, in Q128.128, then inverted for positive
/// ticks and narrowed to Q64.96.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> SHIFT_128;
            }
        };
    }

    apply_multiplier!(2, 6459403834229662010, 18444899583751176498);
    apply_multiplier!(4, 17226890335427755468, 18443055278223354162);
    apply_multiplier!(8, 2032852871939366096, 18439367220385604838);
    apply_multiplier!(16, 14545316742740207172, 18431993317065449817);
    apply_multiplier!(32, 5129152022828963008, 18417254355718160513);
    apply_multiplier!(64, 4894419605888772193, 18387811781193591352);
    apply_multiplier!(128, 1280255884321894483, 18329067761203520168);
    apply_multiplier!(256, 15924666964335305636, 18212142134806087854);
    apply_multiplier!(512, 8010504389359918676, 17980523815641551639);
    apply_multiplier!(1024, 10668036004952895731, 17526086738831147013);
    apply_multiplier!(2048, 4878133418470705625, 16651378430235024244);
    apply_multiplier!(4096, 9537173718739605541, 15030750278693429944);
    apply_multiplier!(8192, 9972618978014552549, 12247334978882834399);
    apply_multiplier!(16384, 10428997489610666743, 8131365268884726200);
    apply_multiplier!(32768, 9305304367709015974, 3584323654723342297);
    apply_multiplier!(65536, 14301143598189091785, 696457651847595233);
    apply_multiplier!(131072, 7393154844743099908, 26294789957452057);
    apply_multiplier!(262144, 2209338891292245656, 37481735321082);
    apply_multiplier!(524288, 10518117631919034274, 76158723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result inverts back to `tick`
    let lower_32_bits = ratio.as_limbs()[0] & 0xFFFF_FFFF;
    Ok((ratio >> SHIFT_32) + U256::from((lower_32_bits != 0) as u64))
}

/// Returns the greatest tick `t` with `get_sqrt_ratio_at_tick(t) <= sqrt_price_x96`.
///
/// Accepts prices in `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`; anything else is
/// `StateError::SqrtPriceOutOfBounds`. The tick is read off a 14-bit
/// fractional log2 of the price, which pins it to one of two candidates; the
/// tie is settled by evaluating the upper candidate exactly.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << SHIFT_32;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as usize;

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64;

    // one fractional bit per squaring
    for shift in (50..=63usize).rev() {
        r = r.wrapping_mul(r) >> SHIFT_127;
        let f: U256 = r >> SHIFT_128;
        log_2 |= I256::from_raw(f << shift);
        r >>= f.as_limbs()[0] as usize;
    }

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW) >> SHIFT_128).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH) >> SHIFT_128).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}

#[cfg(test)]
mod test {
    use super::*;

    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn sqrt_ratio_rejects_ticks_out_of_bounds() {
        assert!(matches!(
            get_sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(StateError::TickOutOfBounds)
        ));
        assert!(matches!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(StateError::TickOutOfBounds)
        ));
    }

    #[test]
    fn sqrt_ratio_bounds_are_the_images_of_the_tick_bounds() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
    }

    #[test]
    fn sqrt_ratio_matches_solidity_values() {
        let cases: [(i32, &str); 16] = [
            (MIN_TICK + 1, "4295343490"),
            (0, "79228162514264337593543950336"),
            (50, "79426470787362580746886972461"),
            (100, "79625275426524748796330556128"),
            (250, "80224679980005306637834519095"),
            (500, "81233731461783161732293370115"),
            (1000, "83290069058676223003182343270"),
            (2500, "89776708723587163891445672585"),
            (3000, "92049301871182272007977902845"),
            (4000, "96768528593268422080558758223"),
            (5000, "101729702841318637793976746270"),
            (50000, "965075977353221155028623082916"),
            (150000, "143194173941309278083010301478497"),
            (250000, "21246587762933397357449903968194344"),
            (500000, "5697689776495288729098254600827762987878"),
            (738203, "847134979253254120489401328389043031315994541"),
        ];
        for (tick, expected) in cases {
            assert_eq!(
                get_sqrt_ratio_at_tick(tick).unwrap(),
                U256::from_str(expected).unwrap(),
                "sqrt ratio at {tick} incorrect"
            );
        }
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK - 1).unwrap(),
            U256::from_str("1461373636630004318706518188784493106690254656249").unwrap()
        );
    }

    #[test]
    fn tick_at_sqrt_ratio_rejects_prices_out_of_bounds() {
        assert!(matches!(
            get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::ONE),
            Err(StateError::SqrtPriceOutOfBounds)
        ));
        assert!(matches!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO),
            Err(StateError::SqrtPriceOutOfBounds)
        ));
    }

    #[test]
    fn tick_at_sqrt_ratio_extremes() {
        assert_eq!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(
            get_tick_at_sqrt_ratio(U256::from(4295343490u64)).unwrap(),
            MIN_TICK + 1
        );
        assert_eq!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO - U256::ONE).unwrap(),
            MAX_TICK - 1
        );
    }

    #[test]
    fn tick_at_sqrt_ratio_floors_between_ticks() {
        let q96 = U256::from_str("79228162514264337593543950336").unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(q96).unwrap(), 0);
        assert_eq!(get_tick_at_sqrt_ratio(q96 - U256::ONE).unwrap(), -1);
        assert_eq!(get_tick_at_sqrt_ratio(q96 + U256::ONE).unwrap(), 0);

        let at_50 = U256::from_str("79426470787362580746886972461").unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(at_50).unwrap(), 50);
        assert_eq!(get_tick_at_sqrt_ratio(at_50 - U256::ONE).unwrap(), 49);

        let at_100 = U256::from_str("79625275426524748796330556128").unwrap();
        let midpoint = (at_50 + at_100) >> 1usize;
        let tick = get_tick_at_sqrt_ratio(midpoint).unwrap();
        assert!((50..100).contains(&tick));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // ratio(t) maps back to t and one unit below it falls to t - 1,
        // so tick boundaries are never misclassified
        #[test]
        fn tick_boundaries_invert_exactly(tick in (MIN_TICK + 1)..MAX_TICK) {
            let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
            prop_assert_eq!(get_tick_at_sqrt_ratio(ratio).unwrap(), tick);
            prop_assert_eq!(get_tick_at_sqrt_ratio(ratio - U256::ONE).unwrap(), tick - 1);
        }

        #[test]
        fn sqrt_ratio_is_strictly_increasing(tick in MIN_TICK..MAX_TICK) {
            prop_assert!(
                get_sqrt_ratio_at_tick(tick).unwrap() < get_sqrt_ratio_at_tick(tick + 1).unwrap()
            );
        }
    }
}
