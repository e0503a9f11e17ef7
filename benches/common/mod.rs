#![allow(dead_code)]

use clmm_quoter::math::{sqrt_price_math, swap_math, tick_math};
use clmm_quoter::quote::{self, Direction};
use clmm_quoter::{I256, Pool, PoolEvent, PoolSnapshot, PoolTracker, SwapParams, TickCurve, TickInfo, U256};
use criterion::{BatchSize, Criterion, black_box};

const POSITIONS: i32 = 100;
const WIDTH: i32 = 600;
const POSITION_LIQUIDITY: u128 = 1_000_000_000_000_000_000;

/// Nested positions centred on tick 0, one initialized tick every `WIDTH`.
pub fn wide_pool() -> Pool {
    let mut ticks = Vec::with_capacity(2 * POSITIONS as usize);
    for i in 1..=POSITIONS {
        ticks.push(TickInfo::new(-i * WIDTH, POSITION_LIQUIDITY as i128, POSITION_LIQUIDITY));
        ticks.push(TickInfo::new(i * WIDTH, -(POSITION_LIQUIDITY as i128), POSITION_LIQUIDITY));
    }
    let snapshot = PoolSnapshot::new(
        tick_math::get_sqrt_ratio_at_tick(0).unwrap(),
        0,
        POSITION_LIQUIDITY * POSITIONS as u128,
        3000,
        60,
    )
    .unwrap();
    Pool::new(snapshot, TickCurve::new(60, ticks).unwrap()).unwrap()
}

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    group.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| tick_math::get_sqrt_ratio_at_tick(black_box(-123_456)))
    });
    let price = tick_math::get_sqrt_ratio_at_tick(-123_456).unwrap();
    group.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| tick_math::get_tick_at_sqrt_ratio(black_box(price)))
    });
    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
    let liquidity = POSITION_LIQUIDITY;
    let amount = U256::from(1_000_000_000_000_000u64);

    let mut group = c.benchmark_group("sqrt_price_math");
    group.bench_function("next_from_input_zero_for_one", |b| {
        b.iter(|| {
            sqrt_price_math::get_next_sqrt_price_from_input(black_box(price), liquidity, amount, true)
        })
    });
    group.bench_function("next_from_output_one_for_zero", |b| {
        b.iter(|| {
            sqrt_price_math::get_next_sqrt_price_from_output(black_box(price), liquidity, amount, false)
        })
    });
    let upper = tick_math::get_sqrt_ratio_at_tick(600).unwrap();
    group.bench_function("amount_0_delta", |b| {
        b.iter(|| sqrt_price_math::get_amount_0_delta(black_box(price), upper, liquidity, true))
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
    let target = tick_math::get_sqrt_ratio_at_tick(-600).unwrap();
    let amount = I256::try_from(1_000_000_000_000_000i64).unwrap();

    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            swap_math::compute_swap_step(black_box(price), target, POSITION_LIQUIDITY, amount, 3000)
        })
    });
}

pub fn bench_swap(c: &mut Criterion) {
    let pool = wide_pool();
    let mut group = c.benchmark_group("swap");

    let small = SwapParams::new(
        true,
        I256::try_from(1_000_000_000_000i64).unwrap(),
        Direction::ZeroForOne.default_sqrt_price_limit(),
    );
    group.bench_function("single_step", |b| b.iter(|| pool.swap(black_box(small))));

    // runs off the curve, crossing every tick below the price
    let sweep = SwapParams::new(true, I256::MAX, Direction::ZeroForOne.default_sqrt_price_limit());
    group.bench_function("cross_all_ticks", |b| b.iter(|| pool.swap(black_box(sweep))));

    group.bench_function("max_input_amount", |b| {
        b.iter(|| pool.max_input_amount(black_box(false)))
    });
    group.finish();
}

pub fn bench_quote(c: &mut Criterion) {
    let pool = wide_pool();
    let amount = U256::from(10u128.pow(21));

    let mut group = c.benchmark_group("quote");
    group.bench_function("exact_input", |b| {
        b.iter(|| quote::quote_exact_input(&pool, Direction::OneForZero, black_box(amount), None))
    });
    group.bench_function("exact_output", |b| {
        b.iter(|| quote::quote_exact_output(&pool, Direction::ZeroForOne, black_box(amount), None))
    });
    group.finish();
}

pub fn bench_tracker(c: &mut Criterion) {
    let pool = wide_pool();
    let events: Vec<PoolEvent> = (1..=50)
        .map(|i| PoolEvent::Mint {
            tick_lower: -i * 60,
            tick_upper: i * 120,
            amount: 1_000_000,
        })
        .collect();

    c.bench_function("tracker_apply_and_freeze", |b| {
        b.iter_batched(
            || PoolTracker::from(pool.clone()),
            |mut tracker| {
                tracker.apply_all(&events).unwrap();
                tracker.freeze().unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}
