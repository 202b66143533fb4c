use criterion::{Criterion, criterion_group, criterion_main};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use shanten::algo::shanten::calc_all;
use shanten::build::BuildConfig;
use shanten::hand::parse_tiles;
use shanten::tile::TileType;
use shanten::{HandCalculator, Tables};
use std::hint::black_box;
use std::sync::Arc;

fn tables() -> Arc<Tables> {
    let config = BuildConfig {
        progress: false,
        self_check: false,
        ..Default::default()
    };
    Arc::new(Tables::build(&config).unwrap())
}

fn random_hands(n: usize) -> Vec<Vec<TileType>> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut wall: Vec<_> = TileType::all().flat_map(|t| [t; 4]).collect();
    (0..n)
        .map(|_| {
            wall.shuffle(&mut rng);
            wall[..14].to_vec()
        })
        .collect()
}

fn bench_calculator(c: &mut Criterion) {
    let tables = tables();
    let hands = random_hands(1000);

    c.bench_function("draw_discard_shanten_1000x", |b| {
        let mut calcs: Vec<_> = hands
            .iter()
            .map(|h| HandCalculator::from_tiles(Arc::clone(&tables), &h[..13]))
            .collect();
        b.iter(|| {
            for (calc, hand) in calcs.iter_mut().zip(&hands) {
                calc.draw(hand[13]);
                black_box(calc.shanten());
                calc.discard(hand[13]);
            }
        });
    });

    c.bench_function("ukeire_for_13_1000x", |b| {
        let mut calcs: Vec<_> = hands
            .iter()
            .map(|h| HandCalculator::from_tiles(Arc::clone(&tables), &h[..13]))
            .collect();
        b.iter(|| {
            for calc in &mut calcs {
                black_box(calc.ukeire_for_13());
            }
        });
    });

    c.bench_function("init_14", |b| {
        let tiles = parse_tiles("123456789m 12344p").unwrap();
        b.iter(|| HandCalculator::from_tiles(Arc::clone(&tables), black_box(&tiles)).shanten());
    });
}

fn bench_classic(c: &mut Criterion) {
    let hands: Vec<[u8; 34]> = random_hands(1000)
        .iter()
        .map(|h| {
            let mut counts = [0; 34];
            h.iter().for_each(|t| counts[t.as_usize()] += 1);
            counts
        })
        .collect();
    c.bench_function("classic_calc_all_1000x", |b| {
        b.iter(|| {
            for counts in &hands {
                black_box(calc_all(counts, &[0; 34], 0));
            }
        });
    });
}

criterion_group!(benches, bench_calculator, bench_classic);
criterion_main!(benches);
