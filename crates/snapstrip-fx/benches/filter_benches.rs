use criterion::{black_box, criterion_group, criterion_main, Criterion};
use snapstrip_core::{Color, FrameBuffer};
use snapstrip_fx::{apply_chain, parse, FilterCatalog};

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_vintage_chain", |b| {
        b.iter(|| parse(black_box("sepia(60%) contrast(110%) brightness(105%) saturate(85%)")))
    });
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_preview_frame");
    let catalog = FilterCatalog::builtin();
    // Preview-sized frame: 320x240 at 4:3.
    let source = FrameBuffer::solid(320, 240, &Color::from_rgba8([180, 120, 90, 255]));

    for id in ["grayscale", "sepia", "vintage"] {
        let chain = catalog.resolve(id).chain.clone();
        group.bench_function(id, |b| {
            b.iter(|| {
                let mut fb = source.clone();
                apply_chain(&mut fb, black_box(&chain));
                fb
            })
        });
    }

    let blur = parse("blur(2px)").unwrap();
    group.sample_size(20);
    group.bench_function("blur_2px", |b| {
        b.iter(|| {
            let mut fb = source.clone();
            apply_chain(&mut fb, black_box(&blur));
            fb
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_apply);
criterion_main!(benches);
