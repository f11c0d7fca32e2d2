use chart_engine::api::{ChartEngine, ChartEngineConfig};
use chart_engine::axis::{PriceAxisRequest, TimeAxisConfig, calculate_price_axis, calculate_time_axis};
use chart_engine::core::{Bar, Timeframe};
use chart_engine::layout::{LabelCandidate, LabelPriority, PixelBox, resolve_collisions};
use chart_engine::levels::{KeyLevelConfig, detect_key_levels};
use chart_engine::render::NullRenderer;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const MINUTE_MS: i64 = 60_000;

fn generated_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let base = 100.0 + (t * 0.05).sin() * 12.0 + t * 0.002;
            let open = base;
            let close = if i % 2 == 0 { base + 0.6 } else { base - 0.6 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            Bar::new(i as i64 * MINUTE_MS, open, high, low, close, 1_000.0 + t)
                .expect("valid generated bar")
        })
        .collect()
}

fn bench_time_axis_10k(c: &mut Criterion) {
    let bars = generated_bars(10_000);
    let config = TimeAxisConfig::default();

    c.bench_function("time_axis_10k_window_2k", |b| {
        b.iter(|| {
            let _ = calculate_time_axis(
                black_box(&bars),
                Timeframe::All,
                black_box(1920.0),
                Some((8_000.0, 10_000.0)),
                &config,
            );
        })
    });
}

fn bench_price_axis(c: &mut Criterion) {
    let request = PriceAxisRequest::new(1663.25, 1701.75, 1080.0);

    c.bench_function("price_axis_linear", |b| {
        b.iter(|| {
            let _ = calculate_price_axis(black_box(&request));
        })
    });
}

fn bench_label_collisions_500(c: &mut Criterion) {
    let labels: Vec<LabelCandidate> = (0..500)
        .map(|i| {
            let priority = if i % 10 == 0 {
                LabelPriority::Major
            } else {
                LabelPriority::Minor
            };
            LabelCandidate::new(
                format!("{i}"),
                PixelBox::new(i as f64 * 4.0, 0.0, 36.0, 14.0),
                priority,
            )
        })
        .collect();

    c.bench_function("label_collisions_500", |b| {
        b.iter(|| {
            let _ = resolve_collisions(black_box(&labels), 8.0);
        })
    });
}

fn bench_key_levels_2k(c: &mut Criterion) {
    let bars = generated_bars(2_000);
    let config = KeyLevelConfig::default();

    c.bench_function("key_levels_2k", |b| {
        b.iter(|| {
            let _ = detect_key_levels(black_box(&bars), &config);
        })
    });
}

fn bench_engine_frame_after_pan(c: &mut Criterion) {
    let mut engine =
        ChartEngine::new(NullRenderer::default(), ChartEngineConfig::default()).expect("engine init");
    engine.set_canvas_size(1600, 900);
    engine.set_data(generated_bars(20_000));
    engine.apply_timeframe(Timeframe::OneYear);

    let mut direction = 1.0;
    c.bench_function("engine_frame_after_pan", |b| {
        b.iter(|| {
            direction = -direction;
            engine.pan_by(black_box(direction * 3.0));
            let _ = engine.on_frame();
        })
    });
}

criterion_group!(
    benches,
    bench_time_axis_10k,
    bench_price_axis,
    bench_label_collisions_500,
    bench_key_levels_2k,
    bench_engine_frame_after_pan
);
criterion_main!(benches);
