use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use common_types::{EMBEDDING_DIMENSION, FaceEmbedding, RawMetadata, RawPhoto};
use criterion::{Criterion, criterion_group, criterion_main};
use photo_timeline::assembler::TimelineAssembler;
use photo_timeline::clock::FixedClock;
use photo_timeline::clustering::FaceClusterer;
use photo_timeline::normalizer::MetadataNormalizer;
use serde_json::json;
use std::hint::black_box;
use std::num::NonZeroUsize;
use std::sync::Arc;

fn sample_photos(count: usize) -> Vec<RawPhoto> {
    (0..count)
        .map(|i| {
            let timestamp = format!(
                "20{:02}:{:02}:{:02} {:02}:{:02}:00",
                10 + i % 14,
                1 + i % 12,
                1 + i % 28,
                i % 24,
                i % 60
            );
            RawPhoto::new(
                format!("photo-{i}"),
                RawMetadata::builder()
                    .date_time_original(json!(timestamp))
                    .gps_latitude(json!([52, i % 60, 12.5]))
                    .gps_longitude(json!([4, 53, i % 60]))
                    .build(),
            )
        })
        .collect()
}

fn sample_faces(count: usize) -> Vec<FaceEmbedding> {
    (0..count)
        .map(|i| {
            let person = (i % 25) as f32;
            let values = (0..EMBEDDING_DIMENSION)
                .map(|d| (if d == i % EMBEDDING_DIMENSION { 0.05 } else { 0.0 }) + person * 0.8 * ((d % 3) as f32))
                .collect::<Vec<_>>();
            FaceEmbedding::new(format!("photo-{i}"), values)
        })
        .collect()
}

fn bench_timeline(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default();
    let assembler = TimelineAssembler::builder()
        .normalizer(MetadataNormalizer::new(Arc::new(FixedClock(now)), Tz::UTC))
        .build();
    let photos = sample_photos(10_000);
    let faces = sample_faces(2_000);

    // 1. Normalize, sort and group
    c.bench_function("assemble_10k_photos", |b| {
        b.iter(|| assembler.assemble(black_box(&photos), None));
    });

    // 2. Sequential clustering
    let clusterer = FaceClusterer::default();
    c.bench_function("cluster_2k_faces", |b| {
        b.iter(|| clusterer.cluster(black_box(&faces)));
    });

    // 3. Batched clustering
    let batch_size = NonZeroUsize::new(250).unwrap_or(NonZeroUsize::MIN);
    c.bench_function("cluster_2k_faces_batched", |b| {
        b.iter(|| clusterer.cluster_batched(black_box(&faces), batch_size));
    });
}

criterion_group!(benches, bench_timeline);
criterion_main!(benches);
