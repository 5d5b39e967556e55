use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use std::io::{Cursor, SeekFrom};

use buf_stream_io::{Reader, Writer};

fn generate_random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Sequential byte and block access, the common case for object file output.
fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    let input_data = generate_random_data(1 << 20);

    group.bench_function("write_byte", |b| {
        b.iter(|| {
            let mut writer = Writer::new(Cursor::new(Vec::with_capacity(input_data.len())));
            for byte in &input_data {
                writer.write_byte(*byte).unwrap();
            }
            writer.close().unwrap();
        });
    });

    group.bench_function("read_byte", |b| {
        b.iter(|| {
            let mut reader = Reader::new(Cursor::new(&input_data));
            let mut sum = 0u64;
            while let Some(byte) = reader.read_byte().unwrap() {
                sum += byte as u64;
            }
            black_box(sum)
        });
    });

    group.finish();
}

/// Writes records and goes back to patch a header field after each one.
fn bench_backpatch(c: &mut Criterion) {
    let record = generate_random_data(512);

    c.bench_function("backpatch_lengths", |b| {
        b.iter(|| {
            let mut writer = Writer::new(Cursor::new(Vec::new()));
            for _ in 0..256 {
                let header = writer.offset().unwrap();
                writer.write(&[0; 4]).unwrap();
                writer.write(black_box(&record)).unwrap();
                let end = writer.offset().unwrap();
                writer.seek(SeekFrom::Start(header)).unwrap();
                writer.write(&((end - header) as u32).to_le_bytes()).unwrap();
                writer.seek(SeekFrom::Start(end)).unwrap();
            }
            writer.close().unwrap();
        });
    });
}

criterion_group!(benches, bench_sequential, bench_backpatch);
criterion_main!(benches);
