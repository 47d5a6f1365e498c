use std::hint::black_box;

use chat_export_explorer::MediaTable;
use chat_export_explorer::scheduler::{CancellationToken, NoYield, ParseOptions, ParseRun};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn generate_transcript(num_messages: usize) -> String {
    (0..num_messages)
        .map(|i| {
            format!(
                "[13/05/2023, {:02}:{:02}:00] User{}: message {}\ncontinuation {}\n",
                i / 60 % 24,
                i % 60,
                i % 3,
                i,
                i
            )
        })
        .collect()
}

/// Cost of slicing: the same transcript parsed with different slice sizes
fn bench_chunked_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_advance");
    let transcript = generate_transcript(100_000);
    let media = MediaTable::new();

    group.throughput(Throughput::Elements(100_000));
    for chunk_lines in [50, 500, 5_000].iter() {
        let options = ParseOptions { chunk_lines: *chunk_lines, flush_every: 1000 };
        group.bench_with_input(BenchmarkId::new("chunk_lines", chunk_lines), chunk_lines, |b, _| {
            b.iter(|| {
                let run = ParseRun::new(black_box(&transcript), &media, options, CancellationToken::new())
                    .unwrap();
                run.run(&mut NoYield, &mut ())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chunked_advance);
criterion_main!(benches);
