use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use scale_hardware::frame::{parse, parse_bytes};
use scale_hardware::util::LineAssembler;

// A mixed stream: clean frames, status-prefixed frames, and power-on noise.
fn synth_stream(n: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(n * 16);
    for i in 0..n {
        match i % 4 {
            0 => out.extend_from_slice(format!("  {:.2} kg\r\n", i as f64 * 0.01).as_bytes()),
            1 => out.extend_from_slice(format!("ST,GS,{:>8.1}lb\r\n", i as f64 * 0.1).as_bytes()),
            2 => out.extend_from_slice(b"\xff\x00 ---- \r\n"),
            _ => out.extend_from_slice(format!("{:.3} KG\n", i as f64).as_bytes()),
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_kg_line", |b| b.iter(|| parse(black_box("  4.72 kg"))));
    c.bench_function("parse_unmatched_line", |b| {
        b.iter(|| parse(black_box("ST,GS, ---- overload")))
    });

    let stream = synth_stream(1_000);
    c.bench_function("assemble_and_parse_1k_frames", |b| {
        b.iter_batched(
            || stream.clone(),
            |bytes| {
                let mut asm = LineAssembler::new();
                // Deliver in small chunks, like a slow UART.
                let mut parsed = 0usize;
                for chunk in bytes.chunks(7) {
                    asm.push(chunk);
                    while let Some(line) = asm.next_line() {
                        if parse_bytes(&line).is_some_and(|r| r.is_parsed()) {
                            parsed += 1;
                        }
                    }
                }
                black_box(parsed)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
