#![no_main]
use libfuzzer_sys::fuzz_target;
use scale_hardware::frame;
use scale_hardware::util::LineAssembler;

fuzz_target!(|data: &[u8]| {
    // Arbitrary device bytes must never panic the assembler or the parser,
    // and any parsed weight must be a non-negative finite kg value.
    let mut lines = LineAssembler::new();
    lines.push(data);
    while let Some(line) = lines.next_line() {
        if let Some(reading) = frame::parse_bytes(&line) {
            if let Some(kg) = reading.value_kg() {
                assert!(kg.is_finite() && kg >= 0.0);
            }
        }
    }
});
