#![no_main]

use eolconv::{core::Error, Direction, Translator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Control bytes:
    // data[0] bit 0: direction (set = strip CR)
    // data[0] bit 1: undersize output buffer (exercise OutputBufferTooSmall)
    // data[1]: split point for the two-chunk run
    let control = data[0];
    let direction = if control & 0x01 != 0 {
        Direction::StripCr
    } else {
        Direction::EmitCrlf
    };
    let undersize = control & 0x02 != 0;
    let payload = &data[2..];
    let split = usize::from(data[1]).min(payload.len());

    // Two chunks must agree with feeding the bytes one at a time.
    let mut stepper = Translator::new(direction);
    let mut expected = Vec::new();
    let mut expected_lines = 0;
    for &b in payload {
        let step = stepper.step(b);
        expected.extend(step.prefix);
        expected_lines += u64::from(step.line);
        expected.extend(step.byte);
    }

    let mut translator = Translator::new(direction);
    let mut actual = Vec::new();
    let mut actual_lines = 0;
    for chunk in [&payload[..split], &payload[split..]] {
        let required = direction.max_output_size_for_chunk(chunk.len());
        if undersize && required > 0 {
            let mut out = vec![0u8; required - 1];
            match translator.translate_chunk(chunk, &mut out) {
                Err(Error::OutputBufferTooSmall { required: r }) => assert_eq!(r, required),
                other => panic!("expected OutputBufferTooSmall, got {other:?}"),
            }
        }
        let mut out = vec![0u8; required];
        let status = translator.translate_chunk(chunk, &mut out).unwrap();
        actual.extend_from_slice(&out[..status.output_len()]);
        actual_lines += status.lines();
    }

    assert_eq!(actual, expected);
    assert_eq!(actual_lines, expected_lines);
    assert_eq!(translator.is_pending(), stepper.is_pending());
});
