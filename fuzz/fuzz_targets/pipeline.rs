#![no_main]

use dagplot_core::{build, count_nodes, layout, parse_all};
use libfuzzer_sys::fuzz_target;

// Arbitrary text through parse → build → layout must never panic, and a
// forest that builds must always lay out.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(mut deps) = parse_all(text.lines()) else {
        return;
    };
    let Ok(mut forest) = build(&mut deps) else {
        return;
    };

    assert_eq!(count_nodes(&forest), forest.len());
    layout(&mut forest).expect("built forest lays out");
    assert!(forest.is_positioned());
});
