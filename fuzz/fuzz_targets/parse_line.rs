#![no_main]

use dagplot_core::{ParsedLine, classify_line, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(dep) = parse_line(line) {
        assert!(!dep.name.contains('>'));
        if let Some(downstream) = dep.downstream.as_deref() {
            assert!(!dep.name.is_empty());
            assert!(!downstream.is_empty());
            assert_eq!(downstream, downstream.trim());
        }
    }

    if let Ok(ParsedLine::Dependency(dep)) = classify_line(line) {
        assert_eq!(dep.name, dep.name.trim());
    }
});
