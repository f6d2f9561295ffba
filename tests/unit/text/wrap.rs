use super::*;
use crate::text::fixed_measurer::FixedMeasurer;

fn font(m: &mut FixedMeasurer, size: u32) -> FontHandle {
    m.font(size).unwrap()
}

fn assert_wrap_invariants(m: &mut FixedMeasurer, text: &str, f: &FontHandle, max_width: f32) {
    let lines = wrap_text(text, f, max_width, m);
    for line in &lines {
        let fits = m.line_width(f, line) <= max_width;
        let single_word = line.split_whitespace().count() == 1;
        assert!(fits || single_word, "line {line:?} overflows {max_width}");
        assert!(!line.is_empty());
    }
    let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
    let original: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(rejoined, original);
}

#[test]
fn wraps_at_measured_width() {
    let mut m = FixedMeasurer::default();
    let f = font(&mut m, 20);
    let max_width = m.line_width(&f, "AAAA BBBB");
    assert_eq!(
        wrap_text("AAAA BBBB CCCC", &f, max_width, &mut m),
        vec!["AAAA BBBB".to_string(), "CCCC".to_string()]
    );
}

#[test]
fn empty_and_blank_text_yield_no_lines() {
    let mut m = FixedMeasurer::default();
    let f = font(&mut m, 20);
    assert!(wrap_text("", &f, 100.0, &mut m).is_empty());
    assert!(wrap_text(" \t\n ", &f, 100.0, &mut m).is_empty());
}

#[test]
fn oversized_word_gets_its_own_line() {
    let mut m = FixedMeasurer::default();
    let f = font(&mut m, 20);
    // "xx" is 20px wide, the long word is 100px.
    let lines = wrap_text("xx Supercalif xx", &f, 30.0, &mut m);
    assert_eq!(lines, vec!["xx", "Supercalif", "xx"]);

    let first = wrap_text("Supercalif xx", &f, 30.0, &mut m);
    assert_eq!(first, vec!["Supercalif", "xx"]);
}

#[test]
fn collapses_runs_of_whitespace() {
    let mut m = FixedMeasurer::default();
    let f = font(&mut m, 10);
    let lines = wrap_text("  a\t\tb\n\nc  ", &f, 1000.0, &mut m);
    assert_eq!(lines, vec!["a b c"]);
}

#[test]
fn invariants_hold_across_widths_and_sizes() {
    let corpus = [
        "The quick brown fox jumps over the lazy dog",
        "a bb ccc dddd eeeee ffffff ggggggg hhhhhhhh",
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor",
        "singleword",
        "x",
    ];
    let mut m = FixedMeasurer::default();
    for size in [10, 20, 33, 40] {
        let f = font(&mut m, size);
        for max_width in [1.0, 25.0, 80.0, 200.0, 980.0] {
            for text in corpus {
                assert_wrap_invariants(&mut m, text, &f, max_width);
            }
        }
    }
}
