use super::*;
use crate::text::fixed_measurer::FixedMeasurer;

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                     tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
                     quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

fn range() -> FontSizeRange {
    FontSizeRange { min: 20, max: 40 }
}

#[test]
fn height_counts_lines_and_spacing() {
    let mut m = FixedMeasurer::default();
    // Line height == size with the fixed measurer; "AAAA BBBB" is 90px at size 20.
    let block = wrap_block("AAAA BBBB CCCC", 20, 90.0, 0.2, &mut m).unwrap();
    assert_eq!(block.lines, vec!["AAAA BBBB", "CCCC"]);
    assert_eq!(block.font.size_px, 20);
    assert!((block.height - 44.0).abs() < 1e-4);

    let single = estimate_height("AAAA", 20, 90.0, 0.2, &mut m).unwrap();
    assert!((single - 20.0).abs() < 1e-4);
}

#[test]
fn empty_text_has_zero_height() {
    let mut m = FixedMeasurer::default();
    assert_eq!(estimate_height("", 30, 100.0, 0.2, &mut m).unwrap(), 0.0);
    assert_eq!(estimate_height("   ", 30, 100.0, 0.2, &mut m).unwrap(), 0.0);
}

#[test]
fn unresolvable_size_propagates() {
    let mut m = FixedMeasurer::default();
    let err = estimate_height("abc", 0, 100.0, 0.2, &mut m).unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::PostreelError::Configuration(_)
    ));
}

#[test]
fn short_content_gets_the_maximum_size() {
    let mut m = FixedMeasurer::default();
    let fit = find_optimal_size("hi", 980.0, 1000.0, range(), 0.2, 10, &mut m).unwrap();
    assert_eq!(fit.size_px, 40);
    assert!(fit.fits);
}

#[test]
fn overflowing_content_degrades_to_minimum() {
    let mut m = FixedMeasurer::default();
    let text = LOREM.repeat(20);
    let fit = find_optimal_size(&text, 980.0, 50.0, range(), 0.2, 10, &mut m).unwrap();
    assert_eq!(fit.size_px, 20);
    assert!(!fit.fits);

    let negative = find_optimal_size("x", 980.0, -5.0, range(), 0.2, 10, &mut m).unwrap();
    assert_eq!(negative.size_px, 20);
    assert!(!negative.fits);
}

#[test]
fn picks_largest_fitting_size() {
    let mut m = FixedMeasurer::default();
    // One line, so height == size.
    let fit = find_optimal_size("abc", 980.0, 30.5, range(), 0.2, 10, &mut m).unwrap();
    assert_eq!(fit.size_px, 30);
    assert!(fit.fits);
    assert_eq!(fit.probes, 4);
}

#[test]
fn probes_are_bounded_and_result_in_range() {
    let wide = FontSizeRange { min: 1, max: 100_000 };
    for budget in [-1.0, 0.0, 10.0, 333.0, 5_000.0, 1e9] {
        let mut m = FixedMeasurer::default();
        let fit = find_optimal_size(LOREM, 980.0, budget, wide, 0.2, 10, &mut m).unwrap();
        assert!(fit.probes <= 10);
        assert!(wide.contains(fit.size_px));
        assert_eq!(m.resolved.len() as u32, fit.probes);
    }

    for requested in [11, 50, u32::MAX] {
        let mut m = FixedMeasurer::default();
        let fit =
            find_optimal_size(LOREM, 980.0, 5_000.0, wide, 0.2, requested, &mut m).unwrap();
        assert!(fit.probes <= MAX_FIT_PROBES, "{requested}: {}", fit.probes);
        assert_eq!(m.resolved.len() as u32, fit.probes);
    }

    let mut m = FixedMeasurer::default();
    let fit = find_optimal_size(LOREM, 980.0, 1e9, range(), 0.2, 1, &mut m).unwrap();
    assert_eq!(fit.probes, 1);
    assert!(range().contains(fit.size_px));
}

#[test]
fn rejects_inverted_range() {
    let mut m = FixedMeasurer::default();
    let bad = FontSizeRange { min: 40, max: 20 };
    assert!(find_optimal_size("x", 980.0, 100.0, bad, 0.2, 10, &mut m).is_err());
}

#[test]
fn height_is_non_decreasing_in_size_for_fixed_advances() {
    let mut m = FixedMeasurer::default();
    for text in [LOREM, "a b c d e f g", "one", ""] {
        let mut prev = 0.0f32;
        for size in 20..=40 {
            let h = estimate_height(text, size, 300.0, 0.2, &mut m).unwrap();
            assert!(h >= prev, "height dropped at size {size} for {text:?}");
            prev = h;
        }
    }
}

#[test]
fn height_is_non_decreasing_in_size_with_bundled_font() {
    let lib = crate::text::font::FontLibrary::from_path("tests/data/fonts/DejaVuSans.ttf").unwrap();
    let mut ts = crate::text::measure::Typesetter::new(&lib).unwrap();
    for text in [LOREM, "The quick brown fox jumps over the lazy dog"] {
        let mut prev = 0.0f32;
        for size in 20..=40 {
            let h = estimate_height(text, size, 980.0, 0.2, &mut ts).unwrap();
            assert!(h >= prev, "height dropped at size {size}");
            prev = h;
        }
    }
}
