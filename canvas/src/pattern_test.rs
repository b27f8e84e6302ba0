use super::*;

#[test]
fn qr_is_deterministic() {
    assert_eq!(qr_modules("MBR-000123"), qr_modules("MBR-000123"));
}

#[test]
fn qr_differs_by_value() {
    assert_ne!(qr_modules("MBR-000123"), qr_modules("MBR-000124"));
}

#[test]
fn qr_modules_stay_in_grid() {
    for (row, col) in qr_modules("https://members.example.com/card/1") {
        assert!(row < QR_MODULES && col < QR_MODULES);
    }
}

#[test]
fn qr_has_three_finder_patterns() {
    let dark = qr_modules("anything");
    for (r0, c0) in [(0, 0), (0, QR_MODULES - 7), (QR_MODULES - 7, 0)] {
        // Outer ring corners and the center are dark.
        assert!(dark.contains(&(r0, c0)));
        assert!(dark.contains(&(r0 + 6, c0 + 6)));
        assert!(dark.contains(&(r0 + 3, c0 + 3)));
        // Gap between ring and core is light.
        assert!(!dark.contains(&(r0 + 1, c0 + 1)));
    }
    // Separator next to the top-left finder is light.
    assert!(!dark.contains(&(7, 0)));
    assert!(!dark.contains(&(0, 7)));
}

#[test]
fn barcode_widths_in_range() {
    let bars = barcode_bars("1234 5678 9012 3456");
    assert!(bars.iter().all(|w| (1..=3).contains(w)));
    assert_eq!(&bars[..4], &[2, 1, 1, 1]);
    assert_eq!(&bars[bars.len() - 3..], &[1, 1, 2]);
}

#[test]
fn barcode_is_deterministic_and_value_dependent() {
    assert_eq!(barcode_bars("A"), barcode_bars("A"));
    assert_ne!(barcode_bars("A"), barcode_bars("B"));
}

#[test]
fn barcode_length_grows_with_value_then_caps() {
    assert!(barcode_bars("12345678").len() > barcode_bars("1").len());
    assert_eq!(barcode_bars(&"9".repeat(16)).len(), barcode_bars(&"9".repeat(40)).len());
}
