use super::*;

fn sample_pixels() -> Vec<Rgba8> {
    let mut out = Vec::new();
    for r in (0..=255u16).step_by(17) {
        for g in (0..=255u16).step_by(51) {
            for b in (0..=255u16).step_by(85) {
                out.push([r as u8, g as u8, b as u8, (r ^ b) as u8]);
            }
        }
    }
    out.push([255, 255, 255, 255]);
    out
}

#[test]
fn normal_is_identity() {
    for px in sample_pixels() {
        assert_eq!(Filter::Normal.apply_px(px), px);
    }
}

#[test]
fn grayscale_is_neutral_and_idempotent() {
    for px in sample_pixels() {
        let once = grayscale_px(px);
        assert_eq!(once[0], once[1]);
        assert_eq!(once[1], once[2]);
        assert_eq!(grayscale_px(once), once);
    }
}

#[test]
fn grayscale_uses_bt601_weights() {
    // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
    assert_eq!(grayscale_px([200, 100, 50, 255]), [124, 124, 124, 255]);
}

#[test]
fn sepia_clamps_white() {
    assert_eq!(sepia_px([255, 255, 255, 255]), [255, 255, 239, 255]);
}

#[test]
fn sepia_matches_matrix_for_midtones() {
    // R' = 0.393*100 + 0.769*100 + 0.189*100 = 135.1
    // G' = 0.349*100 + 0.686*100 + 0.168*100 = 120.3
    // B' = 0.272*100 + 0.534*100 + 0.131*100 = 93.7
    assert_eq!(sepia_px([100, 100, 100, 7]), [135, 120, 94, 7]);
}

#[test]
fn filters_never_touch_alpha() {
    for px in sample_pixels() {
        for f in Filter::ALL {
            assert_eq!(f.apply_px(px)[3], px[3]);
        }
    }
}

#[test]
fn apply_filter_keeps_dimensions_and_source() {
    let src = RgbaBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
    let out = apply_filter(&src, Filter::Grayscale).unwrap();
    assert_eq!((out.width, out.height), (2, 1));
    assert_eq!(out.pixel(0, 0).unwrap(), [76, 76, 76, 255]);
    assert_eq!(out.pixel(1, 0).unwrap(), [29, 29, 29, 128]);
    assert_eq!(src.pixel(0, 0).unwrap(), [255, 0, 0, 255]);
}

#[test]
fn apply_filter_in_place_rejects_partial_pixels() {
    let mut data = vec![0u8; 7];
    assert!(apply_filter_in_place(&mut data, Filter::Sepia).is_err());
}

#[test]
fn filter_names_parse_and_roundtrip() {
    for f in Filter::ALL {
        assert_eq!(f.as_str().parse::<Filter>().unwrap(), f);
    }
    assert_eq!("blackwhite".parse::<Filter>().unwrap(), Filter::Grayscale);
    assert!("vivid".parse::<Filter>().is_err());

    let f: Filter = serde_json::from_str("\"blackwhite\"").unwrap();
    assert_eq!(f, Filter::Grayscale);
    assert_eq!(serde_json::to_string(&Filter::Sepia).unwrap(), "\"sepia\"");
}
