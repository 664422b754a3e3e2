use super::*;

#[test]
fn rgba_buffer_new_validates_length() {
    assert!(RgbaBuffer::new(2, 2, vec![0; 16]).is_ok());
    assert!(RgbaBuffer::new(2, 2, vec![0; 15]).is_err());
    assert!(RgbaBuffer::new(0, 2, Vec::new()).is_err());
}

#[test]
fn filled_buffer_reports_every_pixel() {
    let buf = RgbaBuffer::filled(3, 2, [1, 2, 3, 4]);
    assert_eq!(buf.data.len(), 3 * 2 * 4);
    assert_eq!(buf.pixel(2, 1).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn pixel_outside_buffer_is_none() {
    let buf = RgbaBuffer::filled(3, 2, [1, 2, 3, 4]);
    assert_eq!(buf.pixel(3, 0), None);
    assert_eq!(buf.pixel(0, 2), None);

    let short = RgbaBuffer {
        width: 2,
        height: 2,
        data: vec![0; 8],
    };
    assert!(short.pixel(0, 0).is_some());
    assert_eq!(short.pixel(1, 1), None);
}

#[test]
fn image_conversion_keeps_pixels() {
    let buf = RgbaBuffer::new(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 128]).unwrap();
    let img = buf.to_image().unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(RgbaBuffer::from_image(img), buf);
}

#[test]
fn aspect_rejects_zero_terms() {
    assert!(Aspect::new(4, 0).is_err());
    assert!(Aspect::new(0, 3).is_err());
    let a = Aspect::new(4, 3).unwrap();
    assert_eq!(a, Aspect::FOUR_THREE);
    assert!((a.as_f64() - 4.0 / 3.0).abs() < 1e-12);
}
