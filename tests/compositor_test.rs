// Integration tests for the border compositor
use bordergenie::compositor::{
    AspectLabel, BorderColor, BorderSpec, CompositeError, CompositeLayout, CompositorConfig, ImageCompositor,
    ImageSource, PixelRect, SourceImage, TargetFrame,
};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x * 3 + y) % 239) as u8, 255])
    })
}

fn encode(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    let dynamic = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    dynamic
        .write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(png, ImageFormat::Png)
        .expect("output should be a valid png")
        .to_rgba8()
}

fn compositor() -> ImageCompositor {
    ImageCompositor::new(CompositorConfig::default()).expect("compositor init failed")
}

fn border(width: u32, color: BorderColor) -> BorderSpec {
    BorderSpec::new(width, color).expect("valid border")
}

#[test]
fn landscape_photo_on_square_frame_with_border() {
    let source = SourceImage::from_rgba("wide.png", gradient(1600, 1200));
    let result = compositor()
        .composite(&source, TargetFrame::Square, &border(50, BorderColor::WHITE))
        .expect("composite should succeed");

    assert_eq!((result.width(), result.height()), (1180, 1180));
    assert_eq!(result.layout.draw.width, 1080.0);
    assert_eq!(result.layout.draw.height, 810.0);
    assert_eq!((result.layout.draw.offset_x, result.layout.draw.offset_y), (50.0, 185.0));

    let canvas = decode(&result.png);
    assert_eq!(canvas.dimensions(), (1180, 1180));
    // 上方留边与四周边框都是边框色
    assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    assert_eq!(canvas.get_pixel(600, 100), &Rgba([255, 255, 255, 255]));
    assert_eq!(canvas.get_pixel(600, 184), &Rgba([255, 255, 255, 255]));
    assert_eq!(canvas.get_pixel(600, 995), &Rgba([255, 255, 255, 255]));
}

#[test]
fn portrait_photo_on_portrait_frame_without_border() {
    let source = SourceImage::from_rgba("tall.png", gradient(900, 1200));
    let result = compositor()
        .composite(&source, TargetFrame::Portrait, &border(0, BorderColor::BLACK))
        .expect("composite should succeed");

    assert_eq!((result.width(), result.height()), (1080, 1350));
    assert_eq!(result.layout.draw.width, 1012.5);
    assert_eq!(result.layout.draw.offset_x, 33.75);
    assert_eq!(result.layout.draw.offset_y, 0.0);
    assert_eq!(
        result.layout.placement,
        PixelRect { x: 34, y: 0, width: 1012, height: 1350 }
    );

    let canvas = decode(&result.png);
    assert_eq!(canvas.get_pixel(10, 675), &Rgba([0, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(1070, 675), &Rgba([0, 0, 0, 255]));
}

#[test]
fn custom_frame_with_matching_aspect_has_no_bars() {
    let source = SourceImage::from_rgba(
        "square.png",
        ImageBuffer::from_pixel(500, 500, Rgba([30, 140, 90, 255])),
    );
    let result = compositor()
        .composite(&source, TargetFrame::Custom, &border(20, BorderColor::WHITE))
        .expect("composite should succeed");

    assert_eq!((result.width(), result.height()), (1120, 1120));
    assert_eq!(
        result.layout.placement,
        PixelRect { x: 20, y: 20, width: 1080, height: 1080 }
    );

    let canvas = decode(&result.png);
    assert_eq!(canvas.get_pixel(19, 19), &Rgba([255, 255, 255, 255]));
    for (x, y) in [(20, 20), (1099, 20), (20, 1099), (1099, 1099), (560, 560)] {
        let pixel = canvas.get_pixel(x, y);
        assert!(pixel.0[1] > 130 && pixel.0[0] < 40, "unexpected inner pixel {:?}", pixel);
    }
}

#[test]
fn zero_border_output_matches_frame_dimensions() {
    let compositor = compositor();
    let source = SourceImage::from_rgba("any.png", gradient(333, 777));

    for frame in TargetFrame::ALL {
        let result = compositor
            .composite(&source, frame, &border(0, BorderColor::WHITE))
            .expect("composite should succeed");
        let (frame_width, frame_height) = frame.resolve_dimensions(333, 777).unwrap();
        assert_eq!((result.width(), result.height()), (frame_width, frame_height));
    }
}

#[test]
fn composite_is_deterministic() {
    let compositor = compositor();
    let source = SourceImage::from_rgba("det.png", gradient(640, 400));
    let border_spec = border(37, BorderColor::parse("#e0e0e0").unwrap());

    let first = compositor.composite(&source, TargetFrame::Landscape, &border_spec).unwrap();
    let second = compositor.composite(&source, TargetFrame::Landscape, &border_spec).unwrap();

    assert_eq!(first.png, second.png);
    assert_eq!(first.layout, second.layout);
}

#[test]
fn changing_border_color_only_changes_pixels_outside_image() {
    let compositor = compositor();
    let source = SourceImage::from_rgba("color.png", gradient(1080, 810));

    let white = compositor
        .composite(&source, TargetFrame::Portrait, &border(25, BorderColor::WHITE))
        .unwrap();
    let black = compositor
        .composite(&source, TargetFrame::Portrait, &border(25, BorderColor::BLACK))
        .unwrap();

    assert_eq!(white.layout, black.layout);
    assert_eq!(
        white.layout.placement,
        PixelRect { x: 25, y: 295, width: 1080, height: 810 }
    );
    let placement = white.layout.placement;
    let white_canvas = decode(&white.png);
    let black_canvas = decode(&black.png);

    for (x, y, pixel) in white_canvas.enumerate_pixels() {
        let other = black_canvas.get_pixel(x, y);
        if placement.contains(x, y) {
            assert_eq!(pixel, other, "image pixel changed at ({}, {})", x, y);
        } else {
            assert_eq!(pixel, &Rgba([255, 255, 255, 255]));
            assert_eq!(other, &Rgba([0, 0, 0, 255]));
        }
    }
}

#[test]
fn recomposite_replaces_previous_output() {
    let compositor = compositor();
    let source = SourceImage::from_rgba("again.png", gradient(200, 200));

    let small = compositor
        .composite(&source, TargetFrame::Square, &border(10, BorderColor::WHITE))
        .unwrap();
    let large = compositor
        .composite(&source, TargetFrame::Square, &border(100, BorderColor::WHITE))
        .unwrap();
    let small_again = compositor
        .composite(&source, TargetFrame::Square, &border(10, BorderColor::WHITE))
        .unwrap();

    assert_eq!(large.width(), 1280);
    assert_eq!(small.png, small_again.png);
}

#[test]
fn process_decodes_jpeg_and_png_sources() {
    let compositor = compositor();
    let border_spec = border(50, BorderColor::WHITE);

    for (name, format, media_type) in [
        ("photo.jpg", ImageFormat::Jpeg, "image/jpeg"),
        ("photo.png", ImageFormat::Png, "image/png"),
    ] {
        let result = compositor
            .process(
                ImageSource::Bytes {
                    name: name.to_string(),
                    media_type: media_type.to_string(),
                    bytes: encode(gradient(320, 180), format),
                },
                TargetFrame::Landscape,
                &border_spec,
            )
            .expect("process should succeed");

        assert_eq!((result.width(), result.height()), (1180, 707));
    }
}

fn jpeg_with_exif_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = encode(gradient(width, height), ImageFormat::Jpeg);

    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01".to_vec();
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[test]
fn sideways_phone_photo_is_upright_before_layout() {
    let compositor = compositor();
    let source = compositor
        .load(ImageSource::Bytes {
            name: "phone.jpg".to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: jpeg_with_exif_orientation(400, 300, 6),
        })
        .expect("load should succeed");

    assert_eq!((source.width(), source.height()), (300, 400));
    assert_eq!(compositor.classify(source.width(), source.height()).unwrap(), AspectLabel::Portrait);

    let result = compositor
        .composite(&source, TargetFrame::Square, &border(0, BorderColor::WHITE))
        .unwrap();
    // 竖图放进方形画幅：左右留边
    assert_eq!(
        result.layout.placement,
        PixelRect { x: 135, y: 0, width: 810, height: 1080 }
    );
}

#[test]
fn process_reads_files_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("disk.png");
    std::fs::write(&path, encode(gradient(120, 150), ImageFormat::Png)).unwrap();

    let source = compositor()
        .load(ImageSource::FilePath(path.to_string_lossy().to_string()))
        .expect("load should succeed");

    assert_eq!(source.file_name(), "disk.png");
    assert_eq!(source.media_type(), "image/png");
    assert_eq!((source.width(), source.height()), (120, 150));
}

#[test]
fn non_image_inputs_are_unsupported() {
    let compositor = compositor();
    let border_spec = border(0, BorderColor::WHITE);

    let pdf_like = compositor.process(
        ImageSource::Bytes {
            name: "doc.pdf".to_string(),
            media_type: "image/png".to_string(),
            bytes: b"%PDF-1.7 not an image".to_vec(),
        },
        TargetFrame::Square,
        &border_spec,
    );
    assert!(matches!(pdf_like, Err(CompositeError::UnsupportedMediaType(_))));

    let data_url = compositor.process(
        ImageSource::Base64 {
            name: "note.txt".to_string(),
            data: "data:text/plain;base64,SGVsbG8=".to_string(),
        },
        TargetFrame::Square,
        &border_spec,
    );
    assert!(matches!(data_url, Err(CompositeError::UnsupportedMediaType(_))));
}

#[test]
fn layout_and_error_codes_are_stable() {
    let err = CompositeLayout::compute(0, 10, TargetFrame::Square, &border(0, BorderColor::WHITE))
        .unwrap_err();
    assert_eq!(err.code(), "E_INVALID_DIMENSIONS");
    assert_eq!(err.stage(), "layout");
}
