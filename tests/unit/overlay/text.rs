use super::*;

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn font() -> Option<PathBuf> {
    let p = PathBuf::from(SYSTEM_FONT);
    p.exists().then_some(p)
}

fn block(text: &str, font: PathBuf, w: u32, h: u32) -> TextBlockSpec {
    TextBlockSpec {
        name: "title".to_owned(),
        text: text.to_owned(),
        x: 4,
        y: 4,
        w,
        h,
        background: Color::rgb(255, 0, 0),
        foreground: Color::WHITE,
        font,
    }
}

#[test]
fn brush_from_color_keeps_channels() {
    let b = TextBrush::from(Color::rgba(1, 2, 3, 4));
    assert_eq!(b, TextBrush { r: 1, g: 2, b: 3, a: 4 });
}

#[test]
fn missing_font_skips_block() {
    let mut tr = TextRenderer::new();
    let frame = RgbaImage::from_pixel(16, 16, image::Rgba([9, 9, 9, 255]));
    let out = tr
        .draw_blocks(&frame, &[block("hi", "/nonexistent/font.ttf".into(), 10, 10)])
        .unwrap();
    assert_eq!(out, frame);
    assert!(tr.fit_size("hi", Path::new("/nonexistent/font.ttf"), 10.0, 10.0).is_none());
}

#[test]
fn fitted_size_respects_box() {
    let Some(font) = font() else { return };
    let mut tr = TextRenderer::new();
    let size = tr.fit_size("Hello", &font, 60.0, 30.0).unwrap();
    assert!(size > 0 && size < FIT_SIZE_LIMIT - 1, "size {size}");
    let (w, h) = tr.measure("Hello", &font, size as f32).unwrap();
    assert!(w <= 60.0 && h <= 30.0);
    let (w2, h2) = tr.measure("Hello", &font, (size + 1) as f32).unwrap();
    assert!(w2 > 60.0 || h2 > 30.0);
}

#[test]
fn roomy_box_falls_back_to_default_size() {
    let Some(font) = font() else { return };
    let mut tr = TextRenderer::new();
    assert_eq!(
        tr.fit_size("x", &font, 5000.0, 5000.0),
        Some(DEFAULT_FONT_SIZE)
    );
}

#[test]
fn more_lines_fit_smaller() {
    let Some(font) = font() else { return };
    let mut tr = TextRenderer::new();
    let one = tr.fit_size("abc", &font, 200.0, 40.0).unwrap();
    let three = tr.fit_size("abc\nabc\nabc", &font, 200.0, 40.0).unwrap();
    assert!(three < one, "{three} vs {one}");
}

#[test]
fn draws_background_and_text() {
    let Some(font) = font() else { return };
    let mut tr = TextRenderer::new();
    let frame = RgbaImage::from_pixel(64, 48, image::Rgba([0, 0, 0, 255]));
    let out = tr
        .draw_blocks(&frame, &[block("WW", font, 50, 30)])
        .unwrap();

    // Outside the block the frame is untouched.
    assert_eq!(out.get_pixel(60, 44).0, [0, 0, 0, 255]);
    // Inside the block: red background with some white-ish glyph coverage.
    let mut red = 0;
    let mut light = 0;
    for y in 5..33 {
        for x in 5..53 {
            let [r, g, b, _] = out.get_pixel(x, y).0;
            if r > 200 && g < 60 && b < 60 {
                red += 1;
            }
            if r > 200 && g > 150 && b > 150 {
                light += 1;
            }
        }
    }
    assert!(red > 100, "red {red}");
    assert!(light > 10, "light {light}");
}
