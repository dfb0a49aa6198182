use super::*;
use crate::assets::catalog::MemoryCatalog;
use crate::assets::decode::ImageBytes;
use crate::layout::fit::CropAlignX;

const GREEN: [u8; 4] = [0, 255, 0, 255];

fn foreground_rows(w: u32, h: u32, rows: std::ops::RangeInclusive<u32>, px: [u8; 4]) -> Raster {
    let mut r = Raster::transparent(w, h).unwrap();
    let stride = r.stride();
    for y in rows {
        let start = y as usize * stride;
        for dst in r.data_mut()[start..start + stride].chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }
    r
}

fn row_is(r: &Raster, y: u32, px: [u8; 4]) -> bool {
    r.row(y).chunks_exact(4).all(|p| p == px)
}

#[test]
fn centered_content_is_not_shifted() {
    let fg = foreground_rows(100, 100, 40..=59, [255, 0, 0, 255]);
    let bg = Raster::filled(100, 100, GREEN).unwrap();
    let (out, report) = compose_with_report(fg, bg, &ComposeOpts::default()).unwrap();

    assert_eq!(report.bounds, ContentBounds { top: 40, bottom: 59 });
    assert_eq!(report.shift, None);
    assert!(row_is(&out, 39, GREEN));
    assert!(row_is(&out, 40, [255, 0, 0, 255]));
    assert!(row_is(&out, 59, [255, 0, 0, 255]));
    assert!(row_is(&out, 60, GREEN));
}

#[test]
fn high_content_settles_toward_bottom() {
    let fg = foreground_rows(100, 100, 10..=20, [255, 0, 0, 255]);
    let bg = Raster::filled(100, 100, GREEN).unwrap();
    let (out, report) = compose_with_report(fg, bg, &ComposeOpts::default()).unwrap();

    assert_eq!(report.shift, Some(69));
    for y in 0..79 {
        assert!(row_is(&out, y, GREEN), "row {y}");
    }
    for y in 79..=89 {
        assert!(row_is(&out, y, [255, 0, 0, 255]), "row {y}");
    }
    for y in 90..100 {
        assert!(row_is(&out, y, GREEN), "row {y}");
    }
}

#[test]
fn wide_background_is_right_cropped_to_foreground_size() {
    let mut bg = Raster::transparent(200, 100).unwrap();
    for (i, px) in bg.data_mut().chunks_exact_mut(4).enumerate() {
        let x = i as u32 % 200;
        px.copy_from_slice(if x < 100 { &[255, 0, 0, 255] } else { &[0, 0, 255, 255] });
    }
    let fg = Raster::transparent(100, 100).unwrap();

    let (out, report) = compose_with_report(fg, bg, &ComposeOpts::default()).unwrap();
    assert_eq!(out.dimensions(), (100, 100));
    assert_eq!(report.fit.crop_x, 100);
    assert!(report.bounds.is_empty());
    assert!(out.data().chunks_exact(4).all(|px| px == [0, 0, 255, 255]));
}

#[test]
fn output_takes_foreground_size() {
    let fg = foreground_rows(64, 48, 0..=47, [0, 0, 0, 0]);
    let bg = Raster::filled(10, 300, GREEN).unwrap();
    let out = compose(fg, bg, &ComposeOpts::default()).unwrap();
    assert_eq!(out.dimensions(), (64, 48));
}

#[test]
fn chroma_key_prepass_reveals_background() {
    let fg = Raster::filled(8, 8, [250, 250, 250, 255]).unwrap();
    let bg = Raster::filled(8, 8, GREEN).unwrap();

    let plain = compose(fg.clone(), bg.clone(), &ComposeOpts::default()).unwrap();
    assert!(plain.data().chunks_exact(4).all(|px| px == [250, 250, 250, 255]));

    let opts = ComposeOpts {
        chroma_key: Some(ChromaKey::default()),
        ..ComposeOpts::default()
    };
    let keyed = compose(fg, bg, &opts).unwrap();
    assert!(keyed.data().chunks_exact(4).all(|px| px == GREEN));
}

#[test]
fn serial_and_parallel_runs_agree() {
    let fg = foreground_rows(33, 41, 2..=9, [120, 30, 200, 140]);
    let bg = Raster::filled(90, 20, [5, 6, 7, 255]).unwrap();
    let serial = ComposeOpts {
        parallel: false,
        ..ComposeOpts::default()
    };
    let a = compose(fg.clone(), bg.clone(), &serial).unwrap();
    let b = compose(fg, bg, &ComposeOpts::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn options_json_defaults_and_overrides() {
    let opts = ComposeOpts::from_reader(&b"{}"[..]).unwrap();
    assert_eq!(opts, ComposeOpts::default());

    let json = br#"{
        "visibility_threshold": 0,
        "chroma_key": { "min_alpha": 200 },
        "align": { "x": "left" },
        "parallel": false
    }"#;
    let opts = ComposeOpts::from_reader(&json[..]).unwrap();
    assert_eq!(opts.visibility_threshold, 0);
    assert_eq!(opts.chroma_key, Some(ChromaKey::strict()));
    assert_eq!(opts.align.x, CropAlignX::Left);
    assert!(!opts.parallel);

    let err = ComposeOpts::from_reader(&br#"{ "paralel": true }"#[..]).unwrap_err();
    assert!(matches!(err, BackdropError::Validation(_)));
}

#[test]
fn sources_and_catalog_produce_png() {
    let mut fg_png = Vec::new();
    image::RgbaImage::from_pixel(6, 4, image::Rgba([0, 0, 0, 0]))
        .write_to(&mut std::io::Cursor::new(&mut fg_png), image::ImageFormat::Png)
        .unwrap();
    let catalog = MemoryCatalog::new(vec![Raster::filled(3, 3, GREEN).unwrap()]).unwrap();

    let encoded =
        compose_from_sources(&ImageBytes(fg_png), &catalog, 7, &ComposeOpts::default()).unwrap();
    assert_eq!(encoded.content_type, "image/png");
    let decoded = image::load_from_memory(&encoded.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (6, 4));
}

#[test]
fn unreadable_source_fails_without_output() {
    let catalog = MemoryCatalog::new(vec![Raster::filled(3, 3, GREEN).unwrap()]).unwrap();
    let err = compose_from_sources(
        &ImageBytes(b"not an image".to_vec()),
        &catalog,
        0,
        &ComposeOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BackdropError::SourceUnavailable(_)));
}
