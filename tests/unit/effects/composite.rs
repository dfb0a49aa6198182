use super::*;

fn gradient(w: u32, h: u32, alpha: u8) -> Raster {
    let mut r = Raster::transparent(w, h).unwrap();
    for (i, px) in r.data_mut().chunks_exact_mut(4).enumerate() {
        let i = i as u32;
        px.copy_from_slice(&[(i * 7) as u8, (i * 13) as u8, (i * 29) as u8, alpha]);
    }
    r
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_on_opaque_mixes_evenly() {
    let dst = [0, 0, 0, 255];
    let src = [255, 255, 255, 128];
    let out = over(dst, src);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[1], out[0]);
}

#[test]
fn over_semitransparent_pair_accumulates_alpha() {
    // 0.502 + 0.502 * 0.498 = 0.752
    let out = over([0, 0, 255, 128], [255, 0, 0, 128]);
    assert_eq!(out[3], 192);
    assert!(out[0] > out[2]);
}

#[test]
fn transparent_foreground_reproduces_background() {
    let bg = gradient(9, 5, 255);
    let fg = gradient(9, 5, 0);
    for parallel in [false, true] {
        let out = composite_over(bg.clone(), &fg, parallel).unwrap();
        assert_eq!(out, bg);
    }
}

#[test]
fn opaque_foreground_reproduces_foreground() {
    let bg = gradient(9, 5, 77);
    let mut fg = Raster::filled(9, 5, [3, 4, 5, 255]).unwrap();
    fg.data_mut()[0] = 99;
    for parallel in [false, true] {
        let out = composite_over(bg.clone(), &fg, parallel).unwrap();
        assert_eq!(out, fg);
    }
}

#[test]
fn parallel_and_serial_agree() {
    let bg = gradient(31, 17, 200);
    let fg = gradient(31, 17, 90);
    let a = composite_over(bg.clone(), &fg, false).unwrap();
    let b = composite_over(bg, &fg, true).unwrap();
    assert_eq!(a, b);
}

#[test]
fn size_mismatch_is_rejected() {
    let bg = Raster::transparent(4, 4).unwrap();
    let fg = Raster::transparent(4, 5).unwrap();
    assert!(matches!(
        composite_over(bg, &fg, false),
        Err(BackdropError::InvalidDimensions(_))
    ));
}
