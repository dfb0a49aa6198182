use super::*;

fn sample() -> Raster {
    let pixels: [[u8; 4]; 8] = [
        [255, 255, 255, 255],
        [241, 241, 241, 120],
        [240, 255, 255, 255],
        [255, 240, 255, 255],
        [255, 255, 240, 255],
        [10, 20, 30, 255],
        [250, 250, 250, 201],
        [250, 250, 250, 200],
    ];
    Raster::new(4, 2, pixels.concat()).unwrap()
}

#[test]
fn keys_only_near_white_pixels() {
    for parallel in [false, true] {
        let before = sample();
        let mut r = before.clone();
        ChromaKey::default().apply(&mut r, parallel);

        for (b, a) in before.data().chunks_exact(4).zip(r.data().chunks_exact(4)) {
            if b[0] > 240 && b[1] > 240 && b[2] > 240 {
                assert_eq!(a[3], 0);
            } else {
                assert_eq!(a[3], b[3]);
            }
            assert_eq!(a[..3], b[..3]);
        }
    }
}

#[test]
fn strict_variant_requires_existing_alpha() {
    let mut r = sample();
    ChromaKey::strict().apply(&mut r, false);
    let alphas: Vec<u8> = r.data().chunks_exact(4).map(|px| px[3]).collect();
    assert_eq!(alphas, vec![0, 120, 255, 255, 255, 255, 0, 200]);
}

#[test]
fn default_uses_240_threshold() {
    let key = ChromaKey::default();
    assert_eq!(key.threshold, 240);
    assert_eq!(key.min_alpha, None);
    assert_eq!(ChromaKey::strict().min_alpha, Some(200));
}

#[test]
fn config_json_fills_defaults() {
    let key: ChromaKey = serde_json::from_str(r#"{ "min_alpha": 200 }"#).unwrap();
    assert_eq!(key, ChromaKey::strict());
    assert!(serde_json::from_str::<ChromaKey>(r#"{ "thresh": 1 }"#).is_err());
}
