use rayon::prelude::*;

use crate::foundation::core::{CHROMA_KEY_THRESHOLD, Raster, STRICT_KEY_MIN_ALPHA};

/// Near-white chroma key: zero the alpha of pixels whose r, g and b all exceed `threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChromaKey {
    pub threshold: u8,
    /// Strict variant: only key pixels whose alpha already exceeds this value.
    pub min_alpha: Option<u8>,
}

impl Default for ChromaKey {
    fn default() -> Self {
        Self {
            threshold: CHROMA_KEY_THRESHOLD,
            min_alpha: None,
        }
    }
}

impl ChromaKey {
    pub fn strict() -> Self {
        Self {
            min_alpha: Some(STRICT_KEY_MIN_ALPHA),
            ..Self::default()
        }
    }

    pub fn matches(&self, px: &[u8]) -> bool {
        let t = self.threshold;
        px[0] > t && px[1] > t && px[2] > t && self.min_alpha.is_none_or(|min| px[3] > min)
    }

    /// Rewrite alpha in place. Pixels are independent, so rows are keyed in parallel on request.
    #[tracing::instrument(skip(raster), fields(size = ?raster.dimensions()))]
    pub fn apply(&self, raster: &mut Raster, parallel: bool) {
        let key = |px: &mut [u8]| {
            if self.matches(px) {
                px[3] = 0;
            }
        };
        if parallel {
            let stride = raster.stride();
            raster
                .data_mut()
                .par_chunks_exact_mut(stride)
                .for_each(|row| row.chunks_exact_mut(4).for_each(key));
        } else {
            raster.data_mut().chunks_exact_mut(4).for_each(key);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chroma_key.rs"]
mod tests;
