//! Field-of-view background normalisation
//!
//! Compares a predicted background cube with observed counts on the same
//! geometry, restricted to pixels free of known sources, and derives one scale
//! factor per energy bin:
//!
//! ```text
//! norm[e] = Σ_pix counts[e, pix] · mask[e, pix] / Σ_pix acceptance[e, pix] · mask[e, pix]
//! ```
//!
//! Bins whose masked acceptance sums to zero yield non-finite factors. They are
//! returned as they are and callers must check for them.

use log::warn;
use ndarray::{Array1, Array3, ArrayView1, ArrayView3, ArrayViewD, Axis};
use shared::geom::MapGeom;
use shared::map::NdMap;

use crate::error::BackgroundError;

/// One scale factor per energy bin
pub type NormalizationVector = Array1<f64>;

/// Normalisation of a predicted background map against observed counts.
///
/// `exclusion_mask` marks pixels to include with `true`. It may have any shape
/// that broadcasts to the cube shape after dropping leading length-1 axes,
/// e.g. a spatial (rows, cols) image or a full (bins, rows, cols) cube. `None`
/// includes every pixel.
///
/// # Errors
///
/// `BackgroundError::ShapeMismatch` when the counts cube differs in shape from
/// the acceptance cube or the mask cannot be broadcast to it.
pub fn fov_background_norm<G: MapGeom>(
    acceptance_map: &NdMap<G>,
    counts_map: &NdMap<G>,
    exclusion_mask: Option<ArrayViewD<'_, bool>>,
) -> Result<NormalizationVector, BackgroundError> {
    fov_background_norm_arrays(acceptance_map.data(), counts_map.data(), exclusion_mask)
}

/// Array form of [`fov_background_norm`] for cubes shaped (bins, rows, cols)
pub fn fov_background_norm_arrays(
    acceptance: ArrayView3<'_, f64>,
    counts: ArrayView3<'_, f64>,
    exclusion_mask: Option<ArrayViewD<'_, bool>>,
) -> Result<NormalizationVector, BackgroundError> {
    if counts.dim() != acceptance.dim() {
        return Err(BackgroundError::ShapeMismatch {
            what: "counts",
            expected: acceptance.shape().to_vec(),
            found: counts.shape().to_vec(),
        });
    }

    let keep = match exclusion_mask {
        Some(mask) => resize_mask(mask, acceptance.dim())?,
        None => Array3::ones(acceptance.dim()),
    };

    // Multiplicative mask: NaN in an excluded pixel still propagates
    let acceptance_sum = masked_plane_sums(acceptance, &keep);
    let counts_sum = masked_plane_sums(counts, &keep);
    let norm = counts_sum / acceptance_sum;

    let degenerate: Vec<usize> = norm
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_finite())
        .map(|(bin, _)| bin)
        .collect();
    if !degenerate.is_empty() {
        warn!("Non-finite background normalisation in energy bins {degenerate:?}");
    }

    Ok(norm)
}

/// Scale every energy plane of a map by its normalisation factor
pub fn apply_normalization<G: MapGeom + Clone>(
    map: &NdMap<G>,
    norm: ArrayView1<'_, f64>,
) -> Result<NdMap<G>, BackgroundError> {
    let data = map.data();
    let nbin = data.len_of(Axis(0));
    if norm.len() != nbin {
        return Err(BackgroundError::ShapeMismatch {
            what: "normalization vector",
            expected: vec![nbin],
            found: vec![norm.len()],
        });
    }

    let factors = norm.insert_axis(Axis(1)).insert_axis(Axis(2));
    let scaled = &data * &factors;
    Ok(NdMap::new(map.geom().clone(), scaled)?)
}

/// Resize a mask to the cube shape as 0/1 weights
fn resize_mask(
    mask: ArrayViewD<'_, bool>,
    shape: (usize, usize, usize),
) -> Result<Array3<f64>, BackgroundError> {
    let mut mask = mask;
    while mask.ndim() > 3 && mask.shape()[0] == 1 {
        mask = mask.index_axis_move(Axis(0), 0);
    }

    let resized = mask
        .broadcast(shape)
        .ok_or_else(|| BackgroundError::ShapeMismatch {
            what: "exclusion mask",
            expected: vec![shape.0, shape.1, shape.2],
            found: mask.shape().to_vec(),
        })?;
    Ok(resized.mapv(|include| if include { 1.0 } else { 0.0 }))
}

fn masked_plane_sums(cube: ArrayView3<'_, f64>, keep: &Array3<f64>) -> Array1<f64> {
    (&cube * keep).sum_axis(Axis(2)).sum_axis(Axis(1))
}
