/// Norms below this are treated as zero.
pub(crate) const MIN_NORM: f32 = 1e-12;

/// In-place L2 normalization. Vectors whose norm is below [`MIN_NORM`] or not
/// finite are zero-filled instead. Returns `true` when the vector now has unit norm.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) -> bool {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    let norm = norm_sq.sqrt();
    if !norm.is_finite() || norm < MIN_NORM {
        v.fill(0.0);
        return false;
    }
    let inv_norm = norm.recip();
    for x in v.iter_mut() {
        *x *= inv_norm;
    }
    true
}

#[cfg(test)]
pub(crate) fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
