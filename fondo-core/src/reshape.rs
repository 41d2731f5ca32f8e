/// Partition `tokens` into consecutive, non-overlapping rows of `width`.
///
/// Order is preserved. A trailing chunk shorter than `width` is dropped, so
/// every returned row holds exactly `width` tokens; call sites that need the
/// tail must pad the input themselves. Dropping (rather than padding) is the
/// convention throughout the workspace.
///
/// `width == 0` yields no rows. Runs in linear time over the input.
pub fn rows<T>(tokens: Vec<T>, width: usize) -> Vec<Vec<T>> {
    if width == 0 {
        return Vec::new();
    }
    let full = tokens.len() / width;
    let mut out = Vec::with_capacity(full);
    let mut it = tokens.into_iter();
    for _ in 0..full {
        out.push(it.by_ref().take(width).collect());
    }
    out
}
