//! Merging of several slice stacks into one back-to-front draw order.
//!
//! Stacks of different depths are stretched onto the deepest one: at every
//! global step each layer contributes the local slice lying at the same
//! relative depth, so all layers advance from their far end to their near
//! end together.

/// One entry of the global draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRef {
    /// Slice index within the layer's own stack.
    pub slice: usize,
    /// Position of the layer in the displayed-layer list.
    pub layer: usize,
}

/// Builds the global draw order for layers with the given slice counts.
///
/// The result has `slice_counts.len() * max(slice_counts)` entries. Step `g`
/// maps to local slice `g * (s - 1) / (L - 1)` (floored, clamped to `s - 1`)
/// of a layer with `s` slices, so the first and last steps hit both ends of
/// every stack. Layers with no slices are pinned to index 0; the compositor
/// skips them.
#[must_use]
pub fn interleave(slice_counts: &[usize]) -> Vec<SliceRef> {
    let largest = slice_counts.iter().copied().max().unwrap_or(0);
    let mut order = Vec::with_capacity(slice_counts.len() * largest);
    let span = largest.saturating_sub(1);

    for step in 0..largest {
        for (layer, &count) in slice_counts.iter().enumerate() {
            let last = count.saturating_sub(1);
            let slice = if span == 0 {
                0
            } else {
                (step * last / span).min(last)
            };
            order.push(SliceRef { slice, layer });
        }
    }
    order
}
