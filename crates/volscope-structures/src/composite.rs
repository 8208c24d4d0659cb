//! Back-to-front compositing of interleaved slice stacks.

use volscope_render::{BlendMode, ColorTable, StripSink, StripVertex};

use crate::interleave::SliceRef;
use crate::volume::Volume;

/// What the compositor draws for one displayed layer.
#[derive(Debug, Clone, Copy)]
pub struct CompositeLayer<'a> {
    /// Slice stack of the layer, if one is allocated.
    pub volume: Option<&'a Volume>,
    /// Color table the layer's indices are looked up in.
    pub color_table: &'a ColorTable,
}

/// Why a draw-order entry produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry names a layer that is not in the layer list.
    UnknownLayer,
    /// The layer has no volume slot.
    NoVolume,
    /// The stack does not match the current frame.
    Invalid,
    /// The stack has no slices.
    Empty,
    /// The local slice index lies past the end of the stack.
    SliceOutOfRange,
}

/// Outcome of one compositing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Draw-order entries that were drawn.
    pub entries: usize,
    /// Quad strips submitted to the sink.
    pub strips: usize,
    /// Skipped entries as `(layer, reason)`, one per layer, first reason seen.
    pub skipped: Vec<(usize, SkipReason)>,
}

impl CompositeStats {
    /// Whether every entry was drawn.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, layer: usize, reason: SkipReason) {
        if !self.skipped.iter().any(|&(l, _)| l == layer) {
            self.skipped.push((layer, reason));
        }
    }
}

/// Draws the slices listed in `order` into `sink`, in order.
///
/// Each slice of `rows` vertex rows yields `(rows - 1) / stride` quad strips
/// of `(cols - 1) / stride + 1` vertex pairs. Strips are drawn with alpha
/// blending, and the sink's previous blend mode is restored afterward.
/// Entries that cannot be drawn are skipped and the pass continues.
pub fn composite(
    order: &[SliceRef],
    layers: &[CompositeLayer<'_>],
    stride: usize,
    sink: &mut dyn StripSink,
) -> CompositeStats {
    let stride = stride.max(1);
    let mut stats = CompositeStats::default();
    let mut strip = Vec::new();

    let saved = sink.blend_mode();
    sink.set_blend_mode(BlendMode::AlphaOver);

    for entry in order {
        let Some(layer) = layers.get(entry.layer) else {
            stats.skip(entry.layer, SkipReason::UnknownLayer);
            continue;
        };
        let volume = match check_volume(layer.volume, entry.slice) {
            Ok(volume) => volume,
            Err(reason) => {
                stats.skip(entry.layer, reason);
                continue;
            }
        };
        let (Some(positions), Some(indices)) = (
            volume.slice_vertices(entry.slice),
            volume.slice_indices(entry.slice),
        ) else {
            stats.skip(entry.layer, SkipReason::SliceOutOfRange);
            continue;
        };

        let cols = volume.cols();
        let strips = volume.rows().saturating_sub(1) / stride;
        let pairs = if cols == 0 { 0 } else { (cols - 1) / stride + 1 };
        for i in 0..strips {
            let upper = i * stride * cols;
            let lower = upper + stride * cols;
            strip.clear();
            for j in 0..pairs {
                let c = j * stride;
                for at in [upper + c, lower + c] {
                    strip.push(StripVertex {
                        position: positions[at],
                        color: layer.color_table.get(indices[at]),
                    });
                }
            }
            sink.draw_quad_strip(&strip);
        }
        stats.strips += strips;
        stats.entries += 1;
    }

    sink.set_blend_mode(saved);
    stats
}

fn check_volume(volume: Option<&Volume>, slice: usize) -> Result<&Volume, SkipReason> {
    let volume = volume.ok_or(SkipReason::NoVolume)?;
    if !volume.is_valid() {
        return Err(SkipReason::Invalid);
    }
    if volume.slices() == 0 {
        return Err(SkipReason::Empty);
    }
    if slice >= volume.slices() {
        return Err(SkipReason::SliceOutOfRange);
    }
    Ok(volume)
}
