//! Per-display volume state and the frame pipeline.

use std::collections::{BTreeMap, BTreeSet};

use volscope_core::{
    Direction, DisplayGrid, GridLease, GridShape, GridSource, Quantizer, Result, VariableInfo,
    VolscopeError, VolumeOptions,
};
use volscope_render::{ColorTable, StripSink, ViewTransform};
use volscope_structures::{
    build_slices, composite, interleave, jitter_fraction, level_heights, CompositeLayer,
    DirectSampler, Sampler, SliceFrame, TrilinearSampler, Volume,
};

use crate::report::FrameReport;

/// One variable shown as a translucent volume.
#[derive(Debug, Clone, Copy)]
pub struct VolumeLayer<'a> {
    /// Variable index in the grid source.
    pub variable: usize,
    /// Color table applied to the variable's quantized values.
    pub color_table: &'a ColorTable,
}

/// Inputs that, when changed, make every cached slice stack stale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameKey {
    time: usize,
    variables: Vec<usize>,
    shapes: Vec<Option<GridShape>>,
}

/// Where a layer's geometry is built this frame.
#[derive(Debug, Clone, Copy)]
struct BuildPlan {
    variable: usize,
    info: VariableInfo,
    shape: GridShape,
    low_level: i32,
    resample: bool,
}

/// Volume slots and cache state of one display.
///
/// Several contexts may coexist; each owns its slots and remembers what the
/// previous frame was built from.
#[derive(Debug)]
pub struct VolumeContext {
    options: VolumeOptions,
    volumes: BTreeMap<usize, Volume>,
    disabled: BTreeSet<usize>,
    previous: Option<FrameKey>,
    last_direction: Option<Direction>,
}

impl Default for VolumeContext {
    fn default() -> Self {
        Self::with_checked_options(VolumeOptions::default())
    }
}

impl VolumeContext {
    /// Creates a context with no volume slots.
    ///
    /// Fails with [`VolscopeError::InvalidOption`] if `options` does not validate.
    pub fn new(options: VolumeOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::with_checked_options(options))
    }

    fn with_checked_options(options: VolumeOptions) -> Self {
        Self {
            options,
            volumes: BTreeMap::new(),
            disabled: BTreeSet::new(),
            previous: None,
            last_direction: None,
        }
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &VolumeOptions {
        &self.options
    }

    /// Replaces the options. Stacks are rebuilt on the next frame.
    ///
    /// Invalid options are rejected and the current ones stay in effect.
    pub fn set_options(&mut self, options: VolumeOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        self.invalidate_volumes();
        Ok(())
    }

    /// Switches between full-resolution and strided compositing.
    pub fn set_fast_draw(&mut self, fast_draw: bool) {
        self.options.fast_draw = fast_draw;
    }

    /// Slot of a variable, if allocated and enabled.
    #[must_use]
    pub fn volume(&self, variable: usize) -> Option<&Volume> {
        if self.disabled.contains(&variable) {
            return None;
        }
        self.volumes.get(&variable)
    }

    /// Whether volume rendering was disabled for a variable.
    #[must_use]
    pub fn is_disabled(&self, variable: usize) -> bool {
        self.disabled.contains(&variable)
    }

    /// Reserves buffers able to hold a grid of the given dimensions.
    ///
    /// An existing slot only grows. On failure the slot is disabled until it
    /// is allocated again successfully or released.
    pub fn allocate_volume_slot(
        &mut self,
        variable: usize,
        max_rows: usize,
        max_cols: usize,
        max_levels: usize,
    ) -> Result<()> {
        let shape = GridShape::new(max_rows, max_cols, max_levels);
        let result = self.try_allocate(variable, shape);
        match &result {
            Ok(()) => {
                if self.disabled.remove(&variable) {
                    log::info!("volume rendering re-enabled for variable {variable}");
                }
            }
            Err(err) => {
                log::warn!("{err}; volume rendering disabled for variable {variable}");
                self.volumes.remove(&variable);
                self.disabled.insert(variable);
            }
        }
        result
    }

    fn try_allocate(&mut self, variable: usize, shape: GridShape) -> Result<()> {
        if shape.levels < self.options.min_levels {
            return Err(VolscopeError::DegenerateGrid {
                variable,
                levels: shape.levels,
                required: self.options.min_levels,
            });
        }
        if let Some(volume) = self.volumes.get_mut(&variable) {
            return volume.ensure_capacity(shape);
        }
        let volume = Volume::allocate(variable, shape)?;
        log::info!(
            "allocated volume for variable {variable} ({} bytes)",
            Volume::bytes_for(shape)
        );
        self.volumes.insert(variable, volume);
        Ok(())
    }

    /// Frees a variable's slot and clears its disabled state.
    pub fn release_volume_slot(&mut self, variable: usize) -> Result<()> {
        let was_disabled = self.disabled.remove(&variable);
        match self.volumes.remove(&variable) {
            Some(_) => {
                log::info!("released volume for variable {variable}");
                Ok(())
            }
            None if was_disabled => Ok(()),
            None => Err(VolscopeError::VolumeNotAllocated(variable)),
        }
    }

    /// Frees every slot.
    pub fn release_all(&mut self) {
        if !self.volumes.is_empty() {
            log::info!("released {} volume(s)", self.volumes.len());
        }
        self.volumes.clear();
        self.disabled.clear();
        self.previous = None;
        self.last_direction = None;
    }

    /// Forces every stack to be rebuilt on the next frame.
    pub fn invalidate_volumes(&mut self) {
        for volume in self.volumes.values_mut() {
            volume.invalidate();
        }
    }

    /// Draws the given layers as translucent volumes.
    ///
    /// Selects the slicing direction, rebuilds the stacks that are stale,
    /// interleaves them and composites the result into `sink`. Problems with
    /// one layer are recorded in the report and never stop the others.
    pub fn render_volumes<S: GridSource + ?Sized>(
        &mut self,
        source: &S,
        layers: &[VolumeLayer<'_>],
        time: usize,
        view: &ViewTransform,
        sink: &mut dyn StripSink,
    ) -> FrameReport {
        let direction = view.select_direction(self.options.direction_strategy);
        if self.last_direction != Some(direction) {
            log::debug!("slicing direction is now {direction}");
            self.last_direction = Some(direction);
        }
        let mut report = FrameReport::new(direction);

        let layers = unique_layers(layers);
        let infos: Vec<Option<VariableInfo>> = layers
            .iter()
            .map(|l| source.variable_info(l.variable))
            .collect();
        self.check_frame_key(time, &layers, &infos);

        let display = source.display_grid();
        let mut slice_counts = Vec::with_capacity(layers.len());
        for (index, (layer, info)) in layers.iter().zip(&infos).enumerate() {
            let Some(info) = *info else {
                report.diagnostics.push(VolscopeError::UnknownVariable(layer.variable));
                slice_counts.push(0);
                continue;
            };
            let plan = build_plan(source, layer.variable, info, &display);
            slice_counts.push(direction.slice_count(plan.shape));

            let jitter = jitter_fraction(index, layers.len(), self.options.depth_jitter);
            if let Err(err) = self.prepare(source, time, direction, &plan, &display, jitter) {
                report.diagnostics.push(err);
            }
        }

        let order = interleave(&slice_counts);
        let composite_layers: Vec<CompositeLayer<'_>> = layers
            .iter()
            .map(|layer| CompositeLayer {
                volume: self.volume(layer.variable),
                color_table: layer.color_table,
            })
            .collect();
        let stride = self.options.effective_stride();
        let stats = composite(&order, &composite_layers, stride, sink);

        report.entries = stats.entries;
        report.strips = stats.strips;
        for (index, reason) in stats.skipped {
            let variable = layers.get(index).map_or(index, |l| l.variable);
            log::debug!("variable {variable} skipped while compositing: {reason:?}");
            report.skipped.push((variable, reason));
        }
        report
    }

    /// Invalidates every stack when time, variable list or grid shapes change.
    fn check_frame_key(
        &mut self,
        time: usize,
        layers: &[VolumeLayer<'_>],
        infos: &[Option<VariableInfo>],
    ) {
        let key = FrameKey {
            time,
            variables: layers.iter().map(|l| l.variable).collect(),
            shapes: infos.iter().map(|i| i.map(|i| i.shape)).collect(),
        };
        if self.previous.as_ref() != Some(&key) {
            if self.previous.is_some() {
                log::debug!(
                    "frame inputs changed, invalidating {} volume(s)",
                    self.volumes.len()
                );
            }
            self.invalidate_volumes();
            self.previous = Some(key);
        }
    }

    /// Makes sure a layer's slot exists and its stack matches `direction`.
    fn prepare<S: GridSource + ?Sized>(
        &mut self,
        source: &S,
        time: usize,
        direction: Direction,
        plan: &BuildPlan,
        display: &DisplayGrid,
        jitter: f32,
    ) -> Result<()> {
        let variable = plan.variable;
        if self.disabled.contains(&variable) {
            return Err(VolscopeError::VolumeDisabled(variable));
        }
        if !self.volumes.contains_key(&variable) {
            let max = plan.info.shape.max(display.shape);
            self.allocate_volume_slot(variable, max.rows, max.cols, max.levels)?;
        }
        let Some(volume) = self.volumes.get_mut(&variable) else {
            return Err(VolscopeError::VolumeNotAllocated(variable));
        };
        if !volume.needs_rebuild(direction) {
            return Ok(());
        }

        let Some(lease) = GridLease::acquire(source, time, variable) else {
            volume.invalidate();
            log::warn!("no data for variable {variable} at time step {time}");
            return Err(VolscopeError::DataUnavailable { time, variable });
        };
        let heights = level_heights(source, time, variable, plan.shape.levels, plan.low_level);
        let frame = SliceFrame {
            extent: display.extent,
            heights: &heights,
            jitter,
        };
        let quantizer = Quantizer::new(plan.info.min, plan.info.max);

        let mut build = |sampler: &dyn Sampler| {
            build_slices(volume, direction, plan.shape, &frame, sampler, &quantizer)
        };
        let built = if plan.resample {
            let remap = |row: f32, col: f32, level: f32| {
                source.display_to_native(time, variable, row, col, level)
            };
            TrilinearSampler::new(lease.data(), plan.info.shape, remap)
                .and_then(|sampler| build(&sampler))
        } else {
            DirectSampler::new(lease.data(), plan.info.shape)
                .and_then(|sampler| build(&sampler))
        };

        if let Err(err) = built {
            volume.invalidate();
            if matches!(err, VolscopeError::OutOfMemory { .. }) {
                log::warn!("{err}; volume rendering disabled for variable {variable}");
                self.volumes.remove(&variable);
                self.disabled.insert(variable);
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Drops repeated variables, keeping the first occurrence.
fn unique_layers<'a>(layers: &[VolumeLayer<'a>]) -> Vec<VolumeLayer<'a>> {
    let mut seen = BTreeSet::new();
    layers
        .iter()
        .filter(|layer| {
            let first = seen.insert(layer.variable);
            if !first {
                log::warn!("variable {} listed twice, drawing it once", layer.variable);
            }
            first
        })
        .copied()
        .collect()
}

fn build_plan<S: GridSource + ?Sized>(
    source: &S,
    variable: usize,
    info: VariableInfo,
    display: &DisplayGrid,
) -> BuildPlan {
    let resample = source.needs_resampling(variable);
    let (shape, low_level) = if resample {
        (display.shape, display.low_level)
    } else {
        (info.shape, info.low_level)
    };
    BuildPlan {
        variable,
        info,
        shape,
        low_level,
        resample,
    }
}
