//! End-to-end tests of the volume frame pipeline against an in-memory grid source.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use proptest::prelude::*;
use volscope::*;

type Remap = fn(f32, f32, f32) -> Vec3;

struct MockVariable {
    info: VariableInfo,
    data: Vec<f32>,
    remap: Option<Remap>,
}

/// Grid source backed by vectors, counting every fetch and release.
struct MockSource {
    variables: Vec<MockVariable>,
    display: DisplayGrid,
    unavailable: RefCell<BTreeSet<usize>>,
    fetches: Cell<usize>,
    releases: Cell<usize>,
}

impl MockSource {
    fn new(display: GridShape) -> Self {
        Self {
            variables: Vec::new(),
            display: DisplayGrid {
                shape: display,
                low_level: 0,
                extent: Extent::default(),
            },
            unavailable: RefCell::new(BTreeSet::new()),
            fetches: Cell::new(0),
            releases: Cell::new(0),
        }
    }

    fn with_constant(mut self, shape: GridShape, value: f32) -> Self {
        self.variables.push(MockVariable {
            info: VariableInfo {
                shape,
                low_level: 0,
                min: 0.0,
                max: 100.0,
            },
            data: vec![value; shape.len()],
            remap: None,
        });
        self
    }

    fn with_resampled(mut self, shape: GridShape, data: Vec<f32>, remap: Remap) -> Self {
        self.variables.push(MockVariable {
            info: VariableInfo {
                shape,
                low_level: 0,
                min: 0.0,
                max: 100.0,
            },
            data,
            remap: Some(remap),
        });
        self
    }

    /// Replaces a variable's native grid with a constant one of a new shape.
    fn reshape(&mut self, variable: usize, shape: GridShape, value: f32) {
        let entry = &mut self.variables[variable];
        entry.info.shape = shape;
        entry.data = vec![value; shape.len()];
    }

    fn set_available(&self, variable: usize, available: bool) {
        let mut unavailable = self.unavailable.borrow_mut();
        if available {
            unavailable.remove(&variable);
        } else {
            unavailable.insert(variable);
        }
    }
}

impl GridSource for MockSource {
    fn fetch_grid(&self, _time: usize, variable: usize) -> Option<Vec<f32>> {
        if self.unavailable.borrow().contains(&variable) {
            return None;
        }
        let data = self.variables.get(variable)?.data.clone();
        self.fetches.set(self.fetches.get() + 1);
        Some(data)
    }

    fn release_grid(&self, _time: usize, _variable: usize, _data: Vec<f32>) {
        self.releases.set(self.releases.get() + 1);
    }

    fn variable_info(&self, variable: usize) -> Option<VariableInfo> {
        self.variables.get(variable).map(|v| v.info)
    }

    fn display_grid(&self) -> DisplayGrid {
        self.display
    }

    fn level_to_height(&self, _time: usize, _variable: usize, level: f32) -> f32 {
        level * 2.0
    }

    fn display_to_native(
        &self,
        _time: usize,
        variable: usize,
        row: f32,
        col: f32,
        level: f32,
    ) -> Vec3 {
        match self.variables.get(variable).and_then(|v| v.remap) {
            Some(remap) => remap(row, col, level),
            None => Vec3::new(row, col, level),
        }
    }

    fn needs_resampling(&self, variable: usize) -> bool {
        self.variables
            .get(variable)
            .is_some_and(|v| v.remap.is_some())
    }
}

fn overhead_view() -> ViewTransform {
    let mut camera = Camera::new(1.0);
    camera.position = Vec3::new(0.0, 0.0, 10.0);
    camera.up = Vec3::Y;
    camera.view_transform(512.0, 512.0)
}

fn east_view() -> ViewTransform {
    let mut camera = Camera::new(1.0);
    camera.position = Vec3::new(10.0, 0.0, 0.0);
    camera.up = Vec3::Z;
    camera.view_transform(512.0, 512.0)
}

fn layers<'a>(table: &'a ColorTable, variables: &[usize]) -> Vec<VolumeLayer<'a>> {
    variables
        .iter()
        .map(|&variable| VolumeLayer {
            variable,
            color_table: table,
        })
        .collect()
}

#[test]
fn test_uniform_grid_end_to_end() {
    let shape = GridShape::new(10, 10, 5);
    let source = MockSource::new(shape).with_constant(shape, 50.0);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);

    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.direction, Direction::BottomToTop);
    assert_eq!(report.entries, 5);
    assert_eq!(report.strips, 45);

    let volume = ctx.volume(0).expect("slot allocated on first use");
    assert_eq!((volume.slices(), volume.rows(), volume.cols()), (5, 10, 10));
    assert!(volume.indices().iter().all(|&i| i == 127));

    assert_eq!(source.fetches.get(), 1);
    assert_eq!(source.releases.get(), 1);
    assert_eq!(sink.blend_mode(), BlendMode::Replace);
}

#[test]
fn test_validity_cache() {
    let shape = GridShape::new(6, 8, 4);
    let source = MockSource::new(shape).with_constant(shape, 10.0);
    let table = ColorTable::default();
    let layers = layers(&table, &[0]);
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 1, "unchanged frame reuses the stack");

    let report = ctx.render_volumes(&source, &layers, 0, &east_view(), &mut sink);
    assert_eq!(report.direction, Direction::WestToEast);
    assert_eq!(source.fetches.get(), 2, "direction change rebuilds");
    assert_eq!(report.entries, 8);

    ctx.render_volumes(&source, &layers, 1, &east_view(), &mut sink);
    assert_eq!(source.fetches.get(), 3, "time change rebuilds");

    ctx.invalidate_volumes();
    ctx.render_volumes(&source, &layers, 1, &east_view(), &mut sink);
    assert_eq!(source.fetches.get(), 4, "explicit invalidation rebuilds");

    assert_eq!(source.fetches.get(), source.releases.get());
}

#[test]
fn test_variable_list_change_invalidates() {
    let shape = GridShape::new(4, 4, 3);
    let source = MockSource::new(shape)
        .with_constant(shape, 10.0)
        .with_constant(shape, 20.0);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 1);

    let both = layers(&table, &[0, 1]);
    ctx.render_volumes(&source, &both, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 3, "both stacks rebuilt");
}

#[test]
fn test_native_shape_change_invalidates() {
    let display = GridShape::new(6, 6, 4);
    let mut source = MockSource::new(display).with_constant(GridShape::new(4, 4, 3), 10.0);
    let table = ColorTable::default();
    let layers = layers(&table, &[0]);
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 1);

    // New values on the same grid are not noticed without another trigger
    source.reshape(0, GridShape::new(4, 4, 3), 90.0);
    ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 1);

    source.reshape(0, GridShape::new(6, 5, 4), 50.0);
    let report = ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(source.fetches.get(), 2, "shape change rebuilds");
    assert_eq!(report.entries, 4);

    let volume = ctx.volume(0).expect("slot");
    assert_eq!((volume.slices(), volume.rows(), volume.cols()), (4, 6, 5));
    assert!(volume.indices().iter().all(|&i| i == 127));
    assert_eq!(source.fetches.get(), source.releases.get());
}

#[test]
fn test_interleaving_of_different_depths() {
    let display = GridShape::new(4, 4, 8);
    let source = MockSource::new(display)
        .with_constant(GridShape::new(4, 4, 4), 10.0)
        .with_constant(GridShape::new(4, 4, 8), 90.0);
    let shallow = ColorTable::from_fn(|_| [255, 0, 0, 100]);
    let deep = ColorTable::from_fn(|_| [0, 0, 255, 100]);
    let layers = [
        VolumeLayer {
            variable: 0,
            color_table: &shallow,
        },
        VolumeLayer {
            variable: 1,
            color_table: &deep,
        },
    ];
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let report = ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.entries, 16);

    // Each slice has 3 strips; layers alternate at every global step
    let colors: Vec<[u8; 4]> = sink
        .strips()
        .iter()
        .step_by(3)
        .map(|s| s.vertices[0].color)
        .collect();
    assert_eq!(colors.len(), 16);
    for (i, color) in colors.iter().enumerate() {
        let expected = if i % 2 == 0 { [255, 0, 0, 100] } else { [0, 0, 255, 100] };
        assert_eq!(*color, expected);
    }

    // The shallow stack advances through its slices 0,0,0,1,1,2,2,3
    let heights: Vec<f32> = sink
        .strips()
        .iter()
        .step_by(6)
        .map(|s| s.vertices[0].position[2])
        .collect();
    assert_eq!(heights, vec![0.0, 0.0, 0.0, 2.0, 2.0, 4.0, 4.0, 6.0]);
}

#[test]
fn test_second_layer_is_jittered_toward_viewer() {
    let shape = GridShape::new(3, 3, 3);
    let source = MockSource::new(shape)
        .with_constant(shape, 10.0)
        .with_constant(shape, 10.0);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();
    let both = layers(&table, &[0, 1]);
    ctx.render_volumes(&source, &both, 0, &overhead_view(), &mut sink);

    let z0 = ctx.volume(0).expect("slot").vertices()[0][2];
    let z1 = ctx.volume(1).expect("slot").vertices()[0][2];
    assert_eq!(z0, 0.0);
    // Layer 1 of 2, default jitter 0.1, level spacing 2
    assert!((z1 - 0.1).abs() < 1e-6);
}

#[test]
fn test_missing_data_skips_only_that_variable() {
    let shape = GridShape::new(4, 4, 3);
    let source = MockSource::new(shape)
        .with_constant(shape, 10.0)
        .with_constant(shape, 20.0);
    source.set_available(0, false);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let layers = layers(&table, &[0, 1]);
    let report = ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert!(!report.is_complete());
    assert!(matches!(
        report.diagnostics[0],
        VolscopeError::DataUnavailable {
            time: 0,
            variable: 0
        }
    ));
    assert_eq!(report.skipped, vec![(0, SkipReason::Invalid)]);
    assert_eq!(report.entries, 3);
    assert!(!ctx.volume(0).expect("slot").is_valid());

    // Data arrives on a later frame
    source.set_available(0, true);
    let report = ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.entries, 6);
    assert_eq!(source.fetches.get(), source.releases.get());
}

#[test]
fn test_single_level_variable_is_disabled() {
    let display = GridShape::new(4, 4, 1);
    let source = MockSource::new(display).with_constant(display, 10.0);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert!(matches!(
        report.diagnostics[0],
        VolscopeError::DegenerateGrid { variable: 0, .. }
    ));
    assert!(ctx.is_disabled(0));
    assert_eq!(report.skipped, vec![(0, SkipReason::NoVolume)]);

    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert!(matches!(
        report.diagnostics[0],
        VolscopeError::VolumeDisabled(0)
    ));
    assert_eq!(source.fetches.get(), 0);
}

#[test]
fn test_resampled_variable() {
    // Native grid at half the display resolution horizontally
    let native = GridShape::new(3, 3, 2);
    let mut data = vec![0.0; native.len()];
    for l in 0..2 {
        for c in 0..3 {
            for r in 0..3 {
                data[native.index(r, c, l)] = (10 * r + 20 * c) as f32;
            }
        }
    }
    let display = GridShape::new(5, 5, 2);
    let source = MockSource::new(display).with_resampled(native, data, |r, c, l| {
        Vec3::new(r * 0.5, c * 0.5, l)
    });
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert!(report.is_complete(), "{report:?}");

    let volume = ctx.volume(0).expect("slot");
    assert_eq!((volume.slices(), volume.rows(), volume.cols()), (2, 5, 5));
    let quantizer = Quantizer::new(0.0, 100.0);
    let slice = volume.slice_indices(0).expect("slice");
    // Display (1, 1) sits at native (0.5, 0.5): 10 * 0.5 + 20 * 0.5
    assert_eq!(slice[5 + 1], quantizer.index(15.0));
    // Display (4, 4) sits on native (2, 2)
    assert_eq!(slice[24], quantizer.index(60.0));
}

#[test]
fn test_resample_beyond_native_rows_is_transparent() {
    let native = GridShape::new(3, 3, 2);
    let display = GridShape::new(4, 3, 2);
    let data = vec![50.0; native.len()];
    let source = MockSource::new(display).with_resampled(native, data, Vec3::new);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    let volume = ctx.volume(0).expect("slot");
    let slice = volume.slice_indices(0).expect("slice");
    // Display row 3 maps to native row 3, one past the last row
    assert!(slice[9..12].iter().all(|&i| i == NO_CONTRIBUTION));
    assert!(slice[..9].iter().all(|&i| i == 127));
}

#[test]
fn test_fast_draw_uses_stride() {
    let shape = GridShape::new(10, 10, 5);
    let source = MockSource::new(shape).with_constant(shape, 50.0);
    let table = ColorTable::default();
    let mut ctx = VolumeContext::default();
    ctx.set_fast_draw(true);
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert_eq!(report.strips, 5 * 4);
    assert!(sink.strips().iter().all(|s| s.vertices.len() == 10));
}

#[test]
fn test_independent_contexts() {
    let shape = GridShape::new(4, 4, 3);
    let source = MockSource::new(shape).with_constant(shape, 10.0);
    let table = ColorTable::default();
    let mut first = VolumeContext::default();
    let mut second = VolumeContext::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    first.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    second.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert_eq!(source.fetches.get(), 2);

    first.release_all();
    assert!(first.volume(0).is_none());
    assert!(second.volume(0).is_some());
}

#[test]
fn test_options_from_json() {
    let options = VolumeOptions::from_json_str(
        r#"{ "direction_strategy": "projected_axes", "fast_draw": true, "interactive_stride": 3 }"#,
    )
    .expect("valid options");
    let mut ctx = VolumeContext::new(options).expect("valid options");
    let shape = GridShape::new(7, 7, 2);
    let source = MockSource::new(shape).with_constant(shape, 10.0);
    let table = ColorTable::default();
    let mut sink = RecordingSink::default();

    let single = layers(&table, &[0]);
    let report = ctx.render_volumes(&source, &single, 0, &overhead_view(), &mut sink);
    assert_eq!(report.direction, Direction::BottomToTop);
    // 6 quad rows / 3 = 2 strips per slice
    assert_eq!(report.strips, 4);

    let text = serde_json::to_string(ctx.options()).expect("serializable");
    assert!(text.contains("\"projected_axes\""));
}

proptest! {
    #[test]
    fn prop_every_variable_spans_the_longest_stack(
        levels in proptest::collection::vec(2usize..7, 1..4),
    ) {
        let deepest = levels.iter().copied().max().unwrap_or(0);
        let mut source = MockSource::new(GridShape::new(3, 3, deepest));
        for &l in &levels {
            source = source.with_constant(GridShape::new(3, 3, l), 40.0);
        }
        let table = ColorTable::default();
        let variables: Vec<usize> = (0..levels.len()).collect();
        let mut ctx = VolumeContext::default();
        let mut sink = RecordingSink::default();

        let layers = layers(&table, &variables);
        let report = ctx.render_volumes(&source, &layers, 0, &overhead_view(), &mut sink);
        prop_assert!(report.is_complete());
        prop_assert_eq!(report.entries, levels.len() * deepest);
        prop_assert_eq!(report.strips, 2 * levels.len() * deepest);
        prop_assert_eq!(source.fetches.get(), source.releases.get());
    }
}
