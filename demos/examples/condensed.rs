// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Condensed: four sources in one viewport, with cell selection and a moving wave.
//!
//! A grid of 300 pixel cells fills the plane. A custom source places dots on
//! a sine wave whose phase the "Phase" buttons shift; the dots glide to their
//! new places without re-rendering. Two strips pinned to the bottom and right
//! edges share the grid's cell size. A long press claims the gesture, after
//! which dragging selects the grid cell under the pointer and re-renders only
//! the old and new selection.
//!
//! Run:
//! - `cargo run -p evergrid_demos --example condensed`

use std::collections::HashMap;
use std::num::NonZeroU64;

use evergrid::layout::{
    Axis, CustomItemLayout, CustomLayoutSource, Edge, FlatLayoutSource, GridLayoutSource,
    LayoutProps, RenderPolicy, ReuseId, Rounding, linear_indices,
};
use evergrid::{
    Animation, Evergrid, EvergridEvent, EvergridOptions, FrameUpdate, ItemIndex, Observable,
    SlotChange, SlotId, SlotKey, SourceId, SpringSpec,
};
use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;

const FRAME_DT: f64 = 1.0 / 60.0;
const DOT_SPACING: f64 = 40.0;

fn spring() -> Animation {
    Animation::Spring(SpringSpec::DEFAULT)
}

/// What a host-side view currently shows.
#[derive(Debug)]
struct CellView {
    key: SlotKey,
    selected: bool,
}

#[derive(Debug)]
struct Condensed {
    view: Evergrid,
    grid: SourceId,
    dots: SourceId,
    phase: Observable<f64>,
    selected: ItemIndex,
    views: HashMap<SlotId, CellView>,
}

impl Condensed {
    fn new() -> Self {
        let mut view = Evergrid::new(
            Size::new(800.0, 600.0),
            EvergridOptions {
                anchor: Vec2::new(0.5, 0.5),
                ..EvergridOptions::default()
            },
        );
        let cell_size = Observable::new(Vec2::new(300.0, 300.0));
        let phase = Observable::new(0.0);

        let grid = view.add_source(GridLayoutSource::new(
            LayoutProps::new(ReuseId("grid")).with_item_size(cell_size.handle()),
        ));

        let wave = phase.handle();
        let dots = view.add_source(CustomLayoutSource::new(
            LayoutProps::new(ReuseId("point"))
                .with_item_size(Vec2::new(20.0, 20.0))
                .with_render_policy(RenderPolicy::Never),
            move |index| {
                let i = index.linear()? as f64;
                let y = (wave.get() + i * 0.2).sin() * 100.0;
                Some(CustomItemLayout::at(Point::new(i * DOT_SPACING, y)))
            },
            |query| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "the viewport keeps query edges within i64"
                )]
                let (first, end) = (
                    (query.x0 / DOT_SPACING).floor() as i64,
                    (query.x1 / DOT_SPACING).ceil() as i64,
                );
                linear_indices(first..end)
            },
        ));

        view.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("B"))
                .with_item_size(cell_size.handle().map(|s| Vec2::new(s.x, 40.0)))
                .with_sticky_edge(Edge::Bottom)
                .with_origin(Vec2::new(0.0, -40.0)),
            Axis::Horizontal,
        ));
        view.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("R"))
                .with_item_size(cell_size.handle().map(|s| Vec2::new(40.0, s.y)))
                .with_sticky_edge(Edge::Right)
                .with_origin(Vec2::new(-40.0, 0.0)),
            Axis::Vertical,
        ));

        Self {
            view,
            grid,
            dots,
            phase,
            selected: ItemIndex::Grid { x: 0, y: 0 },
            views: HashMap::new(),
        }
    }

    fn apply(&mut self, frame: &FrameUpdate) {
        for change in &frame.changes {
            match *change {
                SlotChange::Create { slot, key, .. } => {
                    self.views.insert(
                        slot,
                        CellView {
                            key,
                            selected: false,
                        },
                    );
                }
                SlotChange::Destroy { slot } => {
                    self.views.remove(&slot);
                }
                SlotChange::Rebind { slot, to, .. } => {
                    if let Some(view) = self.views.get_mut(&slot) {
                        view.key = to;
                    }
                }
                SlotChange::Render { slot, key } => {
                    let selected = key.source == self.grid && key.index == self.selected;
                    if let Some(view) = self.views.get_mut(&slot) {
                        view.key = key;
                        view.selected = selected;
                    }
                }
                SlotChange::Hide { .. } | SlotChange::Show { .. } => {}
            }
        }
    }

    fn step(&mut self) -> FrameUpdate {
        let frame = self.view.update(FRAME_DT);
        self.apply(&frame);
        frame
    }

    fn settle(&mut self) -> usize {
        let mut frames = 0;
        loop {
            let frame = self.step();
            frames += 1;
            if !frame.animating || frames >= 10_000 {
                return frames;
            }
        }
    }

    /// Selects the grid cell under a screen point; returns whether it changed.
    fn select_at(&mut self, screen: Point) -> bool {
        if self.view.is_panning_content() {
            return false;
        }
        let container = self.view.transform_point_from_screen_to_container(screen);
        let Ok(location) = self.view.location_in_source(self.grid, container) else {
            return false;
        };
        let Some(index) = self
            .view
            .source_as::<GridLayoutSource>(self.grid)
            .and_then(|grid| grid.grid_index(location, Rounding::Floor))
        else {
            return false;
        };
        if index == self.selected {
            return false;
        }
        let previous = core::mem::replace(&mut self.selected, index);
        tracing::debug!(%previous, selected = %index, "selected grid cell");
        self.view.set_item_needs_render(self.grid, previous);
        self.view.set_item_needs_render(self.grid, index);
        true
    }

    /// The "Phase" buttons.
    fn offset_phase(&mut self, delta: f64) {
        self.phase.update(|phase| *phase += delta);
        if let Some(dots) = self.view.source_as_mut::<CustomLayoutSource>(self.dots) {
            dots.invalidate();
        }
        self.view
            .update_items(self.dots, Some(spring()))
            .expect("the dot source is registered");
    }

    /// The "Scale" buttons.
    fn apply_scale(&mut self, factor: f64) {
        let target = self.view.scale() * factor;
        self.view
            .animate_scale(target, spring())
            .expect("scaling by 1.6 keeps the scale valid");
    }

    fn report(&self, title: &str, frame: &FrameUpdate) {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for item in &frame.items {
            *counts.entry(item.reuse_id.0).or_default() += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_unstable();
        let selected = self
            .views
            .values()
            .filter(|view| view.selected)
            .map(|view| view.key.index.to_string())
            .collect::<Vec<_>>();
        println!("{title}");
        println!("  on screen: {counts:?}");
        println!(
            "  {} rendered, {} moving, selected view {selected:?}",
            frame.renders().count(),
            frame.items.iter().filter(|item| item.transitioning).count(),
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut demo = Condensed::new();
    let frame = demo.view.update(0.0);
    demo.apply(&frame);
    demo.report("opened", &frame);

    // Long press, then drag across cells to move the selection.
    let finger = NonZeroU64::new(1).expect("pointer ids are non-zero");
    let start = Point::new(420.0, 320.0);
    demo.view.pointer_down(finger, start, 0);
    for event in demo.view.poll(600) {
        if let EvergridEvent::LongPress { .. } = event {
            demo.view.prevent_default_pan();
            demo.select_at(start);
        }
    }
    let mut now = 600;
    for step in 1..=8 {
        now += 16;
        let position = start + Vec2::new(40.0 * f64::from(step), 0.0);
        for event in demo.view.pointer_move(finger, position, now) {
            if let EvergridEvent::CustomMove { position, .. } = event {
                if demo.select_at(position) {
                    let frame = demo.step();
                    demo.report(&format!("dragged to x = {}", position.x), &frame);
                }
            }
        }
    }
    demo.view.pointer_up(finger, start + Vec2::new(320.0, 0.0), now);

    // Shift the wave both ways.
    for delta in [1.0, -1.0] {
        demo.offset_phase(delta);
        let frame = demo.step();
        demo.report(&format!("phase {delta:+}"), &frame);
        let frames = demo.settle();
        println!("  the wave settled after {frames} frames");
    }

    // Zoom in and back out.
    for (label, factor) in [("scale +", 1.6), ("scale -", 1.0 / 1.6)] {
        demo.apply_scale(factor);
        demo.settle();
        let frame = demo.step();
        demo.report(&format!("{label}: {:.3}", demo.view.scale().x), &frame);
    }
    tracing::info!(views = demo.views.len(), "condensed walkthrough finished");
}
