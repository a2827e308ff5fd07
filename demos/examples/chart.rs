// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart: a sine wave over a pannable, zoomable coordinate plane.
//!
//! Seven sources share one viewport with a flipped y axis (50 pixels per unit):
//! - grid lines pinned to the top and left edges that never re-render,
//! - the data points, placed by a custom source,
//! - axis backgrounds that stay put at the bottom and right,
//! - tick labels pinned to those axes and re-rendered as they scroll.
//!
//! Run:
//! - `cargo run -p evergrid_demos --example chart`

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::num::NonZeroU64;

use evergrid::layout::{
    Axis, CustomItemLayout, CustomLayoutSource, Dimension, Edge, FlatLayoutSource, ItemIndex,
    LayoutProps, RenderPolicy, ReuseId, ViewLayout, linear_indices,
};
use evergrid::{
    Animation, Evergrid, EvergridEvent, EvergridOptions, FrameUpdate, SourceId, SpringSpec,
};
use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;

const FRAME_DT: f64 = 1.0 / 60.0;
const AXIS_HEIGHT: f64 = 38.0;
const AXIS_WIDTH: f64 = 60.0;

fn sample(i: i64) -> Point {
    let x = i as f64;
    Point::new(x, (x * PI * 0.1).sin() * 2.0)
}

/// Sources by the name the host draws them under.
#[derive(Debug)]
struct Chart {
    names: BTreeMap<SourceId, &'static str>,
    points: SourceId,
}

impl Chart {
    fn build(chart: &mut Evergrid) -> Self {
        let mut names = BTreeMap::new();
        let unit = Vec2::new(1.0, 1.0);

        let vertical_lines = chart.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("vertical-line"))
                .with_item_size(unit)
                .with_sticky_edge(Edge::Top)
                .with_render_policy(RenderPolicy::Never)
                .with_view_layout(|_, _| ViewLayout {
                    height: Some(Dimension::FULL),
                    ..ViewLayout::default()
                }),
            Axis::Horizontal,
        ));
        names.insert(vertical_lines, "vertical grid");

        let horizontal_lines = chart.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("horizontal-line"))
                .with_item_size(unit)
                .with_sticky_edge(Edge::Left)
                .with_render_policy(RenderPolicy::Never)
                .with_view_layout(|_, _| ViewLayout {
                    width: Some(Dimension::FULL),
                    ..ViewLayout::default()
                }),
            Axis::Vertical,
        ));
        names.insert(horizontal_lines, "horizontal grid");

        let points = chart.add_source(CustomLayoutSource::new(
            LayoutProps::new(ReuseId("point"))
                .with_item_size(Vec2::new(0.3, 0.3))
                .with_item_origin(Vec2::new(0.5, 0.5)),
            |index| Some(CustomItemLayout::at(sample(index.linear()?))),
            |query| linear_indices(query.x0.floor() as i64..query.x1.ceil() as i64 + 1),
        ));
        names.insert(points, "points");

        let bottom_axis = chart.add_source(CustomLayoutSource::new(
            LayoutProps::new(ReuseId("axis")).with_view_layout(|_, _| ViewLayout {
                x: Some(Dimension::px(0.0)),
                y: Some(Dimension::relative(1.0, -AXIS_HEIGHT)),
                width: Some(Dimension::FULL),
                height: Some(Dimension::px(AXIS_HEIGHT)),
            }),
            |_| Some(CustomItemLayout::at(Point::ZERO)),
            |_| linear_indices(0..1),
        ));
        names.insert(bottom_axis, "bottom axis");

        let bottom_ticks = chart.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("x-tick"))
                .with_item_size(unit)
                .with_sticky_edge(Edge::Bottom)
                .with_origin(Vec2::new(0.0, -AXIS_HEIGHT))
                .with_view_layout(|_, _| ViewLayout {
                    width: Some(Dimension::px(AXIS_WIDTH)),
                    height: Some(Dimension::px(AXIS_HEIGHT)),
                    ..ViewLayout::default()
                }),
            Axis::Horizontal,
        ));
        names.insert(bottom_ticks, "x ticks");

        let right_axis = chart.add_source(CustomLayoutSource::new(
            LayoutProps::new(ReuseId("axis")).with_view_layout(|_, _| ViewLayout {
                x: Some(Dimension::relative(1.0, -AXIS_WIDTH)),
                y: Some(Dimension::px(0.0)),
                width: Some(Dimension::px(AXIS_WIDTH)),
                height: Some(Dimension::FULL),
            }),
            |_| Some(CustomItemLayout::at(Point::ZERO)),
            |_| linear_indices(0..1),
        ));
        names.insert(right_axis, "right axis");

        let right_ticks = chart.add_source(FlatLayoutSource::new(
            LayoutProps::new(ReuseId("y-tick"))
                .with_item_size(unit)
                .with_sticky_edge(Edge::Right)
                .with_item_origin(Vec2::new(1.0, 0.5))
                .with_view_layout(|_, _| ViewLayout {
                    x: Some(Dimension::relative(1.0, -AXIS_WIDTH)),
                    width: Some(Dimension::px(AXIS_WIDTH)),
                    ..ViewLayout::default()
                }),
            Axis::Vertical,
        ));
        names.insert(right_ticks, "y ticks");

        Self { names, points }
    }

    fn name(&self, source: SourceId) -> &'static str {
        self.names.get(&source).copied().unwrap_or("?")
    }

    /// Counts items and renders per source.
    fn report(&self, title: &str, frame: &FrameUpdate) {
        let mut items: BTreeMap<&str, usize> = BTreeMap::new();
        for item in &frame.items {
            *items.entry(self.name(item.key.source)).or_default() += 1;
        }
        let mut renders: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (_, key) in frame.renders() {
            renders
                .entry(self.name(key.source))
                .or_default()
                .push(key.index.to_string());
        }
        println!("{title}");
        for (name, count) in &items {
            let rendered = renders.get(name).map_or(0, Vec::len);
            println!("  {name:>16}: {count:>3} on screen, {rendered:>3} rendered");
        }
        if let Some(labels) = renders.get("x ticks") {
            println!("  new x labels: {}", labels.join(" "));
        }
    }
}

/// Updates until nothing animates, reporting the last frame.
fn settle(chart: &mut Evergrid, layout: &Chart, title: &str) {
    let mut frames = 0;
    loop {
        let frame = chart.update(FRAME_DT);
        frames += 1;
        if !frame.animating || frames >= 10_000 {
            layout.report(&format!("{title} ({frames} frames)"), &frame);
            return;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut chart = Evergrid::new(
        Size::new(800.0, 500.0),
        EvergridOptions {
            anchor: Vec2::new(0.5, 0.5),
            scale: Vec2::new(50.0, -50.0),
            ..EvergridOptions::default()
        },
    );
    let layout = Chart::build(&mut chart);
    layout.report("opened at the origin", &chart.update(0.0));

    // Drag the plane 200 pixels to the left: four units of x scroll by.
    let finger = NonZeroU64::new(1).expect("pointer ids are non-zero");
    chart.pointer_down(finger, Point::new(600.0, 250.0), 0);
    chart.pointer_move(finger, Point::new(500.0, 250.0), 50);
    chart.pointer_move(finger, Point::new(400.0, 250.0), 2_000);
    chart.pointer_up(finger, Point::new(400.0, 250.0), 2_000);
    println!("dragged to {:?}", chart.offset());
    settle(&mut chart, &layout, "after the drag");

    // Long press the peak of the wave at x = 5.
    let peak = chart.transform_point_from_content_to_container(sample(5));
    chart.pointer_down(finger, peak, 3_000);
    for event in chart.poll(3_600) {
        if let EvergridEvent::LongPress { location, item, .. } = event {
            let on_point = item.is_some_and(|key| key.source == layout.points);
            println!(
                "long press at ({:.2}, {:.2}) hit {}",
                location.x,
                location.y,
                item.filter(|_| on_point)
                    .map_or_else(|| "nothing".to_string(), |key| format!("point {}", key.index)),
            );
        }
    }
    chart.pointer_up(finger, peak, 3_700);

    // The "Origin" button.
    chart.scroll_to(Point::ZERO, Some(Animation::Spring(SpringSpec::DEFAULT)));
    settle(&mut chart, &layout, "back at the origin");

    // Zoom out so more of the wave fits.
    let target = chart.scale() / 2.0;
    chart
        .animate_scale(target, Animation::Spring(SpringSpec::DEFAULT))
        .expect("halving the scale keeps it valid");
    settle(&mut chart, &layout, "zoomed out");

    let first = chart
        .item_frame(layout.points, ItemIndex::Linear(0))
        .expect("point 0 exists");
    tracing::info!(?first, "point 0 frame");
}
