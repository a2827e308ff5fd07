// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Photo gallery: an endless grid of 300 pixel cells, flung and zoomed.
//!
//! The host keeps one "photo view" per slot and fades photos in when they are
//! rendered. A fling shows how few views the recycler needs; the zoom buttons
//! spring the scale up and down by 1.6.
//!
//! Run:
//! - `cargo run -p evergrid_demos --example gallery`
//! - `RUST_LOG=evergrid=trace cargo run -p evergrid_demos --example gallery`

use std::collections::HashMap;
use std::num::NonZeroU64;

use evergrid::layout::{GridLayoutSource, LayoutProps, ReuseId};
use evergrid::{
    AnimatedValue, Animation, Easing, Evergrid, EvergridOptions, FrameUpdate, SlotChange, SlotId,
    SlotKey, SpringSpec, TimingSpec,
};
use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;

const FRAME_DT: f64 = 1.0 / 60.0;
const FRAME_MS: u64 = 16;

/// A host-side photo tile.
#[derive(Debug)]
struct PhotoView {
    photo: Option<SlotKey>,
    opacity: AnimatedValue<f64>,
}

#[derive(Debug, Default)]
struct Host {
    views: HashMap<SlotId, PhotoView>,
    on_screen: usize,
    created: usize,
    rendered: usize,
}

impl Host {
    fn apply(&mut self, frame: &FrameUpdate) {
        for change in &frame.changes {
            match *change {
                SlotChange::Create { slot, .. } => {
                    self.created += 1;
                    self.views.insert(
                        slot,
                        PhotoView {
                            photo: None,
                            opacity: AnimatedValue::new(0.0),
                        },
                    );
                }
                SlotChange::Destroy { slot } => {
                    self.views.remove(&slot);
                }
                SlotChange::Render { slot, key } => {
                    let Some(view) = self.views.get_mut(&slot) else {
                        continue;
                    };
                    self.rendered += 1;
                    view.photo = Some(key);
                    view.opacity.set_value(0.0);
                    view.opacity.animate_to(
                        1.0,
                        Animation::Timing(TimingSpec::new(300).with_easing(Easing::EaseOut)),
                    );
                }
                SlotChange::Hide { .. } | SlotChange::Rebind { .. } | SlotChange::Show { .. } => {}
            }
        }
        for view in self.views.values_mut() {
            view.opacity.tick(FRAME_DT);
        }
        self.on_screen = frame.items.len();
    }

    fn fading(&self) -> usize {
        self.views
            .values()
            .filter(|view| view.opacity.is_animating())
            .count()
    }
}

/// Updates until nothing animates; returns the number of frames.
fn settle(gallery: &mut Evergrid, host: &mut Host) -> usize {
    let mut frames = 0;
    loop {
        let frame = gallery.update(FRAME_DT);
        host.apply(&frame);
        frames += 1;
        if !frame.animating || frames >= 10_000 {
            return frames;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut gallery = Evergrid::new(
        Size::new(1080.0, 720.0),
        EvergridOptions {
            anchor: Vec2::new(0.5, 0.5),
            ..EvergridOptions::default()
        },
    );
    let photos = gallery.add_source(GridLayoutSource::new(
        LayoutProps::new(ReuseId("grid")).with_item_size(Vec2::new(300.0, 300.0)),
    ));
    let mut host = Host::default();

    host.apply(&gallery.update(0.0));
    println!(
        "opened: {} photos on screen, {} fading in",
        host.on_screen,
        host.fading()
    );

    // A quick diagonal flick towards the top left.
    let finger = NonZeroU64::new(1).expect("pointer ids are non-zero");
    let mut now = 0;
    let start = Point::new(900.0, 600.0);
    gallery.pointer_down(finger, start, now);
    let mut position = start;
    for _ in 0..6 {
        now += FRAME_MS;
        position -= Vec2::new(60.0, 40.0);
        gallery.pointer_move(finger, position, now);
        host.apply(&gallery.update(FRAME_DT));
    }
    gallery.pointer_up(finger, position, now);
    let frames = settle(&mut gallery, &mut host);
    let center = gallery.transform_point_from_screen_to_container(Point::new(540.0, 360.0));
    let under_center = gallery
        .visible_item_at(photos, center)
        .expect("the photo source is registered");
    println!(
        "fling came to rest after {frames} frames at {:?}; photo {} is centered",
        gallery.offset(),
        under_center.map_or_else(|| "none".to_string(), |index| index.to_string()),
    );
    println!(
        "{} views created for {} renders",
        host.created, host.rendered
    );

    // The zoom buttons.
    for (label, factor) in [("zoom in", 1.6), ("zoom out", 1.0 / 1.6)] {
        let target = gallery.scale() * factor;
        gallery
            .animate_scale(target, Animation::Spring(SpringSpec::DEFAULT))
            .expect("zooming by 1.6 stays within the scale limits");
        let frames = settle(&mut gallery, &mut host);
        println!(
            "{label}: scale {:.3} after {frames} frames, {} photos on screen, {} views alive",
            gallery.scale().x,
            host.on_screen,
            host.views.len(),
        );
    }

    let shown: usize = host
        .views
        .values()
        .filter(|view| view.photo.is_some())
        .count();
    tracing::info!(shown, created = host.created, "gallery walkthrough finished");
}
