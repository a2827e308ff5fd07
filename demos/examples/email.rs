// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Email inbox: a vertical list with swipe-to-delete and animated arrivals.
//!
//! The list only scrolls vertically. A horizontal drag on a row is claimed by
//! the host with `prevent_default_pan`, after which moves arrive as
//! `CustomMove` events and slide that row. Released far enough left, the row
//! slides out and is removed; the rows below spring up without re-rendering.
//! New mail is inserted at the top.
//!
//! Run:
//! - `cargo run -p evergrid_demos --example email`

use std::collections::HashMap;
use std::num::NonZeroU64;

use evergrid::layout::{Axis, Edge, FlatLayoutSource, LayoutProps, ReuseId};
use evergrid::{
    AnimatedValue, Animation, Evergrid, EvergridEvent, EvergridOptions, FrameUpdate,
    GestureConfig, ItemIndex, ScrollAxes, SlotChange, SlotId, SlotKey, SourceId, SpringSpec,
};
use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;

const FRAME_DT: f64 = 1.0 / 60.0;
const WIDTH: f64 = 300.0;
const ROW_HEIGHT: f64 = 60.0;
/// Fraction of the width a row must be dragged left to be deleted.
const DELETE_THRESHOLD: f64 = 0.3;

fn spring() -> Animation {
    Animation::Spring(SpringSpec::DEFAULT)
}

/// A host-side row view.
#[derive(Debug)]
struct RowView {
    subject: String,
    swipe: AnimatedValue<f64>,
}

#[derive(Debug)]
struct Inbox {
    list: Evergrid,
    rows: SourceId,
    mail: Vec<String>,
    views: HashMap<SlotId, RowView>,
    bound: HashMap<SlotKey, SlotId>,
    received: usize,
}

impl Inbox {
    fn new(len: usize) -> Self {
        let mut list = Evergrid::new(
            Size::new(WIDTH, 600.0),
            EvergridOptions {
                anchor: Vec2::new(0.5, 0.0),
                gesture: GestureConfig {
                    axes: ScrollAxes::VERTICAL,
                    ..GestureConfig::default()
                },
                ..EvergridOptions::default()
            },
        );
        let rows = list.add_source(
            FlatLayoutSource::new(
                LayoutProps::new(ReuseId("email"))
                    .with_item_size(Vec2::new(WIDTH, ROW_HEIGHT))
                    .with_sticky_edge(Edge::Left),
                Axis::Vertical,
            )
            .with_len(len),
        );
        Self {
            list,
            rows,
            mail: (0..len).map(|i| format!("Message #{i}")).collect(),
            views: HashMap::new(),
            bound: HashMap::new(),
            received: 0,
        }
    }

    fn apply(&mut self, frame: &FrameUpdate) {
        for change in &frame.changes {
            match *change {
                SlotChange::Create { slot, .. } => {
                    self.views.insert(
                        slot,
                        RowView {
                            subject: String::new(),
                            swipe: AnimatedValue::new(0.0),
                        },
                    );
                }
                SlotChange::Destroy { slot } => {
                    self.views.remove(&slot);
                }
                // A recycled row starts unswiped.
                SlotChange::Rebind { slot, .. } | SlotChange::Show { slot } => {
                    if let Some(view) = self.views.get_mut(&slot) {
                        view.swipe.set_value(0.0);
                    }
                }
                SlotChange::Render { slot, key } => {
                    let subject = key
                        .index
                        .linear()
                        .and_then(|i| usize::try_from(i).ok())
                        .and_then(|i| self.mail.get(i))
                        .cloned()
                        .unwrap_or_default();
                    if let Some(view) = self.views.get_mut(&slot) {
                        view.subject = subject;
                    }
                }
                SlotChange::Hide { .. } => {}
            }
        }
        for view in self.views.values_mut() {
            view.swipe.tick(FRAME_DT);
        }
        self.bound = frame.items.iter().map(|item| (item.key, item.slot)).collect();
    }

    fn settle(&mut self) -> FrameUpdate {
        let mut frames = 0;
        loop {
            let frame = self.list.update(FRAME_DT);
            self.apply(&frame);
            frames += 1;
            let swiping = self.views.values().any(|view| view.swipe.is_animating());
            if (!frame.animating && !swiping) || frames >= 10_000 {
                return frame;
            }
        }
    }

    fn print(&self, title: &str, frame: &FrameUpdate) {
        println!("{title}");
        for item in &frame.items {
            let Some(view) = self.views.get(&item.slot) else {
                continue;
            };
            println!(
                "  y {:>5.0}  {}{}",
                item.frame.y0,
                view.subject,
                if item.transitioning { "  (moving)" } else { "" },
            );
        }
        let renders = frame.renders().count();
        if renders > 0 {
            println!("  {renders} rows rendered");
        }
    }

    /// Drags a row horizontally by `dx`; returns whether it was deleted.
    fn swipe(&mut self, row_y: f64, dx: f64, start_ms: u64) -> bool {
        let finger = NonZeroU64::new(1).expect("pointer ids are non-zero");
        let down = Point::new(WIDTH * 0.5, row_y);
        let hit = self
            .list
            .visible_item_at(
                self.rows,
                self.list.transform_point_from_screen_to_container(down),
            )
            .expect("the row source is registered");
        let Some(ItemIndex::Linear(index)) = hit else {
            return false;
        };
        let Some(&slot) = self
            .bound
            .get(&SlotKey::new(self.rows, ItemIndex::Linear(index)))
        else {
            return false;
        };

        let slop = GestureConfig::default().pan_slop;
        let mut claimed = false;
        let mut swiped = 0.0;
        let mut now = start_ms;
        self.list.pointer_down(finger, down, now);
        for step in 1..=10 {
            now += 16;
            let position = down + Vec2::new(dx * f64::from(step) / 10.0, 0.0);
            let mut events = self.list.pointer_move(finger, position, now);
            if !claimed && !self.list.is_panning_content() && (position.x - down.x).abs() > slop {
                claimed = true;
                events.extend(self.list.prevent_default_pan());
                swiped = position.x - down.x;
            }
            for event in events {
                if let EvergridEvent::CustomMove { position, .. } = event {
                    swiped = position.x - down.x;
                }
            }
            if let Some(view) = self.views.get_mut(&slot) {
                view.swipe.set_value(swiped);
            }
        }
        self.list.pointer_up(finger, down + Vec2::new(dx, 0.0), now);

        let delete = claimed && swiped < -WIDTH * DELETE_THRESHOLD;
        if let Some(view) = self.views.get_mut(&slot) {
            view.swipe
                .animate_to(if delete { -WIDTH } else { 0.0 }, spring());
        }
        if delete {
            if let Ok(i) = usize::try_from(index) {
                let subject = self.mail.remove(i);
                tracing::info!(%subject, "deleted");
            }
            self.list
                .remove_item(self.rows, index, Some(spring()))
                .expect("the row source is a list");
        }
        delete
    }

    fn receive(&mut self) {
        self.received += 1;
        self.mail.insert(0, format!("New message {}", self.received));
        self.list
            .insert_item(self.rows, 0, Some(spring()))
            .expect("the row source is a list");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut inbox = Inbox::new(100);
    let frame = inbox.list.update(0.0);
    inbox.apply(&frame);
    inbox.print("inbox", &frame);

    // A short swipe springs back.
    let deleted = inbox.swipe(2.5 * ROW_HEIGHT, -60.0, 0);
    let frame = inbox.settle();
    inbox.print(&format!("short swipe on row 2, deleted: {deleted}"), &frame);

    // A long one deletes the row; the rows below move up.
    let deleted = inbox.swipe(2.5 * ROW_HEIGHT, -150.0, 1_000);
    let frame = inbox.list.update(FRAME_DT);
    inbox.apply(&frame);
    inbox.print(&format!("long swipe on row 2, deleted: {deleted}"), &frame);
    let frame = inbox.settle();
    inbox.print("after the removal settled", &frame);

    // New mail arrives at the top.
    inbox.receive();
    let frame = inbox.list.update(FRAME_DT);
    inbox.apply(&frame);
    inbox.print("new mail arrived", &frame);
    inbox.settle();
}
