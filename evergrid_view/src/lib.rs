// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evergrid View: the viewport model behind a pannable, zoomable container.
//!
//! This crate provides a small, headless [`Viewport`] that maps between three
//! coordinate spaces (screen, container, and content) using a content offset,
//! a per-axis scale, and an anchor. It focuses on:
//!
//! - Coordinate conversion for points and rects, plus an equivalent [`kurbo::Affine`].
//! - The visible content rect, optionally shrunk by pixel insets.
//! - Pan and zoom-about-a-focal-point operations.
//! - Optional clamping against content bounds ([`ClampMode`]).
//!
//! It does **not** interpret input or run animations. The `evergrid` container
//! drives a `Viewport` from its gesture state machine and animated values.
//!
//! ## Example
//!
//! ```rust
//! use evergrid_view::Viewport;
//! use kurbo::{Point, Rect, Size, Vec2};
//!
//! let mut view = Viewport::new(Size::new(600.0, 400.0));
//! view.set_anchor(Vec2::new(0.5, 0.5));
//!
//! // Pan right by 100 pixels: content follows the pointer.
//! view.pan_by(Vec2::new(100.0, 0.0));
//! assert_eq!(view.offset(), Point::new(-100.0, 0.0));
//!
//! // Cull against what is on screen.
//! let visible = view.visible_content_rect();
//! assert_eq!(visible, Rect::new(-400.0, -200.0, 200.0, 200.0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod viewport;

pub use viewport::{ClampMode, Viewport};
