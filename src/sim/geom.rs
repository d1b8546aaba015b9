//! Axis-aligned box geometry shared by every body in the level
//!
//! Screen-space coordinates: `pos` is the top-left corner and y grows
//! downward, so `top() < bottom()`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBox {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height, both > 0
    pub size: Vec2,
}

impl AxisBox {
    /// Build a box, rejecting zero, negative or non-finite geometry
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(GeometryError::NonFinite {
                x,
                y,
                width,
                height,
            });
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::NonPositiveSize { width, height });
        }
        Ok(Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        })
    }

    /// Build a box from its bottom-center point (feet position)
    pub fn from_bottom_center(
        bottom_center: Vec2,
        width: f32,
        height: f32,
    ) -> Result<Self, GeometryError> {
        Self::new(
            bottom_center.x - width / 2.0,
            bottom_center.y - height,
            width,
            height,
        )
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x * 0.5
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y * 0.5
    }

    pub fn set_left(&mut self, x: f32) {
        self.pos.x = x;
    }

    pub fn set_right(&mut self, x: f32) {
        self.pos.x = x - self.size.x;
    }

    pub fn set_top(&mut self, y: f32) {
        self.pos.y = y;
    }

    pub fn set_bottom(&mut self, y: f32) {
        self.pos.y = y - self.size.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    /// Strict interior intersection; shared edges do not overlap
    #[inline]
    pub fn overlaps(&self, other: &AxisBox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal extents intersect (ignores y)
    #[inline]
    pub fn overlaps_x(&self, other: &AxisBox) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }

    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left() && x <= self.right()
    }
}
