// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-driven editing: drag to move shapes, drag empty space to pan, wheel to zoom.

use kurbo::{Point, Vec2};

use crate::damage::Damage;
use crate::error::SceneError;
use crate::scene::Scene;
use crate::shape::ShapeId;
use crate::surface::Surface;

/// Wheel delta that changes the scale by one.
pub const WHEEL_STEP: f64 = 1500.0;

/// What a pointer drag does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ToolMode {
    /// Dragging pans the camera.
    #[default]
    View,
    /// Dragging moves the shape that was pressed.
    Move,
}

/// An active drag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Drag {
    /// Pointer position of the previous event, in screen space.
    pub(crate) last: Point,
    /// Shape being moved; `None` while panning.
    pub(crate) target: Option<ShapeId>,
}

impl<S: Surface> Scene<S> {
    /// Current drag behavior.
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Start a drag. Pressing a shape moves it; pressing empty space pans.
    pub fn pointer_down(&mut self, screen: Point) -> ToolMode {
        let target = self.hit_test(self.viewport().screen_to_world(screen));
        self.mode = if target.is_some() {
            ToolMode::Move
        } else {
            ToolMode::View
        };
        self.drag = Some(Drag {
            last: screen,
            target,
        });
        self.mode
    }

    /// Track the pointer: refresh the hover and continue any drag.
    ///
    /// Returns the damage of a shape move, if one happened.
    pub fn pointer_move(&mut self, screen: Point) -> Result<Option<Damage>, SceneError> {
        if self.drag.is_none() {
            self.hover = self.hit_test(self.viewport().screen_to_world(screen));
            return Ok(None);
        }
        let scale = self.viewport().scale();
        let Some(drag) = self.drag.as_mut() else {
            return Ok(None);
        };
        let delta: Vec2 = (screen - drag.last) / scale;
        drag.last = screen;
        let target = drag.target;
        match target {
            Some(id) => {
                self.hover = Some(id);
                self.move_shape(id, delta).map(Some)
            }
            None => {
                self.pan(-delta)?;
                Ok(None)
            }
        }
    }

    /// End the drag and rebuild the spatial index.
    pub fn pointer_up(&mut self) {
        self.drag = None;
        self.mode = ToolMode::View;
        self.rebuild_index();
    }

    /// Zoom around the pointer. A positive `delta_y` (scrolling down) zooms out.
    ///
    /// Returns whether the visible tile set changed.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> Result<bool, SceneError> {
        self.zoom_at(screen, -delta_y / WHEEL_STEP)
    }
}
