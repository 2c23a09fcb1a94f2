//! # Pointer / Touch Adapter
//!
//! Drag-to-drive input. Every pressed pointer (mouse button or finger) is a
//! [`PointerTrack`] remembering where it went down and where it is now. The
//! displacement of each track, normalized by the half-extent of the surface,
//! is summed across all tracks, so several fingers add up and opposing drags
//! cancel out.
//!
//! ## Axes
//!
//! | Displacement | Output |
//! |---|---|
//! | Horizontal, right positive | `yaw` |
//! | Vertical, screen-down positive | `-vel` (dragging up drives forward) |

use std::collections::HashMap;

use super::curve::drag_response;
use super::{clamp_unit, InputSample};

/// Identifier of a pointer (mouse = 0, touches by tracking id).
pub type PointerId = i64;

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { id: PointerId, at: Point },
    Move { id: PointerId, at: Point },
    Up { id: PointerId },
    Cancel { id: PointerId },
}

/// One active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTrack {
    pub origin: Point,
    pub latest: Point,
}

/// Size of the surface the pointers move on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Turns active pointer tracks into an [`InputSample`].
#[derive(Debug, Clone)]
pub struct PointerAdapter {
    surface: Surface,
    tracks: HashMap<PointerId, PointerTrack>,
}

impl PointerAdapter {
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            tracks: HashMap::new(),
        }
    }

    /// Updates the surface size, e.g. after a resize.
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Number of active tracks.
    #[must_use]
    pub fn active_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Applies a pointer event to the tracked set.
    ///
    /// Moves for unknown pointers (e.g. hover without a press) are ignored.
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { id, at } => {
                self.tracks.insert(id, PointerTrack { origin: at, latest: at });
            }
            PointerEvent::Move { id, at } => {
                if let Some(track) = self.tracks.get_mut(&id) {
                    track.latest = at;
                }
            }
            PointerEvent::Up { id } | PointerEvent::Cancel { id } => {
                self.tracks.remove(&id);
            }
        }
    }

    /// Drops every track, e.g. when the surface loses focus.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Current contribution of all tracks.
    #[must_use]
    pub fn sample(&self) -> InputSample {
        let half_width = self.surface.width / 2.0;
        let half_height = self.surface.height / 2.0;
        if self.tracks.is_empty() || half_width <= 0.0 || half_height <= 0.0 {
            return InputSample::ZERO;
        }

        let (dx, dy) = self.tracks.values().fold((0.0, 0.0), |(dx, dy), track| {
            (
                dx + (track.latest.x - track.origin.x) / half_width,
                dy + (track.latest.y - track.origin.y) / half_height,
            )
        });

        InputSample {
            vel: drag_response(-clamp_unit(dy)),
            yaw: drag_response(clamp_unit(dx)),
        }
    }
}
