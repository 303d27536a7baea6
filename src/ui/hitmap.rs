//! Screen regions recorded during render, used to resolve pointer input.
//!
//! Regions are pushed in draw order, so a modal drawn over the menu
//! shadows the buttons underneath it.

use crate::scene::Target;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x
            && row >= self.y
            && (col as u32) < self.x as u32 + self.w as u32
            && (row as u32) < self.y as u32 + self.h as u32
    }
}

#[derive(Clone, Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Option<Target>)>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, rect: Rect, target: Target) {
        self.regions.push((rect, Some(target)));
    }

    /// Opaque region: swallows the pointer without naming a target.
    pub fn block(&mut self, rect: Rect) {
        self.regions.push((rect, None));
    }

    /// Topmost region under the cell.
    pub fn target_at(&self, col: u16, row: u16) -> Option<Target> {
        self.regions
            .iter()
            .rev()
            .find(|(r, _)| r.contains(col, row))
            .and_then(|(_, t)| *t)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
