// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::board::Coordinate;

/// Orientation chosen by the player when placing a plant. Only matters for plants whose
/// footprint is not square.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Horizontal
    }
}

/// A rectangular footprint, `width` columns by `height` rows.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Footprint {
    width: usize,
    height: usize,
}

impl Footprint {
    /// Construct a footprint with the given size. Panics if either side is 0.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0);
        Footprint { width, height }
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Project the footprint onto the grid with `anchor` as its top-left cell. Cells come
    /// out row-major. Does not account for the bounds of any board.
    pub fn project(&self, anchor: Coordinate) -> impl Iterator<Item = Coordinate> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| anchor.offset(row, col)))
    }
}
