// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// A pixel rectangle. `y` counts from the bottom row of the image, so tile
/// row `num_tiles_y - 1` is the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// First row of this region when rows are stored top-down.
    pub fn top_row(&self, image_height: u32) -> u32 {
        image_height - (self.y + self.height)
    }
}

/// Partition of the render target into tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub render_width: u32,
    pub render_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub num_tiles_x: u32,
    pub num_tiles_y: u32,
    pub inv_num_tiles: [f32; 2],
}

impl TileGrid {
    /// Tiles larger than the target collapse to a single tile covering it.
    pub fn new(render_width: u32, render_height: u32, tile_width: u32, tile_height: u32) -> Self {
        let render_width = render_width.max(1);
        let render_height = render_height.max(1);
        let tile_width = tile_width.clamp(1, render_width);
        let tile_height = tile_height.clamp(1, render_height);

        Self {
            render_width,
            render_height,
            tile_width,
            tile_height,
            num_tiles_x: render_width.div_ceil(tile_width),
            num_tiles_y: render_height.div_ceil(tile_height),
            inv_num_tiles: [
                tile_width as f32 / render_width as f32,
                tile_height as f32 / render_height as f32,
            ],
        }
    }

    pub fn whole_frame(render_width: u32, render_height: u32) -> Self {
        Self::new(render_width, render_height, render_width, render_height)
    }

    pub fn tile_count(&self) -> u32 {
        self.num_tiles_x * self.num_tiles_y
    }

    pub fn first(&self) -> TileCursor {
        TileCursor {
            x: 0,
            y: self.num_tiles_y as i32 - 1,
        }
    }

    /// Position held between an invalidation and the first tile of a pass.
    pub fn sentinel(&self) -> TileCursor {
        TileCursor {
            x: -1,
            y: self.num_tiles_y as i32 - 1,
        }
    }

    /// Normalized offset of the tile's lower-left corner.
    pub fn tile_offset(&self, cursor: TileCursor) -> [f32; 2] {
        [
            cursor.x as f32 * self.inv_num_tiles[0],
            cursor.y as f32 * self.inv_num_tiles[1],
        ]
    }

    /// Pixels the tile covers in the full frame, clipped at the right and top edges.
    pub fn tile_region(&self, cursor: TileCursor) -> Viewport {
        let x = cursor.x.max(0) as u32 * self.tile_width;
        let y = cursor.y.max(0) as u32 * self.tile_height;
        Viewport {
            x,
            y,
            width: self.tile_width.min(self.render_width - x),
            height: self.tile_height.min(self.render_height - y),
        }
    }

    /// Working image size for a single tile pass.
    pub fn tile_viewport(&self) -> Viewport {
        Viewport::full(self.tile_width, self.tile_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCursor {
    pub x: i32,
    pub y: i32,
}

impl TileCursor {
    pub fn is_sentinel(&self) -> bool {
        self.x < 0
    }

    /// Step to the next tile: left to right, then one row down.
    ///
    /// Returns `true` when the last tile of the grid was passed and the cursor
    /// wrapped back to the first tile, i.e. a sample pass just completed.
    #[must_use]
    pub fn advance(&mut self, grid: &TileGrid) -> bool {
        self.x += 1;
        if self.x < grid.num_tiles_x as i32 {
            return false;
        }

        self.x = 0;
        self.y -= 1;
        if self.y >= 0 {
            return false;
        }

        *self = grid.first();
        true
    }
}
