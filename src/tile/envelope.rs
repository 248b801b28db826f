//! Projection of XYZ tiles onto a fixed planar grid.
//!
//! The grid covers a square world extent in a projected coordinate system
//! and is split into `2^zoom × 2^zoom` tiles per zoom level. Columns count
//! rightward from the west edge and rows count upward from the south edge, so
//! row `y` spans `[bottom + size*y, bottom + size*(y+1)]`. Clients address
//! this scheme with flipped-Y (`{-y}`) URL templates.
//!
//! Edges are computed by interpolating between the world bounds rather than
//! by repeated addition. This keeps the outermost edges equal to the world
//! bounds exactly, and two neighbouring tiles always compute their shared edge
//! from the same expression, so it is bit-identical on both sides.

use super::coord::TileCoordinate;

/// SRID of Amersfoort / RD New (EPSG:28992).
pub const RD_NEW_SRID: i32 = 28992;

/// Tile grid over the Dutch national RD New coordinate system.
pub const RD_NEW_GRID: TileGrid = TileGrid {
    srid: RD_NEW_SRID,
    min_x: -285401.92,
    max_x: 595401.92,
    min_y: 22598.08,
    max_y: 903401.92,
};

/// World extent of a tile pyramid in a projected coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    /// SRID the bounds are expressed in
    pub srid: i32,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl TileGrid {
    /// Width of a single tile at `zoom`, in grid units.
    pub fn tile_size(&self, zoom: i32) -> f64 {
        (self.max_x - self.min_x) / tiles_per_axis_f64(zoom)
    }

    /// Compute the envelope of a validated tile.
    ///
    /// The tile must have passed validation; out-of-range coordinates still
    /// produce numbers, but they lie outside the world extent.
    pub fn envelope(&self, tile: &TileCoordinate) -> Envelope {
        let n = tiles_per_axis_f64(tile.zoom);
        let column = |i: i64| lerp(self.min_x, self.max_x, i as f64 / n);
        let row = |j: i64| lerp(self.min_y, self.max_y, j as f64 / n);

        Envelope {
            xmin: column(tile.x),
            xmax: column(tile.x + 1),
            ymin: row(tile.y),
            ymax: row(tile.y + 1),
        }
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        RD_NEW_GRID
    }
}

/// `2^zoom` as a float. Exact for every zoom up to
/// [`MAX_ZOOM`](super::coord::MAX_ZOOM).
fn tiles_per_axis_f64(zoom: i32) -> f64 {
    2f64.powi(zoom)
}

/// Linear interpolation that returns `a` at `t = 0` and `b` at `t = 1` exactly.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

// =============================================================================
// Envelope
// =============================================================================

/// Axis-aligned bounding box of one tile in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Envelope {
    /// Envelope of `tile` on the RD New grid.
    pub fn from_tile(tile: &TileCoordinate) -> Self {
        RD_NEW_GRID.envelope(tile)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

// =============================================================================
// Tests
// =============================================================================
