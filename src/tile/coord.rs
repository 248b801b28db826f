//! Tile coordinates: parsing from request paths and validation.
//!
//! Tile paths follow the XYZ scheme `/{zoom}/{x}/{y}.{format}`. The matcher is
//! anchored at the start of the path only, so anything after the format token
//! (for example a second extension) is ignored.

use std::fmt;

use crate::error::TileError;

/// Tile formats accepted by the server. Both names denote the same MVT payload.
pub const ACCEPTED_FORMATS: [&str; 2] = ["pbf", "mvt"];

/// Deepest zoom level served. The pyramid has `MAX_ZOOM + 1` levels.
pub const MAX_ZOOM: i32 = 31;

// =============================================================================
// TileCoordinate
// =============================================================================

/// A tile address in the XYZ pyramid, as parsed from a request path.
///
/// A parsed coordinate is not necessarily valid: use [`is_valid_tile`] or
/// [`validate_tile`] before projecting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCoordinate {
    /// Zoom level (0 = a single tile covering the world)
    pub zoom: i32,

    /// Column, counted from the left edge
    pub x: i64,

    /// Row, counted from the bottom edge
    pub y: i64,

    /// Requested format token (e.g. "pbf")
    pub format: String,
}

impl TileCoordinate {
    /// Create a coordinate from its parts.
    pub fn new(zoom: i32, x: i64, y: i64, format: impl Into<String>) -> Self {
        Self {
            zoom,
            x,
            y,
            format: format.into(),
        }
    }

    /// Extract a tile coordinate from a request path.
    ///
    /// Returns `None` when the path does not start with
    /// `/<digits>/<digits>/<digits>.<word>`.
    ///
    /// ```
    /// use mvt_tile_server::tile::TileCoordinate;
    ///
    /// let tile = TileCoordinate::from_path("/3/4/2.pbf").unwrap();
    /// assert_eq!((tile.zoom, tile.x, tile.y), (3, 4, 2));
    /// assert_eq!(tile.format, "pbf");
    ///
    /// assert!(TileCoordinate::from_path("/abc/def.pbf").is_none());
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;

        let (zoom, rest) = take_digits(rest)?;
        let rest = rest.strip_prefix('/')?;
        let (x, rest) = take_digits(rest)?;
        let rest = rest.strip_prefix('/')?;
        let (y, rest) = take_digits(rest)?;
        let rest = rest.strip_prefix('.')?;
        let (format, _) = take_word(rest)?;

        Some(Self {
            zoom: zoom.parse().ok()?,
            x: x.parse().ok()?,
            y: y.parse().ok()?,
            format: format.to_string(),
        })
    }

    /// Number of tiles along each axis at this zoom level.
    pub fn tiles_per_axis(&self) -> i64 {
        tiles_per_axis(self.zoom)
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}.{}", self.zoom, self.x, self.y, self.format)
    }
}

/// Split off a leading run of ASCII digits. Fails on an empty run.
fn take_digits(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

/// Split off a leading run of word characters (`[A-Za-z0-9_]`).
fn take_word(s: &str) -> Option<(&str, &str)> {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

// =============================================================================
// Validation
// =============================================================================

/// Number of tiles along each axis at `zoom`, i.e. `2^zoom`.
///
/// Negative zoom levels have no tiles. Levels past 62 saturate at `i64::MAX`,
/// which still admits every representable non-negative column.
pub fn tiles_per_axis(zoom: i32) -> i64 {
    match zoom {
        z if z < 0 => 0,
        z if z > 62 => i64::MAX,
        z => 1i64 << z,
    }
}

/// Check whether a format token names an accepted tile format.
pub fn is_accepted_format(format: &str) -> bool {
    ACCEPTED_FORMATS.contains(&format)
}

/// Check that a (possibly absent) tile coordinate addresses a real tile.
///
/// Fails if the coordinate is absent, the format is not accepted, the zoom
/// is deeper than [`MAX_ZOOM`], or `x`/`y` fall outside `[0, 2^zoom)`.
pub fn is_valid_tile(tile: Option<&TileCoordinate>) -> bool {
    let Some(tile) = tile else {
        return false;
    };
    if !is_accepted_format(&tile.format) || tile.zoom > MAX_ZOOM {
        return false;
    }
    let size = tile.tiles_per_axis();
    (0..size).contains(&tile.x) && (0..size).contains(&tile.y)
}

/// Parse and validate a request path in one step.
///
/// The error echoes the offending path.
pub fn validate_tile(path: &str) -> Result<TileCoordinate, TileError> {
    match TileCoordinate::from_path(path) {
        Some(tile) if is_valid_tile(Some(&tile)) => Ok(tile),
        _ => Err(TileError::InvalidTilePath {
            path: path.to_string(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
