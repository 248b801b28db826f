//! Assembly of the PostGIS query that renders one tile.
//!
//! The query is built from named geometric steps. The envelope bounds, the
//! segment length and the source SRID are bound parameters; only validated
//! [`Identifier`](super::Identifier)s are spliced into the text.
//!
//! ```text
//! bounds  = Segmentize(MakeEnvelope(xmin, ymin, xmax, ymax, grid), seg)
//! mvtgeom = AsMVTGeom(Transform(CurveToLine(t.geom), grid), bounds.b2d), attrs…
//!           FROM table t WHERE Intersects(t.geom, Transform(bounds, source_srid))
//! result  = AsMVT(mvtgeom.*)
//! ```

use std::fmt;

use crate::tile::{Envelope, TileGrid};

use super::source::SourceTable;

/// Number of segments each envelope edge is split into before reprojection.
pub const DENSIFY_FACTOR: f64 = 4.0;

// =============================================================================
// Tile Query
// =============================================================================

/// Scalar parameters bound to a [`TileQuery`], in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileQueryParams {
    /// `$1`
    pub xmin: f64,
    /// `$2`
    pub ymin: f64,
    /// `$3`
    pub xmax: f64,
    /// `$4`
    pub ymax: f64,
    /// `$5`: maximum edge segment length for densification
    pub segment_length: f64,
    /// `$6`: SRID of the stored geometry
    pub source_srid: i32,
}

/// A ready-to-run tile query: SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TileQuery {
    pub sql: String,
    pub params: TileQueryParams,
}

impl fmt::Display for TileQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- params: [{}, {}, {}, {}, {}, {}]",
            self.sql.trim(),
            self.params.xmin,
            self.params.ymin,
            self.params.xmax,
            self.params.ymax,
            self.params.segment_length,
            self.params.source_srid
        )
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds tile queries for one source table on one tile grid.
#[derive(Debug, Clone)]
pub struct TileQueryBuilder {
    source: SourceTable,
    grid: TileGrid,
}

impl TileQueryBuilder {
    /// Create a builder for `source` on the default (RD New) grid.
    pub fn new(source: SourceTable) -> Self {
        Self::with_grid(source, TileGrid::default())
    }

    /// Create a builder for `source` on a specific grid.
    pub fn with_grid(source: SourceTable, grid: TileGrid) -> Self {
        Self { source, grid }
    }

    pub fn source(&self) -> &SourceTable {
        &self.source
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Build the query for one envelope. Performs no I/O.
    pub fn build(&self, env: &Envelope) -> TileQuery {
        let params = TileQueryParams {
            xmin: env.xmin,
            ymin: env.ymin,
            xmax: env.xmax,
            ymax: env.ymax,
            segment_length: segment_length(env),
            source_srid: self.source.srid,
        };

        TileQuery {
            sql: self.render(),
            params,
        }
    }

    fn render(&self) -> String {
        let geom = format!("t.{}", self.source.geom_column.quoted());
        let bounds = segmentize(&make_envelope(self.grid.srid), "$5::float8");

        let mut columns = vec![format!(
            "{} AS geom",
            as_mvt_geom(
                &transform(&curve_to_line(&geom), &self.grid.srid.to_string()),
                "bounds.b2d"
            )
        )];
        columns.extend(
            self.source
                .attr_columns
                .iter()
                .map(|c| format!("t.{}", c.quoted())),
        );

        format!(
            "WITH\n\
             bounds AS (\n    \
                 SELECT {bounds} AS geom,\n           \
                        {bounds}::box2d AS b2d\n\
             ),\n\
             mvtgeom AS (\n    \
                 SELECT {columns}\n    \
                 FROM {table} t, bounds\n    \
                 WHERE {predicate}\n\
             )\n\
             SELECT {aggregate} FROM mvtgeom",
            bounds = bounds,
            columns = columns.join(",\n           "),
            table = self.source.table.quoted(),
            predicate = intersects(&geom, &transform("bounds.geom", "$6::int4")),
            aggregate = as_mvt("mvtgeom"),
        )
    }
}

/// Edge segment length that splits the envelope width into equal parts.
pub fn segment_length(env: &Envelope) -> f64 {
    env.width() / DENSIFY_FACTOR
}

// =============================================================================
// Geometric Steps
// =============================================================================

fn make_envelope(srid: i32) -> String {
    format!(
        "ST_MakeEnvelope($1::float8, $2::float8, $3::float8, $4::float8, {})",
        srid
    )
}

fn segmentize(geom: &str, max_length: &str) -> String {
    format!("ST_Segmentize({}, {})", geom, max_length)
}

fn transform(geom: &str, srid: &str) -> String {
    format!("ST_Transform({}, {})", geom, srid)
}

fn curve_to_line(geom: &str) -> String {
    format!("ST_CurveToLine({})", geom)
}

fn intersects(a: &str, b: &str) -> String {
    format!("ST_Intersects({}, {})", a, b)
}

fn as_mvt_geom(geom: &str, bounds: &str) -> String {
    format!("ST_AsMVTGeom({}, {})", geom, bounds)
}

fn as_mvt(relation: &str) -> String {
    format!("ST_AsMVT({}.*)", relation)
}

// =============================================================================
// Tests
// =============================================================================
