//! # Cheshire-Viz
//!
//! Terminal-native chart rendering for tabular query results.
//!
//! A row-set (named columns of numbers, text, timestamps or nulls) is turned
//! into a [`Frame`](frame::Frame): a grid of glyph cells with colors, a legend
//! and render statistics. Glyphs come from a small fixed alphabet (full and
//! half blocks, 2×4 Braille dot patterns, shade ramps, cluster markers) and
//! colors are either xterm-256 palette indices or truecolor.
//!
//! ## Features
//!
//! - **Maps**: points, clusters, density and value heatmaps over lat/lon columns
//! - **Proportions**: pie charts and waffle grids with exact apportionment
//! - **Matrix heatmaps**: two categorical dimensions, counts or aggregated values
//! - **Suggestions**: ranked chart archetypes for a schema, with tunable thresholds
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cheshire_viz::prelude::*;
//!
//! let rows = RowSet::from_records(vec![
//!     vec![("region", Value::from("north")), ("sales", Value::from(15.0))],
//!     vec![("region", Value::from("south")), ("sales", Value::from(20.0))],
//! ])?;
//! let options = ChartOptions::new(ChartKind::Pie).column("x", "region").column("y", "sales");
//! let frame = render(&rows, &options, Viewport::new(40, 12)?, &RenderContext::default())?;
//! println!("{}", AnsiEncoder::new().encode(&frame));
//! ```
//!
//! Rendering is a pure function of its inputs. The only process-wide state
//! is the opt-in diagnostic log switch in [`debug`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in cell-grid code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Opt-in diagnostic logging.
pub mod debug;

/// Row-sets, values and field types.
pub mod data;

/// Per-column schema profiles.
pub mod schema;

/// Terminal colors and categorical palettes.
pub mod color;

/// Gradients and named themes.
pub mod theme;

/// Domains, scales and projections.
pub mod scale;

/// Spatial binning, clustering and intensity fields.
pub mod aggregate;

/// Glyph alphabet and sub-cell packing.
pub mod glyph;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Viewports, cells and frames.
pub mod frame;

/// Chart options.
pub mod options;

/// Chart renderers.
pub mod render;

/// Output encoders (terminal).
pub mod output;

// ============================================================================
// Suggestions & Configuration
// ============================================================================

/// Chart suggestion engine.
pub mod suggest;

/// YAML configuration.
pub mod config;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for cheshire-viz operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use cheshire_viz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::{ColorSpace, Rgba, TermColor};
    pub use crate::config::Config;
    pub use crate::data::{FieldType, RowSet, Value};
    pub use crate::error::{Error, Result};
    pub use crate::frame::{Cell, Frame, LegendEntry, RenderStats, Viewport};
    pub use crate::glyph::GlyphMode;
    pub use crate::options::{ChartKind, ChartOptions, Dimension, MapSubtype};
    pub use crate::output::AnsiEncoder;
    pub use crate::render::{render, render_fit, RenderContext};
    pub use crate::scale::{Framing, ProjectionConfig};
    pub use crate::schema::SchemaSummary;
    pub use crate::suggest::{suggest, suggest_rows, Archetype, Suggestion, SuggestionConfig};
    pub use crate::theme::{Gradient, Theme};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
