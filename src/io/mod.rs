//! Reading and writing shapes and graphs.
//!
//! - `json` - shape files, one serialized `Shape` per document
//! - `svg` - SVG rendering of a shape for inspection
//! - `graph` - `Graph::serialize` / `Graph::deserialize`

mod graph;
mod json;
mod svg;

pub use json::{read_shape, write_shape};
pub use svg::{svg_string, write_svg, SvgOptions};
