//! Parsers over unified-diff text and rendered HTML diff fragments.

mod html;
mod stats;
mod unified;

pub use html::extract_diff_from_html;
pub use stats::parse_stats;
pub use unified::render_diff;
