pub mod notice;
pub mod style;

pub use notice::render_decision;
