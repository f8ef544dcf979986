pub mod derive;
pub mod params;

pub use derive::{SlidePlan, derive_plan, slide_index};
pub use params::{Bound, SlideParams};
