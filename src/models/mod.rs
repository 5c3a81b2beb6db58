//! Domain records shared across the sweep pipeline.

mod ticket;
mod work_item;

pub use ticket::*;
pub use work_item::*;
