//! Pagination planning.
//!
//! Turns the height of one continuous capture into an ordered list of source pixel
//! ranges, one per output page. Planning is pure: no I/O and no allocation beyond
//! the plan itself.

mod planner;

pub use planner::{plan_slices, PlanFallback, PlanInput, Slice, SlicePlan};
