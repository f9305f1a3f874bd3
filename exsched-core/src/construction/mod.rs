//! Construction strategies that drive the assignment from empty to complete.

mod coloring;
mod forward;

pub use coloring::ColoringConstruction;
pub use forward::ExamConstruction;
