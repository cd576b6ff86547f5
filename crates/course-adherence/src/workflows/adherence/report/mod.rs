mod assembler;
pub mod render;

pub use assembler::{assemble, AdherenceReport, AssemblyError, CourseSummaryRow, LabelCount};
pub use render::{EmailContext, TableHeadings};
