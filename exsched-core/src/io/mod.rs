//! Problem input, solution output and CSV reports.

mod reports;
mod xml_loader;
mod xml_writer;

pub use reports::{all_reports, save_csv, Report, Table};
pub use xml_loader::ExamXmlLoader;
pub use xml_writer::ExamXmlWriter;

use crate::config::SolverConfig;
use crate::model::ExamModel;
use crate::solver::Solution;
use crate::SolverError;

/// Parses a problem document into a model. Broken invariants and
/// unparseable input surface as [`SolverError::MalformedInput`].
pub trait ProblemLoader {
    fn load(&self, input: &str, config: &SolverConfig) -> Result<ExamModel, SolverError>;
}

/// Renders a solution document mirroring the input schema.
pub trait SolutionWriter {
    fn save(&self, solution: &Solution) -> Result<String, SolverError>;
}
