//! Code-generation-specific error cases (spec.md §7): unsupported constructs
//! encountered only while lowering, as opposed to the structural violations the
//! analysis stack already collects into `solace_analysis::Diagnostics`.

use solace_ast::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CodegenError {
    #[error("unsupported construct: {construct} at {site}")]
    Unsupported { construct: &'static str, site: NodeId },

    #[error("internal inconsistency: {0}")]
    Internal(String),

    #[error(transparent)]
    Analysis(#[from] solace_analysis::AnalysisError),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
