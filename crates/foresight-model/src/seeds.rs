//! Built-in workflow table for pre-training a fresh model.

use foresight_core::Action;
use tracing::info;

use crate::transition::TransitionModel;

/// `(from, [(to, weight)])` rows.
pub type Workflow = (&'static str, &'static [(&'static str, f64)]);

const DEFAULT_WORKFLOWS: &[Workflow] = &[
    (
        "OPEN_PDF",
        &[("SUMMARIZE_TEXT", 0.7), ("EXTRACT_DATA", 0.2), ("SEARCH_CONTENT", 0.1)],
    ),
    (
        "WRITE_CODE",
        &[("DEBUG_SYNTAX", 0.5), ("RUN_CODE", 0.3), ("SAVE_FILE", 0.2)],
    ),
    (
        "DEBUG_SYNTAX",
        &[("FIX_ERROR", 0.6), ("RUN_CODE", 0.3), ("ABANDON", 0.1)],
    ),
    (
        "RUN_CODE",
        &[("ANALYZE_OUTPUT", 0.4), ("DEBUG_SYNTAX", 0.4), ("CELEBRATE", 0.2)],
    ),
    (
        "RUN_SIM",
        &[("ANALYZE_DATA", 0.5), ("VISUALIZE", 0.3), ("EXPORT_RESULTS", 0.2)],
    ),
    (
        "SEARCH",
        &[("READ_RESULT", 0.6), ("REFINE_QUERY", 0.3), ("GIVE_UP", 0.1)],
    ),
    (
        "READ_RESULT",
        &[("TAKE_NOTES", 0.4), ("SEARCH", 0.3), ("APPLY_KNOWLEDGE", 0.3)],
    ),
    ("TYPE_IMPORT", &[("LOAD_LIBRARY", 0.8), ("AUTO_COMPLETE", 0.2)]),
    (
        "START_PROJECT",
        &[("BRAINSTORM", 0.4), ("RESEARCH", 0.3), ("WRITE_OUTLINE", 0.3)],
    ),
];

/// Document, coding, simulation, search and project-start workflows.
pub fn default_workflows() -> &'static [Workflow] {
    DEFAULT_WORKFLOWS
}

/// Reinforce every row of `workflows` into `model`. Returns the number of
/// edges written.
pub fn seed_model(model: &TransitionModel, workflows: &[Workflow]) -> usize {
    let mut edges = 0;
    for (from, successors) in workflows {
        let from = Action::from(*from);
        for (to, weight) in successors.iter() {
            model.reinforce(&from, &Action::from(*to), *weight);
            edges += 1;
        }
    }
    info!(edges, sources = workflows.len(), "transition model seeded");
    edges
}
