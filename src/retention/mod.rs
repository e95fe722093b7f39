pub mod candidates;
pub mod pruner;

pub use candidates::{find_candidates, FileCandidate};
pub use pruner::{
    execute, plan, prune, prune_at, select_for_deletion, FailedDeletion, PruneMode, PrunePlan,
    PruneReport, RetentionRequest,
};
