//! Menu tree pipeline: assemble -> overlay -> present.

pub mod assembler;
pub mod invariants;
pub mod overlay;
pub mod presenter;

pub use assembler::{assemble, MenuForest, TreeNode};
pub use invariants::{tree_violations, TreeViolation};
pub use overlay::{apply_selection, prune_to_granted, CheckState, CheckedForest, CheckedNode};
pub use presenter::{present, DisplayNode, PresentOptions};
