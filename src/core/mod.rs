// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod overlap;
pub mod reasons;
pub mod scoring;

pub use filters::{eligible_candidates, is_eligible};
pub use matcher::{rank_matches, MatchResult, Matcher};
pub use overlap::{overlap_ratio, shared_tags};
pub use reasons::{basic_match_reasons, generate_match_reasons};
pub use scoring::calculate_compatibility;
