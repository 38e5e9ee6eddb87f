//! Report assembly and output.

pub mod generator;

pub use generator::{
    format_score, generate_json_report, generate_report, write_report, ConclusionTier,
    FALLBACK_MOLECULE,
};
