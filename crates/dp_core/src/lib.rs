//! # dp_core - Disc Build & Note-Economy Engine
//!
//! This library implements the build engine behind the DiscPlanner
//! companion app: equipment slot state, note-level aggregation,
//! secondary-ability unlock resolution, and build score aggregation,
//! with a JSON API for easy integration with rendering layers.
//!
//! ## Features
//! - Six-slot loadout state machine (3 main + 3 sub discs)
//! - Note economy: promotion-table contributions + declared extras
//! - Highest-unlocked-tier ability resolution with per-note thresholds
//! - Compressed, checksummed saves and URL-safe share codes

// Allow unused code for features under development
#![allow(dead_code)]

pub mod api;
pub mod data;
pub mod disc;
pub mod error;
pub mod save;
pub mod state;

// Re-export main API functions
pub use api::{
    decode_build_json, encode_build_json, evaluate_build_json, BuildRequest, BuildViewResponse,
};
pub use error::{CoreError, Result};

// Re-export data tables
pub use data::{
    game_data, AbilityTier, GameData, NoteType, GROWTH_PHASE_MAX, MAIN_TIER_MAX,
    SECONDARY_TIER_MAX,
};

// Re-export disc build system types
pub use disc::{
    aggregate_notes, compute_score, resolve_main, resolve_secondary, Disc, DiscLoadout, Element,
    MainSlot, Rarity, ScoreBreakdown, SubSlot,
};

// Re-export session state
pub use state::{MainSlotResolution, PlannerSession};

// Re-export save system
pub use save::{
    decode_share_code, encode_share_code, BuildSave, SaveError, SaveManager, SAVE_VERSION,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
