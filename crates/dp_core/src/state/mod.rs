//! Planner Session State
//!
//! This module provides the session-scoped state container for the disc
//! build engine. A `PlannerSession` owns the active loadout plus a handle
//! to the loaded lookup tables, and exposes the mutation and derived-query
//! surface consumed by UI layers. Sessions are plain values: any number of
//! independent sessions can coexist in-process (useful for tests and for
//! comparing builds side by side), and a session can be converted to/from
//! `BuildSave` for persistence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{AbilityTier, GameData, MAIN_TIER_MAX};
use crate::disc::ability::{resolve_main, resolve_secondary};
use crate::disc::loadout::DiscLoadout;
use crate::disc::notes::{aggregate_notes, slot_note_levels};
use crate::disc::score::{compute_score, ScoreBreakdown};
use crate::save::format::BuildSave;

/// Resolved ability view for one occupied main slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainSlotResolution {
    /// Slot index (0-2)
    pub slot: usize,
    /// Equipped disc ID
    pub disc_id: String,
    /// Current limit-break tier
    pub tier: u8,
    /// Main ability at the current tier (None if the table has no row)
    pub main_ability: Option<AbilityTier>,
    /// Resolved secondary abilities, one entry per referenced group
    /// (None = inactive under the current note pool)
    pub secondary_abilities: Vec<Option<AbilityTier>>,
}

/// Session-scoped engine state
///
/// Holds the authoritative slot assignments and declared note levels.
/// All derived values (note aggregation, ability resolution, score) are
/// recomputed from current state on every query; nothing derived is
/// cached across mutations.
#[derive(Debug, Clone)]
pub struct PlannerSession {
    data: Arc<GameData>,
    loadout: DiscLoadout,
}

impl PlannerSession {
    /// Create a new session with an empty loadout
    pub fn new(data: Arc<GameData>) -> Self {
        Self { data, loadout: DiscLoadout::new("기본 편성".to_string()) }
    }

    /// Create a session around an existing loadout
    pub fn with_loadout(data: Arc<GameData>, mut loadout: DiscLoadout) -> Self {
        loadout.recompute_required_notes(&data);
        Self { data, loadout }
    }

    /// Lookup tables backing this session
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// Current loadout (read-only; mutate through session methods)
    pub fn loadout(&self) -> &DiscLoadout {
        &self.loadout
    }

    // ========================
    // Mutations
    // ========================

    /// Equip a main disc by ID
    pub fn equip_main(&mut self, slot: usize, disc_id: &str) -> Result<(), String> {
        let Some(disc) = self.data.disc(disc_id) else {
            return Err("존재하지 않는 디스크입니다.".to_string());
        };
        self.loadout.equip_main(slot, disc, &self.data)
    }

    /// Equip a sub disc by ID
    pub fn equip_sub(&mut self, slot: usize, disc_id: &str) -> Result<(), String> {
        let Some(disc) = self.data.disc(disc_id) else {
            return Err("존재하지 않는 디스크입니다.".to_string());
        };
        self.loadout.equip_sub(slot, disc, &self.data)
    }

    /// Clear a main slot; returns the removed disc ID
    pub fn unequip_main(&mut self, slot: usize) -> Option<String> {
        self.loadout.unequip_main(slot, &self.data)
    }

    /// Clear a sub slot; returns the removed disc ID
    pub fn unequip_sub(&mut self, slot: usize) -> Option<String> {
        self.loadout.unequip_sub(slot)
    }

    /// Adjust a main slot's limit-break tier (clamped to 1-6)
    pub fn adjust_tier(&mut self, slot: usize, delta: i32) {
        self.loadout.adjust_tier(slot, delta);
    }

    /// Adjust a sub slot's growth phase (clamped to 0-8)
    pub fn adjust_growth_phase(&mut self, slot: usize, delta: i32) {
        self.loadout.adjust_growth_phase(slot, delta);
    }

    /// Set the total level for a note type; returns the applied total
    pub fn set_note_level(&mut self, note_type: &str, new_total: u32) -> Result<u32, String> {
        self.loadout.set_note_level(note_type, new_total, &self.data)
    }

    // ========================
    // Derived queries
    // ========================

    /// Aggregated note levels (slot contributions + acquired extras)
    pub fn note_levels(&self) -> HashMap<String, u32> {
        aggregate_notes(&self.loadout, &self.data)
    }

    /// Slot-derived note levels alone (without acquired extras)
    pub fn slot_note_levels(&self) -> HashMap<String, u32> {
        slot_note_levels(&self.loadout, &self.data)
    }

    /// Note types required by the equipped main discs (UI highlighting)
    pub fn required_note_types(&self) -> &HashSet<String> {
        &self.loadout.required_note_types
    }

    /// Resolved main/secondary abilities for every occupied main slot
    pub fn resolved_abilities(&self) -> Vec<MainSlotResolution> {
        let note_levels = self.note_levels();
        let mut resolutions = Vec::new();

        for (idx, slot) in self.loadout.main_slots.iter().enumerate() {
            let Some(disc_id) = slot.disc_id.as_deref() else { continue };
            let Some(disc) = self.data.disc(disc_id) else { continue };

            let main_ability = disc
                .main_ability_group
                .as_deref()
                .and_then(|group| resolve_main(group, slot.tier, &self.data))
                .cloned();

            let secondary_abilities = disc
                .secondary_ability_groups
                .iter()
                .map(|group| resolve_secondary(group, &note_levels, &self.data).cloned())
                .collect();

            resolutions.push(MainSlotResolution {
                slot: idx,
                disc_id: disc_id.to_string(),
                tier: slot.tier,
                main_ability,
                secondary_abilities,
            });
        }

        resolutions
    }

    /// Current build score breakdown
    pub fn score(&self) -> ScoreBreakdown {
        compute_score(&self.loadout, &self.data)
    }

    // ========================
    // Persistence
    // ========================

    /// Convert session state to the save format
    pub fn to_save(&self) -> BuildSave {
        BuildSave::from_loadout(&self.loadout)
    }

    /// Restore a session from save data
    ///
    /// Slots are re-applied through the normal equip transitions, so a
    /// save carrying duplicate or unknown disc IDs is rejected. Tier and
    /// growth phase are clamped into their valid ranges.
    pub fn from_save(save: &BuildSave, data: Arc<GameData>) -> Result<Self, String> {
        let mut session = Self::new(data);

        for (idx, slot) in save.main_slots.iter().enumerate().take(3) {
            if let Some(disc_id) = slot.disc_id.as_deref() {
                session.equip_main(idx, disc_id)?;
                session.loadout.main_slots[idx].tier = slot.tier.clamp(1, MAIN_TIER_MAX);
            }
        }
        for (idx, slot) in save.sub_slots.iter().enumerate().take(3) {
            if let Some(disc_id) = slot.disc_id.as_deref() {
                session.equip_sub(idx, disc_id)?;
                session.loadout.sub_slots[idx].growth_phase =
                    slot.growth_phase.min(crate::data::GROWTH_PHASE_MAX);
            }
        }
        for (note_type, extra) in &save.acquired_notes {
            if *extra > 0 {
                session.loadout.acquired_notes.insert(note_type.clone(), *extra);
            }
        }

        session.loadout.recompute_required_notes(&session.data);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::fixtures::sample_data;

    fn session() -> PlannerSession {
        PlannerSession::new(Arc::new(sample_data()))
    }

    #[test]
    fn test_session_equip_and_score() {
        let mut s = session();
        s.equip_main(0, "main_x").unwrap();
        s.equip_sub(0, "sub_a").unwrap();
        s.adjust_growth_phase(0, 2);

        let notes = s.note_levels();
        assert_eq!(notes.get("n1"), Some(&2));

        let score = s.score();
        assert!(score.total > 0.0);
    }

    #[test]
    fn test_session_rejects_unknown_disc() {
        let mut s = session();
        assert!(s.equip_main(0, "ghost_disc").is_err());
        assert!(s.loadout().is_empty());
    }

    #[test]
    fn test_resolved_abilities_per_slot() {
        let mut s = session();
        s.equip_main(0, "main_x").unwrap();
        s.adjust_tier(0, 2);
        s.set_note_level("n1", 2).unwrap();

        let resolutions = s.resolved_abilities();
        assert_eq!(resolutions.len(), 1);

        let r = &resolutions[0];
        assert_eq!(r.slot, 0);
        assert_eq!(r.tier, 3);
        assert_eq!(r.main_ability.as_ref().unwrap().score, 30.0);
        assert_eq!(r.secondary_abilities.len(), 2);
        assert_eq!(r.secondary_abilities[0].as_ref().unwrap().tier, 3); // sec_g
        assert_eq!(r.secondary_abilities[1].as_ref().unwrap().tier, 1); // sec_h
    }

    #[test]
    fn test_save_roundtrip_reproduces_derived_state() {
        let mut s = session();
        s.equip_main(0, "main_x").unwrap();
        s.equip_main(1, "main_y").unwrap();
        s.adjust_tier(1, 4);
        s.equip_sub(0, "sub_a").unwrap();
        s.adjust_growth_phase(0, 4);
        s.equip_sub(1, "sub_b").unwrap();
        s.adjust_growth_phase(1, 1);
        s.set_note_level("n2", 5).unwrap();

        let save = s.to_save();
        let restored = PlannerSession::from_save(&save, Arc::new(sample_data())).unwrap();

        assert_eq!(restored.note_levels(), s.note_levels());
        assert_eq!(restored.score(), s.score());
        assert_eq!(restored.required_note_types(), s.required_note_types());

        let a = s.resolved_abilities();
        let b = restored.resolved_abilities();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.disc_id, y.disc_id);
            assert_eq!(x.tier, y.tier);
            assert_eq!(
                x.secondary_abilities.iter().map(|t| t.as_ref().map(|t| t.tier)).collect::<Vec<_>>(),
                y.secondary_abilities.iter().map(|t| t.as_ref().map(|t| t.tier)).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_from_save_rejects_duplicates() {
        let mut save = BuildSave::new();
        save.main_slots[0].disc_id = Some("main_x".to_string());
        save.main_slots[1].disc_id = Some("main_x".to_string());

        let result = PlannerSession::from_save(&save, Arc::new(sample_data()));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_save_clamps_out_of_range_progress() {
        let mut save = BuildSave::new();
        save.main_slots[0].disc_id = Some("main_x".to_string());
        save.main_slots[0].tier = 99;
        save.sub_slots[0].disc_id = Some("sub_a".to_string());
        save.sub_slots[0].growth_phase = 99;

        let restored = PlannerSession::from_save(&save, Arc::new(sample_data())).unwrap();
        assert_eq!(restored.loadout().main_slots[0].tier, 6);
        assert_eq!(restored.loadout().sub_slots[0].growth_phase, 8);
    }
}
