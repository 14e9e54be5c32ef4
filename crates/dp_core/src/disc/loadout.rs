// 디스크 장착 편성 시스템
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::{GameData, GROWTH_PHASE_MAX, MAIN_TIER_MAX, SECONDARY_TIER_MAX};
use crate::disc::item::Disc;
use crate::disc::notes::slot_note_levels;

/// 메인 슬롯 수
pub const MAIN_SLOT_COUNT: usize = 3;
/// 서브 슬롯 수
pub const SUB_SLOT_COUNT: usize = 3;

/// 메인 슬롯 상태 (디스크 + 한계 돌파 티어)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainSlot {
    /// 장착된 디스크 ID
    pub disc_id: Option<String>,
    /// 한계 돌파 티어 (1~6)
    pub tier: u8,
}

impl Default for MainSlot {
    fn default() -> Self {
        Self { disc_id: None, tier: 1 }
    }
}

impl MainSlot {
    pub fn is_occupied(&self) -> bool {
        self.disc_id.is_some()
    }
}

/// 서브 슬롯 상태 (디스크 + 성장 단계)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubSlot {
    /// 장착된 디스크 ID
    pub disc_id: Option<String>,
    /// 성장 단계 (0~8)
    pub growth_phase: u8,
}

impl SubSlot {
    pub fn is_occupied(&self) -> bool {
        self.disc_id.is_some()
    }
}

/// 디스크 편성 (메인 3 + 서브 3 = 6칸)
///
/// 엔진의 유일한 가변 상태. 슬롯 배치, 획득 노트 보정치, 파생된
/// 요구 노트 타입 집합을 보관한다. 노트 집계/어빌리티 해석/점수는
/// 저장하지 않고 매번 현재 상태에서 다시 계산한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscLoadout {
    /// 편성 이름
    pub name: String,
    /// 메인 슬롯 (3칸)
    pub main_slots: Vec<MainSlot>,
    /// 서브 슬롯 (3칸)
    pub sub_slots: Vec<SubSlot>,
    /// 획득 노트 보정 레벨 (노트 타입 → 추가 레벨, 0은 저장하지 않음)
    pub acquired_notes: HashMap<String, u32>,
    /// 장착된 메인 디스크가 요구하는 노트 타입 집합 (UI 강조용)
    pub required_note_types: HashSet<String>,
    /// 마지막 수정 시간
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl DiscLoadout {
    /// 새 편성 생성
    pub fn new(name: String) -> Self {
        Self {
            name,
            main_slots: vec![MainSlot::default(), MainSlot::default(), MainSlot::default()],
            sub_slots: vec![SubSlot::default(), SubSlot::default(), SubSlot::default()],
            acquired_notes: HashMap::new(),
            required_note_types: HashSet::new(),
            last_modified: None,
        }
    }

    /// 메인 디스크 장착 (슬롯 0-2)
    ///
    /// 장착 성공 시 해당 슬롯의 티어는 1로 초기화된다.
    pub fn equip_main(
        &mut self,
        slot: usize,
        disc: &Disc,
        data: &GameData,
    ) -> Result<(), String> {
        if slot >= MAIN_SLOT_COUNT {
            return Err("메인 슬롯은 0-2까지입니다.".to_string());
        }
        if !disc.is_main() {
            return Err("메인 디스크만 장착 가능합니다.".to_string());
        }
        if self.occupies_other_slot(&disc.id, true, slot) {
            return Err("동일한 디스크는 중복 장착할 수 없습니다.".to_string());
        }

        self.main_slots[slot] = MainSlot { disc_id: Some(disc.id.clone()), tier: 1 };
        self.recompute_required_notes(data);
        self.touch();
        Ok(())
    }

    /// 서브 디스크 장착 (슬롯 0-2)
    ///
    /// 장착 성공 시 해당 슬롯의 성장 단계는 0으로 초기화된다.
    pub fn equip_sub(&mut self, slot: usize, disc: &Disc, _data: &GameData) -> Result<(), String> {
        if slot >= SUB_SLOT_COUNT {
            return Err("서브 슬롯은 0-2까지입니다.".to_string());
        }
        if !disc.is_sub() {
            return Err("서브 디스크만 장착 가능합니다.".to_string());
        }
        if self.occupies_other_slot(&disc.id, false, slot) {
            return Err("동일한 디스크는 중복 장착할 수 없습니다.".to_string());
        }

        // 서브 슬롯 변경은 요구 노트 집합에 영향을 주지 않는다
        self.sub_slots[slot] = SubSlot { disc_id: Some(disc.id.clone()), growth_phase: 0 };
        self.touch();
        Ok(())
    }

    /// 메인 슬롯 해제. 해제된 디스크 ID를 반환한다.
    pub fn unequip_main(&mut self, slot: usize, data: &GameData) -> Option<String> {
        let removed = self.main_slots.get_mut(slot)?.disc_id.take();
        if let Some(s) = self.main_slots.get_mut(slot) {
            s.tier = 1;
        }
        if removed.is_some() {
            self.recompute_required_notes(data);
            self.touch();
        }
        removed
    }

    /// 서브 슬롯 해제. 해제된 디스크 ID를 반환한다.
    pub fn unequip_sub(&mut self, slot: usize) -> Option<String> {
        let removed = self.sub_slots.get_mut(slot)?.disc_id.take();
        if let Some(s) = self.sub_slots.get_mut(slot) {
            s.growth_phase = 0;
        }
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// 메인 슬롯 티어 조정. 범위(1~6)를 벗어나는 조정은 경계에서 멈춘다.
    pub fn adjust_tier(&mut self, slot: usize, delta: i32) {
        if let Some(s) = self.main_slots.get_mut(slot) {
            if s.is_occupied() {
                let next = (s.tier as i32 + delta).clamp(1, MAIN_TIER_MAX as i32) as u8;
                if next != s.tier {
                    s.tier = next;
                    self.touch();
                }
            }
        }
    }

    /// 서브 슬롯 성장 단계 조정. 범위(0~8)를 벗어나는 조정은 경계에서 멈춘다.
    pub fn adjust_growth_phase(&mut self, slot: usize, delta: i32) {
        if let Some(s) = self.sub_slots.get_mut(slot) {
            if s.is_occupied() {
                let next = (s.growth_phase as i32 + delta).clamp(0, GROWTH_PHASE_MAX as i32) as u8;
                if next != s.growth_phase {
                    s.growth_phase = next;
                    self.touch();
                }
            }
        }
    }

    /// 노트 타입의 총 레벨 지정
    ///
    /// UI는 총 레벨을 편집 대상으로 노출하지만 내부적으로는 슬롯 기여분을
    /// 제외한 보정치만 저장한다. 총 레벨은
    /// `[슬롯 기여 레벨, 정의된 최대 레벨]` 범위로 클램프되며, 실제로
    /// 적용된 총 레벨을 반환한다.
    pub fn set_note_level(
        &mut self,
        note_type: &str,
        new_total: u32,
        data: &GameData,
    ) -> Result<u32, String> {
        let Some(note) = data.note_type(note_type) else {
            return Err("존재하지 않는 노트 타입입니다.".to_string());
        };

        let slot_derived = slot_note_levels(self, data).get(note_type).copied().unwrap_or(0);
        let upper = note.max_level().max(slot_derived);
        let clamped = new_total.clamp(slot_derived, upper);
        let extra = clamped - slot_derived;

        if extra == 0 {
            self.acquired_notes.remove(note_type);
        } else {
            self.acquired_notes.insert(note_type.to_string(), extra);
        }
        self.touch();
        Ok(clamped)
    }

    /// 장착된 모든 디스크 ID 순회 (메인 + 서브)
    pub fn occupied_disc_ids(&self) -> impl Iterator<Item = &str> {
        self.main_slots
            .iter()
            .filter_map(|s| s.disc_id.as_deref())
            .chain(self.sub_slots.iter().filter_map(|s| s.disc_id.as_deref()))
    }

    /// 편성이 완전히 비어 있는지
    pub fn is_empty(&self) -> bool {
        self.occupied_disc_ids().next().is_none() && self.acquired_notes.is_empty()
    }

    /// 다른 슬롯에 이미 장착되어 있는지 확인
    fn occupies_other_slot(&self, disc_id: &str, target_is_main: bool, target_slot: usize) -> bool {
        for (idx, s) in self.main_slots.iter().enumerate() {
            if target_is_main && idx == target_slot {
                continue;
            }
            if s.disc_id.as_deref() == Some(disc_id) {
                return true;
            }
        }
        for (idx, s) in self.sub_slots.iter().enumerate() {
            if !target_is_main && idx == target_slot {
                continue;
            }
            if s.disc_id.as_deref() == Some(disc_id) {
                return true;
            }
        }
        false
    }

    /// 요구 노트 타입 집합 재계산
    ///
    /// 장착된 메인 디스크의 보조 어빌리티 그룹 전 티어를 훑어, 해금
    /// 조건에 등장하는 모든 노트 타입의 합집합을 만든다. 현재 해금
    /// 여부와 무관하며, 점수 계산에는 사용되지 않는다.
    pub fn recompute_required_notes(&mut self, data: &GameData) {
        let mut required = HashSet::new();
        for slot in &self.main_slots {
            let Some(disc_id) = slot.disc_id.as_deref() else { continue };
            let Some(disc) = data.disc(disc_id) else { continue };
            for group in &disc.secondary_ability_groups {
                for tier in 1..=SECONDARY_TIER_MAX {
                    if let Some(ability) = data.secondary_ability(group, tier) {
                        required.extend(ability.required_notes.keys().cloned());
                    }
                }
            }
        }
        self.required_note_types = required;
    }

    /// 편성 요약 정보
    pub fn summary(&self) -> String {
        let slot_name = |id: &Option<String>| -> String {
            id.clone().unwrap_or_else(|| "빈 슬롯".to_string())
        };
        format!(
            "편성: {}\n메인: {}, {}, {}\n서브: {}, {}, {}",
            self.name,
            slot_name(&self.main_slots[0].disc_id),
            slot_name(&self.main_slots[1].disc_id),
            slot_name(&self.main_slots[2].disc_id),
            slot_name(&self.sub_slots[0].disc_id),
            slot_name(&self.sub_slots[1].disc_id),
            slot_name(&self.sub_slots[2].disc_id),
        )
    }

    fn touch(&mut self) {
        self.last_modified = Some(chrono::Utc::now());
    }
}
