//! 게임 데이터 테이블 로딩
//!
//! 원본 JSON 테이블을 파싱하여 조회용 복합 키 맵을 한 번만 구축합니다.
//! 잘못된 필드 값(숫자가 아닌 레벨/점수)은 로드 시점에 보수적인 값으로
//! 치환되며, 다른 행에는 영향을 주지 않습니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::disc::item::Disc;
use crate::error::{CoreError, Result};

/// 메인 어빌리티 최대 티어 (한계 돌파 1~6)
pub const MAIN_TIER_MAX: u8 = 6;
/// 보조 어빌리티 최대 티어 (해금 랭크 1~9)
pub const SECONDARY_TIER_MAX: u8 = 9;
/// 서브 디스크 최대 성장 단계 (0~8, "1+" ~ "80+")
pub const GROWTH_PHASE_MAX: u8 = 8;

/// 디스크당 보조 어빌리티 그룹 상한
pub const MAX_SECONDARY_GROUPS: usize = 2;

/// 어빌리티 티어 레코드
///
/// `(group, tier)` 복합 키로 조회된다. 보조 어빌리티만
/// `required_notes` 해금 조건을 가진다 (비어 있으면 조건 없음).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityTier {
    pub group: String,
    pub tier: u8,
    pub score: f64,
    #[serde(default)]
    pub required_notes: HashMap<String, u32>,
}

/// 노트 타입 정의
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteType {
    pub id: String,
    pub name: String,
    /// 레벨별 점수 (index 0 = 레벨 1). 최대 레벨 = 배열 길이.
    pub score_by_level: Vec<f64>,
}

impl NoteType {
    pub fn max_level(&self) -> u32 {
        self.score_by_level.len() as u32
    }

    /// 레벨에 해당하는 점수. 정의된 범위를 넘는 레벨은 최대 레벨로
    /// 클램프하여 읽는다 (외삽하지 않음). 레벨 0은 0점.
    pub fn score_at(&self, level: u32) -> f64 {
        if level == 0 || self.score_by_level.is_empty() {
            return 0.0;
        }
        let idx = level.min(self.max_level()) as usize - 1;
        self.score_by_level[idx]
    }
}

// ============================================================================
// 원본 테이블 행 (파싱 전용)
// ============================================================================

#[derive(Debug, Deserialize)]
struct AbilityRow {
    group: String,
    tier: u8,
    #[serde(default)]
    score: Value,
    #[serde(default)]
    required_notes: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct NoteTypeRow {
    id: String,
    name: String,
    #[serde(default)]
    score_by_level: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PromotionRow {
    note_group: String,
    phase: u8,
    #[serde(default)]
    notes: HashMap<String, Value>,
}

/// 점수 필드 정리. 숫자가 아니면 0점 처리.
fn sanitize_score(value: &Value, context: &str) -> f64 {
    match value.as_f64() {
        Some(score) => score,
        None => {
            log::warn!("non-numeric score in {}, treating as 0", context);
            0.0
        }
    }
}

/// 해금 조건 레벨 정리. 숫자가 아니면 충족 불가능한 값으로 치환.
fn sanitize_required_level(value: &Value, context: &str) -> u32 {
    match value.as_u64() {
        Some(level) => level.min(u32::MAX as u64) as u32,
        None => {
            log::warn!("non-numeric required level in {}, treating as unsatisfiable", context);
            u32::MAX
        }
    }
}

/// 노트 기여 레벨 정리. 숫자가 아니면 기여 0 처리.
fn sanitize_contribution(value: &Value, context: &str) -> u32 {
    match value.as_u64() {
        Some(level) => level.min(u32::MAX as u64) as u32,
        None => {
            log::warn!("non-numeric note contribution in {}, treating as 0", context);
            0
        }
    }
}

// ============================================================================
// GameData
// ============================================================================

/// 로드 완료된 전체 게임 데이터 (읽기 전용 조회 테이블)
///
/// 엔진의 모든 파생 계산은 이 테이블을 참조한다. 세션 상태와 달리
/// 수정되지 않으며, 조회는 전부 복합 키 맵으로 수행된다.
#[derive(Debug, Clone)]
pub struct GameData {
    discs: HashMap<String, Disc>,
    main_abilities: HashMap<(String, u8), AbilityTier>,
    secondary_abilities: HashMap<(String, u8), AbilityTier>,
    note_types: HashMap<String, NoteType>,
    promotions: HashMap<(String, u8), HashMap<String, u32>>,
}

impl GameData {
    /// 5개 JSON 테이블에서 GameData 구축
    ///
    /// 테이블 구조 자체가 깨진 경우(JSON 문법 오류 등)만 에러를 반환하며,
    /// 개별 필드 값의 오류는 보수적인 값으로 치환된다.
    pub fn from_json(
        discs_json: &str,
        main_abilities_json: &str,
        secondary_abilities_json: &str,
        note_types_json: &str,
        promotions_json: &str,
    ) -> Result<Self> {
        let disc_rows: Vec<Disc> = serde_json::from_str(discs_json)
            .map_err(|e| CoreError::ParseError(format!("disc table: {}", e)))?;
        let main_rows: Vec<AbilityRow> = serde_json::from_str(main_abilities_json)
            .map_err(|e| CoreError::ParseError(format!("main ability table: {}", e)))?;
        let secondary_rows: Vec<AbilityRow> = serde_json::from_str(secondary_abilities_json)
            .map_err(|e| CoreError::ParseError(format!("secondary ability table: {}", e)))?;
        let note_rows: Vec<NoteTypeRow> = serde_json::from_str(note_types_json)
            .map_err(|e| CoreError::ParseError(format!("note type table: {}", e)))?;
        let promotion_rows: Vec<PromotionRow> = serde_json::from_str(promotions_json)
            .map_err(|e| CoreError::ParseError(format!("promotion table: {}", e)))?;

        let mut discs = HashMap::new();
        for mut disc in disc_rows {
            if disc.secondary_ability_groups.len() > MAX_SECONDARY_GROUPS {
                log::warn!(
                    "disc {} has {} secondary ability groups, keeping first {}",
                    disc.id,
                    disc.secondary_ability_groups.len(),
                    MAX_SECONDARY_GROUPS
                );
                disc.secondary_ability_groups.truncate(MAX_SECONDARY_GROUPS);
            }
            discs.insert(disc.id.clone(), disc);
        }

        let main_abilities = build_ability_map(main_rows);
        let secondary_abilities = build_ability_map(secondary_rows);

        let mut note_types = HashMap::new();
        for row in note_rows {
            let context = format!("note type {}", row.id);
            let score_by_level =
                row.score_by_level.iter().map(|v| sanitize_score(v, &context)).collect();
            note_types.insert(
                row.id.clone(),
                NoteType { id: row.id, name: row.name, score_by_level },
            );
        }

        let mut promotions = HashMap::new();
        for row in promotion_rows {
            let context = format!("promotion {}/{}", row.note_group, row.phase);
            let contributions: HashMap<String, u32> = row
                .notes
                .iter()
                .map(|(id, v)| (id.clone(), sanitize_contribution(v, &context)))
                .collect();
            promotions.insert((row.note_group, row.phase), contributions);
        }

        Ok(Self { discs, main_abilities, secondary_abilities, note_types, promotions })
    }

    /// 디스크 조회
    pub fn disc(&self, id: &str) -> Option<&Disc> {
        self.discs.get(id)
    }

    /// 등록된 전체 디스크 순회 (UI 목록용)
    pub fn discs(&self) -> impl Iterator<Item = &Disc> {
        self.discs.values()
    }

    /// 메인 어빌리티 `(group, tier)` 조회
    pub fn main_ability(&self, group: &str, tier: u8) -> Option<&AbilityTier> {
        self.main_abilities.get(&(group.to_string(), tier))
    }

    /// 보조 어빌리티 `(group, tier)` 조회
    pub fn secondary_ability(&self, group: &str, tier: u8) -> Option<&AbilityTier> {
        self.secondary_abilities.get(&(group.to_string(), tier))
    }

    /// 노트 타입 조회
    pub fn note_type(&self, id: &str) -> Option<&NoteType> {
        self.note_types.get(id)
    }

    /// 승급 테이블 `(note_group, phase)` 조회. 정의되지 않은 단계는 None.
    pub fn promotion(&self, note_group: &str, phase: u8) -> Option<&HashMap<String, u32>> {
        self.promotions.get(&(note_group.to_string(), phase))
    }
}

fn build_ability_map(rows: Vec<AbilityRow>) -> HashMap<(String, u8), AbilityTier> {
    let mut map = HashMap::new();
    for row in rows {
        let context = format!("ability {}/{}", row.group, row.tier);
        let score = sanitize_score(&row.score, &context);
        let required_notes: HashMap<String, u32> = row
            .required_notes
            .unwrap_or_default()
            .iter()
            .map(|(id, v)| (id.clone(), sanitize_required_level(v, &context)))
            .collect();
        map.insert(
            (row.group.clone(), row.tier),
            AbilityTier { group: row.group, tier: row.tier, score, required_notes },
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = "[]";

    #[test]
    fn test_composite_key_lookup() {
        let secondaries = r#"[
            { "group": "sec_a", "tier": 1, "score": 5 },
            { "group": "sec_a", "tier": 3, "score": 20, "required_notes": { "n1": 2 } }
        ]"#;
        let data = GameData::from_json(EMPTY, EMPTY, secondaries, EMPTY, EMPTY).unwrap();

        let tier3 = data.secondary_ability("sec_a", 3).unwrap();
        assert_eq!(tier3.score, 20.0);
        assert_eq!(tier3.required_notes.get("n1"), Some(&2));

        // 정의되지 않은 티어는 에러가 아닌 None
        assert!(data.secondary_ability("sec_a", 2).is_none());
        assert!(data.secondary_ability("sec_missing", 1).is_none());
    }

    #[test]
    fn test_malformed_score_treated_as_zero() {
        let mains = r#"[{ "group": "main_a", "tier": 1, "score": "oops" }]"#;
        let data = GameData::from_json(EMPTY, mains, EMPTY, EMPTY, EMPTY).unwrap();
        assert_eq!(data.main_ability("main_a", 1).unwrap().score, 0.0);
    }

    #[test]
    fn test_malformed_required_level_unsatisfiable() {
        let secondaries = r#"[
            { "group": "sec_a", "tier": 2, "score": 10, "required_notes": { "n1": "broken", "n2": 1 } }
        ]"#;
        let data = GameData::from_json(EMPTY, EMPTY, secondaries, EMPTY, EMPTY).unwrap();
        let tier = data.secondary_ability("sec_a", 2).unwrap();
        // 깨진 항목만 충족 불가 값이 되고 나머지는 그대로 유지
        assert_eq!(tier.required_notes.get("n1"), Some(&u32::MAX));
        assert_eq!(tier.required_notes.get("n2"), Some(&1));
    }

    #[test]
    fn test_malformed_contribution_treated_as_zero() {
        let promotions = r#"[
            { "note_group": "ng_a", "phase": 0, "notes": { "n1": "bad", "n2": 2 } }
        ]"#;
        let data = GameData::from_json(EMPTY, EMPTY, EMPTY, EMPTY, promotions).unwrap();
        let row = data.promotion("ng_a", 0).unwrap();
        assert_eq!(row.get("n1"), Some(&0));
        assert_eq!(row.get("n2"), Some(&2));
    }

    #[test]
    fn test_excess_secondary_groups_truncated() {
        let discs = r#"[{
            "id": "d1", "name": "D1", "element": "fire", "rarity": "SR",
            "main_ability_group": "main_a",
            "secondary_ability_groups": ["s1", "s2", "s3"]
        }]"#;
        let data = GameData::from_json(discs, EMPTY, EMPTY, EMPTY, EMPTY).unwrap();
        assert_eq!(data.disc("d1").unwrap().secondary_ability_groups.len(), 2);
    }

    #[test]
    fn test_note_type_score_clamp() {
        let notes = r#"[{ "id": "n1", "name": "N1", "score_by_level": [10, 20, 30] }]"#;
        let data = GameData::from_json(EMPTY, EMPTY, EMPTY, notes, EMPTY).unwrap();
        let n1 = data.note_type("n1").unwrap();
        assert_eq!(n1.max_level(), 3);
        assert_eq!(n1.score_at(2), 20.0);
        assert_eq!(n1.score_at(99), 30.0); // 범위 초과는 최대 레벨로 클램프
        assert_eq!(n1.score_at(0), 0.0);
    }

    #[test]
    fn test_broken_table_is_parse_error() {
        let result = GameData::from_json("not json", EMPTY, EMPTY, EMPTY, EMPTY);
        assert!(matches!(result, Err(CoreError::ParseError(_))));
    }
}
