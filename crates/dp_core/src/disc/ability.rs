// 어빌리티 해석
//
// 보조 어빌리티는 노트 풀이 해금 조건을 충족하는 최고 티어로 해석되고,
// 메인 어빌리티는 장착 슬롯의 티어로 직접 조회된다.

use std::collections::HashMap;

use crate::data::{AbilityTier, GameData, SECONDARY_TIER_MAX};

/// 보조 어빌리티 해석
///
/// 최고 티어(9)부터 1까지 내림차순으로 훑으며, 해금 조건이 있는 티어는
/// 조건의 **모든** 항목이 `노트 레벨 >= 요구 레벨`일 때만 후보가 된다.
/// 조건이 없는 티어는 티어 번호가 정확히 1일 때만 기본 해금 후보다.
/// 처음 만나는 후보가 결과이며 그 자리에서 탐색을 멈춘다. 어떤 티어도
/// 충족되지 않으면 None (어빌리티 비활성).
pub fn resolve_secondary<'a>(
    group: &str,
    note_levels: &HashMap<String, u32>,
    data: &'a GameData,
) -> Option<&'a AbilityTier> {
    for tier in (1..=SECONDARY_TIER_MAX).rev() {
        let Some(ability) = data.secondary_ability(group, tier) else { continue };

        let unlocked = if ability.required_notes.is_empty() {
            tier == 1
        } else {
            ability
                .required_notes
                .iter()
                .all(|(note_type, min)| note_levels.get(note_type).copied().unwrap_or(0) >= *min)
        };

        if unlocked {
            tracing::trace!(group, tier, "secondary ability resolved");
            return Some(ability);
        }
    }
    None
}

/// 메인 어빌리티 해석 (티어 직접 조회, 해금 조건 없음)
pub fn resolve_main<'a>(group: &str, tier: u8, data: &'a GameData) -> Option<&'a AbilityTier> {
    data.main_ability(group, tier)
}
