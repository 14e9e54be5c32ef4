// 빌드 점수 집계
//
// 보조 어빌리티 점수(장착된 메인 디스크 기준)와 노트 레벨 점수를
// 합산해 총 빌드 점수를 만든다. 반올림 없음.

use serde::{Deserialize, Serialize};

use crate::data::GameData;
use crate::disc::ability::resolve_secondary;
use crate::disc::loadout::DiscLoadout;
use crate::disc::notes::aggregate_notes;

/// 점수 내역
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 해석된 보조 어빌리티 티어 점수 합
    pub secondary_score: f64,
    /// 노트 레벨 점수 합
    pub note_score: f64,
    /// 총점 (secondary + note)
    pub total: f64,
}

/// 현재 편성의 빌드 점수 계산
///
/// 보조 점수: 장착된 각 메인 디스크의 보조 어빌리티 그룹(최대 2개)마다
/// 해석된 티어의 점수를 더한다. 해석 결과가 없으면 0.
/// 노트 점수: 집계 레벨이 0이 아닌 각 노트 타입에 대해
/// `score_by_level[clamp(level, 1, 최대 레벨) - 1]`을 더한다.
pub fn compute_score(loadout: &DiscLoadout, data: &GameData) -> ScoreBreakdown {
    let note_levels = aggregate_notes(loadout, data);

    let mut secondary_score = 0.0;
    for slot in &loadout.main_slots {
        let Some(disc_id) = slot.disc_id.as_deref() else { continue };
        let Some(disc) = data.disc(disc_id) else { continue };
        for group in &disc.secondary_ability_groups {
            if let Some(ability) = resolve_secondary(group, &note_levels, data) {
                secondary_score += ability.score;
            }
        }
    }

    let mut note_score = 0.0;
    for (note_type, level) in &note_levels {
        if let Some(note) = data.note_type(note_type) {
            note_score += note.score_at(*level);
        }
    }

    ScoreBreakdown { secondary_score, note_score, total: secondary_score + note_score }
}
