// 노트 레벨 집계
//
// 장착된 서브 디스크의 승급 기여와 획득 노트 보정치를 하나의
// 노트 타입별 레벨 맵으로 합산한다. 순수 함수이며 상태를 남기지 않는다.

use std::collections::HashMap;

use crate::data::GameData;
use crate::disc::loadout::DiscLoadout;

/// 슬롯 기여분만 집계 (획득 노트 보정 제외)
///
/// 각 서브 슬롯의 `(note_group, growth_phase)` 승급 행을 조회해 노트
/// 타입별로 합산한다. 승급 행이 정의되지 않은 단계는 기여 없음으로
/// 처리한다 (에러 아님).
pub fn slot_note_levels(loadout: &DiscLoadout, data: &GameData) -> HashMap<String, u32> {
    let mut levels: HashMap<String, u32> = HashMap::new();

    for slot in &loadout.sub_slots {
        let Some(disc_id) = slot.disc_id.as_deref() else { continue };
        let Some(disc) = data.disc(disc_id) else { continue };
        let Some(note_group) = disc.note_group.as_deref() else { continue };
        let Some(contributions) = data.promotion(note_group, slot.growth_phase) else { continue };

        for (note_type, level) in contributions {
            *levels.entry(note_type.clone()).or_insert(0) += level;
        }
    }

    levels
}

/// 전체 노트 레벨 집계 (슬롯 기여 + 획득 노트 보정)
///
/// 슬롯 기여가 없는 노트 타입의 보정치도 포함되며, 합계가 0인 항목은
/// 결과에 나타나지 않는다 (소비자는 부재와 0을 동일하게 취급한다).
pub fn aggregate_notes(loadout: &DiscLoadout, data: &GameData) -> HashMap<String, u32> {
    let mut levels = slot_note_levels(loadout, data);

    for (note_type, extra) in &loadout.acquired_notes {
        *levels.entry(note_type.clone()).or_insert(0) += extra;
    }

    levels.retain(|_, level| *level > 0);
    levels
}
