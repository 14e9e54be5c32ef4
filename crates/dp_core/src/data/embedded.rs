//! 임베딩된 기본 게임 데이터
//!
//! `include_str!` 매크로를 사용하여 컴파일 시점에 JSON 테이블을 바이너리에
//! 포함합니다. 런타임에 파일 I/O 없이 즉시 사용 가능합니다.
//!
//! ## 임베딩된 파일
//! - cache_discs.v1.json (디스크 테이블)
//! - cache_main_abilities.v1.json (메인 어빌리티 테이블)
//! - cache_secondary_abilities.v1.json (보조 어빌리티 테이블)
//! - cache_note_types.v1.json (노트 타입 테이블)
//! - cache_promotions.v1.json (승급 테이블)

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::tables::GameData;

// ============================================================================
// 임베딩된 JSON 데이터 (컴파일 시점에 바이너리에 포함)
// ============================================================================

/// 디스크 테이블 JSON
pub const DISCS_JSON: &str = include_str!("../../../../data/exports/cache_discs.v1.json");

/// 메인 어빌리티 테이블 JSON
pub const MAIN_ABILITIES_JSON: &str =
    include_str!("../../../../data/exports/cache_main_abilities.v1.json");

/// 보조 어빌리티 테이블 JSON
pub const SECONDARY_ABILITIES_JSON: &str =
    include_str!("../../../../data/exports/cache_secondary_abilities.v1.json");

/// 노트 타입 테이블 JSON
pub const NOTE_TYPES_JSON: &str =
    include_str!("../../../../data/exports/cache_note_types.v1.json");

/// 승급 테이블 JSON
pub const PROMOTIONS_JSON: &str =
    include_str!("../../../../data/exports/cache_promotions.v1.json");

static GAME_DATA: Lazy<Arc<GameData>> = Lazy::new(|| {
    let data = GameData::from_json(
        DISCS_JSON,
        MAIN_ABILITIES_JSON,
        SECONDARY_ABILITIES_JSON,
        NOTE_TYPES_JSON,
        PROMOTIONS_JSON,
    )
    .expect("embedded game data tables must parse");
    Arc::new(data)
});

/// 임베딩된 기본 게임 데이터 로드
///
/// 최초 호출 시 JSON 파싱, 이후 캐시된 데이터 반환. 엔진의 모든 파생
/// 계산은 테이블이 준비된 뒤에만 호출될 수 있으며, 이 접근자가 그
/// 준비 게이트 역할을 한다.
///
/// # Panics
///
/// 임베딩된 JSON이 테이블 구조 수준에서 깨져 있으면 패닉합니다.
/// (컴파일 시점에 포함되는 데이터이므로 배포 전에 잡힙니다.)
pub fn game_data() -> Arc<GameData> {
    Arc::clone(&GAME_DATA)
}
