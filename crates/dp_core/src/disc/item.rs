// 디스크 아이템 데이터 구조
use serde::{Deserialize, Serialize};

/// 속성 (원소 친화도)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Wind,
    Light,
    Dark,
}

impl Element {
    /// 속성 아이콘
    pub fn icon(&self) -> &'static str {
        match self {
            Element::Fire => "🔥",
            Element::Water => "💧",
            Element::Wind => "🌪️",
            Element::Light => "✨",
            Element::Dark => "🌑",
        }
    }

    /// 속성 색상 (UI용)
    pub fn color(&self) -> &'static str {
        match self {
            Element::Fire => "red",
            Element::Water => "blue",
            Element::Wind => "green",
            Element::Light => "yellow",
            Element::Dark => "purple",
        }
    }
}

/// 디스크 레어도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rarity {
    R,
    Sr,
    Ssr,
}

impl Rarity {
    /// 레어도 별 개수
    pub fn stars(&self) -> u8 {
        match self {
            Rarity::R => 1,
            Rarity::Sr => 2,
            Rarity::Ssr => 3,
        }
    }

    /// 레어도 이모지
    pub fn emoji(&self) -> &'static str {
        match self {
            Rarity::R => "⭐",
            Rarity::Sr => "⭐⭐",
            Rarity::Ssr => "⭐⭐⭐",
        }
    }
}

/// 디스크 아이템 (외부 데이터 테이블에서 공급, 불변)
///
/// 메인 디스크는 `main_ability_group`과 최대 2개의 보조 어빌리티 그룹을
/// 가지며, 서브 디스크는 `note_group`만 가진다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disc {
    /// 디스크 고유 ID
    pub id: String,
    /// 디스크 이름
    pub name: String,
    /// 속성
    pub element: Element,
    /// 레어도
    pub rarity: Rarity,
    /// 메인 어빌리티 그룹 (메인 디스크 전용)
    #[serde(default)]
    pub main_ability_group: Option<String>,
    /// 보조 어빌리티 그룹 참조 (0~2개)
    #[serde(default)]
    pub secondary_ability_groups: Vec<String>,
    /// 노트 그룹 (서브 디스크 전용)
    #[serde(default)]
    pub note_group: Option<String>,
}

impl Disc {
    /// 메인 슬롯 장착 가능 여부
    pub fn is_main(&self) -> bool {
        self.main_ability_group.is_some()
    }

    /// 서브 슬롯 장착 가능 여부
    pub fn is_sub(&self) -> bool {
        self.note_group.is_some()
    }

    /// 디스크 표시 문자열
    pub fn display(&self) -> String {
        format!("{} {} {}", self.rarity.emoji(), self.name, self.element.icon())
    }
}
