// 디스크 빌드 시스템
// 장착 편성, 노트 경제, 어빌리티 해금, 빌드 점수 집계

pub mod ability;
pub mod item;
pub mod loadout;
pub mod notes;
pub mod score;

pub use ability::*;
pub use item::*;
pub use loadout::*;
pub use notes::*;
pub use score::*;
