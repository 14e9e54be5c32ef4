// Disc Build JSON API Layer
// Connects rendering/UI collaborators to the build engine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::embedded;
use crate::disc::score::ScoreBreakdown;
use crate::save::format::{BuildSave, MainSlotSave, SubSlotSave};
use crate::save::share::{decode_share_code, encode_share_code};
use crate::state::{MainSlotResolution, PlannerSession};

// ========== Request/Response Structures ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub main_slots: Vec<MainSlotSave>,
    #[serde(default)]
    pub sub_slots: Vec<SubSlotSave>,
    #[serde(default)]
    pub acquired_notes: HashMap<String, u32>,
}

impl BuildRequest {
    /// Normalize the request into save form (slots padded/truncated to 3)
    fn to_save(&self) -> BuildSave {
        let mut save = BuildSave::new();
        for (idx, slot) in self.main_slots.iter().take(save.main_slots.len()).enumerate() {
            save.main_slots[idx] = slot.clone();
        }
        for (idx, slot) in self.sub_slots.iter().take(save.sub_slots.len()).enumerate() {
            save.sub_slots[idx] = slot.clone();
        }
        save.acquired_notes = self.acquired_notes.clone();
        save
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildViewResponse {
    pub success: bool,
    /// Aggregated note levels (type -> total)
    pub note_levels: HashMap<String, u32>,
    /// Note types required by equipped main discs, sorted for stable output
    pub required_note_types: Vec<String>,
    /// Per-slot resolved abilities (occupied main slots only)
    pub main_slots: Vec<MainSlotResolution>,
    /// Score breakdown
    pub score: Option<ScoreBreakdown>,
    pub error: Option<String>,
}

impl BuildViewResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            note_levels: HashMap::new(),
            required_note_types: Vec::new(),
            main_slots: Vec::new(),
            score: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareCodeResponse {
    pub success: bool,
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeShareRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeShareResponse {
    pub success: bool,
    /// Restored build state (version/timestamp included)
    pub build: Option<BuildSave>,
    pub error: Option<String>,
}

const FALLBACK_JSON: &str = r#"{"success":false,"error":"response serialization failed"}"#;

fn to_json<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| FALLBACK_JSON.to_string())
}

// ========== Public API Functions ==========

/// Evaluate a build: aggregate notes, resolve abilities, compute the score
///
/// The request carries raw slot/note state; all derived values in the
/// response are recomputed here against the embedded lookup tables.
pub fn evaluate_build_json(request_json: &str) -> String {
    let request: BuildRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => return to_json(&BuildViewResponse::failure(format!("invalid request: {}", e))),
    };
    if request.schema_version != crate::SCHEMA_VERSION {
        return to_json(&BuildViewResponse::failure(format!(
            "unsupported schema version: {}",
            request.schema_version
        )));
    }

    let save = request.to_save();
    let session = match PlannerSession::from_save(&save, embedded::game_data()) {
        Ok(session) => session,
        Err(e) => return to_json(&BuildViewResponse::failure(e)),
    };

    let mut required: Vec<String> = session.required_note_types().iter().cloned().collect();
    required.sort();

    let response = BuildViewResponse {
        success: true,
        note_levels: session.note_levels(),
        required_note_types: required,
        main_slots: session.resolved_abilities(),
        score: Some(session.score()),
        error: None,
    };
    to_json(&response)
}

/// Encode a build as a URL-safe share code
pub fn encode_build_json(request_json: &str) -> String {
    let request: BuildRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            return to_json(&ShareCodeResponse {
                success: false,
                code: None,
                error: Some(format!("invalid request: {}", e)),
            })
        }
    };
    if request.schema_version != crate::SCHEMA_VERSION {
        return to_json(&ShareCodeResponse {
            success: false,
            code: None,
            error: Some(format!("unsupported schema version: {}", request.schema_version)),
        });
    }

    match encode_share_code(&request.to_save()) {
        Ok(code) => to_json(&ShareCodeResponse { success: true, code: Some(code), error: None }),
        Err(e) => {
            to_json(&ShareCodeResponse { success: false, code: None, error: Some(e.to_string()) })
        }
    }
}

/// Decode a share code back into raw build state
pub fn decode_build_json(request_json: &str) -> String {
    let request: DecodeShareRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            return to_json(&DecodeShareResponse {
                success: false,
                build: None,
                error: Some(format!("invalid request: {}", e)),
            })
        }
    };

    // Version and structure checks happen inside the save-format decoder
    match decode_share_code(&request.code) {
        Ok(build) => {
            to_json(&DecodeShareResponse { success: true, build: Some(build), error: None })
        }
        Err(e) => to_json(&DecodeShareResponse {
            success: false,
            build: None,
            error: Some(e.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_build_with_embedded_data() {
        let request = json!({
            "schema_version": 1,
            "main_slots": [
                { "disc_id": "disc_aurora", "tier": 3 }
            ],
            "sub_slots": [
                { "disc_id": "disc_silver_string", "growth_phase": 4 }
            ],
            "acquired_notes": { "beat": 2 }
        });

        let response: BuildViewResponse =
            serde_json::from_str(&evaluate_build_json(&request.to_string())).unwrap();

        assert!(response.success, "{:?}", response.error);
        // ng_strings phase 4: melody 3, rhythm 2, harmony 1 (+ acquired beat 2)
        assert_eq!(response.note_levels.get("melody"), Some(&3));
        assert_eq!(response.note_levels.get("beat"), Some(&2));

        assert_eq!(response.main_slots.len(), 1);
        let slot = &response.main_slots[0];
        assert_eq!(slot.disc_id, "disc_aurora");
        assert_eq!(slot.main_ability.as_ref().unwrap().tier, 3);
        // sec_resonance: melody 3 + rhythm 2 unlock tier 4
        assert_eq!(slot.secondary_abilities[0].as_ref().unwrap().tier, 4);
        // sec_crescendo: beat 2 unlocks tier 3
        assert_eq!(slot.secondary_abilities[1].as_ref().unwrap().tier, 3);

        let score = response.score.unwrap();
        assert_eq!(score.total, score.secondary_score + score.note_score);
        assert!(score.total > 0.0);

        // disc_aurora requires melody/rhythm/harmony (sec_resonance) and
        // beat/chord (sec_crescendo)
        assert!(response.required_note_types.contains(&"melody".to_string()));
        assert!(response.required_note_types.contains(&"chord".to_string()));
    }

    #[test]
    fn test_evaluate_rejects_duplicate_discs() {
        let request = json!({
            "schema_version": 1,
            "main_slots": [
                { "disc_id": "disc_aurora", "tier": 1 },
                { "disc_id": "disc_aurora", "tier": 1 }
            ]
        });

        let response: BuildViewResponse =
            serde_json::from_str(&evaluate_build_json(&request.to_string())).unwrap();
        assert!(!response.success);
        assert!(response.error.is_some());
    }

    #[test]
    fn test_evaluate_rejects_wrong_schema_version() {
        let request = json!({ "schema_version": 99 });
        let response: BuildViewResponse =
            serde_json::from_str(&evaluate_build_json(&request.to_string())).unwrap();
        assert!(!response.success);
    }

    #[test]
    fn test_malformed_request_is_error_response() {
        let response: BuildViewResponse =
            serde_json::from_str(&evaluate_build_json("not json")).unwrap();
        assert!(!response.success);
    }

    #[test]
    fn test_share_code_roundtrip_through_api() {
        let request = json!({
            "schema_version": 1,
            "main_slots": [{ "disc_id": "disc_twilight", "tier": 5 }],
            "sub_slots": [{ "disc_id": "disc_ivory_keys", "growth_phase": 7 }],
            "acquired_notes": { "melody": 1 }
        });

        let encoded: ShareCodeResponse =
            serde_json::from_str(&encode_build_json(&request.to_string())).unwrap();
        assert!(encoded.success);
        let code = encoded.code.unwrap();

        let decode_request = json!({ "code": code });
        let decoded: DecodeShareResponse =
            serde_json::from_str(&decode_build_json(&decode_request.to_string())).unwrap();
        assert!(decoded.success);

        let build = decoded.build.unwrap();
        assert_eq!(build.main_slots[0].disc_id.as_deref(), Some("disc_twilight"));
        assert_eq!(build.main_slots[0].tier, 5);
        assert_eq!(build.sub_slots[0].growth_phase, 7);
        assert_eq!(build.acquired_notes.get("melody"), Some(&1));
    }

    #[test]
    fn test_decode_garbage_code_is_error_response() {
        let decoded: DecodeShareResponse =
            serde_json::from_str(&decode_build_json(r#"{"code":"???"}"#)).unwrap();
        assert!(!decoded.success);
    }
}
