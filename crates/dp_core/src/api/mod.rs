pub mod build_json;

pub use build_json::{
    decode_build_json, encode_build_json, evaluate_build_json, BuildRequest, BuildViewResponse,
    DecodeShareRequest, DecodeShareResponse, ShareCodeResponse,
};
