//! Static catalog of selectable upstream models.
//!
//! Membership here is the validation gate: no upstream call is made for a
//! model id outside this list.

use crate::types::ModelInfo;

pub const MODELS: &[ModelInfo] = &[
    ModelInfo { id: "openrouter/sonoma-dusk-alpha", name: "Sonoma Dusk Alpha" },
    ModelInfo { id: "nvidia/nemotron-nano-9b-v2:free", name: "NVIDIA: Nemotron Nano 9B V2" },
    ModelInfo { id: "openrouter/sonoma-sky-alpha", name: "Sonoma Sky (Alpha)" },
    ModelInfo { id: "deepseek/deepseek-chat-v3.1:free", name: "DeepSeek: DeepSeek V3.1" },
    ModelInfo { id: "tngtech/deepseek-r1t2-chimera:free", name: "TNG: DeepSeek R1T2 Chimera" },
    ModelInfo { id: "z-ai/glm-4.5-air:free", name: "Z.AI: GLM 4.5 Air" },
    ModelInfo { id: "deepseek/deepseek-r1:free", name: "DeepSeek: R1" },
    ModelInfo { id: "google/gemini-2.0-flash-exp:free", name: "Google: Gemini 2.0 Flash Experimental" },
    ModelInfo { id: "meta-llama/llama-3.3-70b-instruct:free", name: "Meta: Llama 3.3 70B Instruct" },
    ModelInfo { id: "microsoft/mai-ds-r1:free", name: "Microsoft: MAI DS R1" },
];

pub fn contains(id: &str) -> bool {
    MODELS.iter().any(|m| m.id == id)
}
