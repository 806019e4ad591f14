pub struct ClaudeModels;

impl ClaudeModels {
    pub const OPUS_4: &'static str = "claude-opus-4-20250514";
    pub const SONNET_4: &'static str = "claude-sonnet-4-20250514";
    pub const SONNET_3_7: &'static str = "claude-3-7-sonnet-20250219";
    pub const HAIKU_3_5: &'static str = "claude-3-5-haiku-20241022";
    pub const SONNET_3_5_V2: &'static str = "claude-3-5-sonnet-20241022";

    /// Expand a short alias (`sonnet-4`, `haiku-3.5`, ...) to a dated model id.
    /// Anything else is passed through as a full id.
    pub fn resolve(name: &str) -> String {
        match name.to_ascii_lowercase().as_str() {
            "opus-4" | "opus" => Self::OPUS_4,
            "sonnet-4" | "sonnet" => Self::SONNET_4,
            "sonnet-3.7" => Self::SONNET_3_7,
            "haiku-3.5" | "haiku" => Self::HAIKU_3_5,
            "sonnet-3.5" => Self::SONNET_3_5_V2,
            _ => name,
        }
        .to_string()
    }
}
