/*!
 * System prompt shared by every translation provider.
 *
 * The prompt is part of a provider's identity: it is prepended ahead of the
 * caller's text on every request and cannot be overridden, which keeps the
 * terminology consistent across all files of a batch.
 */

/// Domain glossary enforced on every translation, source term to required rendering
pub const GLOSSARY: &[(&str, &str)] = &[
    ("Majnoon", "Majnoon"),
    ("Induction", "入场培训"),
    ("HSE", "健康、安全与环境"),
    ("PPE", "个人防护装备"),
    ("Muster Point", "紧急集合点"),
];

/// System prompt for technical document translation
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    template: String,
}

impl SystemPrompt {
    /// The default translator persona
    pub const TECHNICAL_TRANSLATOR: &'static str = r#"You are a professional translator for the Oil & Gas industry.
Translate the following text from {source_language} to {target_language}.
Rules:
1. Maintain the original tone: professional, safety-first.
2. Terminology:
   - "Majnoon" -> "Majnoon"
   - "Induction" -> "入场培训" (not "感应")
   - "HSE" -> "健康、安全与环境"
   - "PPE" -> "个人防护装备"
   - "Muster Point" -> "紧急集合点"
3. Do NOT translate technical codes (e.g., ISO 45001).
4. Keep the output strictly as the translation, no extra explanations."#;

    /// Create a prompt from a template string
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default technical translator prompt
    pub fn technical_translator() -> Self {
        Self::new(Self::TECHNICAL_TRANSLATOR)
    }

    /// Render the template with the batch's language pair
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::technical_translator()
    }
}
