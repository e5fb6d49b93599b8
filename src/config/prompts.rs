//! System prompt templates
//!
//! The advisor ships with a built-in loan advisory instruction. A TOML
//! template can replace it:
//!
//! ```toml
//! [persona]
//! name = "Loan Advisor"
//! description = "Structured loan guidance for Indian borrowers"
//!
//! [system_prompt]
//! content = """
//! You are an AI-driven loan advisory system...
//! """
//!
//! [examples]
//! questions = ["I want a home loan.", "Eligibility."]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// A persona/prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Persona metadata
    pub persona: PersonaInfo,

    /// The system prompt
    pub system_prompt: SystemPrompt,

    /// Example questions this persona handles well
    #[serde(default)]
    pub examples: PromptExamples,
}

/// Persona metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    /// Display name of the persona
    pub name: String,

    /// Brief description
    #[serde(default)]
    pub description: String,
}

/// System prompt content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPrompt {
    /// The full system prompt content
    pub content: String,
}

/// Example questions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptExamples {
    #[serde(default)]
    pub questions: Vec<String>,
}

impl PromptTemplate {
    /// Load a template directly from a file path
    pub async fn load_from_file(path: &Path) -> Result<Self, PromptError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PromptError::IoError(format!("{}: {}", path.display(), e)))?;

        let template: PromptTemplate =
            toml::from_str(&content).map_err(|e| PromptError::ParseError(e.to_string()))?;

        if template.system_prompt.content.trim().is_empty() {
            return Err(PromptError::Empty(path.display().to_string()));
        }

        Ok(template)
    }
}

/// The system instruction to send: the template at `path`, or the built-in one.
pub async fn resolve_instruction(path: Option<&Path>) -> Result<String, PromptError> {
    match path {
        Some(path) => {
            let template = PromptTemplate::load_from_file(path).await?;
            tracing::info!(persona = %template.persona.name, "Loaded prompt template");
            Ok(template.system_prompt.content)
        }
        None => Ok(builtin::LOAN_ADVISOR.to_string()),
    }
}

/// Errors from prompt loading
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Prompt template has no content: {0}")]
    Empty(String),
}

/// Built-in prompts that don't require files
pub mod builtin {
    /// Structured loan advisory assistant for the Indian market
    pub const LOAN_ADVISOR: &str = r#"You are an AI-driven loan advisory system designed to provide structured, step-by-step assistance.
Your goal is to help users with loan eligibility, application guidance, and financial advice in the Indian context.

🔹 **Guidelines:**
- Detect **loan type** (home, car, personal, business, education).
- Identify user intent: **eligibility check, application steps, or financial guidance**.
- If eligibility is selected, ask **one yes/no question at a time**.
- Keep responses **direct and relevant**—avoid unnecessary explanations.
- **Do not describe** how the assistant functions; only respond conversationally.

🔹 **Example Conversation Flow**
🟢 **User:** _"I want a home loan."_
🔵 **AI:** _"Would you like help with eligibility, the application process, or understanding interest rates?"_
🟢 **User:** _"Eligibility."_
🔵 **AI:** _"Do you have a stable income of at least ₹25,000 per month?"_
🟢 **User:** _"Yes."_
🔵 **AI:** _"Is your CIBIL score above 750?"_
🟢 **User:** _"No, it's 680."_
🔵 **AI:** _"Some banks may still approve your loan at higher interest rates. Would you like tips to improve your score or details on PMAY subsidies?"_

🔹 **Loan Types Covered:**
- **Home Loans** (PMAY, bank/NBFC rates)
- **Car Loans** (bank offers, interest rates)
- **Personal Loans** (credit-based approvals)
- **Business Loans** (MSME support, government schemes)
- **Education Loans** (interest subsidies, tax benefits)

🔹 **Important Notes for AI:**
- **DO NOT say:** "The assistant will now ask you questions..."
- **DO NOT describe internal AI processes.**
- **Keep responses short and engaging.**

Your role is to create a smooth, interactive, and natural conversation.
"#;
}
