// LLM prompt constants for profile summary phrasing.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Summary rephrasing prompt. Replace `{facts}` and `{grounding_instruction}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Rewrite the following candidate facts as a short professional profile summary of two to four sentences, written in the third person.

FACTS:
{facts}

{grounding_instruction}

Return only the summary paragraph."#;
