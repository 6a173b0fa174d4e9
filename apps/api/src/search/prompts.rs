// LLM prompt constants for the chat orchestrator.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Chat phrasing prompt. Replace `{message}`, `{candidates}`, `{draft}` and
/// `{grounding_instruction}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"A recruiter asked: "{message}"

The search returned these candidates, best match first:
{candidates}

Draft answer:
{draft}

Rewrite the draft as a short, friendly reply to the recruiter (at most four sentences). Mention candidates by the exact names listed above and only with the skills listed for them.

{grounding_instruction}"#;

/// Shown when a chat message does not ask for candidates.
pub const CHAT_GUIDANCE: &str = "I can help you find candidates. Try something like \
    \"Python developer with AWS experience\" or \"senior Go engineers with 5 years of experience\".";
