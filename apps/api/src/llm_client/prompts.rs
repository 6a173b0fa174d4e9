// Shared prompt fragments. Each service that needs LLM calls defines its own prompts.rs
// alongside it and composes these in.

/// System prompt fragment that enforces plain prose output.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a precise recruiting assistant. \
    Respond with plain prose only. \
    Do NOT use markdown, bullet lists, headings or code fences. \
    Do NOT include explanations, apologies or preambles.";

/// Appended to every prompt that rewords structured facts.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only the facts listed above. Do NOT add skills, certifications, \
    employers, names or numbers that are not in the list. If a fact is not listed, omit it. \
    Keep every listed skill and certification name spelled exactly as given.";
