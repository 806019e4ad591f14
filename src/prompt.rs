use crate::model::GeneratedQuestion;
use schemars::schema_for;

/// Render the quiz instruction for a topic and difficulty. Any strings are accepted.
pub fn render(topic: &str, difficulty: &str) -> String {
    format!(
        "Generate 5 {difficulty} multiple-choice questions about {topic}. \
         Format as JSON: [{{\"id\":\"uuid\",\"question\":\"text\",\"options\":[\"a\",\"b\",\"c\",\"d\"],\"correct_answer\":\"a\"}}]"
    )
}

/// [`render`] followed by the JSON schema of a single question.
pub fn render_with_schema(topic: &str, difficulty: &str) -> String {
    let schema = schema_for!(GeneratedQuestion);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n\n## Response Format\nReply with one JSON array whose items match this schema:\n```json\n{}\n```",
        render(topic, difficulty),
        schema_json
    )
}
