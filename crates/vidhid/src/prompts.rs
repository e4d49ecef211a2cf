//! Prompt rendering and fixed user-facing answers.

use vidhi_common::RetrievedChunk;

/// Answer returned when retrieval finds nothing.
pub const NO_RESULTS_ANSWER: &str = "I couldn't find relevant information in the compliance documents. Please try rephrasing your question or consult with a qualified CA.";

/// Answer returned when query processing fails outright.
pub const PROCESSING_ERROR_ANSWER: &str = "I encountered an error processing your question. Please try again or contact support.";

/// Characters of context quoted in the fallback answer.
const FALLBACK_EXCERPT_CHARS: usize = 200;

/// Render the consultant prompt for one question over assembled context.
pub fn render_query_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are an expert Indian tax and compliance consultant specializing in GST, Income Tax, and business regulations for SMEs (Small and Medium Enterprises).

Context Information:
{context}

User Question: {question}

Instructions:
1. Provide accurate, actionable advice based on the context
2. Always cite specific sections, rules, or dates when available
3. If discussing deadlines, mention the exact due dates
4. If mentioning penalties, specify the amounts
5. Keep responses concise but complete
6. If the context doesn't contain enough information, say so clearly
7. Focus on practical implications for SME business owners

Answer:"#
    )
}

/// Join retrieved chunks into the prompt context block, numbered from one.
pub fn assemble_context(chunks: &[RetrievedChunk]) -> String {
    let parts: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Source {}: {}", i + 1, chunk.text))
        .collect();
    parts.join("\n\n")
}

/// Local answer used when the language model is unreachable. Quotes the
/// question and the first 200 characters of the context.
pub fn fallback_answer(question: &str, context: &str) -> String {
    let excerpt: String = context.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    format!(
        r#"Based on the provided context, here's what I found regarding your question about "{question}":

{excerpt}...

Please note: This is a fallback response generated while the language model was unavailable.

Key points from the context:
- Information is available in the compliance documents
- For detailed advice, please consult with a qualified CA
- Always verify current rates and deadlines with official sources"#
    )
}
