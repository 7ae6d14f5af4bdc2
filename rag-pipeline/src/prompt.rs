//! Prompt builder: fixed QA instruction plus a question/context user message.

use ai_llm_service::ChatMessage;

/// System instruction for concise, grounded answers.
pub const QA_SYSTEM: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// Separator placed between passages inside the context block.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Joins passage texts in ranked order.
pub fn build_context<S: AsRef<str>>(passages: &[S]) -> String {
    passages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}

/// Renders the user message. The question is inserted verbatim.
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\nContext: {context}\nAnswer:")
}

/// Builds the `[system, user]` message pair for a question and its passages.
///
/// An empty passage list yields an empty context.
///
/// # Example
/// ```
/// # use rag_pipeline::prompt::assemble_messages;
/// let msgs = assemble_messages("What is GDPR?", &["GDPR is a regulation."]);
/// assert_eq!(msgs.len(), 2);
/// assert!(msgs[1].content.contains("What is GDPR?"));
/// ```
pub fn assemble_messages<S: AsRef<str>>(question: &str, passages: &[S]) -> Vec<ChatMessage> {
    let context = build_context(passages);
    vec![
        ChatMessage::system(QA_SYSTEM),
        ChatMessage::user(build_user_prompt(question, &context)),
    ]
}
