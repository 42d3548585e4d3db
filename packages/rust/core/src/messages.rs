//! User-facing texts: prompts, document title, mail subject and body.

/// Question prompt shown by the input step.
pub const QUESTION_PROMPT: &str = "Por favor, introduce tu pregunta: ";

/// Recipient prompt shown by the input step.
pub const RECIPIENT_PROMPT: &str = "Ahora, introduce tu correo para recibir la respuesta: ";

/// Plain-text body of the delivery mail.
pub const MAIL_BODY: &str =
    "Hola,\n\nAdjunto encontrarás la respuesta generada por la IA a tu pregunta.\n\nSaludos.";

/// Characters of the question kept in the document title.
pub const TITLE_PREFIX_CHARS: usize = 40;

/// Characters of the question kept in the mail subject.
pub const SUBJECT_PREFIX_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// Prompt asking the model for a one-sentence summary of the question's intent.
pub fn intent_prompt(question: &str) -> String {
    format!(
        "Analiza y resume en una sola frase la intención principal de la siguiente pregunta: '{question}'"
    )
}

/// Title of the rendered document.
pub fn document_title(question: &str) -> String {
    format!(
        "Respuesta a: {}{ELLIPSIS}",
        char_prefix(question, TITLE_PREFIX_CHARS)
    )
}

/// Subject line of the delivery mail.
pub fn mail_subject(question: &str) -> String {
    format!(
        "Respuesta a tu pregunta: '{}{ELLIPSIS}'",
        char_prefix(question, SUBJECT_PREFIX_CHARS)
    )
}

/// First `max` characters of `text`, never splitting a code point.
pub fn char_prefix(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
