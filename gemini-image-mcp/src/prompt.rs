//! Prompt normalization and instruction templates.
//!
//! Every prompt with words in it goes through the text model once, which
//! returns English prompts unchanged and translates everything else. The
//! result is then wrapped in the instruction template for the requested mode
//! before being sent to the image model.

use gemini_image_mcp_common::error::Error;
use tracing::{debug, instrument, warn};

use crate::gemini::ImageModel;

/// Whether a prompt has anything to translate.
///
/// Script alone cannot tell English from French or German, so any prompt
/// with a letter in it qualifies. Digits, emoji and punctuation do not.
pub fn needs_translation(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Return an English version of `prompt`.
///
/// If the translation call fails or comes back empty, the original prompt is
/// used.
#[instrument(level = "debug", skip(model, prompt), fields(len = prompt.len()))]
pub async fn normalize(model: &dyn ImageModel, prompt: &str) -> String {
    let prompt = prompt.trim();
    if !needs_translation(prompt) {
        return prompt.to_string();
    }

    match translate(model, prompt).await {
        Ok(translated) => {
            debug!(translated = %translated, "Prompt normalized");
            translated
        }
        Err(e) => {
            warn!(error = %e, "Translation failed, using original prompt");
            prompt.to_string()
        }
    }
}

async fn translate(model: &dyn ImageModel, prompt: &str) -> Result<String, Error> {
    let answer = model
        .generate_text(&translation_instructions(prompt))
        .await
        .map_err(|e| Error::translation(e.to_string()))?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(Error::translation("model returned an empty translation"));
    }
    Ok(answer.to_string())
}

/// Instruction asking the text model for a faithful English translation.
pub fn translation_instructions(prompt: &str) -> String {
    format!(
        "Translate the image prompt below into English. Translate only: keep the \
meaning, every detail, the tone and any technical terms exactly as they are. \
Do not add, drop or reinterpret anything. If the prompt is already English, \
return it unchanged.\n\n\
Prompt: {prompt}\n\n\
Answer with the English prompt and nothing else."
    )
}

/// Instruction wrapping a text-to-image prompt.
pub fn generation_instructions(prompt: &str) -> String {
    format!(
        "You are an image generation assistant. Produce one image for the request \
below right away; never ask a clarifying question. When the request is vague or \
abstract, pick the most common interpretation and fill in lighting, composition, \
style and color that suit the subject.\n\n\
The image must not contain any text. Do not render words, letters or characters \
from the request in any form, even stylized or partial. If the request mentions \
signs, books, labels or other written objects, show the object without legible \
writing.\n\n\
Request: {prompt}"
    )
}

/// Instruction wrapping an image-to-image edit request.
pub fn transformation_instructions(prompt: &str) -> String {
    format!(
        "You are an image editing assistant. Edit the attached image as requested \
below. Make the change substantial and clearly visible, blend edited areas \
naturally with the rest of the picture, keep everything the request does not \
mention as it is, and keep the overall quality high. Do not add any text to \
the image.\n\n\
Edit request: {prompt}"
    )
}
