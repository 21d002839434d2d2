//! The extraction prompt.
//!
//! Centralising the prompt here serves two purposes: changing the
//! instructions requires editing exactly one place, and unit tests can
//! inspect the rendered text without calling a model. Both front-ends and
//! every provider adapter must use this exact rendering — the coercer's
//! fence-stripping tolerance is calibrated against it.

/// Instruction template. `{schema}` is replaced with the verbatim schema
/// text; the model sees the `.proto` source exactly as written.
const PROMPT_TEMPLATE: &str = "{schema}
Using the provided content and images, extract data as JSON in adherence to the above schema.
If multiple pages or images are provided, combine the information into a single JSON object.
No talk. JSON only.
";

/// Render the extraction prompt for one schema.
pub fn build_prompt(schema_text: &str) -> String {
    PROMPT_TEMPLATE.replace("{schema}", schema_text)
}
