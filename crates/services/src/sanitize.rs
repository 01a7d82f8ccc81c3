//! Post-processing for raw model output.
//!
//! Models occasionally wrap the document in a markdown code fence despite the
//! system instruction; the fence is stripped before the document is stored or
//! previewed.

use regex::Regex;

/// Strip a leading code-fence opener and a trailing fence marker, then trim
/// outer whitespace. Logs a warning when the result does not look like a
/// complete HTML document; the value is still returned as-is.
pub fn clean_generated_html(raw: &str) -> String {
    let opener = Regex::new(r"^\s*```[a-zA-Z]*[ \t]*\r?\n?").unwrap();
    let closer = Regex::new(r"\r?\n?[ \t]*```\s*$").unwrap();

    let cleaned = opener.replace(raw, "");
    let cleaned = closer.replace(&cleaned, "");
    let cleaned = cleaned.trim().to_string();

    if !cleaned.starts_with("<!DOCTYPE html") {
        tracing::warn!("generated document does not start with <!DOCTYPE html>");
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_fence_and_whitespace() {
        let raw = "  \n```html\n<!DOCTYPE html><html></html>\n```  \n";
        assert_eq!(clean_generated_html(raw), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n<!DOCTYPE html><html></html>\n```";
        assert_eq!(clean_generated_html(raw), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn unfenced_output_is_only_trimmed() {
        let raw = "\n<!DOCTYPE html>\n<html></html>\n";
        assert_eq!(clean_generated_html(raw), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn non_document_output_is_returned_unchanged() {
        // The doctype check is observability only; callers are not blocked.
        assert_eq!(clean_generated_html("<div>partial</div>"), "<div>partial</div>");
    }
}
