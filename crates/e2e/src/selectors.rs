//! Selector builders for the Playwright selector dialect

/// Element whose text is exactly `text`: `text="..."`
pub fn text(text: &str) -> String {
    format!("text={}", quote(text))
}

/// `<element>[data-qa="<qa>"]`
pub fn data_qa(element: &str, qa: &str) -> String {
    format!("{}[data-qa={}]", element, quote(qa))
}

/// `<element>:has-text("...")`, substring and case-insensitive
pub fn has_text(element: &str, text: &str) -> String {
    format!("{}:has-text({})", element, quote(text))
}

/// `<element>[<attribute>="<value>"]`
pub fn attr(element: &str, attribute: &str, value: &str) -> String {
    format!("{}[{}={}]", element, attribute, quote(value))
}

/// The header link naming the logged-in user
pub fn logged_in_as(username: &str) -> String {
    has_text("a", &format!("Logged in as {}", username))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
