/// Sanitizes user-supplied rich text (course descriptions, text lessons).
///
/// Whitelist based: safe formatting tags like <b> and <p> survive, while
/// <script>, <iframe> and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
