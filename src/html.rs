/// Minimal HTML entity decoding for attribute values and captions.
pub fn decode_entities_basic(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#64;", "@")
        .replace("&nbsp;", " ")
        // last, so "&amp;lt;" stays "&lt;"
        .replace("&amp;", "&")
}
