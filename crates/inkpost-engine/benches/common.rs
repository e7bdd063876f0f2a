// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_post(sections: usize) -> String {
    let base = "<h2>Section</h2><p>Paragraph with <b>bold</b>, <i>italic</i> and a <a href=\"https://example.com\">link</a>.</p><ul><li>First</li><li>Second<ul><li>Nested</li></ul></li></ul><table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>";
    base.repeat(sections)
}

/// Character length of the document text, for picking selection offsets.
#[allow(dead_code)]
pub fn text_len(sections: usize) -> usize {
    "SectionParagraph with bold, italic and a link.FirstSecondNestedabcd"
        .chars()
        .count()
        * sections
}
