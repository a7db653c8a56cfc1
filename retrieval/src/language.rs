//! Best-effort query language detection.
//!
//! Detection is by dominant Unicode script, which is cheap, dependency-free,
//! and good enough to drive a small ranking bonus. Mixed or unrecognized
//! input yields `None`, which disables the language bonus entirely.

/// Detect the dominant language of a query from its script.
pub fn detect(text: &str) -> Option<&'static str> {
    let mut latin = 0usize;
    let mut devanagari = 0usize;
    let mut arabic = 0usize;
    let mut cyrillic = 0usize;
    let mut cjk = 0usize;

    for c in text.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' => latin += 1,
            '\u{0900}'..='\u{097F}' => devanagari += 1,
            '\u{0600}'..='\u{06FF}' => arabic += 1,
            '\u{0400}'..='\u{04FF}' => cyrillic += 1,
            '\u{4E00}'..='\u{9FFF}' | '\u{3040}'..='\u{30FF}' => cjk += 1,
            _ => {}
        }
    }

    let totals = [
        ("en", latin),
        ("hi", devanagari),
        ("ar", arabic),
        ("ru", cyrillic),
        ("zh", cjk),
    ];
    let (tag, count) = totals
        .iter()
        .max_by_key(|(_, count)| *count)
        .copied()?;
    (count > 0).then_some(tag)
}
