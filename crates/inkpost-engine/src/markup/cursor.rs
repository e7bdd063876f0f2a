/// A byte cursor over markup source.
///
/// The parser only ever stops on ASCII delimiters (`<`, `>`, `=`, quotes,
/// whitespace), so every index the cursor rests on between tokens is a char
/// boundary and slicing with [`Cursor::slice`] is safe.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The markup being parsed.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.s.len())..].starts_with(pat)
    }

    /// ASCII case-insensitive variant of [`Cursor::starts_with`].
    pub fn starts_with_ignore_case(&self, pat: &[u8]) -> bool {
        let rest = &self.s.as_bytes()[self.i.min(self.s.len())..];
        rest.len() >= pat.len() && rest[..pat.len()].eq_ignore_ascii_case(pat)
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Advances while `pred` holds and returns the consumed slice.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    pub fn skip_whitespace(&mut self) {
        self.eat_while(|b| b.is_ascii_whitespace());
    }

    /// Finds the next occurrence of `pat` at or after the cursor.
    pub fn find(&self, pat: &str) -> Option<usize> {
        self.s[self.i..].find(pat).map(|off| self.i + off)
    }

    /// Case-insensitive search for an ASCII needle.
    pub fn find_ignore_case(&self, pat: &str) -> Option<usize> {
        let hay = self.s.as_bytes();
        let needle = pat.as_bytes();
        if needle.len() > hay.len() {
            return None;
        }
        (self.i..=hay.len() - needle.len())
            .find(|&at| hay[at..at + needle.len()].eq_ignore_ascii_case(needle))
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.s[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basics() {
        let mut cur = Cursor::new("<p>");
        assert_eq!(cur.pos(), 0);
        assert_eq!(cur.peek(), Some(b'<'));
        assert_eq!(cur.peek_at(1), Some(b'p'));
        assert_eq!(cur.bump(), Some(b'<'));
        assert_eq!(cur.pos(), 1);
    }

    #[test]
    fn test_eat_while() {
        let mut cur = Cursor::new("abc12 rest");
        assert_eq!(cur.eat_while(|b| b.is_ascii_alphanumeric()), "abc12");
        cur.skip_whitespace();
        assert_eq!(cur.peek(), Some(b'r'));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        let cur = Cursor::new("</SCRIPT>");
        assert!(cur.starts_with_ignore_case(b"</script"));
        assert!(!cur.starts_with(b"</script"));
    }

    #[test]
    fn test_find_ignore_case() {
        let cur = Cursor::new("var x = 1;</Script>");
        assert_eq!(cur.find_ignore_case("</script"), Some(10));
        assert_eq!(cur.find_ignore_case("</style"), None);
    }

    #[test]
    fn test_bump_n_clamps_at_end() {
        let mut cur = Cursor::new("hi");
        cur.bump_n(10);
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert!(cur.starts_with(b""));
    }
}
