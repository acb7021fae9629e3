//! Comment-erasing state machine shared by every grammar.
//!
//! The scanner makes one left-to-right pass and copies everything that is
//! not part of a comment. Line comments keep their terminating newline so
//! the line count survives; block comments vanish entirely, newlines
//! included, which is what forces the reconciler into its fallback path.

use crate::grammar::Grammar;
use std::fmt;

/// Delimiters recognised by a grammar.
#[derive(Debug, Clone, Copy)]
struct Tokens {
    line_open: &'static str,
    block: Option<(&'static str, &'static str)>,
}

impl Tokens {
    fn for_grammar(grammar: Grammar) -> Self {
        match grammar {
            Grammar::CStyle => Tokens {
                line_open: "//",
                block: Some(("/*", "*/")),
            },
            Grammar::HashStyle { supports_block } => Tokens {
                line_open: "#",
                block: supports_block.then_some(("<#", "#>")),
            },
            Grammar::SemicolonStyle => Tokens {
                line_open: ";",
                block: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    InLineComment,
    InBlockComment,
    InStringLiteral { delimiter: char },
}

/// Cursor state for a single pass over one file.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub mode: Mode,
    pub escape_pending: bool,
    /// Read position, in chars.
    pub pos: usize,
    /// 1-based source line of the read position.
    pub line: usize,
    opened_at: usize,
    comment_on_line: bool,
}

impl ScanState {
    fn new() -> Self {
        Self {
            mode: Mode::Normal,
            escape_pending: false,
            pos: 0,
            line: 1,
            opened_at: 1,
            comment_on_line: false,
        }
    }

    fn enter(&mut self, mode: Mode) {
        self.mode = mode;
        self.opened_at = self.line;
        if matches!(mode, Mode::InLineComment | Mode::InBlockComment) {
            self.comment_on_line = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnterminatedKind {
    BlockComment,
    StringLiteral { delimiter: char },
}

/// A construct still open when the input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated {
    pub kind: UnterminatedKind,
    /// 1-based line on which the construct was opened.
    pub line: usize,
}

impl fmt::Display for Unterminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnterminatedKind::BlockComment => {
                write!(f, "unterminated block comment opened on line {}", self.line)
            }
            UnterminatedKind::StringLiteral { delimiter } => write!(
                f,
                "unterminated {} literal opened on line {}",
                delimiter, self.line
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    pub text: String,
    pub unterminated: Option<Unterminated>,
}

#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    tokens: Tokens,
}

impl Scanner {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            tokens: Tokens::for_grammar(grammar),
        }
    }

    pub fn scan(&self, text: &str) -> ScanOutput {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut state = ScanState::new();

        while state.pos < chars.len() {
            let ch = chars[state.pos];
            let mode = state.mode;
            match mode {
                Mode::InLineComment => {
                    if ch == '\n' {
                        state.mode = Mode::Normal;
                        end_line(&mut out, &mut state);
                    }
                    state.pos += 1;
                }
                Mode::InBlockComment => {
                    let close = self.tokens.block.map(|(_, close)| close).unwrap_or("");
                    if !close.is_empty() && starts_with_at(&chars, state.pos, close) {
                        state.mode = Mode::Normal;
                        state.pos += close.chars().count();
                    } else {
                        if ch == '\n' {
                            state.line += 1;
                        }
                        state.pos += 1;
                    }
                }
                Mode::InStringLiteral { delimiter } => {
                    out.push(ch);
                    if ch == '\n' {
                        state.line += 1;
                        state.comment_on_line = false;
                    }
                    if state.escape_pending {
                        state.escape_pending = false;
                    } else if ch == '\\' {
                        state.escape_pending = true;
                    } else if ch == delimiter {
                        state.mode = Mode::Normal;
                    }
                    state.pos += 1;
                }
                Mode::Normal => self.step_normal(&chars, &mut out, &mut state),
            }
        }

        let unterminated = match state.mode {
            Mode::InBlockComment => Some(Unterminated {
                kind: UnterminatedKind::BlockComment,
                line: state.opened_at,
            }),
            Mode::InStringLiteral { delimiter } => Some(Unterminated {
                kind: UnterminatedKind::StringLiteral { delimiter },
                line: state.opened_at,
            }),
            Mode::Normal | Mode::InLineComment => {
                if state.comment_on_line {
                    trim_trailing_blanks(&mut out);
                }
                None
            }
        };

        ScanOutput {
            text: out,
            unterminated,
        }
    }

    fn step_normal(&self, chars: &[char], out: &mut String, state: &mut ScanState) {
        let ch = chars[state.pos];

        if ch == '"' || ch == '\'' {
            state.enter(Mode::InStringLiteral { delimiter: ch });
            out.push(ch);
            state.pos += 1;
            return;
        }

        // Block openers are tried first, so the `#` of a PowerShell `<#`
        // never reaches the line-comment check below.
        if let Some((open, _)) = self.tokens.block {
            if starts_with_at(chars, state.pos, open) {
                state.enter(Mode::InBlockComment);
                state.pos += open.chars().count();
                return;
            }
        }

        if starts_with_at(chars, state.pos, self.tokens.line_open) {
            state.enter(Mode::InLineComment);
            state.pos += self.tokens.line_open.chars().count();
            return;
        }

        if ch == '\n' {
            end_line(out, state);
        } else {
            out.push(ch);
        }
        state.pos += 1;
    }
}

fn starts_with_at(chars: &[char], pos: usize, token: &str) -> bool {
    let mut idx = pos;
    for expected in token.chars() {
        match chars.get(idx) {
            Some(c) if *c == expected => idx += 1,
            _ => return false,
        }
    }
    true
}

fn end_line(out: &mut String, state: &mut ScanState) {
    if state.comment_on_line {
        trim_trailing_blanks(out);
    }
    out.push('\n');
    state.line += 1;
    state.comment_on_line = false;
}

/// Drop spaces and tabs left behind on the current output line, keeping a
/// trailing carriage return in place.
fn trim_trailing_blanks(out: &mut String) {
    let had_cr = out.ends_with('\r');
    if had_cr {
        out.pop();
    }
    while out.ends_with(' ') || out.ends_with('\t') {
        out.pop();
    }
    if had_cr {
        out.push('\r');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(grammar: Grammar, text: &str) -> String {
        Scanner::new(grammar).scan(text).text
    }

    const PLAIN_HASH: Grammar = Grammar::HashStyle {
        supports_block: false,
    };
    const POWERSHELL: Grammar = Grammar::HashStyle {
        supports_block: true,
    };

    #[test]
    fn test_c_line_comment_keeps_newline() {
        assert_eq!(scan(Grammar::CStyle, "a; // x\nb;\n"), "a;\nb;\n");
        assert_eq!(scan(Grammar::CStyle, "// only\n"), "\n");
    }

    #[test]
    fn test_c_block_comment_swallows_newlines() {
        assert_eq!(scan(Grammar::CStyle, "a /* x\ny */ b\n"), "a  b\n");
        assert_eq!(scan(Grammar::CStyle, "/* one */int x;"), "int x;");
    }

    #[test]
    fn test_trailing_blanks_trimmed_only_on_commented_lines() {
        assert_eq!(scan(Grammar::CStyle, "a  \nb; /* c */  \n"), "a  \nb;\n");
        assert_eq!(scan(Grammar::CStyle, "x = 1;\t// c\r\n"), "x = 1;\n");
        assert_eq!(scan(Grammar::CStyle, "x; /* c */ \r\n"), "x;\r\n");
    }

    #[test]
    fn test_c_strings_hide_delimiters() {
        let src = "char *s = \"http://example.com\"; char c = '/';\n";
        assert_eq!(scan(Grammar::CStyle, src), src);
        let src = "s = \"/* not */\";\n";
        assert_eq!(scan(Grammar::CStyle, src), src);
    }

    #[test]
    fn test_escaped_delimiter_does_not_close_string() {
        let src = "s = \"a \\\" // still string\"; // gone\n";
        assert_eq!(scan(Grammar::CStyle, src), "s = \"a \\\" // still string\";\n");
        let src = "c = '\\''; // quote\n";
        assert_eq!(scan(Grammar::CStyle, src), "c = '\\'';\n");
    }

    #[test]
    fn test_comment_contents_are_inert() {
        assert_eq!(scan(Grammar::CStyle, "a // \"not a string\nb\n"), "a\nb\n");
        assert_eq!(scan(Grammar::CStyle, "a /* ' */ b\n"), "a  b\n");
    }

    #[test]
    fn test_hash_plain() {
        assert_eq!(scan(PLAIN_HASH, "echo hi # greet\n# note\n"), "echo hi\n\n");
        assert_eq!(scan(PLAIN_HASH, "echo '#not' \"#nope\"\n"), "echo '#not' \"#nope\"\n");
        // `<#` is not special without block support.
        assert_eq!(scan(PLAIN_HASH, "a <# b\n"), "a <\n");
    }

    #[test]
    fn test_powershell_block_comment() {
        assert_eq!(
            scan(POWERSHELL, "<#\nblock\n#>\n$x = 1 # inline\n"),
            "\n$x = 1\n"
        );
        assert_eq!(scan(POWERSHELL, "$a = 1 <# mid #> + 2\n"), "$a = 1  + 2\n");
    }

    #[test]
    fn test_semicolon_style() {
        assert_eq!(
            scan(
                Grammar::SemicolonStyle,
                "mov eax, 1 ; comment\n; full line\nret\n"
            ),
            "mov eax, 1\n\nret\n"
        );
        let src = "MsgBox \"a;b\"\n";
        assert_eq!(scan(Grammar::SemicolonStyle, src), src);
    }

    #[test]
    fn test_line_comment_grammars_preserve_newline_count() {
        let src = "a // x\n\n// y\n\"s\\\n t\" // z\nend";
        let out = scan(Grammar::CStyle, src);
        assert_eq!(out.matches('\n').count(), src.matches('\n').count());

        let src = "; one\nx ; two\n\n'q;' ; three\n";
        let out = scan(Grammar::SemicolonStyle, src);
        assert_eq!(out.matches('\n').count(), src.matches('\n').count());
    }

    #[test]
    fn test_unterminated_block_comment_erases_rest() {
        let output = Scanner::new(Grammar::CStyle).scan("int a;\n/* open\nint b;\n");
        assert_eq!(output.text, "int a;\n");
        assert_eq!(
            output.unterminated,
            Some(Unterminated {
                kind: UnterminatedKind::BlockComment,
                line: 2,
            })
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let output = Scanner::new(PLAIN_HASH).scan("echo \"abc # x\nmore # y\n");
        assert_eq!(output.text, "echo \"abc # x\nmore # y\n");
        assert_eq!(
            output.unterminated,
            Some(Unterminated {
                kind: UnterminatedKind::StringLiteral { delimiter: '"' },
                line: 1,
            })
        );
    }

    #[test]
    fn test_unterminated_line_comment_is_fine() {
        let output = Scanner::new(Grammar::CStyle).scan("x; // trailing");
        assert_eq!(output.text, "x;");
        assert_eq!(output.unterminated, None);
    }
}
