//! Lexer for TypeScript/TSX sources using logos.
//!
//! Only declaration-level structure matters to the scanner, so the token set
//! is small: words, literals and punctuation. Every word (keywords included)
//! lexes as [`Token::Ident`]; the parser decides what is contextual.
//!
//! Quoted literals are scanned by [`quoted`] rather than by regex: a quote
//! with no closing partner on its line (an apostrophe in JSX text) becomes
//! [`Token::StrayQuote`], so it never swallows the brackets after it. Bytes
//! the lexer cannot classify are dropped.

use logos::{Lexer, Logos, Skip};

/// Token types for TypeScript sources.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token<'src> {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    /// String literal; the slice excludes the quotes and is still escaped.
    Str(&'src str),

    /// Template literal; the slice excludes the backticks.
    Template(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9_]+)?([eE][+-]?[0-9]+)?n?", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F_]+n?", |lex| lex.slice())]
    #[regex(r"0[bB][01_]+n?", |lex| lex.slice())]
    #[regex(r"0[oO][0-7_]+n?", |lex| lex.slice())]
    Number(&'src str),

    /// An unterminated quote, typically an apostrophe in JSX text. The same
    /// tokens produce [`Token::Str`] and [`Token::Template`] when they close.
    #[token("'", quoted)]
    #[token("\"", quoted)]
    #[token("`", quoted)]
    StrayQuote,

    #[token("=>")]
    Arrow,
    #[token("...")]
    Ellipsis,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("*")]
    Star,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("!")]
    Bang,
    #[token("/")]
    #[token("/*", block_comment)]
    Slash,
    #[token("@")]
    At,
    #[token("#")]
    Hash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
}

/// Skip a block comment through its `*/`, or to the end of an unterminated
/// one.
fn block_comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Skip {
    let rest = lex.remainder();
    let len = rest.find("*/").map_or(rest.len(), |end| end + 2);
    lex.bump(len);
    Skip
}

/// Scan to the matching closing quote. String literals end at a line break;
/// template literals may span lines.
fn quoted<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Token<'src> {
    let quote = lex.slice().as_bytes()[0];
    let rest = lex.remainder();
    let mut escaped = false;

    for (i, byte) in rest.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => escaped = true,
            b'\n' if quote != b'`' => break,
            _ if byte == quote => {
                lex.bump(i + 1);
                let body = &rest[..i];
                return if quote == b'`' {
                    Token::Template(body)
                } else {
                    Token::Str(body)
                };
            }
            _ => {}
        }
    }

    Token::StrayQuote
}

/// A token with its byte span and line-break information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'src> {
    pub token: Token<'src>,
    pub start: usize,
    pub end: usize,
    /// Whether a line break separates this token from the previous one.
    /// Used for automatic semicolon insertion when skipping statements.
    pub newline_before: bool,
}

/// Tokenize a whole source file.
pub fn tokenize(source: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    let mut last_end = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let Ok(token) = result else {
            continue;
        };
        let newline_before = source[last_end..span.start].contains('\n');
        tokens.push(Spanned {
            token,
            start: span.start,
            end: span.end,
            newline_before,
        });
        last_end = span.end;
    }

    tokens
}

/// Resolve the escape sequences of a string literal body.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_tokenize_declaration() {
        assert_eq!(
            kinds("export const A = (p: Props) => null;"),
            vec![
                Token::Ident("export"),
                Token::Ident("const"),
                Token::Ident("A"),
                Token::Eq,
                Token::LParen,
                Token::Ident("p"),
                Token::Colon,
                Token::Ident("Props"),
                Token::RParen,
                Token::Arrow,
                Token::Ident("null"),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_strings_and_comments() {
        assert_eq!(
            kinds("/* doc */ 'a' // trailing\n\"b\\\"c\""),
            vec![Token::Str("a"), Token::Str("b\\\"c")]
        );
    }

    #[test]
    fn test_doc_comments_between_members() {
        let source = "{\n  /** Visible text. */\n  label: string;\n  /* a **/ b: number; /*** x ***/\n}";
        assert_eq!(
            kinds(source),
            vec![
                Token::LBrace,
                Token::Ident("label"),
                Token::Colon,
                Token::Ident("string"),
                Token::Semi,
                Token::Ident("b"),
                Token::Colon,
                Token::Ident("number"),
                Token::Semi,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        assert_eq!(kinds("a /* never closed } )"), vec![Token::Ident("a")]);
    }

    #[test]
    fn test_template_spans_lines() {
        assert_eq!(
            kinds("`a\n${b}` 'c'"),
            vec![Token::Template("a\n${b}"), Token::Str("c")]
        );
    }

    #[test]
    fn test_stray_quote_in_jsx_text() {
        let tokens = kinds("<p>Don't {panic}</p>");
        assert!(tokens.contains(&Token::StrayQuote));
        assert!(tokens.contains(&Token::LBrace));
        assert!(tokens.contains(&Token::Ident("panic")));
        assert!(!tokens.iter().any(|t| matches!(t, Token::Str(_))));
    }

    #[test]
    fn test_nested_generics_close_separately() {
        let tokens = kinds("Array<Array<string>>");
        assert_eq!(tokens.iter().filter(|t| **t == Token::Gt).count(), 2);
    }

    #[test]
    fn test_newline_tracking() {
        let tokens = tokenize("a\nb c");
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"é"), "é");
    }
}
