use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value")]
pub enum TokenKind {
    Header(Header),
    Number(f64),
    /// Any run that does not parse as a number, `true`/`false` included
    Word(String),
    Comment(String),
    Newline,
}

/// Section markers of the absolute-frame dialect
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "section", content = "index")]
pub enum Header {
    Canvas,
    Arm(usize),
}

/// Lexing never fails: text that is not a number comes out as a `Word`
/// and is left for the parser to judge.
pub fn lex(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn pos(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn rest_of_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.peek() {
            let (line, column) = self.pos();

            if ch.is_whitespace() {
                self.bump();
                if ch == '\n' {
                    return Some(Token {
                        kind: TokenKind::Newline,
                        line,
                        column,
                    });
                }
                continue;
            }

            if ch == '#' {
                self.bump();
                let text = self.rest_of_line();
                return Some(Token {
                    kind: classify_comment(text.trim()),
                    line,
                    column,
                });
            }

            let mut raw = String::new();
            while let Some(c) = self.peek() {
                if c.is_whitespace() {
                    break;
                }
                raw.push(c);
                self.bump();
            }
            let kind = match raw.parse::<f64>() {
                Ok(value) => TokenKind::Number(value),
                Err(_) => TokenKind::Word(raw),
            };
            return Some(Token { kind, line, column });
        }

        None
    }
}

fn classify_comment(text: &str) -> TokenKind {
    if text == "Canvas" {
        return TokenKind::Header(Header::Canvas);
    }
    if let Some(index) = text
        .strip_prefix("Arm")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .and_then(|rest| rest.trim().parse::<usize>().ok())
    {
        return TokenKind::Header(Header::Arm(index));
    }
    TokenKind::Comment(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).map(|t| t.kind).collect()
    }

    #[test]
    fn headers_and_comments() {
        assert_eq!(
            kinds("# Canvas\n#Arm 2\n# Arm\n# Armature 1\n"),
            vec![
                TokenKind::Header(Header::Canvas),
                TokenKind::Newline,
                TokenKind::Header(Header::Arm(2)),
                TokenKind::Newline,
                TokenKind::Comment("Arm".into()),
                TokenKind::Newline,
                TokenKind::Comment("Armature 1".into()),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn numbers_and_words() {
        assert_eq!(
            kinds("1.5  -2 true x1\r\n"),
            vec![
                TokenKind::Number(1.5),
                TokenKind::Number(-2.0),
                TokenKind::Word("true".into()),
                TokenKind::Word("x1".into()),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn tracks_positions() {
        let tokens: Vec<Token> = lex("a\n  7").collect();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 2));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!(tokens.len(), 3);
    }
}
