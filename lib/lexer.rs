use std::collections::VecDeque;

use crate::token::{Token, TokenKind};

const TAB_WIDTH: usize = 4;

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    char: Option<char>,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    queue: VecDeque<Token>,
    nesting: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let char = chars.first().copied();
        Self {
            chars,
            position: 0,
            char,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            queue: VecDeque::new(),
            nesting: 0,
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return token;
            }

            self.skip_whitespace();

            let (line, column) = (self.line, self.column);

            let Some(char) = self.char else {
                if self.indent_stack.len() > 1 {
                    self.indent_stack.pop();
                    return Token::new(TokenKind::Dedent, "", line, column);
                }
                return Token::new(TokenKind::Eof, "", line, column);
            };

            let token = match char {
                // layout is suspended inside brackets
                '\n' if self.nesting > 0 => {
                    self.read_char();
                    self.line += 1;
                    self.column = 1;
                    continue;
                }
                '\n' => {
                    self.handle_newline();
                    continue;
                }
                '/' if self.is_next_char('/') => {
                    self.skip_comment();
                    continue;
                }
                '=' if self.is_next_char('=') => {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==", line, column)
                }
                '!' if self.is_next_char('=') => {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=", line, column)
                }
                '<' if self.is_next_char('=') => {
                    self.read_char();
                    Token::new(TokenKind::LtEq, "<=", line, column)
                }
                '>' if self.is_next_char('=') => {
                    self.read_char();
                    Token::new(TokenKind::GtEq, ">=", line, column)
                }
                '"' => return self.read_string(line, column),
                _ if char.is_ascii_digit() => return self.read_number(line, column),
                _ if char.is_alphabetic() || char == '_' => {
                    return self.read_identifier(line, column)
                }
                _ => {
                    let kind = match char {
                        '=' => TokenKind::Assign,
                        '+' => TokenKind::Plus,
                        '-' => TokenKind::Minus,
                        '*' => TokenKind::Asterisk,
                        '/' => TokenKind::Slash,
                        '%' => TokenKind::Percent,
                        '<' => TokenKind::Lt,
                        '>' => TokenKind::Gt,
                        ',' => TokenKind::Comma,
                        ':' => TokenKind::Colon,
                        '.' => TokenKind::Dot,
                        '$' => TokenKind::Dollar,
                        '(' => TokenKind::Lparen,
                        ')' => TokenKind::Rparen,
                        '{' => TokenKind::Lbrace,
                        '}' => TokenKind::Rbrace,
                        '[' => TokenKind::Lbracket,
                        ']' => TokenKind::Rbracket,
                        _ => TokenKind::Illegal,
                    };
                    match kind {
                        TokenKind::Lparen | TokenKind::Lbracket | TokenKind::Lbrace => {
                            self.nesting += 1
                        }
                        TokenKind::Rparen | TokenKind::Rbracket | TokenKind::Rbrace => {
                            self.nesting = self.nesting.saturating_sub(1)
                        }
                        _ => {}
                    }
                    Token::new(kind, char.to_string(), line, column)
                }
            };

            self.read_char();

            return token;
        }
    }

    /// Consumes the newline under the cursor plus any blank or comment-only
    /// lines after it, then queues the layout tokens for the next real line.
    fn handle_newline(&mut self) {
        let (newline_line, newline_column) = (self.line, self.column);

        let width = loop {
            self.read_char();
            self.line += 1;
            self.column = 1;

            let mut width = 0;
            while let Some(char @ (' ' | '\t' | '\r')) = self.char {
                match char {
                    ' ' => width += 1,
                    '\t' => width += TAB_WIDTH,
                    _ => {}
                }
                self.read_char();
            }

            if self.char == Some('/') && self.is_next_char('/') {
                self.skip_comment();
            }

            match self.char {
                Some('\n') => continue,
                None => return,
                Some(_) => break width,
            }
        };

        self.queue.push_back(Token::new(
            TokenKind::Newline,
            "\n",
            newline_line,
            newline_column,
        ));

        let current = self.current_indent();
        if width > current {
            self.indent_stack.push(width);
            self.queue
                .push_back(Token::new(TokenKind::Indent, "", self.line, self.column));
        } else if width < current {
            while self.indent_stack.len() > 1 && width < self.current_indent() {
                self.indent_stack.pop();
                self.queue
                    .push_back(Token::new(TokenKind::Dedent, "", self.line, self.column));
            }
            if self.current_indent() != width {
                self.queue.push_back(Token::new(
                    TokenKind::Illegal,
                    "inconsistent dedent",
                    self.line,
                    self.column,
                ));
            }
        }
    }

    fn current_indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    fn read_char(&mut self) {
        self.position += 1;
        self.column += 1;
        self.char = self.chars.get(self.position).copied();
    }

    fn is_next_char(&self, ch: char) -> bool {
        self.chars.get(self.position + 1).eq(&Some(&ch))
    }

    fn skip_whitespace(&mut self) {
        while self
            .char
            .is_some_and(|char| char == ' ' || char == '\t' || char == '\r')
        {
            self.read_char();
        }
    }

    fn skip_comment(&mut self) {
        while self.char.is_some_and(|char| char != '\n') {
            self.read_char();
        }
    }

    fn read_while(&mut self, condition: impl Fn(char) -> bool) -> String {
        let mut literal = String::new();
        while let Some(char) = self.char {
            if !condition(char) {
                break;
            }
            literal.push(char);
            self.read_char();
        }
        literal
    }

    fn read_string(&mut self, line: usize, column: usize) -> Token {
        self.read_char();
        let mut literal = String::new();
        while let Some(char) = self.char {
            if char == '"' {
                break;
            }
            literal.push(char);
            self.read_char();
            if char == '\n' {
                self.line += 1;
                self.column = 1;
            }
        }
        // unterminated strings simply run to the end of input
        if self.char.is_some() {
            self.read_char();
        }
        Token::new(TokenKind::String, literal, line, column)
    }

    fn read_number(&mut self, line: usize, column: usize) -> Token {
        let mut literal = self.read_while(|char| char.is_ascii_digit());
        if self.char == Some('.')
            && self
                .chars
                .get(self.position + 1)
                .is_some_and(|char| char.is_ascii_digit())
        {
            literal.push('.');
            self.read_char();
            literal.push_str(&self.read_while(|char| char.is_ascii_digit()));
            return Token::new(TokenKind::Float, literal, line, column);
        }
        Token::new(TokenKind::Int, literal, line, column)
    }

    fn read_identifier(&mut self, line: usize, column: usize) -> Token {
        let literal = self.read_while(|char| char.is_alphanumeric() || char == '_');
        let kind = TokenKind::lookup_ident(&literal);
        Token::new(kind, literal, line, column)
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}
