use std::{collections::HashMap, fmt};

use lazy_static::lazy_static;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Int,
    Float,
    String,

    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,

    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    And,
    Or,
    Not,

    Comma,
    Colon,
    Dot,
    Dollar,

    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,

    Newline,
    Indent,
    Dedent,

    True,
    False,
    Nil,
    Hunt,
    Sniff,
    Missing,
    Track,
    Bring,
    Howl,
    Summon,
    Pack,
    In,
    Range,
    Prowl,
    Mold,
}

lazy_static! {
    /// Both dialects resolve to the same kinds, so the grammar never looks at spelling.
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut keywords = HashMap::new();
        for (english, javanese, kind) in [
            ("hunt", "garap", TokenKind::Hunt),
            ("mold", "gerombolan", TokenKind::Mold),
            ("sniff", "menowo", TokenKind::Sniff),
            ("missing", "yenora", TokenKind::Missing),
            ("track", "baleni", TokenKind::Track),
            ("bring", "balekno", TokenKind::Bring),
            ("howl", "ketok", TokenKind::Howl),
            ("summon", "undang", TokenKind::Summon),
            ("pack", "bungkus", TokenKind::Pack),
            ("in", "neng", TokenKind::In),
            ("range", "deret", TokenKind::Range),
            ("true", "bener", TokenKind::True),
            ("false", "salah", TokenKind::False),
            ("nil", "kopong", TokenKind::Nil),
            ("and", "lan", TokenKind::And),
            ("or", "utowo", TokenKind::Or),
            ("not", "ora", TokenKind::Not),
            ("prowl", "playon", TokenKind::Prowl),
        ] {
            keywords.insert(english, kind);
            keywords.insert(javanese, kind);
        }
        keywords
    };
}

impl TokenKind {
    pub fn lookup_ident(ident: &str) -> TokenKind {
        KEYWORDS.get(ident).copied().unwrap_or(TokenKind::Ident)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",

            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",

            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",

            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",

            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",

            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Dollar => "$",

            TokenKind::Lparen => "(",
            TokenKind::Rparen => ")",
            TokenKind::Lbrace => "{",
            TokenKind::Rbrace => "}",
            TokenKind::Lbracket => "[",
            TokenKind::Rbracket => "]",

            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",

            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Nil => "nil",
            TokenKind::Hunt => "hunt",
            TokenKind::Sniff => "sniff",
            TokenKind::Missing => "missing",
            TokenKind::Track => "track",
            TokenKind::Bring => "bring",
            TokenKind::Howl => "howl",
            TokenKind::Summon => "summon",
            TokenKind::Pack => "pack",
            TokenKind::In => "in",
            TokenKind::Range => "range",
            TokenKind::Prowl => "prowl",
            TokenKind::Mold => "mold",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Ident
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::Illegal => write!(f, "{}({})", self.kind, self.literal),
            kind => write!(f, "{}", kind),
        }
    }
}
