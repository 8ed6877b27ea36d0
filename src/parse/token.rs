use logos::Logos;

#[derive(Logos, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'src> {
    #[token(":")]
    Colon,

    #[token("=")]
    Equals,

    #[regex(r"%[0-9]+", |lex| lex.slice()[1..].parse::<u64>().ok())]
    Value(u64),

    /// An instruction name with an optional `.size` suffix, a block label, or
    /// a keyword such as `gpr`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[0-9]+)?")]
    Word(&'src str),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Number(u64),

    #[regex(r"[\n\r]+")]
    Newline,

    #[error]
    #[regex(r"[ \t\v\f]+", logos::skip)]
    #[regex(r";[^\n\r]*", logos::skip)]
    Error,
}

impl Token<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Colon => "':'",
            Self::Equals => "'='",
            Self::Value(_) => "a value",
            Self::Word(_) => "a name",
            Self::Number(_) => "a number",
            Self::Newline => "the end of the line",
            Self::Error => "an invalid token",
        }
    }
}
