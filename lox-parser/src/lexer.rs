use logos::Logos;

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse())]
    NumberLit(f64),
    #[regex(r"true|false", |lex| lex.slice() == "true")]
    BoolLit(bool),
    #[regex(r#""[^"]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // unary operators
    #[token("!")]
    LogicalNot,

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    // - assignment
    #[token("=")]
    Equals,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,

    // keywords
    #[token("and")]
    And,
    #[token("class")]
    Class,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated in parse phase when `lexer.next()` returns `None`.
    Eof,
}

impl Token {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    /// Assignment (`Token::Equals`) has the lowest precedence with `(3, 2)` (right associative).
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Assignment */
            Token::Equals => Some((3, 2)),
            /* Logical */
            Token::Or => Some((4, 5)),
            Token::And => Some((6, 7)),
            /* Equality */
            Token::EqualsEquals | Token::NotEquals => Some((8, 9)),
            /* Ordering */
            Token::GreaterThan
            | Token::GreaterThanEquals
            | Token::LessThan
            | Token::LessThanEquals => Some((10, 11)),
            /* Additive */
            Token::Plus | Token::Minus => Some((12, 13)),
            /* Multiplicative */
            Token::Asterisk | Token::Slash => Some((14, 15)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Token::lexer(source).collect()
    }

    #[test]
    fn literals() {
        assert_eq!(tokens("123"), vec![Token::NumberLit(123.0)]);
        assert_eq!(tokens("1.5"), vec![Token::NumberLit(1.5)]);
        assert_eq!(
            tokens(r#""hello world""#),
            vec![Token::StringLit("hello world".to_string())]
        );
        assert_eq!(tokens("true"), vec![Token::BoolLit(true)]);
        assert_eq!(tokens("false"), vec![Token::BoolLit(false)]);
        assert_eq!(tokens("nil"), vec![Token::Nil]);
    }

    #[test]
    fn no_leading_or_trailing_dot_numbers() {
        assert_eq!(tokens("123."), vec![Token::NumberLit(123.0), Token::Dot]);
        assert_eq!(tokens(".5"), vec![Token::Dot, Token::NumberLit(5.0)]);
    }

    #[test]
    fn keywords_vs_identifiers() {
        assert_eq!(tokens("var"), vec![Token::Var]);
        assert_eq!(tokens("variable"), vec![Token::Identifier("variable".to_string())]);
        assert_eq!(tokens("fun"), vec![Token::Fun]);
        assert_eq!(tokens("orchid"), vec![Token::Identifier("orchid".to_string())]);
        assert_eq!(tokens("_foo2"), vec![Token::Identifier("_foo2".to_string())]);
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(tokens("<="), vec![Token::LessThanEquals]);
        assert_eq!(tokens("< ="), vec![Token::LessThan, Token::Equals]);
        assert_eq!(tokens("=="), vec![Token::EqualsEquals]);
        assert_eq!(tokens("!="), vec![Token::NotEquals]);
        assert_eq!(tokens("! ="), vec![Token::LogicalNot, Token::Equals]);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            tokens("1 // a comment\n+ 2"),
            vec![Token::NumberLit(1.0), Token::Plus, Token::NumberLit(2.0)]
        );
        assert_eq!(tokens("  \t\r\n "), vec![]);
    }

    #[test]
    fn strings_may_span_lines() {
        assert_eq!(
            tokens("\"a\nb\""),
            vec![Token::StringLit("a\nb".to_string())]
        );
    }

    #[test]
    fn unexpected_character_produces_error_token() {
        assert_eq!(
            tokens("1 @ 2"),
            vec![Token::NumberLit(1.0), Token::Error, Token::NumberLit(2.0)]
        );
    }
}
