//! The lexer.

use derive_more::Display;
use regex::Regex;

/// Tokens in the program
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display, Debug)]
#[display("kind: '{kind}', part of input: '{text}'")]
pub struct Token<'src> {
    /// What token class this token belongs to.
    kind: TokenKind,
    /// What part of the input this token carries.
    text: &'src str,
}

impl<'src> Token<'src> {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &'src str {
        self.text
    }
}

/// Token classes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display, Debug)]
pub enum TokenKind {
    #[display("id")]
    Id,
    #[display("int-literal")]
    IntLit,
    #[display("float-literal")]
    FloatLit,
    #[display("double-literal")]
    DoubleLit,
    #[display("char-literal")]
    CharLit,
    #[display("string-literal")]
    StringLit,
    // type keywords
    #[display("int")]
    Int,
    #[display("char")]
    Char,
    #[display("float")]
    Float,
    #[display("double")]
    Double,
    #[display("void")]
    Void,
    #[display("enum")]
    Enum,
    #[display("unsigned")]
    Unsigned,
    #[display("short")]
    Short,
    #[display("long")]
    Long,
    // statement keywords
    #[display("if")]
    If,
    #[display("else")]
    Else,
    #[display("while")]
    While,
    #[display("do")]
    Do,
    #[display("for")]
    For,
    #[display("switch")]
    Switch,
    #[display("case")]
    Case,
    #[display("default")]
    Default,
    #[display("break")]
    Break,
    #[display("continue")]
    Continue,
    #[display("return")]
    Return,
    #[display("goto")]
    Goto,
    #[display("sizeof")]
    Sizeof,
    // punctuation and operators, longest first in the matcher table
    #[display("<<=")]
    ShlAssign,
    #[display(">>=")]
    ShrAssign,
    #[display("->")]
    Arrow,
    #[display("++")]
    Increment,
    #[display("--")]
    Decrement,
    #[display("<<")]
    Shl,
    #[display(">>")]
    Shr,
    #[display("<=")]
    Le,
    #[display(">=")]
    Ge,
    #[display("==")]
    EqEq,
    #[display("!=")]
    Ne,
    #[display("&&")]
    AndAnd,
    #[display("||")]
    OrOr,
    #[display("+=")]
    PlusAssign,
    #[display("-=")]
    MinusAssign,
    #[display("*=")]
    StarAssign,
    #[display("/=")]
    SlashAssign,
    #[display("%=")]
    PercentAssign,
    #[display("&=")]
    AmpAssign,
    #[display("|=")]
    PipeAssign,
    #[display("^=")]
    CaretAssign,
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("*")]
    Star,
    #[display("/")]
    Slash,
    #[display("%")]
    Percent,
    #[display("<")]
    Lt,
    #[display(">")]
    Gt,
    #[display("=")]
    Assign,
    #[display("!")]
    Bang,
    #[display("&")]
    Amp,
    #[display("|")]
    Pipe,
    #[display("^")]
    Caret,
    #[display("~")]
    Tilde,
    #[display("?")]
    Question,
    #[display(":")]
    Colon,
    #[display(";")]
    Semicolon,
    #[display(",")]
    Comma,
    #[display(".")]
    Dot,
    #[display("(")]
    LParen,
    #[display(")")]
    RParen,
    #[display("[")]
    LBracket,
    #[display("]")]
    RBracket,
    #[display("{{")]
    LBrace,
    #[display("}}")]
    RBrace,
}

pub struct LexError(usize, char);

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lexer error: unexpected character {:?} at {}", self.1, self.0)
    }
}

impl std::fmt::Debug for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lexer error: unexpected character {:?} at {}", self.1, self.0)
    }
}

/// Keywords are lexed as identifiers, then reclassified here.
fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match text {
        "int" => Int,
        "char" => Char,
        "float" => Float,
        "double" => Double,
        "void" => Void,
        "enum" => Enum,
        "unsigned" => Unsigned,
        "short" => Short,
        "long" => Long,
        "if" => If,
        "else" => Else,
        "while" => While,
        "do" => Do,
        "for" => For,
        "switch" => Switch,
        "case" => Case,
        "default" => Default,
        "break" => Break,
        "continue" => Continue,
        "return" => Return,
        "goto" => Goto,
        "sizeof" => Sizeof,
        _ => return None,
    };
    Some(kind)
}

pub struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    whitespace: Regex,
    matchers: Vec<(Regex, TokenKind)>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        use TokenKind::*;
        let table: &[(&str, TokenKind)] = &[
            // literals before operators so `1.5` is not `1` `.` `5`
            (r"\A(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?[fF]", FloatLit),
            (r"\A(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?", DoubleLit),
            (r"\A(?:0[xX][0-9a-fA-F]+|\d+)", IntLit),
            (r"\A'(?:\\.|[^\\'])'", CharLit),
            (r#"\A"(?:\\.|[^\\"])*""#, StringLit),
            (r"\A[A-Za-z_][A-Za-z0-9_]*", Id),
            // three-character operators first, then two, then one
            (r"\A<<=", ShlAssign),
            (r"\A>>=", ShrAssign),
            (r"\A->", Arrow),
            (r"\A\+\+", Increment),
            (r"\A--", Decrement),
            (r"\A<<", Shl),
            (r"\A>>", Shr),
            (r"\A<=", Le),
            (r"\A>=", Ge),
            (r"\A==", EqEq),
            (r"\A!=", Ne),
            (r"\A&&", AndAnd),
            (r"\A\|\|", OrOr),
            (r"\A\+=", PlusAssign),
            (r"\A-=", MinusAssign),
            (r"\A\*=", StarAssign),
            (r"\A/=", SlashAssign),
            (r"\A%=", PercentAssign),
            (r"\A&=", AmpAssign),
            (r"\A\|=", PipeAssign),
            (r"\A\^=", CaretAssign),
            (r"\A\+", Plus),
            (r"\A-", Minus),
            (r"\A\*", Star),
            (r"\A/", Slash),
            (r"\A%", Percent),
            (r"\A<", Lt),
            (r"\A>", Gt),
            (r"\A=", Assign),
            (r"\A!", Bang),
            (r"\A&", Amp),
            (r"\A\|", Pipe),
            (r"\A\^", Caret),
            (r"\A~", Tilde),
            (r"\A\?", Question),
            (r"\A:", Colon),
            (r"\A;", Semicolon),
            (r"\A,", Comma),
            (r"\A\.", Dot),
            (r"\A\(", LParen),
            (r"\A\)", RParen),
            (r"\A\[", LBracket),
            (r"\A\]", RBracket),
            (r"\A\{", LBrace),
            (r"\A\}", RBrace),
        ];
        Lexer {
            input,
            pos: 0,
            whitespace: Regex::new(r"\A(?:[ \t\f\r\n\v]|//[^\n]*|/\*(?s:.)*?\*/)*").unwrap(),
            matchers: table
                .iter()
                .map(|(pat, kind)| (Regex::new(pat).unwrap(), *kind))
                .collect(),
        }
    }

    /// Has the lexer reached the end of input?
    pub fn end_of_input(&self) -> bool {
        self.pos == self.input.len()
    }

    // Skip comments and whitespace
    fn skip_whitespace(&mut self) {
        if let Some(m) = self.whitespace.find(&self.input[self.pos..]) {
            self.pos += m.end()
        }
    }

    /// Get the next token if possible.
    ///
    /// The return type distinguishes between end-of-input and lexer error.
    pub fn next(&mut self) -> Result<Option<Token<'input>>, LexError> {
        self.skip_whitespace();
        if self.end_of_input() {
            return Ok(None);
        }

        let rest = &self.input[self.pos..];
        for (regex, kind) in &self.matchers {
            if let Some(m) = regex.find(rest) {
                let text = &rest[..m.end()];
                let kind = match kind {
                    TokenKind::Id => keyword(text).unwrap_or(TokenKind::Id),
                    other => *other,
                };
                self.pos += m.end();
                return Ok(Some(Token { kind, text }));
            }
        }

        Err(LexError(self.pos, rest.chars().next().unwrap_or('\0')))
    }

    /// Lex the whole input up front.
    pub fn tokenize(mut self) -> Result<Vec<Token<'input>>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.kind())
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("int main intx _a"),
            vec![Int, Id, Id, Id],
        );
    }

    #[test]
    fn numeric_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("42 0x1F 1.5f 2.25 .5f 3."),
            vec![IntLit, IntLit, FloatLit, DoubleLit, FloatLit, DoubleLit],
        );
    }

    #[test]
    fn multi_character_operators_win() {
        use TokenKind::*;
        assert_eq!(kinds("<<= << <= <"), vec![ShlAssign, Shl, Le, Lt]);
        assert_eq!(kinds("a+++b"), vec![Id, Increment, Plus, Id]);
    }

    #[test]
    fn char_and_string_literals() {
        let tokens = Lexer::new(r#"'a' '\n' "hi\n""#).tokenize().unwrap();
        assert_eq!(tokens[0].text(), "'a'");
        assert_eq!(tokens[1].text(), r"'\n'");
        assert_eq!(tokens[2].text(), r#""hi\n""#);
    }

    #[test]
    fn comments_are_whitespace() {
        use TokenKind::*;
        assert_eq!(
            kinds("a // line\n b /* block\n still */ c"),
            vec![Id, Id, Id],
        );
    }

    #[test]
    fn rejects_stray_characters() {
        let mut lexer = Lexer::new("a @");
        assert!(lexer.next().unwrap().is_some());
        assert!(lexer.next().is_err());
    }
}
