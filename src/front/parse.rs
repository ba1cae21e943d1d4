//! The parser

use std::fmt::Debug;

use derive_more::derive::Display;

use crate::common::{id, Id};

use super::ast::*;
use super::lex::*;
use super::types::Type;

#[derive(Display)]
#[display("Parse error: {}", self.0)]
pub struct ParseError(String);

impl Debug for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

pub fn parse(input: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(input)
        .tokenize()
        .map_err(|e| ParseError(e.to_string()))?;
    Parser { tokens, pos: 0 }.program()
}

struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind())
    }

    fn peek_kind_at(&self, ahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| t.kind())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) -> Result<Token<'src>, ParseError> {
        let token = self
            .peek()
            .ok_or_else(|| ParseError("unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        match self.peek() {
            Some(token) if token.kind() == kind => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError(format!(
                "expected '{}', found '{}'",
                kind,
                token.text()
            ))),
            None => Err(ParseError(format!(
                "expected '{kind}', found end of input"
            ))),
        }
    }

    fn is_type_start(&self, kind: Option<TokenKind>) -> bool {
        matches!(
            kind,
            Some(
                TokenKind::Int
                    | TokenKind::Char
                    | TokenKind::Float
                    | TokenKind::Double
                    | TokenKind::Void
                    | TokenKind::Enum
                    | TokenKind::Unsigned
                    | TokenKind::Short
                    | TokenKind::Long
            )
        )
    }

    fn type_specifier(&mut self) -> Result<Type, ParseError> {
        let token = self.advance()?;
        let ty = match token.kind() {
            TokenKind::Int => Type::Int,
            TokenKind::Char => Type::Char,
            TokenKind::Float => Type::Float,
            TokenKind::Double => Type::Double,
            TokenKind::Void => Type::Void,
            TokenKind::Unsigned => Type::Unsigned,
            TokenKind::Short => Type::Short,
            TokenKind::Long => Type::Long,
            TokenKind::Enum => {
                // `enum Color` used as a type; enums are int-sized
                self.eat(TokenKind::Id);
                Type::Enum
            }
            _ => {
                return Err(ParseError(format!(
                    "expected a type specifier, found '{}'",
                    token.text()
                )))
            }
        };
        Ok(ty)
    }

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut decls = Vec::new();
        while self.peek().is_some() {
            if self.check(TokenKind::Enum) && self.enum_definition_ahead() {
                decls.push(Decl::Enum(self.enum_declaration()?));
                continue;
            }
            self.external_declaration(&mut decls)?;
        }
        Ok(Program { decls })
    }

    /// `enum` introduces a definition when a `{` follows (with an optional tag).
    fn enum_definition_ahead(&self) -> bool {
        match self.peek_kind_at(1) {
            Some(TokenKind::LBrace) => true,
            Some(TokenKind::Id) => self.peek_kind_at(2) == Some(TokenKind::LBrace),
            _ => false,
        }
    }

    fn enum_declaration(&mut self) -> Result<EnumDecl, ParseError> {
        self.expect(TokenKind::Enum)?;
        let name = if self.check(TokenKind::Id) {
            Some(id(self.advance()?.text()))
        } else {
            None
        };
        self.expect(TokenKind::LBrace)?;
        let mut values = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let name = id(self.expect(TokenKind::Id)?.text());
            let value = if self.eat(TokenKind::Assign) {
                Some(self.conditional()?)
            } else {
                None
            };
            values.push(Enumerator { name, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(EnumDecl { name, values })
    }

    fn external_declaration(&mut self, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        let ty = self.type_specifier()?;
        let mut pointer_depth = 0;
        while self.eat(TokenKind::Star) {
            pointer_depth += 1;
        }
        let name = id(self.expect(TokenKind::Id)?.text());

        if self.check(TokenKind::LParen) {
            decls.push(Decl::Function(self.function_declaration(
                ty,
                pointer_depth > 0,
                name,
            )?));
            return Ok(());
        }

        // one or more comma-separated global variable declarators
        let mut declarator = self.finish_declarator(pointer_depth, name)?;
        loop {
            let init = if self.eat(TokenKind::Assign) {
                Some(self.initializer()?)
            } else {
                None
            };
            decls.push(Decl::Variable(VarDecl {
                ty,
                declarator,
                init,
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
            let mut depth = 0;
            while self.eat(TokenKind::Star) {
                depth += 1;
            }
            let name = id(self.expect(TokenKind::Id)?.text());
            declarator = self.finish_declarator(depth, name)?;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    /// Array suffix then pointer wrapping, after the name has been read.
    fn finish_declarator(
        &mut self,
        pointer_depth: u32,
        name: Id,
    ) -> Result<Declarator, ParseError> {
        let mut declarator = Declarator::Ident(name);
        if self.eat(TokenKind::LBracket) {
            let size = if self.check(TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.conditional()?))
            };
            self.expect(TokenKind::RBracket)?;
            declarator = Declarator::Array {
                base: Box::new(declarator),
                size,
            };
        }
        for _ in 0..pointer_depth {
            declarator = Declarator::Pointer(Box::new(declarator));
        }
        Ok(declarator)
    }

    fn function_declaration(
        &mut self,
        ret: Type,
        returns_pointer: bool,
        name: Id,
    ) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.check(TokenKind::Void) && self.peek_kind_at(1) == Some(TokenKind::RParen) {
            self.advance()?;
        } else if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parameter()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = if self.check(TokenKind::LBrace) {
            Some(self.compound_statement()?)
        } else {
            self.expect(TokenKind::Semicolon)?;
            None
        };
        Ok(FunctionDecl {
            ret,
            returns_pointer,
            name,
            params,
            body,
        })
    }

    fn parameter(&mut self) -> Result<Param, ParseError> {
        let ty = self.type_specifier()?;
        let mut is_pointer = false;
        while self.eat(TokenKind::Star) {
            is_pointer = true;
        }
        let name = if self.check(TokenKind::Id) {
            Some(id(self.advance()?.text()))
        } else {
            None
        };
        Ok(Param {
            ty,
            name,
            is_pointer,
        })
    }

    fn initializer(&mut self) -> Result<Initializer, ParseError> {
        if self.eat(TokenKind::LBrace) {
            let mut exprs = Vec::new();
            while !self.check(TokenKind::RBrace) {
                exprs.push(self.assignment()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace)?;
            Ok(Initializer::List(exprs))
        } else {
            Ok(Initializer::Expr(self.assignment()?))
        }
    }

    fn local_declarations(&mut self, decls: &mut Vec<VarDecl>) -> Result<(), ParseError> {
        let ty = self.type_specifier()?;
        loop {
            let mut depth = 0;
            while self.eat(TokenKind::Star) {
                depth += 1;
            }
            let name = id(self.expect(TokenKind::Id)?.text());
            let declarator = self.finish_declarator(depth, name)?;
            let init = if self.eat(TokenKind::Assign) {
                Some(self.initializer()?)
            } else {
                None
            };
            decls.push(VarDecl {
                ty,
                declarator,
                init,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn compound_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut decls = Vec::new();
        while self.is_type_start(self.peek_kind()) {
            self.local_declarations(&mut decls)?;
        }
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Compound { decls, stmts })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::LBrace) => self.compound_statement(),
            Some(TokenKind::If) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let cond = self.expression()?;
                self.expect(TokenKind::RParen)?;
                let then_stmt = Box::new(self.statement()?);
                let else_stmt = if self.eat(TokenKind::Else) {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_stmt,
                    else_stmt,
                })
            }
            Some(TokenKind::While) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let cond = self.expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While { cond, body })
            }
            Some(TokenKind::Do) => {
                self.advance()?;
                let body = Box::new(self.statement()?);
                self.expect(TokenKind::While)?;
                self.expect(TokenKind::LParen)?;
                let cond = self.expression()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::DoWhile { body, cond })
            }
            Some(TokenKind::For) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let init = if self.eat(TokenKind::Semicolon) {
                    None
                } else if self.is_type_start(self.peek_kind()) {
                    let mut decls = Vec::new();
                    self.local_declarations(&mut decls)?;
                    let decl = decls
                        .pop()
                        .ok_or_else(|| ParseError("empty for-loop declaration".to_string()))?;
                    Some(Box::new(ForInit::Decl(decl)))
                } else {
                    let expr = self.expression()?;
                    self.expect(TokenKind::Semicolon)?;
                    Some(Box::new(ForInit::Expr(expr)))
                };
                let cond = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                let step = if self.check(TokenKind::RParen) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::For {
                    init,
                    cond,
                    step,
                    body,
                })
            }
            Some(TokenKind::Switch) => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let scrutinee = self.expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::Switch { scrutinee, body })
            }
            Some(TokenKind::Case) => {
                self.advance()?;
                let value = self.conditional()?;
                self.expect(TokenKind::Colon)?;
                let stmt = Box::new(self.statement()?);
                Ok(Stmt::Case {
                    value: Some(value),
                    stmt,
                })
            }
            Some(TokenKind::Default) => {
                self.advance()?;
                self.expect(TokenKind::Colon)?;
                let stmt = Box::new(self.statement()?);
                Ok(Stmt::Case { value: None, stmt })
            }
            Some(TokenKind::Return) => {
                self.advance()?;
                let expr = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return(expr))
            }
            Some(TokenKind::Break) => {
                self.advance()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break)
            }
            Some(TokenKind::Continue) => {
                self.advance()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue)
            }
            Some(TokenKind::Goto) => {
                self.advance()?;
                let label = id(self.expect(TokenKind::Id)?.text());
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Goto(label))
            }
            Some(TokenKind::Id) if self.peek_kind_at(1) == Some(TokenKind::Colon) => {
                let label = id(self.advance()?.text());
                self.advance()?;
                let stmt = Box::new(self.statement()?);
                Ok(Stmt::Labeled { label, stmt })
            }
            Some(TokenKind::Semicolon) => {
                self.advance()?;
                Ok(Stmt::Expr(None))
            }
            _ => {
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(Some(expr)))
            }
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.assignment()?;
        while self.eat(TokenKind::Comma) {
            let rhs = self.assignment()?;
            expr = Expr::Comma {
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.conditional()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Assign) => AssignOp::Assign,
            Some(TokenKind::PlusAssign) => AssignOp::AddAssign,
            Some(TokenKind::MinusAssign) => AssignOp::SubAssign,
            Some(TokenKind::StarAssign) => AssignOp::MulAssign,
            Some(TokenKind::SlashAssign) => AssignOp::DivAssign,
            Some(TokenKind::PercentAssign) => AssignOp::ModAssign,
            Some(TokenKind::AmpAssign) => AssignOp::AndAssign,
            Some(TokenKind::PipeAssign) => AssignOp::OrAssign,
            Some(TokenKind::CaretAssign) => AssignOp::XorAssign,
            Some(TokenKind::ShlAssign) => AssignOp::LeftAssign,
            Some(TokenKind::ShrAssign) => AssignOp::RightAssign,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.assignment()?;
        Ok(Expr::Assignment {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.binary(0)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.conditional()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Binary operator levels from `||` down to `* / %`, loosest first.
    fn binary_op_at(&self, level: usize) -> Option<BinaryOp> {
        use BinaryOp::*;
        use TokenKind as T;
        let kind = self.peek_kind()?;
        let op = match (level, kind) {
            (0, T::OrOr) => LogicalOr,
            (1, T::AndAnd) => LogicalAnd,
            (2, T::Pipe) => BitOr,
            (3, T::Caret) => BitXor,
            (4, T::Amp) => BitAnd,
            (5, T::EqEq) => Eq,
            (5, T::Ne) => Ne,
            (6, T::Lt) => Lt,
            (6, T::Gt) => Gt,
            (6, T::Le) => Le,
            (6, T::Ge) => Ge,
            (7, T::Shl) => LeftShift,
            (7, T::Shr) => RightShift,
            (8, T::Plus) => Add,
            (8, T::Minus) => Sub,
            (9, T::Star) => Mul,
            (9, T::Slash) => Div,
            (9, T::Percent) => Mod,
            _ => return None,
        };
        Some(op)
    }

    fn binary(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level > 9 {
            return self.cast_expression();
        }
        let mut lhs = self.binary(level + 1)?;
        while let Some(op) = self.binary_op_at(level) {
            self.advance()?;
            let rhs = self.binary(level + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn cast_expression(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::LParen) && self.is_type_start(self.peek_kind_at(1)) {
            self.advance()?;
            let ty = self.type_specifier()?;
            while self.eat(TokenKind::Star) {}
            self.expect(TokenKind::RParen)?;
            let expr = self.cast_expression()?;
            return Ok(Expr::Cast {
                ty,
                expr: Box::new(expr),
            });
        }
        self.unary()
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Increment) => Some(UnaryOp::PreIncrement),
            Some(TokenKind::Decrement) => Some(UnaryOp::PreDecrement),
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            Some(TokenKind::Minus) => Some(UnaryOp::Minus),
            Some(TokenKind::Bang) => Some(UnaryOp::LogicalNot),
            Some(TokenKind::Tilde) => Some(UnaryOp::BitNot),
            Some(TokenKind::Amp) => Some(UnaryOp::AddressOf),
            Some(TokenKind::Star) => Some(UnaryOp::Dereference),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let operand = self.cast_expression()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        if self.check(TokenKind::Sizeof) {
            self.advance()?;
            if self.check(TokenKind::LParen) && self.is_type_start(self.peek_kind_at(1)) {
                self.advance()?;
                let ty = self.type_specifier()?;
                while self.eat(TokenKind::Star) {}
                self.expect(TokenKind::RParen)?;
                return Ok(Expr::SizeofType(ty));
            }
            let operand = self.unary()?;
            return Ok(Expr::SizeofExpr(Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::LParen) => {
                    self.advance()?;
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.assignment()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Some(TokenKind::LBracket) => {
                    self.advance()?;
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        array: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(TokenKind::Dot) => {
                    self.advance()?;
                    let field = id(self.expect(TokenKind::Id)?.text());
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                    };
                }
                Some(TokenKind::Arrow) => {
                    self.advance()?;
                    let field = id(self.expect(TokenKind::Id)?.text());
                    expr = Expr::PointerMember {
                        object: Box::new(expr),
                        field,
                    };
                }
                Some(TokenKind::Increment) => {
                    self.advance()?;
                    expr = Expr::Unary {
                        op: UnaryOp::PostIncrement,
                        operand: Box::new(expr),
                    };
                }
                Some(TokenKind::Decrement) => {
                    self.advance()?;
                    expr = Expr::Unary {
                        op: UnaryOp::PostDecrement,
                        operand: Box::new(expr),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance()?;
        match token.kind() {
            TokenKind::IntLit => Ok(Expr::IntLiteral(parse_int(token.text())?)),
            TokenKind::FloatLit => {
                let text = token.text();
                let digits = &text[..text.len() - 1];
                digits
                    .parse::<f32>()
                    .map(Expr::FloatLiteral)
                    .map_err(|_| ParseError(format!("bad float literal '{text}'")))
            }
            TokenKind::DoubleLit => token
                .text()
                .parse::<f64>()
                .map(Expr::DoubleLiteral)
                .map_err(|_| ParseError(format!("bad double literal '{}'", token.text()))),
            TokenKind::CharLit => Ok(Expr::CharLiteral(parse_char(token.text())?)),
            TokenKind::StringLit => Ok(Expr::StringLiteral(token.text().to_string())),
            TokenKind::Id => Ok(Expr::Identifier(id(token.text()))),
            TokenKind::LParen => {
                let expr = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(ParseError(format!(
                "expected an expression, found '{}'",
                token.text()
            ))),
        }
    }
}

fn parse_int(text: &str) -> Result<i32, ParseError> {
    let value = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse::<i64>()
    };
    value
        .map(|v| v as i32)
        .map_err(|_| ParseError(format!("bad integer literal '{text}'")))
}

fn parse_char(text: &str) -> Result<u8, ParseError> {
    // text is the quoted source form, e.g. 'a' or '\n'
    let inner = &text[1..text.len() - 1];
    let mut chars = inner.chars();
    let value = match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => b'\n',
            Some('t') => b'\t',
            Some('r') => b'\r',
            Some('0') => 0,
            Some('\\') => b'\\',
            Some('\'') => b'\'',
            Some('"') => b'"',
            other => {
                return Err(ParseError(format!(
                    "unknown escape '\\{}'",
                    other.unwrap_or('\0')
                )))
            }
        },
        Some(c) if c.is_ascii() => c as u8,
        _ => return Err(ParseError(format!("bad character literal {text}"))),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::types::Type;

    #[test]
    fn parses_globals_and_prototypes() {
        let program = parse("int g = 3;\nfloat pi = 3.14f;\nint add(int a, int b);").unwrap();
        assert_eq!(program.decls.len(), 3);
        match &program.decls[2] {
            Decl::Function(f) => {
                assert_eq!(f.name.as_str(), "add");
                assert_eq!(f.params.len(), 2);
                assert!(f.body.is_none());
            }
            other => panic!("expected a prototype, got {other:?}"),
        }
    }

    #[test]
    fn comma_declarators_split() {
        let program = parse("int main() { int a = 5, b = 3; return a + b; }").unwrap();
        let Decl::Function(f) = &program.decls[0] else {
            panic!("expected a function");
        };
        let Some(Stmt::Compound { decls, stmts }) = f.body.as_ref() else {
            panic!("expected a body");
        };
        assert_eq!(decls.len(), 2);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn precedence_mul_binds_tighter() {
        let program = parse("int f() { return 1 + 2 * 3; }").unwrap();
        let Decl::Function(f) = &program.decls[0] else {
            panic!()
        };
        let Some(Stmt::Compound { stmts, .. }) = f.body.as_ref() else {
            panic!()
        };
        let Stmt::Return(Some(Expr::Binary { op, rhs, .. })) = &stmts[0] else {
            panic!("expected return of a binary expression")
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            **rhs,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn for_loop_with_declaration() {
        let program = parse("int f() { for (int i = 0; i < 5; i++) ; return 0; }").unwrap();
        let Decl::Function(f) = &program.decls[0] else {
            panic!()
        };
        let Some(Stmt::Compound { stmts, .. }) = f.body.as_ref() else {
            panic!()
        };
        let Stmt::For { init, cond, step, .. } = &stmts[0] else {
            panic!("expected a for loop")
        };
        assert!(matches!(init.as_deref(), Some(ForInit::Decl(_))));
        assert!(cond.is_some());
        assert!(step.is_some());
    }

    #[test]
    fn switch_cases_and_default() {
        let program = parse(
            "int f(int x) { switch (x) { case 1: return 1; default: return 9; } }",
        )
        .unwrap();
        let Decl::Function(f) = &program.decls[0] else {
            panic!()
        };
        let Some(Stmt::Compound { stmts, .. }) = f.body.as_ref() else {
            panic!()
        };
        let Stmt::Switch { body, .. } = &stmts[0] else {
            panic!("expected a switch")
        };
        let Stmt::Compound { stmts, .. } = &**body else {
            panic!()
        };
        assert!(matches!(&stmts[0], Stmt::Case { value: Some(_), .. }));
        assert!(matches!(&stmts[1], Stmt::Case { value: None, .. }));
    }

    #[test]
    fn enum_declaration_with_values() {
        let program = parse("enum Color { RED, GREEN = 5, BLUE };").unwrap();
        let Decl::Enum(e) = &program.decls[0] else {
            panic!("expected an enum")
        };
        assert_eq!(e.values.len(), 3);
        assert!(e.values[0].value.is_none());
        assert!(e.values[1].value.is_some());
    }

    #[test]
    fn sizeof_type_and_expr() {
        let program = parse("int f() { return sizeof(int) + sizeof f; }").unwrap();
        let Decl::Function(f) = &program.decls[0] else {
            panic!()
        };
        let Some(Stmt::Compound { stmts, .. }) = f.body.as_ref() else {
            panic!()
        };
        let Stmt::Return(Some(Expr::Binary { lhs, rhs, .. })) = &stmts[0] else {
            panic!()
        };
        assert!(matches!(**lhs, Expr::SizeofType(Type::Int)));
        assert!(matches!(**rhs, Expr::SizeofExpr(_)));
    }

    #[test]
    fn rejects_missing_semicolon() {
        assert!(parse("int f() { return 1 }").is_err());
    }
}
