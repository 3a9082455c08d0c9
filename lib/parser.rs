use anyhow::{anyhow, bail, Result};

use crate::{
    ast::{Expression, Program, Statement},
    lexer::Lexer,
    token::{Token, TokenKind},
};

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Assign => Precedence::Assign,
            TokenKind::Or => Precedence::Or,
            TokenKind::And => Precedence::And,
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
            TokenKind::Lparen => Precedence::Call,
            TokenKind::Lbracket | TokenKind::Dot => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        Self {
            cur_token: lexer.next_token(),
            peek_token: lexer.next_token(),
            lexer,
            errors: Vec::new(),
        }
    }

    /// Diagnostics collected by [`Parser::parse_program`]. A program with any
    /// diagnostics must not be evaluated.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements: Vec<Statement> = Vec::new();
        while !self.cur_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement_or_record() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn next_token(&mut self) -> &mut Self {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
        self
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur_token.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek_token.is(kind)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::from_token(self.peek_token.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::from_token(self.cur_token.kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> Result<()> {
        if self.peek_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(self.peek_error(kind))
        }
    }

    fn peek_error(&self, expected: TokenKind) -> anyhow::Error {
        anyhow!(
            "[{}:{}] expected next token to be {}, got {} instead",
            self.peek_token.line,
            self.peek_token.column,
            expected,
            self.peek_token.kind
        )
    }

    fn parse_statement_or_record(&mut self) -> Option<Statement> {
        match self.parse_statement() {
            Ok(statement) => statement,
            Err(err) => {
                self.errors.push(err.to_string());
                None
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Option<Statement>> {
        let statement = match self.cur_token.kind {
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent => return Ok(None),
            TokenKind::Bring => self.parse_return_statement()?,
            TokenKind::Summon => self.parse_summon_statement()?,
            TokenKind::Prowl => self.parse_prowl_statement()?,
            TokenKind::Track => self.parse_track_statement()?,
            TokenKind::Mold => self.parse_class_statement()?,
            _ => Statement::Expression(self.parse_expression(Precedence::Lowest)?),
        };
        Ok(Some(statement))
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        if matches!(
            self.peek_token.kind,
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        ) {
            return Ok(Statement::Return(Expression::NilLiteral));
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Statement::Return(value))
    }

    fn parse_summon_statement(&mut self) -> Result<Statement> {
        let path = match self.peek_token.kind {
            TokenKind::String => self.peek_token.literal.clone(),
            TokenKind::Ident => format!("{}.wlf", self.peek_token.literal),
            _ => return Err(self.peek_error(TokenKind::String)),
        };
        self.next_token();
        Ok(Statement::Summon(path))
    }

    fn parse_prowl_statement(&mut self) -> Result<Statement> {
        self.next_token();

        let (line, column) = (self.cur_token.line, self.cur_token.column);
        let call = self.parse_expression(Precedence::Lowest)?;
        if !matches!(call, Expression::Call { .. }) {
            bail!("[{line}:{column}] expected call expression after prowl, got {call}");
        }

        Ok(Statement::Prowl(call))
    }

    fn parse_track_statement(&mut self) -> Result<Statement> {
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block()?;

        Ok(Statement::Track {
            condition,
            body: Box::new(body),
        })
    }

    fn parse_class_statement(&mut self) -> Result<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = self.cur_token.literal.clone();

        let superclass = if self.peek_is(TokenKind::Colon) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            Some(self.cur_token.literal.clone())
        } else {
            None
        };

        let body = self.parse_block()?;

        Ok(Statement::Class {
            name,
            superclass,
            body: Box::new(body),
        })
    }

    /// Parses the body of a block construct. Leaves the current token on the
    /// last token of the body: its DEDENT, or the end of a single-line body
    /// (the line's NEWLINE when that body ends in a `sniff`).
    fn parse_block(&mut self) -> Result<Statement> {
        if self.peek_is(TokenKind::Newline) {
            self.next_token();
            if !self.peek_is(TokenKind::Indent) {
                return Err(self.peek_error(TokenKind::Indent));
            }
        }

        if !self.peek_is(TokenKind::Indent) {
            if matches!(
                self.peek_token.kind,
                TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
            ) {
                return Err(self.peek_error(TokenKind::Indent));
            }
            self.next_token();
            let statement = self.parse_statement()?;
            return Ok(Statement::Block(statement.into_iter().collect()));
        }

        self.next_token().next_token();

        let mut statements: Vec<Statement> = Vec::new();

        while !self.cur_is(TokenKind::Dedent) && !self.cur_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement_or_record() {
                statements.push(statement);
            }
            self.next_token();
        }

        Ok(Statement::Block(statements))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        let cur_token = self.cur_token.clone();

        let mut left_exp = match cur_token.kind {
            TokenKind::Ident => Expression::Identifier(cur_token.literal),
            TokenKind::Dollar => self.parse_variable()?,
            TokenKind::Int => self.parse_integer_literal(&cur_token)?,
            TokenKind::Float => self.parse_float_literal(&cur_token)?,
            TokenKind::String => Expression::StringLiteral(cur_token.literal),
            TokenKind::True | TokenKind::False => {
                Expression::BooleanLiteral(cur_token.is(TokenKind::True))
            }
            TokenKind::Nil => Expression::NilLiteral,
            TokenKind::Minus | TokenKind::Not => self.parse_prefix_expression(cur_token.kind)?,
            TokenKind::Lparen => self.parse_grouped_expression()?,
            TokenKind::Lbracket => {
                Expression::ArrayLiteral(self.parse_expression_list(TokenKind::Rbracket)?)
            }
            TokenKind::Lbrace => self.parse_hash_literal()?,
            TokenKind::Sniff => self.parse_if_expression()?,
            TokenKind::Hunt => self.parse_function_literal()?,
            TokenKind::Howl => self.parse_howl_expression()?,
            kind => bail!(
                "[{}:{}] no prefix parse function for {} found",
                cur_token.line,
                cur_token.column,
                kind
            ),
        };

        while !self.cur_is(TokenKind::Newline) && precedence < self.peek_precedence() {
            match self.peek_token.kind {
                TokenKind::Lparen => {
                    self.next_token();
                    left_exp = Expression::Call {
                        function: Box::new(left_exp),
                        arguments: self.parse_expression_list(TokenKind::Rparen)?,
                    };
                }
                TokenKind::Lbracket => {
                    self.next_token();
                    left_exp = self.parse_index_expression(left_exp)?;
                }
                _ => {
                    self.next_token();
                    left_exp = self.parse_infix_expression(left_exp)?;
                }
            };
        }

        Ok(left_exp)
    }

    fn parse_variable(&mut self) -> Result<Expression> {
        self.expect_peek(TokenKind::Ident)?;
        Ok(Expression::Identifier(self.cur_token.literal.clone()))
    }

    fn parse_prefix_expression(&mut self, operator: TokenKind) -> Result<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression> {
        let operator = self.cur_token.kind;
        let precedence = self.cur_precedence();
        self.next_token();

        let right = match operator {
            // right-associative: `$a = $b = 1`
            TokenKind::Assign => self.parse_expression(Precedence::Lowest)?,
            TokenKind::Dot => {
                if !self.cur_is(TokenKind::Ident) {
                    bail!(
                        "[{}:{}] expected next token to be {}, got {} instead",
                        self.cur_token.line,
                        self.cur_token.column,
                        TokenKind::Ident,
                        self.cur_token.kind
                    );
                }
                Expression::Identifier(self.cur_token.literal.clone())
            }
            _ => self.parse_expression(precedence)?,
        };

        Ok(Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_integer_literal(&mut self, token: &Token) -> Result<Expression> {
        let value = token.literal.parse::<i64>().map_err(|_| {
            anyhow!(
                "[{}:{}] could not parse {:?} as integer",
                token.line,
                token.column,
                token.literal
            )
        })?;
        Ok(Expression::IntegerLiteral(value))
    }

    fn parse_float_literal(&mut self, token: &Token) -> Result<Expression> {
        let value = token.literal.parse::<f64>().map_err(|_| {
            anyhow!(
                "[{}:{}] could not parse {:?} as float",
                token.line,
                token.column,
                token.literal
            )
        })?;
        Ok(Expression::FloatLiteral(value))
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rparen)?;
        Ok(exp)
    }

    fn parse_if_expression(&mut self) -> Result<Expression> {
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        let consequence = self.parse_block()?;

        // a single-line body ends with its line, so `missing` may open the next one
        if self.peek_is(TokenKind::Newline) {
            self.next_token();
        }

        let alternative = if self.peek_is(TokenKind::Missing) {
            self.next_token();
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative,
        })
    }

    fn parse_hash_literal(&mut self) -> Result<Expression> {
        let mut pairs: Vec<(Expression, Expression)> = Vec::new();

        while !self.peek_is(TokenKind::Rbrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenKind::Rbrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::Rbrace)?;

        Ok(Expression::HashLiteral(pairs))
    }

    fn parse_function_literal(&mut self) -> Result<Expression> {
        let name = if self.peek_is(TokenKind::Ident) {
            self.next_token();
            Some(self.cur_token.literal.clone())
        } else {
            None
        };

        self.expect_peek(TokenKind::Lparen)?;

        let parameters = self.parse_function_parameters()?;

        let body = self.parse_block()?;

        Ok(Expression::FunctionLiteral {
            name,
            parameters,
            body: Box::new(body),
        })
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<String>> {
        let mut parameters: Vec<String> = Vec::new();

        if self.peek_is(TokenKind::Rparen) {
            self.next_token();
            return Ok(parameters);
        }

        parameters.push(self.parse_parameter()?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            parameters.push(self.parse_parameter()?);
        }

        self.expect_peek(TokenKind::Rparen)?;

        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> Result<String> {
        self.expect_peek(TokenKind::Dollar)?;
        self.expect_peek(TokenKind::Ident)?;
        Ok(self.cur_token.literal.clone())
    }

    fn parse_howl_expression(&mut self) -> Result<Expression> {
        self.expect_peek(TokenKind::Lparen)?;
        let arguments = self.parse_expression_list(TokenKind::Rparen)?;
        Ok(Expression::Call {
            function: Box::new(Expression::Identifier("howl".to_string())),
            arguments,
        })
    }

    fn parse_expression_list(&mut self, end_token: TokenKind) -> Result<Vec<Expression>> {
        let mut expressions: Vec<Expression> = Vec::new();

        if self.peek_is(end_token) {
            self.next_token();
            return Ok(expressions);
        }

        self.next_token();

        expressions.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token().next_token();
            expressions.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end_token)?;

        Ok(expressions)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Result<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rbracket)?;
        Ok(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }
}

/// Lexes and parses `input`, failing with every collected diagnostic.
pub fn parse(input: &str) -> Result<Program> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        bail!("{}", parser.errors().join("\n"));
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use pretty_assertions::assert_eq;

    use super::*;

    fn get_program(input: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            panic!("parser errors for {:?}: {:?}", input, parser.errors());
        }
        program
    }

    fn get_errors(input: &str) -> Vec<String> {
        let mut parser = Parser::new(Lexer::new(input));
        parser.parse_program();
        parser.errors().to_vec()
    }

    fn single_expression(input: &str) -> Expression {
        let program = get_program(input);
        assert_eq!(program.statements.len(), 1, "{}", program);
        match program.statements.into_iter().next() {
            Some(Statement::Expression(expression)) => expression,
            other => panic!("expected expression statement, found {:?}", other),
        }
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    fn int(value: i64) -> Expression {
        Expression::IntegerLiteral(value)
    }

    fn infix(left: Expression, operator: TokenKind, right: Expression) -> Expression {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    #[test]
    fn assignment_statements() {
        let program = get_program("$x = 5\ny = $x");
        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(infix(ident("x"), TokenKind::Assign, int(5))),
                Statement::Expression(infix(ident("y"), TokenKind::Assign, ident("x"))),
            ]
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            single_expression("$a = $b = 1"),
            infix(
                ident("a"),
                TokenKind::Assign,
                infix(ident("b"), TokenKind::Assign, int(1))
            )
        );
    }

    #[test]
    fn return_statements() {
        let program = get_program("bring 5\nbring\n");
        assert_eq!(
            program.statements,
            vec![
                Statement::Return(int(5)),
                Statement::Return(Expression::NilLiteral)
            ]
        );
    }

    #[test]
    fn literal_expressions() {
        let cases = vec![
            ("foobar", ident("foobar")),
            ("$foobar", ident("foobar")),
            ("5", int(5)),
            ("2.5", Expression::FloatLiteral(2.5)),
            ("\"hello world\"", Expression::StringLiteral("hello world".to_string())),
            ("true", Expression::BooleanLiteral(true)),
            ("salah", Expression::BooleanLiteral(false)),
            ("kopong", Expression::NilLiteral),
        ];
        for (input, expected) in cases {
            assert_eq!(single_expression(input), expected);
        }
    }

    #[test]
    fn prefix_operators() {
        let cases = vec![
            ("-15", TokenKind::Minus, int(15)),
            ("not true", TokenKind::Not, Expression::BooleanLiteral(true)),
            ("ora $x", TokenKind::Not, ident("x")),
        ];
        for (input, operator, right) in cases {
            assert_eq!(
                single_expression(input),
                Expression::Prefix {
                    operator,
                    right: Box::new(right)
                }
            );
        }
    }

    #[test]
    fn operator_precedence() {
        let cases = vec![
            ("-a * b", "((- a) * b)"),
            ("not -a", "(not (- a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b % c", "(a + (b % c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 >= 4 != 3 <= 4", "((5 >= 4) != (3 <= 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("a or b and c", "(a or (b and c))"),
            ("a == b and c != d", "((a == b) and (c != d))"),
            ("true", "true"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("-(5 + 5)", "(- (5 + 5))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
            ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
            ("$x = 1 + 2 * 3", "(x = (1 + (2 * 3)))"),
            ("$a.b.c", "((a . b) . c)"),
            ("$a.b(1).c[0]", "(((a . b)(1) . c)[0])"),
            ("this.x = $x + 1", "((this . x) = (x + 1))"),
            ("-a.b", "(- (a . b))"),
        ];
        for (input, expected) in cases {
            let program = get_program(input);
            assert_eq!(program.to_string(), expected, "{}", input);
        }
    }

    #[test]
    fn collection_literals() {
        assert_eq!(
            single_expression("[1, 2 * 2, \"three\"]"),
            Expression::ArrayLiteral(vec![
                int(1),
                infix(int(2), TokenKind::Asterisk, int(2)),
                Expression::StringLiteral("three".to_string()),
            ])
        );
        assert_eq!(single_expression("[]"), Expression::ArrayLiteral(vec![]));
        assert_eq!(
            single_expression("{\"one\": 1, true: 0 + 2}"),
            Expression::HashLiteral(vec![
                (Expression::StringLiteral("one".to_string()), int(1)),
                (
                    Expression::BooleanLiteral(true),
                    infix(int(0), TokenKind::Plus, int(2))
                ),
            ])
        );
        assert_eq!(single_expression("{}"), Expression::HashLiteral(vec![]));
    }

    #[test]
    fn multiline_hash_literal() {
        let program = get_program("$h = {\n    \"a\": 1,\n    \"b\": 2\n}\nhowl($h)");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn if_expression_with_blocks() {
        let input = "sniff $x < $y\n    $x\nmissing\n    $y\n";
        assert_eq!(
            single_expression(input),
            Expression::If {
                condition: Box::new(infix(ident("x"), TokenKind::Lt, ident("y"))),
                consequence: Box::new(Statement::Block(vec![Statement::Expression(ident("x"))])),
                alternative: Some(Box::new(Statement::Block(vec![Statement::Expression(
                    ident("y")
                )]))),
            }
        );
    }

    #[test]
    fn single_line_bodies() {
        let program = get_program("sniff $ok howl(1)\ntrack $go $go = false\nhunt one() bring 1");
        assert_eq!(program.statements.len(), 3);
        match &program.statements[1] {
            Statement::Track { condition, body } => {
                assert_eq!(*condition, ident("go"));
                assert_eq!(
                    **body,
                    Statement::Block(vec![Statement::Expression(infix(
                        ident("go"),
                        TokenKind::Assign,
                        Expression::BooleanLiteral(false)
                    ))])
                );
            }
            other => panic!("expected track statement, found {}", other),
        }

        let program = get_program("$x = false\nsniff $x 1\nmissing 2");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(
            program.statements[1],
            Statement::Expression(Expression::If {
                condition: Box::new(ident("x")),
                consequence: Box::new(Statement::Block(vec![Statement::Expression(int(1))])),
                alternative: Some(Box::new(Statement::Block(vec![Statement::Expression(int(
                    2
                ))]))),
            })
        );

        // the next line starts a new statement, it does not continue the `sniff`
        let program = get_program("sniff $x 1\n-5\n(6)");
        assert_eq!(program.statements.len(), 3);
        assert_eq!(
            program.statements[1],
            Statement::Expression(Expression::Prefix {
                operator: TokenKind::Minus,
                right: Box::new(int(5)),
            })
        );
    }

    #[test]
    fn function_literals() {
        let input = "hunt add($x, $y)\n    bring $x + $y\n";
        assert_eq!(
            single_expression(input),
            Expression::FunctionLiteral {
                name: Some("add".to_string()),
                parameters: vec!["x".to_string(), "y".to_string()],
                body: Box::new(Statement::Block(vec![Statement::Return(infix(
                    ident("x"),
                    TokenKind::Plus,
                    ident("y")
                ))])),
            }
        );

        let cases = vec![
            ("hunt() 1", vec![]),
            ("hunt($x) 1", vec!["x"]),
            ("garap($x, $y, $z) 1", vec!["x", "y", "z"]),
        ];
        for (input, expected) in cases {
            match single_expression(input) {
                Expression::FunctionLiteral {
                    name, parameters, ..
                } => {
                    assert_eq!(name, None);
                    assert_eq!(parameters, expected);
                }
                other => panic!("expected function literal, found {}", other),
            }
        }
    }

    #[test]
    fn parameters_require_the_variable_sigil() {
        let errors = get_errors("hunt f(x) 1");
        assert_eq!(
            errors.first().map(String::as_str),
            Some("[1:8] expected next token to be $, got IDENT instead")
        );
    }

    #[test]
    fn call_and_howl_expressions() {
        let expected = Expression::Call {
            function: Box::new(ident("howl")),
            arguments: vec![int(1), infix(int(2), TokenKind::Asterisk, int(3))],
        };
        assert_eq!(single_expression("howl(1, 2 * 3)"), expected);
        assert_eq!(single_expression("ketok(1, 2 * 3)"), expected);

        match single_expression("add(1)(2)") {
            Expression::Call {
                function,
                arguments,
            } => {
                assert_eq!(arguments, vec![int(2)]);
                assert!(matches!(function.deref(), Expression::Call { .. }));
            }
            other => panic!("expected call expression, found {}", other),
        }
    }

    #[test]
    fn class_statements() {
        let input = "mold Dog : Animal\n    hunt init($name)\n        this.name = $name\n    hunt speak()\n        bring \"woof\"\n";
        let program = get_program(input);
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Class {
                name,
                superclass,
                body,
            } => {
                assert_eq!(name, "Dog");
                assert_eq!(superclass.as_deref(), Some("Animal"));
                match body.deref() {
                    Statement::Block(statements) => assert_eq!(statements.len(), 2),
                    other => panic!("expected block, found {}", other),
                }
            }
            other => panic!("expected class statement, found {}", other),
        }

        match &get_program("gerombolan Cat\n    hunt purr() 1\n").statements[0] {
            Statement::Class { superclass, .. } => assert_eq!(*superclass, None),
            other => panic!("expected class statement, found {}", other),
        }
    }

    #[test]
    fn summon_and_prowl_statements() {
        let program = get_program("summon \"lib/util.wlf\"\nundang router\nprowl work(1)");
        assert_eq!(
            program.statements,
            vec![
                Statement::Summon("lib/util.wlf".to_string()),
                Statement::Summon("router.wlf".to_string()),
                Statement::Prowl(Expression::Call {
                    function: Box::new(ident("work")),
                    arguments: vec![int(1)],
                }),
            ]
        );

        assert_eq!(
            get_errors("prowl 1 + 2"),
            vec!["[1:7] expected call expression after prowl, got (1 + 2)".to_string()]
        );
    }

    #[test]
    fn nested_blocks_close_in_order() {
        let input = "hunt f($x)\n    sniff $x\n        bring 1\n    bring 2\nhowl(f(true))";
        let program = get_program(input);
        assert_eq!(program.statements.len(), 2);
        assert_eq!(
            program.to_string(),
            "hunt f($x)\n    sniff x\n        bring 1\n    bring 2\nhowl(f(true))"
        );
    }

    #[test]
    fn errors_are_collected() {
        let errors = get_errors("$x = )\n$y = 1\n[1, 2\n@");
        assert_eq!(
            errors,
            vec![
                "[1:6] no prefix parse function for ) found".to_string(),
                "[4:1] expected next token to be ], got ILLEGAL instead".to_string(),
                "[4:1] no prefix parse function for ILLEGAL found".to_string(),
            ]
        );
    }

    #[test]
    fn missing_block_body_is_reported() {
        assert_eq!(
            get_errors("sniff $x\n"),
            vec!["[2:1] expected next token to be INDENT, got EOF instead".to_string()]
        );
    }

    #[test]
    fn unindented_body_is_reported() {
        let errors = get_errors("sniff $x\nhowl(1)");
        assert_eq!(
            errors,
            vec!["[2:1] expected next token to be INDENT, got howl instead".to_string()]
        );
    }

    #[test]
    fn inconsistent_dedent_is_reported() {
        let errors = get_errors("hunt f()\n        bring 1\n    bring 2\n");
        assert!(!errors.is_empty());
        assert!(errors[0].contains("ILLEGAL"), "{:?}", errors);
    }

    #[test]
    fn canonical_form_round_trips() {
        let inputs = vec![
            "5",
            "\"text\"",
            "1.5",
            "100000000000000000000.0",
            "0.0000001",
            "true",
            "nil",
            "[1, \"a\", [2]]",
            "{\"k\": 1, 2: false}",
            "$a + $b * 2 - -$c",
            "not ($a == $b) or $c >= 1",
            "add(1, f(2), [3][0])",
            "howl($x % 2)",
            "$obj.field = $obj.other.method(1)",
            "sniff $x > 1\n    howl(1)\nmissing\n    bring 2",
            "hunt add($a, $b)\n    $sum = $a + $b\n    bring $sum",
            "hunt($n) $n * 2",
            "track $i < 10\n    $i = $i + 1",
            "mold Dog : Animal\n    hunt speak()\n        bring \"woof\"",
            "summon \"a.wlf\"",
            "prowl work(1, 2)",
        ];

        for input in inputs {
            let program = get_program(input);
            let reparsed = get_program(&program.to_string());
            assert_eq!(reparsed, program, "{}", input);
        }
    }
}
