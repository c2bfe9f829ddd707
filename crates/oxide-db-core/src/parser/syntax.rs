//! Syntax pass: tokens to an unresolved `SELECT` tree.

use super::error::ParseError;
use super::pratt::{
    infix_binding_power, prefix_binding_power, token_to_binary_op, token_to_unary_op,
    UNARY_BINDING_POWER,
};
use crate::expression::{ExprToken, Expression, ExpressionClass, ExpressionType};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::schema::{JoinType, SortOrder};
use crate::value::Value;

/// A table named in `FROM` or `JOIN`.
#[derive(Debug, Clone)]
pub struct TableSyntax {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// A `JOIN` clause.
#[derive(Debug, Clone)]
pub struct JoinSyntax {
    pub join_type: JoinType,
    pub table: TableSyntax,
    pub condition: Option<Expression>,
}

/// A select-list entry.
#[derive(Debug, Clone)]
pub enum ColumnSyntax {
    /// `*` or `t.*`.
    Asterisk {
        table: Option<String>,
        span: Span,
    },
    Expression {
        expression: Expression,
        alias: Option<String>,
    },
}

/// An `ORDER BY` entry.
#[derive(Debug, Clone)]
pub enum OrderBySyntax {
    /// A 1-based column number.
    Position {
        position: i64,
        order: SortOrder,
        span: Span,
    },
    Expression {
        expression: Expression,
        order: SortOrder,
    },
}

/// A parsed but unresolved `SELECT` statement.
#[derive(Debug, Clone, Default)]
pub struct SelectSyntax {
    pub columns: Vec<ColumnSyntax>,
    pub tables: Vec<TableSyntax>,
    pub joins: Vec<JoinSyntax>,
    pub where_clause: Option<Expression>,
    pub order_by: Vec<OrderBySyntax>,
    /// Source spans of every variable node.
    pub variable_spans: Vec<(Expression, Span)>,
}

impl SelectSyntax {
    /// Span of a variable node created by the parser.
    pub fn span_of(&self, variable: &Expression) -> Span {
        self.variable_spans
            .iter()
            .find(|(expr, _)| expr == variable)
            .map_or_else(|| Span::at(0), |(_, span)| *span)
    }
}

/// Recursive descent parser producing [`SelectSyntax`].
pub struct SyntaxParser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    variable_spans: Vec<(Expression, Span)>,
}

impl<'a> SyntaxParser<'a> {
    /// Creates a new parser for the given input.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
            variable_spans: Vec::new(),
        }
    }

    /// Parses one `SELECT` statement with an optional trailing semicolon.
    pub fn parse_select(mut self) -> Result<SelectSyntax, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let columns = self.parse_select_columns()?;

        // FROM clause (optional for expressions like SELECT 1+1)
        let mut tables = vec![];
        let mut joins = vec![];
        if self.check_keyword(Keyword::From) {
            self.advance();
            loop {
                tables.push(self.parse_table()?);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            while self.is_join_keyword() {
                joins.push(self.parse_join()?);
            }
        }

        // WHERE clause
        let where_clause = if self.check_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        // ORDER BY clause
        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.current.is_eof() {
            return Err(ParseError::unexpected(
                "end of statement",
                self.current.kind.clone(),
                self.current.span,
            ));
        }

        Ok(SelectSyntax {
            columns,
            tables,
            joins,
            where_clause,
            order_by,
            variable_spans: self.variable_spans,
        })
    }

    /// Parses SELECT columns.
    fn parse_select_columns(&mut self) -> Result<Vec<ColumnSyntax>, ParseError> {
        let mut columns = vec![];

        loop {
            if self.check(&TokenKind::Star) {
                let span = self.current.span;
                self.advance();
                columns.push(ColumnSyntax::Asterisk { table: None, span });
            } else if let Some((table, span)) = self.table_asterisk_ahead() {
                // identifier, dot, star
                self.advance();
                self.advance();
                self.advance();
                columns.push(ColumnSyntax::Asterisk {
                    table: Some(table),
                    span,
                });
            } else {
                let expression = self.parse_expression(0)?;

                // Check for alias (AS name or just name)
                let alias = if self.check_keyword(Keyword::As) {
                    self.advance();
                    Some(self.expect_identifier()?)
                } else if matches!(&self.current.kind, TokenKind::Identifier(_)) {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };

                columns.push(ColumnSyntax::Expression { expression, alias });
            }

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(columns)
    }

    /// Returns the table name and span if the next tokens are `name . *`.
    fn table_asterisk_ahead(&self) -> Option<(String, Span)> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return None;
        };
        let mut lookahead = self.lexer.clone();
        let dot = lookahead.next_token();
        let star = lookahead.next_token();
        (dot.kind == TokenKind::Dot && star.kind == TokenKind::Star)
            .then(|| (name.clone(), self.current.span.merge(star.span)))
    }

    /// Parses a table name with an optional alias.
    fn parse_table(&mut self) -> Result<TableSyntax, ParseError> {
        let start = self.current.span;
        let name = self.expect_identifier()?;
        let alias = self.parse_optional_alias()?;
        Ok(TableSyntax {
            name,
            alias,
            span: start.merge(self.previous.span),
        })
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            return Ok(Some(self.expect_identifier()?));
        }
        if matches!(&self.current.kind, TokenKind::Identifier(_)) {
            return Ok(Some(self.expect_identifier()?));
        }
        Ok(None)
    }

    /// Checks if current token starts a JOIN clause.
    fn is_join_keyword(&self) -> bool {
        matches!(
            &self.current.kind,
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    fn parse_join(&mut self) -> Result<JoinSyntax, ParseError> {
        let join_type = self.parse_join_type()?;
        let table = self.parse_table()?;
        let condition = if join_type != JoinType::Cross && self.check_keyword(Keyword::On) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };
        Ok(JoinSyntax {
            join_type,
            table,
            condition,
        })
    }

    /// Parses the join type and the JOIN keyword.
    fn parse_join_type(&mut self) -> Result<JoinType, ParseError> {
        let join_type = match &self.current.kind {
            TokenKind::Keyword(Keyword::Join) => JoinType::Inner,
            TokenKind::Keyword(Keyword::Inner) => {
                self.advance();
                JoinType::Inner
            }
            TokenKind::Keyword(Keyword::Left) => {
                self.advance();
                self.skip_outer();
                JoinType::Left
            }
            TokenKind::Keyword(Keyword::Right) => {
                self.advance();
                self.skip_outer();
                JoinType::Right
            }
            TokenKind::Keyword(Keyword::Full) => {
                self.advance();
                self.skip_outer();
                JoinType::Full
            }
            TokenKind::Keyword(Keyword::Cross) => {
                self.advance();
                JoinType::Cross
            }
            _ => {
                return Err(ParseError::unexpected(
                    "JOIN",
                    self.current.kind.clone(),
                    self.current.span,
                ))
            }
        };
        self.expect_keyword(Keyword::Join)?;
        Ok(join_type)
    }

    fn skip_outer(&mut self) {
        if self.check_keyword(Keyword::Outer) {
            self.advance();
        }
    }

    /// Parses ORDER BY list.
    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBySyntax>, ParseError> {
        let mut items = vec![];
        loop {
            let start = self.current.span;
            let expression = self.parse_expression(0)?;
            let span = start.merge(self.previous.span);
            let order = if self.check_keyword(Keyword::Desc) {
                self.advance();
                SortOrder::Descending
            } else {
                if self.check_keyword(Keyword::Asc) {
                    self.advance();
                }
                SortOrder::Ascending
            };

            let position = match (expression.expression_type(), expression.value()) {
                (ExpressionType::Const, Some(Value::Int(position))) => Some(position),
                _ => None,
            };
            items.push(match position {
                Some(position) => OrderBySyntax::Position {
                    position,
                    order,
                    span,
                },
                None => OrderBySyntax::Expression { expression, order },
            });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    /// Parses an expression using Pratt parsing.
    #[allow(clippy::while_let_loop)]
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expression, ParseError> {
        // Parse prefix (primary expression or unary operator)
        let mut lhs = self.parse_prefix()?;

        // Parse infix operators
        loop {
            // Check if current token is an infix operator
            let (l_bp, r_bp) = match infix_binding_power(&self.current.kind) {
                Some(bp) => bp,
                None => break,
            };

            if l_bp < min_bp {
                break;
            }

            // Handle special infix operators
            match &self.current.kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let token = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        ExprToken::SQL_IS_NOT_NULL
                    } else {
                        ExprToken::SQL_IS_NULL
                    };
                    self.expect_keyword(Keyword::Null)?;
                    lhs = Expression::unary(token, &lhs);
                }
                TokenKind::Keyword(Keyword::Not) => {
                    // NOT LIKE / NOT IN / NOT BETWEEN / NOT SIMILAR TO
                    self.advance();
                    lhs = self.parse_special_infix(lhs, r_bp, true)?;
                }
                TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like | Keyword::Similar) => {
                    lhs = self.parse_special_infix(lhs, r_bp, false)?;
                }
                _ => {
                    // Standard binary operator
                    if let Some((token, class)) = token_to_binary_op(&self.current.kind) {
                        self.advance();
                        let rhs = self.parse_expression(r_bp)?;
                        lhs = Expression::binary(class, &lhs, token, &rhs);
                    } else {
                        break;
                    }
                }
            }
        }

        Ok(lhs)
    }

    /// Parses the keyword operators that have a `NOT` form.
    fn parse_special_infix(
        &mut self,
        lhs: Expression,
        r_bp: u8,
        negated: bool,
    ) -> Result<Expression, ParseError> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::In) => {
                self.advance();
                let list = self.parse_argument_list()?;
                let token = if negated { ExprToken::NOT_IN } else { ExprToken::SQL_IN };
                Ok(Expression::binary(ExpressionClass::Relational, &lhs, token, &list))
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.advance();
                let low = self.parse_expression(r_bp)?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expression(r_bp)?;
                let token = if negated {
                    ExprToken::NOT_BETWEEN_AND
                } else {
                    ExprToken::BETWEEN_AND
                };
                let between = Expression::narg(ExpressionClass::SpecialBinary, token);
                between.append(&lhs);
                between.append(&low);
                between.append(&high);
                Ok(between)
            }
            TokenKind::Keyword(Keyword::Like) => {
                self.advance();
                let rhs = self.parse_expression(r_bp)?;
                let token = if negated { ExprToken::NOT_LIKE } else { ExprToken::LIKE };
                Ok(Expression::binary(ExpressionClass::Relational, &lhs, token, &rhs))
            }
            TokenKind::Keyword(Keyword::Similar) => {
                self.advance();
                self.expect_keyword(Keyword::To)?;
                let rhs = self.parse_expression(r_bp)?;
                let token = if negated {
                    ExprToken::NOT_SIMILAR_TO
                } else {
                    ExprToken::SIMILAR_TO
                };
                Ok(Expression::binary(ExpressionClass::Relational, &lhs, token, &rhs))
            }
            _ => Err(ParseError::unexpected(
                "LIKE, IN, BETWEEN, or SIMILAR TO",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        // Check for unary operators
        if let Some(token) = token_to_unary_op(&self.current.kind) {
            let bp = prefix_binding_power(&self.current.kind).unwrap_or(UNARY_BINDING_POWER);
            self.advance();
            let operand = self.parse_expression(bp)?;
            return Ok(Expression::unary(token, &operand));
        }

        self.parse_primary()
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.current.clone();

        let literal = match &token.kind {
            TokenKind::Integer(n) => Some(Value::Int(*n)),
            TokenKind::Float(f) => Some(Value::Float(*f)),
            TokenKind::String(s) => Some(Value::Text(s.clone())),
            TokenKind::Blob(b) => Some(Value::Blob(b.clone())),
            TokenKind::Keyword(Keyword::True) => Some(Value::Bool(true)),
            TokenKind::Keyword(Keyword::False) => Some(Value::Bool(false)),
            TokenKind::Keyword(Keyword::Null) => Some(Value::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expression::constant(value));
        }

        match &token.kind {
            // Parameter placeholders
            TokenKind::Question => {
                self.advance();
                Ok(Expression::query_parameter(""))
            }
            TokenKind::QueryParameter(message) => {
                self.advance();
                Ok(Expression::query_parameter(message.clone()))
            }

            // Parenthesized expression
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expression::unary(ExprToken::from_char('('), &inner))
            }

            // Column reference or function call
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }
                if self.check(&TokenKind::Dot) {
                    self.advance();
                    let column = self.expect_identifier()?;
                    let span = token.span.merge(self.previous.span);
                    return Ok(self.track_variable(Expression::qualified_variable(name, column), span));
                }
                Ok(self.track_variable(Expression::variable(name), token.span))
            }

            _ => Err(ParseError::unexpected(
                "expression",
                token.kind.clone(),
                token.span,
            )),
        }
    }

    /// Parses a function call after its name. `COUNT(*)` keeps `*` as a
    /// variable.
    fn parse_function_call(&mut self, name: String) -> Result<Expression, ParseError> {
        let args = if self.check(&TokenKind::LeftParen) {
            let mut lookahead = self.lexer.clone();
            let next = lookahead.next_token();
            let after = lookahead.next_token();
            if next.kind == TokenKind::Star && after.kind == TokenKind::RightParen {
                self.advance();
                self.advance();
                self.advance();
                let args = Expression::argument_list();
                args.append(&Expression::variable("*"));
                args
            } else {
                self.parse_argument_list()?
            }
        } else {
            Expression::argument_list()
        };
        Ok(Expression::function(name, &args))
    }

    /// Parses `( expr, ... )`, allowing an empty list.
    fn parse_argument_list(&mut self) -> Result<Expression, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let list = Expression::argument_list();
        if self.check(&TokenKind::RightParen) {
            self.advance();
            return Ok(list);
        }
        loop {
            list.append(&self.parse_expression(0)?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(list)
    }

    fn track_variable(&mut self, variable: Expression, span: Span) -> Expression {
        self.variable_spans.push((variable.clone(), span));
        variable
    }

    // Helper methods

    /// Advances to the next token.
    fn advance(&mut self) {
        self.previous = core::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects and returns an identifier.
    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected(
                "identifier",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> SelectSyntax {
        SyntaxParser::new(sql).parse_select().unwrap()
    }

    fn parse_err(sql: &str) -> ParseError {
        SyntaxParser::new(sql).parse_select().unwrap_err()
    }

    fn where_sql(sql: &str) -> String {
        parse(sql).where_clause.unwrap().to_sql(None)
    }

    #[test]
    fn test_simple_select() {
        let select = parse("SELECT id, name FROM cars");
        assert_eq!(select.columns.len(), 2);
        assert_eq!(select.tables.len(), 1);
        assert_eq!(select.tables[0].name, "cars");
        assert!(select.where_clause.is_none());
        assert_eq!(select.variable_spans.len(), 2);
    }

    #[test]
    fn test_asterisks() {
        let select = parse("SELECT *, c.* FROM cars c");
        assert!(matches!(&select.columns[0], ColumnSyntax::Asterisk { table: None, .. }));
        assert!(matches!(
            &select.columns[1],
            ColumnSyntax::Asterisk { table: Some(t), span } if t == "c" && *span == Span::new(10, 13)
        ));
        assert_eq!(select.tables[0].alias.as_deref(), Some("c"));
    }

    #[test]
    fn test_aliases() {
        let select = parse("SELECT id AS car_id, model m FROM cars AS c");
        let aliases: Vec<_> = select
            .columns
            .iter()
            .map(|column| match column {
                ColumnSyntax::Expression { alias, .. } => alias.clone(),
                ColumnSyntax::Asterisk { .. } => None,
            })
            .collect();
        assert_eq!(aliases, vec![Some("car_id".to_string()), Some("m".to_string())]);
        assert_eq!(select.tables[0].alias.as_deref(), Some("c"));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(where_sql("SELECT 1 WHERE 1 + 2 * 3 = 7"), "1 + 2 * 3 = 7");
        let select = parse("SELECT 1 WHERE a = 1 OR b = 2 AND c = 3");
        let root = select.where_clause.unwrap();
        assert_eq!(root.token(), ExprToken::OR);
        assert_eq!(root.right().unwrap().token(), ExprToken::AND);
    }

    #[test]
    fn test_not_binds_below_comparison() {
        let select = parse("SELECT 1 WHERE NOT a = 1 AND b = 2");
        let root = select.where_clause.unwrap();
        assert_eq!(root.token(), ExprToken::AND);
        let not = root.left().unwrap();
        assert_eq!(not.token(), ExprToken::NOT);
        assert_eq!(not.operand().unwrap().token(), ExprToken::from_char('='));
    }

    #[test]
    fn test_special_operators() {
        assert_eq!(where_sql("SELECT 1 WHERE a IS NOT NULL"), "a IS NOT NULL");
        assert_eq!(where_sql("SELECT 1 WHERE a IN (1, 2)"), "a IN (1, 2)");
        assert_eq!(where_sql("SELECT 1 WHERE a NOT IN (1)"), "a NOT IN (1)");
        assert_eq!(
            where_sql("SELECT 1 WHERE a NOT BETWEEN 1 AND 5"),
            "a NOT BETWEEN 1 AND 5"
        );
        assert_eq!(where_sql("SELECT 1 WHERE a LIKE 'x%'"), "a LIKE 'x%'");
        assert_eq!(
            where_sql("SELECT 1 WHERE a NOT SIMILAR TO 'x'"),
            "a NOT SIMILAR TO 'x'"
        );
        assert_eq!(where_sql("SELECT 1 WHERE a XOR b"), "a XOR b");
    }

    #[test]
    fn test_between_and_binds_correctly() {
        let select = parse("SELECT 1 WHERE a BETWEEN 1 AND 5 AND b = 2");
        let root = select.where_clause.unwrap();
        assert_eq!(root.token(), ExprToken::AND);
        assert_eq!(root.left().unwrap().arg_count(), 3);
    }

    #[test]
    fn test_functions_and_parameters() {
        let select = parse("SELECT COUNT(*), upper(name) FROM cars WHERE id = ? OR id = [Car id]");
        let ColumnSyntax::Expression { expression, .. } = &select.columns[0] else {
            panic!("expected expression");
        };
        assert_eq!(expression.class(), ExpressionClass::Aggregation);
        assert_eq!(expression.to_sql(None), "COUNT(*)");
        assert_eq!(
            select.where_clause.unwrap().to_sql(None),
            "id = ? OR id = [Car id]"
        );
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(where_sql("SELECT 1 WHERE (a + 1) * 2 > 3"), "(a + 1) * 2 > 3");
    }

    #[test]
    fn test_joins() {
        let select =
            parse("SELECT * FROM cars c LEFT OUTER JOIN owners o ON c.owner = o.id CROSS JOIN x");
        assert_eq!(select.joins.len(), 2);
        assert_eq!(select.joins[0].join_type, JoinType::Left);
        assert!(select.joins[0].condition.is_some());
        assert_eq!(select.joins[1].join_type, JoinType::Cross);
        assert!(select.joins[1].condition.is_none());
    }

    #[test]
    fn test_order_by() {
        let select = parse("SELECT id, model FROM cars ORDER BY 2 DESC, id;");
        assert!(matches!(
            select.order_by[0],
            OrderBySyntax::Position {
                position: 2,
                order: SortOrder::Descending,
                ..
            }
        ));
        assert!(matches!(
            &select.order_by[1],
            OrderBySyntax::Expression {
                order: SortOrder::Ascending,
                ..
            }
        ));
    }

    #[test]
    fn test_variable_spans() {
        let sql = "SELECT c.model FROM cars c";
        let select = parse(sql);
        let ColumnSyntax::Expression { expression, .. } = &select.columns[0] else {
            panic!("expected expression");
        };
        assert_eq!(select.span_of(expression).slice(sql), Some("c.model"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_err("SELECT id FROM");
        assert!(err.message.contains("end of input"));
        assert!(!err.is_semantic());

        let err = parse_err("SELECT id FROM cars garbage more");
        assert!(err.message.contains("end of statement"));

        let err = parse_err("SELEC id");
        assert_eq!(err.position(), 0);

        let err = parse_err("SELECT 'open");
        assert!(err.message.contains("Unterminated"));
    }
}
