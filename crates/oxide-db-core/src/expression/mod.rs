//! Expression tree.
//!
//! An [`Expression`] is a shared handle to a node. Cloning the handle is
//! cheap and yields the same node; [`Expression::deep_clone`] copies the whole
//! subtree. Equality (`==`) compares identity, [`Expression::is_same_as`]
//! compares structure.
//!
//! Nodes know their parent through a weak link. A node is a child of at most
//! one parent: inserting it somewhere else detaches it first.
//!
//! ```
//! use oxide_db_core::expression::{ExprToken, Expression, ExpressionClass};
//! use oxide_db_core::value::Value;
//!
//! let cond = Expression::binary(
//!     ExpressionClass::Relational,
//!     &Expression::variable("id"),
//!     ExprToken::from_char('='),
//!     &Expression::constant(Value::Int(1)),
//! );
//! assert_eq!(cond.to_sql(None), "id = 1");
//! ```

mod token;

use core::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

pub use token::ExprToken;

use crate::driver::{Driver, IdentifierEscaping};
use crate::schema::Field;
use crate::value::Value;

/// Semantic class of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionClass {
    /// No class. An n-ary node with this class stays null.
    Unknown,
    /// Unary operator.
    Unary,
    /// `+ - * / % & | << >> ||`.
    Arithmetic,
    /// `AND OR XOR`.
    Logical,
    /// Comparisons, `LIKE`, `IN`, `SIMILAR TO`.
    Relational,
    /// `BETWEEN .. AND ..`.
    SpecialBinary,
    /// Literal.
    Const,
    /// Column reference.
    Variable,
    /// Scalar function call.
    Function,
    /// Aggregate function call.
    Aggregation,
    /// Comma separated columns.
    FieldList,
    /// Comma separated tables.
    TableList,
    /// Parenthesized arguments.
    ArgumentList,
    /// `?` or `[message]`.
    QueryParameter,
}

/// Variant of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    /// The null expression.
    Null,
    /// One operand.
    Unary,
    /// Ordered list of operands.
    NArg,
    /// Literal value.
    Const,
    /// Column reference.
    Variable,
    /// Function call.
    Function,
    /// Query parameter.
    QueryParameter,
}

const AGGREGATE_FUNCTIONS: &[&str] = &["AVG", "COUNT", "MAX", "MIN", "SUM"];

const PAREN: ExprToken = ExprToken::from_char('(');

/// Returns true if `name` is a built-in aggregate function.
#[must_use]
pub fn is_aggregate_function(name: &str) -> bool {
    AGGREGATE_FUNCTIONS
        .binary_search(&name.to_ascii_uppercase().as_str())
        .is_ok()
}

#[derive(Debug, Clone, Default)]
struct VariableData {
    table: Option<String>,
    name: String,
    field: Option<Arc<Field>>,
    table_position: Option<usize>,
}

impl VariableData {
    fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{table}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

enum Kind {
    Null,
    Unary(Option<Expression>),
    NArg(Vec<Expression>),
    Const(Value),
    Variable(VariableData),
    Function { name: String, args: Expression },
    QueryParameter { message: String },
}

struct Node {
    class: ExpressionClass,
    token: ExprToken,
    kind: Kind,
    parent: Weak<RefCell<Node>>,
}

/// Shared handle to an expression node.
#[derive(Clone)]
pub struct Expression(Rc<RefCell<Node>>);

impl Expression {
    fn from_node(class: ExpressionClass, token: ExprToken, kind: Kind) -> Self {
        let expr = Self(Rc::new(RefCell::new(Node {
            class,
            token,
            kind,
            parent: Weak::new(),
        })));
        expr.adopt_children();
        expr
    }

    fn adopt_children(&self) {
        let weak = Rc::downgrade(&self.0);
        for child in self.children() {
            child.0.borrow_mut().parent = weak.clone();
        }
    }

    /// The null expression, rendered as `NULL`.
    #[must_use]
    pub fn null() -> Self {
        Self::from_node(ExpressionClass::Unknown, ExprToken::NONE, Kind::Null)
    }

    /// A unary expression. `operand` is detached from its current parent.
    #[must_use]
    pub fn unary(token: ExprToken, operand: &Self) -> Self {
        let expr = Self::from_node(ExpressionClass::Unary, token, Kind::Unary(None));
        expr.set_operand(operand);
        expr
    }

    /// An empty n-ary expression.
    ///
    /// With [`ExpressionClass::Unknown`] the node behaves as null and rejects
    /// children.
    #[must_use]
    pub fn narg(class: ExpressionClass, token: ExprToken) -> Self {
        Self::from_node(class, token, Kind::NArg(Vec::new()))
    }

    /// A binary operator, stored as a two-argument n-ary node.
    #[must_use]
    pub fn binary(class: ExpressionClass, left: &Self, token: ExprToken, right: &Self) -> Self {
        let expr = Self::narg(class, token);
        expr.append(left);
        expr.append(right);
        expr
    }

    /// An empty parenthesized argument list.
    #[must_use]
    pub fn argument_list() -> Self {
        Self::narg(ExpressionClass::ArgumentList, ExprToken::from_char(','))
    }

    /// A literal. The token follows the value's type.
    #[must_use]
    pub fn constant(value: Value) -> Self {
        let token = match &value {
            Value::Null => ExprToken::SQL_NULL,
            Value::Bool(true) => ExprToken::SQL_TRUE,
            Value::Bool(false) => ExprToken::SQL_FALSE,
            Value::Int(_) => ExprToken::INTEGER_CONST,
            Value::Float(_) => ExprToken::REAL_CONST,
            Value::Text(_) => ExprToken::CHARACTER_STRING_LITERAL,
            Value::Blob(_) => ExprToken::BINARY_CONST,
        };
        Self::from_node(ExpressionClass::Const, token, Kind::Const(value))
    }

    /// An unqualified column reference. `"*"` stands for all columns.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new_variable(None, name.into())
    }

    /// A column reference qualified by a table name or alias.
    #[must_use]
    pub fn qualified_variable(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new_variable(Some(table.into()), name.into())
    }

    fn new_variable(table: Option<String>, name: String) -> Self {
        Self::from_node(
            ExpressionClass::Variable,
            ExprToken::IDENTIFIER,
            Kind::Variable(VariableData {
                table,
                name,
                ..VariableData::default()
            }),
        )
    }

    /// A function call. Aggregates get [`ExpressionClass::Aggregation`].
    ///
    /// `args` should be an [`argument list`](Self::argument_list).
    #[must_use]
    pub fn function(name: impl Into<String>, args: &Self) -> Self {
        let name = name.into();
        let class = if is_aggregate_function(&name) {
            ExpressionClass::Aggregation
        } else {
            ExpressionClass::Function
        };
        args.detach();
        Self::from_node(
            class,
            ExprToken::IDENTIFIER,
            Kind::Function {
                name,
                args: args.clone(),
            },
        )
    }

    /// A query parameter. An empty message renders as `?`.
    #[must_use]
    pub fn query_parameter(message: impl Into<String>) -> Self {
        Self::from_node(
            ExpressionClass::QueryParameter,
            ExprToken::QUERY_PARAMETER,
            Kind::QueryParameter {
                message: message.into(),
            },
        )
    }

    /// Class of the node.
    #[must_use]
    pub fn class(&self) -> ExpressionClass {
        self.0.borrow().class
    }

    /// Token of the node.
    #[must_use]
    pub fn token(&self) -> ExprToken {
        self.0.borrow().token
    }

    /// Variant of the node.
    #[must_use]
    pub fn expression_type(&self) -> ExpressionType {
        match self.0.borrow().kind {
            Kind::Null => ExpressionType::Null,
            Kind::Unary(_) => ExpressionType::Unary,
            Kind::NArg(_) => ExpressionType::NArg,
            Kind::Const(_) => ExpressionType::Const,
            Kind::Variable(_) => ExpressionType::Variable,
            Kind::Function { .. } => ExpressionType::Function,
            Kind::QueryParameter { .. } => ExpressionType::QueryParameter,
        }
    }

    /// Returns true for the null expression and for class-less n-ary nodes.
    #[must_use]
    pub fn is_null(&self) -> bool {
        let node = self.0.borrow();
        match node.kind {
            Kind::Null => true,
            Kind::NArg(_) => node.class == ExpressionClass::Unknown,
            _ => false,
        }
    }

    /// The node this one is a child of.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(Self)
    }

    fn children(&self) -> Vec<Self> {
        match &self.0.borrow().kind {
            Kind::Unary(Some(operand)) => vec![operand.clone()],
            Kind::NArg(args) => args.clone(),
            Kind::Function { args, .. } => vec![args.clone()],
            _ => Vec::new(),
        }
    }

    fn has_ancestor(&self, other: &Self) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node == *other {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Number of operands of an n-ary node; zero for every other variant.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        match &self.0.borrow().kind {
            Kind::NArg(args) => args.len(),
            _ => 0,
        }
    }

    /// Operand `index` of an n-ary node.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<Self> {
        match &self.0.borrow().kind {
            Kind::NArg(args) => args.get(index).cloned(),
            _ => None,
        }
    }

    /// All operands of an n-ary node.
    #[must_use]
    pub fn args(&self) -> Vec<Self> {
        match &self.0.borrow().kind {
            Kind::NArg(args) => args.clone(),
            _ => Vec::new(),
        }
    }

    /// Left side of a binary node.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.arg(0)
    }

    /// Right side of a binary node.
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.arg(1)
    }

    /// Operand of a unary node.
    #[must_use]
    pub fn operand(&self) -> Option<Self> {
        match &self.0.borrow().kind {
            Kind::Unary(operand) => operand.clone(),
            _ => None,
        }
    }

    /// Replaces the operand of a unary node.
    ///
    /// Returns false when the node is not unary or `operand` is the node
    /// itself or one of its ancestors.
    pub fn set_operand(&self, operand: &Self) -> bool {
        if !matches!(self.0.borrow().kind, Kind::Unary(_))
            || operand == self
            || self.has_ancestor(operand)
        {
            return false;
        }
        if let Some(old) = self.operand() {
            if old == *operand {
                return false;
            }
            old.detach();
        }
        operand.detach();
        operand.0.borrow_mut().parent = Rc::downgrade(&self.0);
        if let Kind::Unary(slot) = &mut self.0.borrow_mut().kind {
            *slot = Some(operand.clone());
        }
        true
    }

    /// Value of a constant.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        match &self.0.borrow().kind {
            Kind::Const(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Name of a variable as written, including its qualifier.
    #[must_use]
    pub fn variable_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Variable(data) => Some(data.qualified_name()),
            _ => None,
        }
    }

    /// Column part of a variable's name.
    #[must_use]
    pub fn variable_column(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Variable(data) => Some(data.name.clone()),
            _ => None,
        }
    }

    /// Qualifier of a variable, if any.
    #[must_use]
    pub fn variable_table(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Variable(data) => data.table.clone(),
            _ => None,
        }
    }

    /// Field a variable was resolved to.
    #[must_use]
    pub fn field(&self) -> Option<Arc<Field>> {
        match &self.0.borrow().kind {
            Kind::Variable(data) => data.field.clone(),
            _ => None,
        }
    }

    /// Query table position a variable was resolved to.
    #[must_use]
    pub fn table_position(&self) -> Option<usize> {
        match &self.0.borrow().kind {
            Kind::Variable(data) => data.table_position,
            _ => None,
        }
    }

    /// Binds a variable to a field of the query table at `table_position`.
    ///
    /// Returns false for other variants.
    pub fn resolve_variable(&self, field: Arc<Field>, table_position: usize) -> bool {
        match &mut self.0.borrow_mut().kind {
            Kind::Variable(data) => {
                data.field = Some(field);
                data.table_position = Some(table_position);
                true
            }
            _ => false,
        }
    }

    /// Name of a function call.
    #[must_use]
    pub fn function_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Function { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    /// Argument list of a function call.
    #[must_use]
    pub fn function_args(&self) -> Option<Self> {
        match &self.0.borrow().kind {
            Kind::Function { args, .. } => Some(args.clone()),
            _ => None,
        }
    }

    /// Message of a query parameter.
    #[must_use]
    pub fn query_parameter_message(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::QueryParameter { message } => Some(message.clone()),
            _ => None,
        }
    }

    /// Appends `child` to an n-ary node. See [`insert`](Self::insert).
    pub fn append(&self, child: &Self) -> bool {
        self.insert(usize::MAX, child)
    }

    /// Prepends `child` to an n-ary node. See [`insert`](Self::insert).
    pub fn prepend(&self, child: &Self) -> bool {
        self.insert(0, child)
    }

    /// Inserts `child` at `index` (clamped to the end).
    ///
    /// Rejected, returning false, when the node is not a classed n-ary node,
    /// when `child` is the node itself, already a direct child, or an ancestor.
    /// Otherwise `child` is detached from its previous parent first.
    pub fn insert(&self, index: usize, child: &Self) -> bool {
        if !self.can_adopt(child) {
            return false;
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        if let Kind::NArg(args) = &mut self.0.borrow_mut().kind {
            let index = index.min(args.len());
            args.insert(index, child.clone());
        }
        true
    }

    fn can_adopt(&self, child: &Self) -> bool {
        {
            let node = self.0.borrow();
            let Kind::NArg(args) = &node.kind else {
                return false;
            };
            if node.class == ExpressionClass::Unknown || args.contains(child) {
                return false;
            }
        }
        child != self && !self.has_ancestor(child)
    }

    /// Removes `child` from an n-ary node. Returns false if it is not a child.
    pub fn remove(&self, child: &Self) -> bool {
        let present = match &self.0.borrow().kind {
            Kind::NArg(args) => args.contains(child),
            _ => false,
        };
        if present {
            child.detach();
        }
        present
    }

    /// Removes the operand at `index`. Returns false if out of range.
    pub fn remove_at(&self, index: usize) -> bool {
        self.take_at(index).is_some()
    }

    /// Removes and returns the operand at `index`.
    pub fn take_at(&self, index: usize) -> Option<Self> {
        let child = self.arg(index)?;
        child.detach();
        Some(child)
    }

    /// Detaches the node from its parent, if any.
    pub fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        {
            let mut node = parent.0.borrow_mut();
            match &mut node.kind {
                Kind::NArg(args) => args.retain(|arg| arg != self),
                Kind::Unary(operand) => {
                    if operand.as_ref() == Some(self) {
                        *operand = None;
                    }
                }
                Kind::Function { args, .. } => {
                    if args == self {
                        let fresh = Self::argument_list();
                        fresh.0.borrow_mut().parent = Rc::downgrade(&parent.0);
                        *args = fresh;
                    }
                }
                _ => {}
            }
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Copies the whole subtree. The copy has no parent.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let node = self.0.borrow();
        let kind = match &node.kind {
            Kind::Null => Kind::Null,
            Kind::Unary(operand) => Kind::Unary(operand.as_ref().map(Self::deep_clone)),
            Kind::NArg(args) => Kind::NArg(args.iter().map(Self::deep_clone).collect()),
            Kind::Const(value) => Kind::Const(value.clone()),
            Kind::Variable(data) => Kind::Variable(data.clone()),
            Kind::Function { name, args } => Kind::Function {
                name: name.clone(),
                args: args.deep_clone(),
            },
            Kind::QueryParameter { message } => Kind::QueryParameter {
                message: message.clone(),
            },
        };
        Self::from_node(node.class, node.token, kind)
    }

    /// Structural equality: class, token, payload and children.
    #[must_use]
    pub fn is_same_as(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        if a.class != b.class || a.token != b.token {
            return false;
        }
        match (&a.kind, &b.kind) {
            (Kind::Null, Kind::Null) => true,
            (Kind::Unary(x), Kind::Unary(y)) => match (x, y) {
                (Some(x), Some(y)) => x.is_same_as(y),
                (None, None) => true,
                _ => false,
            },
            (Kind::NArg(x), Kind::NArg(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(x, y)| x.is_same_as(y))
            }
            (Kind::Const(x), Kind::Const(y)) => x == y,
            (Kind::Variable(x), Kind::Variable(y)) => {
                x.name.eq_ignore_ascii_case(&y.name)
                    && match (&x.table, &y.table) {
                        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (
                Kind::Function { name: n1, args: a1 },
                Kind::Function { name: n2, args: a2 },
            ) => n1.eq_ignore_ascii_case(n2) && a1.is_same_as(a2),
            (Kind::QueryParameter { message: m1 }, Kind::QueryParameter { message: m2 }) => {
                m1 == m2
            }
            _ => false,
        }
    }

    /// Variable nodes of the subtree in pre-order.
    #[must_use]
    pub fn variables(&self) -> Vec<Self> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut Vec<Self>) {
        if self.expression_type() == ExpressionType::Variable {
            found.push(self.clone());
        }
        for child in self.children() {
            child.collect_variables(found);
        }
    }

    /// Renders SQL text. Identifiers and literals are escaped by `driver`, or
    /// in a driver-neutral way without one.
    #[must_use]
    pub fn to_sql(&self, driver: Option<&dyn Driver>) -> String {
        let render = Render {
            driver,
            escaping: IdentifierEscaping::AsNecessary,
        };
        self.render(render, &mut None::<core::iter::Empty<Value>>)
    }

    /// Renders SQL text quoting identifiers according to `escaping`.
    #[must_use]
    pub fn to_sql_escaped(&self, driver: &dyn Driver, escaping: IdentifierEscaping) -> String {
        let render = Render {
            driver: Some(driver),
            escaping,
        };
        self.render(render, &mut None::<core::iter::Empty<Value>>)
    }

    /// Renders SQL text, replacing query parameters with values taken in order
    /// from `params`. Parameters left without a value render as placeholders.
    #[must_use]
    pub fn to_sql_with_params<I>(&self, driver: Option<&dyn Driver>, params: I) -> String
    where
        I: IntoIterator<Item = Value>,
    {
        let render = Render {
            driver,
            escaping: IdentifierEscaping::AsNecessary,
        };
        self.render(render, &mut Some(params.into_iter()))
    }

    fn render<I>(&self, render: Render<'_>, params: &mut Option<I>) -> String
    where
        I: Iterator<Item = Value>,
    {
        let node = self.0.borrow();
        let join = |args: &[Self], separator: &str, params: &mut Option<I>| -> String {
            args.iter()
                .map(|arg| arg.render(render, params))
                .collect::<Vec<_>>()
                .join(separator)
        };
        match &node.kind {
            Kind::Null => String::from("NULL"),
            Kind::Unary(operand) => {
                let inner = operand
                    .as_ref()
                    .map(|operand| operand.render(render, params))
                    .unwrap_or_default();
                match node.token {
                    PAREN => format!("({inner})"),
                    ExprToken::SQL_IS_NULL | ExprToken::SQL_IS_NOT_NULL => {
                        format!("{inner} {}", node.token)
                    }
                    ExprToken::NOT => format!("NOT {inner}"),
                    // `- -x` must not become the comment `--x`.
                    token if inner.starts_with(['-', '+']) => format!("{token} {inner}"),
                    token => format!("{token}{inner}"),
                }
            }
            Kind::NArg(args) => match node.class {
                ExpressionClass::ArgumentList => format!("({})", join(args, ", ", params)),
                ExpressionClass::FieldList | ExpressionClass::TableList => {
                    join(args, ", ", params)
                }
                ExpressionClass::SpecialBinary if args.len() == 3 => {
                    let value = args[0].render(render, params);
                    let low = args[1].render(render, params);
                    let high = args[2].render(render, params);
                    format!("{value} {} {low} AND {high}", node.token)
                }
                _ => join(args, &format!(" {} ", node.token), params),
            },
            Kind::Const(value) => render.value(value),
            Kind::Variable(data) => match &data.table {
                Some(table) => format!(
                    "{}.{}",
                    render.identifier(table),
                    render.identifier(&data.name)
                ),
                None => render.identifier(&data.name),
            },
            Kind::Function { name, args } => format!("{name}{}", args.render(render, params)),
            Kind::QueryParameter { message } => {
                match params.as_mut().and_then(Iterator::next) {
                    Some(value) => render.value(&value),
                    None if message.is_empty() => String::from("?"),
                    None => format!("[{message}]"),
                }
            }
        }
    }

    /// Debug rendering showing classes and token names.
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        format!("{self:?}")
    }
}

/// How identifiers and literals are written while rendering.
#[derive(Clone, Copy)]
struct Render<'d> {
    driver: Option<&'d dyn Driver>,
    escaping: IdentifierEscaping,
}

impl Render<'_> {
    fn identifier(self, name: &str) -> String {
        match self.driver {
            Some(driver) if name != "*" => driver.escape_identifier_as(name, self.escaping),
            _ => name.to_string(),
        }
    }

    fn value(self, value: &Value) -> String {
        self.driver
            .map_or_else(|| value.to_sql_inline(), |driver| driver.value_to_sql(value))
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Expression {}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql(None))
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0.borrow();
        match &node.kind {
            Kind::Null => f.write_str("Null"),
            Kind::Unary(operand) => {
                write!(f, "Unary({:?}", node.token)?;
                if let Some(operand) = operand {
                    write!(f, ", {operand:?}")?;
                }
                f.write_str(")")
            }
            Kind::NArg(args) => {
                write!(f, "{:?}({:?}", node.class, node.token)?;
                for arg in args {
                    write!(f, ", {arg:?}")?;
                }
                f.write_str(")")
            }
            Kind::Const(value) => write!(f, "Const({:?}, {value})", node.token),
            Kind::Variable(data) => write!(f, "Variable({})", data.qualified_name()),
            Kind::Function { name, args } => write!(f, "{:?}({name}, {args:?})", node.class),
            Kind::QueryParameter { message } => write!(f, "QueryParameter({message})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expression {
        Expression::constant(Value::Int(n))
    }

    fn list() -> Expression {
        Expression::narg(ExpressionClass::Arithmetic, ExprToken::from_char('+'))
    }

    #[test]
    fn test_null() {
        let null = Expression::null();
        assert!(null.is_null());
        assert_eq!(null.to_sql(None), "NULL");
        assert_eq!(null.expression_type(), ExpressionType::Null);
    }

    #[test]
    fn test_deep_clone_identity() {
        let null = Expression::null();
        let copy = null.deep_clone();
        assert_ne!(copy, null);
        assert!(copy.is_same_as(&null));
        assert_eq!(copy.to_sql(None), null.to_sql(None));
        assert_eq!(copy.to_debug_string(), null.to_debug_string());

        let shared = null.clone();
        assert_eq!(shared, null);
    }

    #[test]
    fn test_deep_clone_subtree() {
        let sum = Expression::binary(
            ExpressionClass::Arithmetic,
            &int(1),
            ExprToken::from_char('+'),
            &Expression::variable("price"),
        );
        let copy = sum.deep_clone();
        assert!(copy.is_same_as(&sum));
        assert_eq!(copy.to_sql(None), "1 + price");
        let left = copy.left().expect("left operand");
        assert_ne!(Some(left.clone()), sum.left());
        assert_eq!(left.parent(), Some(copy));
    }

    #[test]
    fn test_append_self_is_rejected() {
        let n = list();
        assert!(!n.append(&n));
        assert!(!n.prepend(&n));
        assert_eq!(n.arg_count(), 0);
    }

    #[test]
    fn test_append_twice_is_rejected() {
        let n = list();
        let child = int(1);
        assert!(n.append(&child));
        assert!(!n.append(&child));
        assert!(!n.prepend(&child));
        assert_eq!(n.arg_count(), 1);
    }

    #[test]
    fn test_append_ancestor_is_rejected() {
        let outer = list();
        let inner = list();
        assert!(outer.append(&inner));
        assert!(!inner.append(&outer));
        assert_eq!(inner.arg_count(), 0);
    }

    #[test]
    fn test_move_between_parents() {
        let source = list();
        let target = list();
        let child = int(7);
        assert!(source.append(&child));
        assert_eq!(child.parent(), Some(source.clone()));

        assert!(target.append(&child));
        assert_eq!(source.arg_count(), 0);
        assert_eq!(target.arg_count(), 1);
        assert_eq!(child.parent(), Some(target));
    }

    #[test]
    fn test_prepend_and_insert_order() {
        let n = list();
        n.append(&int(2));
        n.prepend(&int(1));
        n.insert(99, &int(3));
        assert_eq!(n.to_sql(None), "1 + 2 + 3");
        assert!(n.remove_at(1));
        assert_eq!(n.to_sql(None), "1 + 3");
        let taken = n.take_at(0).expect("first operand");
        assert_eq!(taken.parent(), None);
        assert_eq!(n.arg_count(), 1);
        assert!(!n.remove(&taken));
        assert!(!n.remove_at(5));
    }

    #[test]
    fn test_unknown_class_stays_null() {
        let n = Expression::narg(ExpressionClass::Unknown, ExprToken::from_char('+'));
        assert!(n.is_null());
        assert!(!n.append(&int(1)));
        assert_eq!(n.arg_count(), 0);
    }

    #[test]
    fn test_non_narg_rejects_children() {
        let c = int(1);
        assert!(!c.append(&int(2)));
        assert_eq!(c.arg_count(), 0);
    }

    #[test]
    fn test_unary_rendering() {
        let neg = Expression::unary(ExprToken::from_char('-'), &Expression::variable("x"));
        assert_eq!(neg.to_sql(None), "-x");
        let not = Expression::unary(ExprToken::NOT, &neg);
        assert_eq!(not.to_sql(None), "NOT -x");
        let is_null = Expression::unary(ExprToken::SQL_IS_NULL, &Expression::variable("x"));
        assert_eq!(is_null.to_sql(None), "x IS NULL");
        let paren = Expression::unary(PAREN, &int(1));
        assert_eq!(paren.to_sql(None), "(1)");
        assert_eq!(neg.parent(), Some(not));
    }

    #[test]
    fn test_nested_sign_is_not_a_comment() {
        let neg = Expression::unary(ExprToken::from_char('-'), &Expression::variable("x"));
        let twice = Expression::unary(ExprToken::from_char('-'), &neg);
        assert_eq!(twice.to_sql(None), "- -x");
        let plus = Expression::unary(ExprToken::from_char('+'), &twice);
        assert_eq!(plus.to_sql(None), "+ - -x");
        let negative = Expression::unary(ExprToken::from_char('-'), &int(-1));
        assert_eq!(negative.to_sql(None), "- -1");
        let bit_not = Expression::unary(ExprToken::from_char('~'), &int(1));
        assert_eq!(bit_not.to_sql(None), "~1");
    }

    #[test]
    fn test_escaping_always_reaches_variables() {
        let driver = crate::driver::GenericDriver::new();
        let cond = Expression::binary(
            ExpressionClass::Relational,
            &Expression::qualified_variable("c", "id"),
            ExprToken::from_char('='),
            &int(1),
        );
        assert_eq!(cond.to_sql(Some(&driver)), "c.id = 1");
        assert_eq!(
            cond.to_sql_escaped(&driver, IdentifierEscaping::Always),
            "\"c\".\"id\" = 1"
        );
    }

    #[test]
    fn test_unary_rejects_ancestor() {
        let inner = Expression::unary(ExprToken::NOT, &int(1));
        let outer = Expression::unary(ExprToken::NOT, &inner);
        assert!(!inner.set_operand(&outer));
        assert!(!inner.set_operand(&inner));
    }

    #[test]
    fn test_between_and_in_rendering() {
        let between = Expression::narg(ExpressionClass::SpecialBinary, ExprToken::BETWEEN_AND);
        between.append(&Expression::variable("price"));
        between.append(&int(1));
        between.append(&int(10));
        assert_eq!(between.to_sql(None), "price BETWEEN 1 AND 10");

        let values = Expression::argument_list();
        values.append(&int(1));
        values.append(&int(2));
        let in_list = Expression::binary(
            ExpressionClass::Relational,
            &Expression::variable("id"),
            ExprToken::NOT_IN,
            &values,
        );
        assert_eq!(in_list.to_sql(None), "id NOT IN (1, 2)");
    }

    #[test]
    fn test_function_class() {
        let args = Expression::argument_list();
        args.append(&Expression::variable("*"));
        let count = Expression::function("COUNT", &args);
        assert_eq!(count.class(), ExpressionClass::Aggregation);
        assert_eq!(count.to_sql(None), "COUNT(*)");
        assert_eq!(args.parent(), Some(count));

        let lower = Expression::function("lower", &Expression::argument_list());
        assert_eq!(lower.class(), ExpressionClass::Function);
        assert_eq!(lower.to_sql(None), "lower()");
    }

    #[test]
    fn test_query_parameters() {
        let cond = Expression::binary(
            ExpressionClass::Logical,
            &Expression::query_parameter(""),
            ExprToken::AND,
            &Expression::query_parameter("Enter name"),
        );
        assert_eq!(cond.to_sql(None), "? AND [Enter name]");
        assert_eq!(
            cond.to_sql_with_params(None, vec![Value::Int(5), Value::Text(String::from("a"))]),
            "5 AND 'a'"
        );
        assert_eq!(cond.to_sql_with_params(None, vec![Value::Null]), "NULL AND [Enter name]");
    }

    #[test]
    fn test_structural_equality() {
        let a = Expression::binary(
            ExpressionClass::Relational,
            &Expression::qualified_variable("cars", "id"),
            ExprToken::from_char('='),
            &int(1),
        );
        let b = Expression::binary(
            ExpressionClass::Relational,
            &Expression::qualified_variable("CARS", "ID"),
            ExprToken::from_char('='),
            &int(1),
        );
        let c = Expression::binary(
            ExpressionClass::Relational,
            &Expression::variable("id"),
            ExprToken::from_char('='),
            &int(1),
        );
        assert!(a.is_same_as(&b));
        assert!(!a.is_same_as(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn test_variables_preorder() {
        let cond = Expression::binary(
            ExpressionClass::Logical,
            &Expression::binary(
                ExpressionClass::Relational,
                &Expression::variable("a"),
                ExprToken::from_char('<'),
                &Expression::variable("b"),
            ),
            ExprToken::OR,
            &Expression::variable("c"),
        );
        let names: Vec<_> = cond
            .variables()
            .iter()
            .filter_map(Expression::variable_name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_debug_string() {
        let cond = Expression::binary(
            ExpressionClass::Relational,
            &Expression::variable("id"),
            ExprToken::NOT_EQUAL,
            &int(1),
        );
        assert_eq!(
            cond.to_debug_string(),
            "Relational(NOT_EQUAL, Variable(id), Const(INTEGER_CONST, 1))"
        );
    }

    #[test]
    fn test_aggregate_lookup() {
        assert!(is_aggregate_function("count"));
        assert!(is_aggregate_function("SUM"));
        assert!(!is_aggregate_function("lower"));
    }
}
