//! Copyright © 2025-2026 The Htx Authors. All Rights Reserved.
//!
//! This file is part of Htx.
//! The Htx project belongs to the Htx project team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use serde_json::Number;

/// Unary expression operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtxUnaryOp {
    /// Logical negation (`!`).
    Not,
    /// Arithmetic negation (`-`).
    Neg,
}

/// Binary expression operators, in the surface syntax of the template
/// expression language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtxBinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl HtxBinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            HtxBinaryOp::Mul => "*",
            HtxBinaryOp::Div => "/",
            HtxBinaryOp::Mod => "%",
            HtxBinaryOp::Add => "+",
            HtxBinaryOp::Sub => "-",
            HtxBinaryOp::Lt => "<",
            HtxBinaryOp::Le => "<=",
            HtxBinaryOp::Gt => ">",
            HtxBinaryOp::Ge => ">=",
            HtxBinaryOp::Eq => "==",
            HtxBinaryOp::Ne => "!=",
            HtxBinaryOp::And => "&&",
            HtxBinaryOp::Or => "||",
        }
    }
}

/// An ordered `elseif` clause on an [`HtxNode::If`].
#[derive(Clone, Debug, PartialEq)]
pub struct HtxElseIf {
    pub condition: HtxNode,
    pub body: Vec<HtxNode>,
}

/// The template AST.
///
/// A parsed body template is a strict tree rooted at [`HtxNode::Template`];
/// every composite node owns its children outright. Nodes fall into two
/// groups: render-position nodes (Text, Output, RawOutput, Placeholder,
/// Each, If, NoneBlock, Template) that produce string fragments, and
/// value-position nodes (literals, references, operators, calls) that
/// produce computed values.
#[derive(Clone, Debug, PartialEq)]
pub enum HtxNode {
    /// Literal passthrough text.
    Text(String),
    /// Escaped expression output: `{{ expr }}`.
    Output(Box<HtxNode>),
    /// Unescaped expression output: `{{{ expr }}}`.
    ///
    /// Raw output exists for fields that carry pre-rendered HTML; using it
    /// on untrusted data is a cross-site-scripting hole, which is why the
    /// escaped form is the short one.
    RawOutput(Box<HtxNode>),
    /// Bare field placeholder: `__name__`. Distinct from a full expression;
    /// resolves to the field's display text, empty when absent.
    Placeholder(String),
    /// Named field lookup against the current scope chain.
    FieldRef(String),
    /// `object.property` lookup.
    DotAccess {
        target: Box<HtxNode>,
        property: String,
    },
    /// Builtin function call with ordered argument expressions.
    FunctionCall { name: String, args: Vec<HtxNode> },
    UnaryOp {
        op: HtxUnaryOp,
        operand: Box<HtxNode>,
    },
    BinaryOp {
        op: HtxBinaryOp,
        left: Box<HtxNode>,
        right: Box<HtxNode>,
    },
    StringLit(String),
    NumberLit(Number),
    BoolLit(bool),
    /// `<htx:each var="x" in="expr">` loop block.
    Each {
        var: String,
        iterable: Box<HtxNode>,
        body: Vec<HtxNode>,
    },
    /// `<htx:if>` / `<htx:elseif>` / `<htx:else>` block.
    If {
        condition: Box<HtxNode>,
        body: Vec<HtxNode>,
        elseifs: Vec<HtxElseIf>,
        else_body: Option<Vec<HtxNode>>,
    },
    /// `<htx:none>` empty-row-set fallback subtree; the hydrator decides
    /// whether it renders.
    NoneBlock(Vec<HtxNode>),
    /// Root node: ordered list of children.
    Template(Vec<HtxNode>),
}
