//! Tokenizing, parsing and token/structure correlation.
//!
//! The pipeline treats everything here as opaque: it asks a [`Grammar`] for
//! a [`ParsedSource`] and hands the result to each rule untouched.

use proc_macro2::{Delimiter, Span, TokenStream, TokenTree};
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::visit::Visit;
use thiserror::Error;

/// Errors raised by a grammar on input it cannot handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// The source could not be split into tokens.
    #[error("lex error at {line}:{column}: {message}")]
    Lex {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Error description.
        message: String,
    },

    /// The tokens do not form a valid file.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
        /// Error description.
        message: String,
    },
}

impl GrammarError {
    /// Line the error points at.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Lex { line, .. } | Self::Parse { line, .. } => *line,
        }
    }

    /// Column the error points at.
    #[must_use]
    pub fn column(&self) -> usize {
        match self {
            Self::Lex { column, .. } | Self::Parse { column, .. } => *column,
        }
    }
}

/// A position in the source, both parts 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn start_of(span: Span) -> Self {
        let lc = span.start();
        Self::new(lc.line, lc.column + 1)
    }

    fn end_of(span: Span) -> Self {
        let lc = span.end();
        Self::new(lc.line, lc.column + 1)
    }
}

/// Bracket kind of an open/close token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// `( ... )`
    Paren,
    /// `{ ... }`
    Brace,
    /// `[ ... ]`
    Bracket,
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Single punctuation character.
    Punct,
    /// String, char, byte or numeric literal.
    Literal,
    /// Opening bracket.
    Open(Delim),
    /// Closing bracket.
    Close(Delim),
}

/// One lexical token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical category.
    pub kind: TokenKind,
    /// Source text of the token.
    pub text: String,
    /// Start position.
    pub pos: Position,
}

/// Kind of structure node tracked by the correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Free function, method or trait method.
    Fn,
    /// `impl` block.
    Impl,
    /// `struct` definition.
    Struct,
    /// `enum` definition.
    Enum,
    /// `trait` definition.
    Trait,
    /// Inline `mod` block or `mod foo;` declaration.
    Mod,
    /// `const` item.
    Const,
    /// `static` item.
    Static,
}

/// A structure node with its source extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Item name; the self type for `impl` blocks.
    pub name: String,
    /// First position of the node.
    pub start: Position,
    /// Position just past the node's last character.
    pub end: Position,
}

impl Node {
    /// Returns true if `pos` falls inside this node.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Number of lines spanned, including the first and last.
    #[must_use]
    pub fn line_span(&self) -> usize {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

/// Links tokens to the innermost structure node containing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    nodes: Vec<Node>,
    owners: Vec<Option<usize>>,
}

impl Correlation {
    /// Builds the correlation for `tokens` over `nodes`.
    ///
    /// `nodes` must be in pre-order (parents before children), which makes
    /// the last containing node the innermost one.
    #[must_use]
    pub fn build(tokens: &[Token], nodes: Vec<Node>) -> Self {
        let owners = tokens
            .iter()
            .map(|t| innermost(&nodes, t.pos))
            .collect();
        Self { nodes, owners }
    }

    /// Structure nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Innermost node containing the token at `token_index`.
    #[must_use]
    pub fn owner(&self, token_index: usize) -> Option<&Node> {
        self.owners
            .get(token_index)
            .copied()
            .flatten()
            .map(|i| &self.nodes[i])
    }

    /// Innermost node containing `pos`.
    #[must_use]
    pub fn node_at(&self, pos: Position) -> Option<&Node> {
        innermost(&self.nodes, pos).map(|i| &self.nodes[i])
    }

    /// Innermost function containing `pos`.
    #[must_use]
    pub fn enclosing_fn(&self, pos: Position) -> Option<&Node> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.kind == NodeKind::Fn && n.contains(pos))
    }

    /// Indices of the tokens whose innermost node is `node_index`.
    pub fn tokens_of(&self, node_index: usize) -> impl Iterator<Item = usize> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |(_, owner)| **owner == Some(node_index))
            .map(|(i, _)| i)
    }
}

fn innermost(nodes: &[Node], pos: Position) -> Option<usize> {
    nodes.iter().rposition(|n| n.contains(pos))
}

/// Tokens, syntax tree and correlation for one file.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    /// Tokens in source order. Comments are not tokens.
    pub tokens: Vec<Token>,
    /// Parsed syntax tree.
    pub tree: syn::File,
    /// Token to structure-node links.
    pub correlation: Correlation,
}

/// Turns sanitized source lines into a [`ParsedSource`].
pub trait Grammar: Send + Sync {
    /// Tokenizes, parses and correlates `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be tokenized or parsed.
    fn parse(&self, lines: &[String]) -> Result<ParsedSource, GrammarError>;
}

/// Rust grammar backed by `proc-macro2` and `syn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustGrammar;

impl Grammar for RustGrammar {
    fn parse(&self, lines: &[String]) -> Result<ParsedSource, GrammarError> {
        let source = source_text(lines);

        let stream: TokenStream = source.parse().map_err(|e: proc_macro2::LexError| {
            let pos = Position::start_of(e.span());
            GrammarError::Lex {
                line: pos.line,
                column: pos.column,
                message: e.to_string(),
            }
        })?;

        let mut tokens = Vec::new();
        flatten(stream.clone(), &mut tokens);

        let tree: syn::File = syn::parse2(stream).map_err(|e| {
            let pos = Position::start_of(e.span());
            GrammarError::Parse {
                line: pos.line,
                column: pos.column,
                message: e.to_string(),
            }
        })?;

        let mut collector = NodeCollector::default();
        collector.visit_file(&tree);
        let correlation = Correlation::build(&tokens, collector.nodes);

        Ok(ParsedSource {
            tokens,
            tree,
            correlation,
        })
    }
}

/// Joins lines for lexing, blanking a leading `#!` interpreter line and
/// dropping a byte order mark so that line numbers stay aligned.
#[must_use]
pub fn source_text(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if text.starts_with('\u{feff}') {
        text.remove(0);
    }
    if let Some(rest) = text.strip_prefix("#!") {
        if !rest.trim_start().starts_with('[') {
            let end = text.find('\n').unwrap_or(text.len());
            text.replace_range(..end, "");
        }
    }
    text
}

fn flatten(stream: TokenStream, out: &mut Vec<Token>) {
    for tree in stream {
        match tree {
            TokenTree::Group(group) => {
                let delim = match group.delimiter() {
                    Delimiter::Parenthesis => Some((Delim::Paren, "(", ")")),
                    Delimiter::Brace => Some((Delim::Brace, "{", "}")),
                    Delimiter::Bracket => Some((Delim::Bracket, "[", "]")),
                    Delimiter::None => None,
                };
                if let Some((d, open, _)) = delim {
                    out.push(Token {
                        kind: TokenKind::Open(d),
                        text: open.to_string(),
                        pos: Position::start_of(group.span_open()),
                    });
                }
                flatten(group.stream(), out);
                if let Some((d, _, close)) = delim {
                    out.push(Token {
                        kind: TokenKind::Close(d),
                        text: close.to_string(),
                        pos: Position::start_of(group.span_close()),
                    });
                }
            }
            TokenTree::Ident(ident) => out.push(Token {
                kind: TokenKind::Ident,
                text: ident.to_string(),
                pos: Position::start_of(ident.span()),
            }),
            TokenTree::Punct(punct) => out.push(Token {
                kind: TokenKind::Punct,
                text: punct.as_char().to_string(),
                pos: Position::start_of(punct.span()),
            }),
            TokenTree::Literal(lit) => out.push(Token {
                kind: TokenKind::Literal,
                text: lit.to_string(),
                pos: Position::start_of(lit.span()),
            }),
        }
    }
}

#[derive(Default)]
struct NodeCollector {
    nodes: Vec<Node>,
}

impl NodeCollector {
    fn push(&mut self, kind: NodeKind, name: String, start: Position, end: Position) {
        self.nodes.push(Node {
            kind,
            name,
            start,
            end,
        });
    }

    fn push_spanned(&mut self, kind: NodeKind, name: String, span: Span) {
        self.push(kind, name, Position::start_of(span), Position::end_of(span));
    }
}

impl<'ast> Visit<'ast> for NodeCollector {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.push(
            NodeKind::Fn,
            node.sig.ident.to_string(),
            Position::start_of(node.sig.fn_token.span),
            Position::end_of(node.block.brace_token.span.close()),
        );
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.push(
            NodeKind::Fn,
            node.sig.ident.to_string(),
            Position::start_of(node.sig.fn_token.span),
            Position::end_of(node.block.brace_token.span.close()),
        );
        syn::visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        let end = match &node.default {
            Some(block) => block.brace_token.span.close(),
            None => node.span(),
        };
        self.push(
            NodeKind::Fn,
            node.sig.ident.to_string(),
            Position::start_of(node.sig.fn_token.span),
            Position::end_of(end),
        );
        syn::visit::visit_trait_item_fn(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let name = node.self_ty.to_token_stream().to_string();
        self.push_spanned(NodeKind::Impl, name, node.span());
        syn::visit::visit_item_impl(self, node);
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.push_spanned(NodeKind::Struct, node.ident.to_string(), node.span());
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.push_spanned(NodeKind::Enum, node.ident.to_string(), node.span());
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.push_spanned(NodeKind::Trait, node.ident.to_string(), node.span());
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.push_spanned(NodeKind::Mod, node.ident.to_string(), node.span());
        syn::visit::visit_item_mod(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.push_spanned(NodeKind::Const, node.ident.to_string(), node.span());
        syn::visit::visit_item_const(self, node);
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.push_spanned(NodeKind::Static, node.ident.to_string(), node.span());
        syn::visit::visit_item_static(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(String::from).collect()
    }

    const SAMPLE: &str = "\
struct Point {
    x: i32,
}

impl Point {
    fn norm(&self) -> i32 {
        self.x.abs()
    }
}

fn main() {
    let p = Point { x: -1 };
}
";

    #[test]
    fn tokens_carry_positions() {
        let parsed = RustGrammar.parse(&lines("fn a() {}\n  let")).err();
        // `let` at file level is not an item.
        assert!(matches!(parsed, Some(GrammarError::Parse { line: 2, .. })));

        let parsed = RustGrammar.parse(&lines("fn a() { 1 }")).unwrap();
        let kinds: Vec<TokenKind> = parsed.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Open(Delim::Paren),
                TokenKind::Close(Delim::Paren),
                TokenKind::Open(Delim::Brace),
                TokenKind::Literal,
                TokenKind::Close(Delim::Brace),
            ]
        );
        assert_eq!(parsed.tokens[1].text, "a");
        assert_eq!(parsed.tokens[1].pos, Position::new(1, 4));
        assert_eq!(parsed.tokens[6].pos, Position::new(1, 12));
    }

    #[test]
    fn collects_nodes_in_pre_order() {
        let parsed = RustGrammar.parse(&lines(SAMPLE)).unwrap();
        let summary: Vec<(NodeKind, &str)> = parsed
            .correlation
            .nodes()
            .iter()
            .map(|n| (n.kind, n.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (NodeKind::Struct, "Point"),
                (NodeKind::Impl, "Point"),
                (NodeKind::Fn, "norm"),
                (NodeKind::Fn, "main"),
            ]
        );

        let norm = &parsed.correlation.nodes()[2];
        assert_eq!(norm.start.line, 6);
        assert_eq!(norm.end.line, 8);
        assert_eq!(norm.line_span(), 3);
    }

    #[test]
    fn tokens_map_to_innermost_node() {
        let parsed = RustGrammar.parse(&lines(SAMPLE)).unwrap();
        let abs = parsed
            .tokens
            .iter()
            .position(|t| t.text == "abs")
            .unwrap();
        assert_eq!(parsed.correlation.owner(abs).unwrap().name, "norm");

        let impl_kw = parsed
            .tokens
            .iter()
            .position(|t| t.text == "impl")
            .unwrap();
        assert_eq!(
            parsed.correlation.owner(impl_kw).unwrap().kind,
            NodeKind::Impl
        );

        let norm_index = 2;
        assert!(parsed
            .correlation
            .tokens_of(norm_index)
            .any(|i| parsed.tokens[i].text == "abs"));
    }

    #[test]
    fn enclosing_fn_lookup() {
        let parsed = RustGrammar.parse(&lines(SAMPLE)).unwrap();
        let node = parsed
            .correlation
            .enclosing_fn(Position::new(12, 9))
            .unwrap();
        assert_eq!(node.name, "main");
        assert!(parsed
            .correlation
            .enclosing_fn(Position::new(2, 5))
            .is_none());
    }

    #[test]
    fn shebang_line_is_blanked() {
        let src = lines("#!/usr/bin/env rust-script\nfn main() {}");
        assert_eq!(source_text(&src), "\nfn main() {}");

        let parsed = RustGrammar.parse(&src).unwrap();
        assert_eq!(parsed.tokens[0].pos.line, 2);
    }

    #[test]
    fn inner_attribute_is_not_a_shebang() {
        let src = lines("#![allow(dead_code)]\nfn main() {}");
        assert_eq!(source_text(&src), "#![allow(dead_code)]\nfn main() {}");
        assert!(RustGrammar.parse(&src).is_ok());
    }

    #[test]
    fn lex_error_is_reported() {
        let err = RustGrammar.parse(&lines("fn main() {\n    let s = \"open;\n")).unwrap_err();
        assert!(matches!(err, GrammarError::Lex { .. }));
    }
}
