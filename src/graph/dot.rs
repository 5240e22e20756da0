//! Graphviz DOT reader: just enough of the language to recover node names and edges.
//!
//! Attributes are read and discarded. Subgraphs are flattened into the top graph;
//! a subgraph used as an edge operand stands for every node mentioned inside it.

use super::GraphError;
use std::collections::HashSet;

const MAX_NESTING: usize = 256;

/// Node and edge lists of one DOT graph, names unquoted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DotDocument {
    pub strict: bool,
    pub directed: bool,
    pub name: Option<String>,
    /// First-seen order, no duplicates
    pub nodes: Vec<String>,
    /// In source order; duplicates kept
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Id { text: String, quoted: bool },
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Colon,
    Equals,
    Plus,
    /// `->` (true) or `--` (false)
    EdgeOp(bool),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn syntax(line: usize, message: impl Into<String>) -> GraphError {
    GraphError::Syntax {
        line,
        message: message.into(),
    }
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || !c.is_ascii()
}

fn lex(src: &str) -> Result<Vec<Token>, GraphError> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut line_start = true;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
            line_start = true;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // `#` lines are C preprocessor output
        if (c == '#' && line_start) || (c == '/' && chars.get(i + 1) == Some(&'/')) {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        line_start = false;
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start = line;
            i += 2;
            loop {
                match chars.get(i) {
                    None => return Err(syntax(start, "unterminated comment")),
                    Some('*') if chars.get(i + 1) == Some(&'/') => {
                        i += 2;
                        break;
                    }
                    Some('\n') => line += 1,
                    Some(_) => {}
                }
                i += 1;
            }
            continue;
        }

        let at = line;
        let tok = match c {
            '{' => Tok::LBrace,
            '}' => Tok::RBrace,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ';' => Tok::Semi,
            ',' => Tok::Comma,
            ':' => Tok::Colon,
            '=' => Tok::Equals,
            '+' => Tok::Plus,
            '-' if chars.get(i + 1) == Some(&'>') => {
                i += 1;
                Tok::EdgeOp(true)
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                i += 1;
                Tok::EdgeOp(false)
            }
            '"' => {
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(syntax(at, "unterminated string")),
                        Some('"') => break,
                        Some('\\') if chars.get(i + 1) == Some(&'"') => {
                            text.push('"');
                            i += 1;
                        }
                        Some('\\') if chars.get(i + 1) == Some(&'\\') => {
                            text.push_str("\\\\");
                            i += 1;
                        }
                        Some('\\') if chars.get(i + 1) == Some(&'\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(&ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            text.push(ch);
                        }
                    }
                    i += 1;
                }
                Tok::Id { text, quoted: true }
            }
            '<' => {
                let mut depth = 0usize;
                let mut text = String::new();
                loop {
                    let Some(&ch) = chars.get(i) else {
                        return Err(syntax(at, "unterminated HTML string"));
                    };
                    match ch {
                        '<' => depth += 1,
                        '>' => depth -= 1,
                        '\n' => line += 1,
                        _ => {}
                    }
                    text.push(ch);
                    if depth == 0 {
                        break;
                    }
                    i += 1;
                }
                Tok::Id { text, quoted: true }
            }
            c if is_id_char(c) || c == '-' => {
                let mut text = String::from(c);
                while let Some(&ch) = chars.get(i + 1) {
                    if !is_id_char(ch) {
                        break;
                    }
                    text.push(ch);
                    i += 1;
                }
                Tok::Id {
                    text,
                    quoted: false,
                }
            }
            other => return Err(syntax(at, format!("unexpected character {other:?}"))),
        };
        out.push(Token { tok, line: at });
        i += 1;
    }
    Ok(out)
}

struct Parser {
    toks: Vec<Token>,
    pos: usize,
    doc: DotDocument,
    seen: HashSet<String>,
}

fn keyword(tok: &Tok, kw: &str) -> bool {
    matches!(tok, Tok::Id { text, quoted: false } if text.eq_ignore_ascii_case(kw))
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|t| &t.tok)
    }

    fn line(&self) -> usize {
        self.toks
            .get(self.pos)
            .or_else(|| self.toks.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn bump(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).map(|t| t.tok.clone());
        self.pos += 1;
        t
    }

    fn eat(&mut self, want: &Tok) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: Tok, what: &str) -> Result<(), GraphError> {
        if self.eat(&want) {
            Ok(())
        } else {
            Err(syntax(self.line(), format!("expected {what}")))
        }
    }

    /// An ID, joining `"a" + "b"` concatenations.
    fn id(&mut self) -> Result<String, GraphError> {
        let line = self.line();
        match self.bump() {
            Some(Tok::Id { mut text, quoted }) => {
                if quoted {
                    while self.peek() == Some(&Tok::Plus) {
                        self.pos += 1;
                        match self.bump() {
                            Some(Tok::Id { text: more, quoted: true }) => text.push_str(&more),
                            _ => return Err(syntax(line, "expected string after '+'")),
                        }
                    }
                }
                Ok(text)
            }
            _ => Err(syntax(line, "expected identifier")),
        }
    }

    fn graph(mut self) -> Result<DotDocument, GraphError> {
        if self.peek().is_some_and(|t| keyword(t, "strict")) {
            self.pos += 1;
            self.doc.strict = true;
        }
        match self.bump() {
            Some(t) if keyword(&t, "digraph") => self.doc.directed = true,
            Some(t) if keyword(&t, "graph") => self.doc.directed = false,
            _ => return Err(syntax(self.line(), "expected 'graph' or 'digraph'")),
        }
        if matches!(self.peek(), Some(Tok::Id { .. })) {
            self.doc.name = Some(self.id()?);
        }
        self.expect(Tok::LBrace, "'{'")?;
        self.stmt_list(0)?;
        self.expect(Tok::RBrace, "'}'")?;
        if self.pos < self.toks.len() {
            return Err(syntax(self.line(), "trailing content after graph"));
        }
        Ok(self.doc)
    }

    /// Statements up to (not including) the closing brace. Returns nodes mentioned.
    fn stmt_list(&mut self, depth: usize) -> Result<Vec<String>, GraphError> {
        if depth > MAX_NESTING {
            return Err(syntax(self.line(), "subgraphs nested too deeply"));
        }
        let mut mentioned = Vec::new();
        loop {
            match self.peek() {
                None => return Err(syntax(self.line(), "expected '}'")),
                Some(Tok::RBrace) => return Ok(mentioned),
                Some(Tok::Semi) => {
                    self.pos += 1;
                }
                Some(_) => self.stmt(depth, &mut mentioned)?,
            }
        }
    }

    fn stmt(&mut self, depth: usize, mentioned: &mut Vec<String>) -> Result<(), GraphError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(syntax(self.line(), "expected statement"));
        };
        if keyword(&tok, "graph") || keyword(&tok, "node") || keyword(&tok, "edge") {
            self.pos += 1;
            return self.attr_list();
        }
        if let Tok::Id { .. } = tok {
            if !keyword(&tok, "subgraph")
                && self.toks.get(self.pos + 1).map(|t| &t.tok) == Some(&Tok::Equals)
            {
                self.id()?;
                self.pos += 1;
                self.id()?;
                return Ok(());
            }
        }

        let first = self.operand(depth)?;
        if !matches!(self.peek(), Some(Tok::EdgeOp(_))) {
            if let Operand::Node(name) = &first {
                self.add_node(name);
                self.attr_list()?;
            }
            mentioned.extend(first.into_nodes());
            return Ok(());
        }

        let mut prev = first;
        while let Some(Tok::EdgeOp(directed)) = self.peek().cloned() {
            if directed != self.doc.directed {
                let op = if directed { "->" } else { "--" };
                return Err(syntax(self.line(), format!("'{op}' does not match graph type")));
            }
            self.pos += 1;
            let next = self.operand(depth)?;
            for tail in prev.nodes() {
                for head in next.nodes() {
                    self.add_node(tail);
                    self.add_node(head);
                    self.doc.edges.push((tail.clone(), head.clone()));
                }
            }
            mentioned.extend(prev.into_nodes());
            prev = next;
        }
        mentioned.extend(prev.into_nodes());
        self.attr_list()
    }

    fn operand(&mut self, depth: usize) -> Result<Operand, GraphError> {
        match self.peek() {
            Some(t) if keyword(t, "subgraph") => {
                self.pos += 1;
                if matches!(self.peek(), Some(Tok::Id { .. })) {
                    self.id()?;
                }
                self.subgraph_body(depth)
            }
            Some(Tok::LBrace) => self.subgraph_body(depth),
            Some(Tok::Id { .. }) => {
                let name = self.id()?;
                // Ports and compass points do not name nodes
                while self.eat(&Tok::Colon) {
                    self.id()?;
                }
                Ok(Operand::Node(name))
            }
            _ => Err(syntax(self.line(), "expected node or subgraph")),
        }
    }

    fn subgraph_body(&mut self, depth: usize) -> Result<Operand, GraphError> {
        self.expect(Tok::LBrace, "'{'")?;
        let nodes = self.stmt_list(depth + 1)?;
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Operand::Subgraph(nodes))
    }

    /// Zero or more `[ a = b, c ]` groups.
    fn attr_list(&mut self) -> Result<(), GraphError> {
        while self.eat(&Tok::LBracket) {
            loop {
                if self.eat(&Tok::RBracket) {
                    break;
                }
                self.id()?;
                if self.eat(&Tok::Equals) {
                    self.id()?;
                }
                if !self.eat(&Tok::Comma) {
                    self.eat(&Tok::Semi);
                }
            }
        }
        Ok(())
    }

    fn add_node(&mut self, name: &str) {
        // Pseudo-nodes the DOT toolchain emits for default-attribute statements
        if matches!(name, "node" | "edge" | "graph" | "\\n") {
            return;
        }
        if self.seen.insert(name.to_string()) {
            self.doc.nodes.push(name.to_string());
        }
    }
}

enum Operand {
    Node(String),
    Subgraph(Vec<String>),
}

impl Operand {
    fn nodes(&self) -> &[String] {
        match self {
            Operand::Node(n) => std::slice::from_ref(n),
            Operand::Subgraph(ns) => ns,
        }
    }

    fn into_nodes(self) -> Vec<String> {
        match self {
            Operand::Node(n) => vec![n],
            Operand::Subgraph(ns) => ns,
        }
    }
}

/// Parse one DOT graph from source text.
pub fn parse_dot(src: &str) -> Result<DotDocument, GraphError> {
    let toks = lex(src)?;
    Parser {
        toks,
        pos: 0,
        doc: DotDocument::default(),
        seen: HashSet::new(),
    }
    .graph()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn simple_digraph() {
        let doc = parse_dot("digraph G { a -> b; b -> c [label=\"x\"]; d; }").unwrap();
        assert!(doc.directed);
        assert_eq!(doc.name.as_deref(), Some("G"));
        assert_eq!(doc.nodes, vec!["a", "b", "c", "d"]);
        assert_eq!(doc.edges, vec![edge("a", "b"), edge("b", "c")]);
    }

    #[test]
    fn quoted_and_bare_names_are_the_same_node() {
        let doc = parse_dot(r#"digraph { "a" -> b; a -> "b" }"#).unwrap();
        assert_eq!(doc.nodes, vec!["a", "b"]);
        assert_eq!(doc.edges.len(), 2);
    }

    #[test]
    fn edge_chains_and_subgraph_operands() {
        let doc = parse_dot("digraph { a -> b -> c; x -> { y z } }").unwrap();
        assert_eq!(
            doc.edges,
            vec![
                edge("a", "b"),
                edge("b", "c"),
                edge("x", "y"),
                edge("x", "z")
            ]
        );
    }

    #[test]
    fn comments_attributes_and_ports() {
        let src = r#"
# generated
digraph "call graph" {
    // defaults
    graph [rankdir=LR];
    node [shape=box, style="filled"];
    rankdir = TB;
    /* multi
       line */
    "main" [label=<<b>main</b>>];
    "main":out -> "sub_401000":in:n;
    subgraph cluster_0 { label="libs"; "sub_401000" -> "CreateFileA" }
}
"#;
        let doc = parse_dot(src).unwrap();
        assert_eq!(doc.name.as_deref(), Some("call graph"));
        assert_eq!(doc.nodes, vec!["main", "sub_401000", "CreateFileA"]);
        assert_eq!(
            doc.edges,
            vec![edge("main", "sub_401000"), edge("sub_401000", "CreateFileA")]
        );
    }

    #[test]
    fn escaped_quotes_and_concatenation() {
        let doc = parse_dot(r#"digraph { "say \"hi\"" -> "ab" + "cd" }"#).unwrap();
        assert_eq!(doc.nodes, vec![r#"say "hi""#, "abcd"]);
    }

    #[test]
    fn undirected_graph() {
        let doc = parse_dot("strict graph { a -- b }").unwrap();
        assert!(doc.strict);
        assert!(!doc.directed);
        assert_eq!(doc.edges, vec![edge("a", "b")]);
    }

    #[test]
    fn mismatched_edge_operator_is_rejected() {
        assert!(matches!(
            parse_dot("digraph { a -- b }"),
            Err(GraphError::Syntax { .. })
        ));
    }

    #[test]
    fn malformed_input_reports_line() {
        let err = parse_dot("digraph {\n a -> b\n c -> [\n}").unwrap_err();
        match err {
            GraphError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_dot("").is_err());
        assert!(parse_dot("digraph { a -> b").is_err());
        assert!(parse_dot("not a graph").is_err());
    }

    #[test]
    fn pseudo_nodes_are_skipped() {
        let doc = parse_dot("digraph { \"node\"; \"\\n\"; a -> b }").unwrap();
        assert_eq!(doc.nodes, vec!["a", "b"]);
    }
}
