use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticKind, ParseError, Severity};
use crate::lexer::{Lexer, SpannedToken, Token, strip_comments};
use crate::relation;
use crate::span::Span;
use serde::Serialize;
use std::collections::HashSet;

/// Top-level blocks that carry no data model and are skipped silently.
const IGNORED_BLOCKS: &[&str] = &["datasource", "generator", "type", "view"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Skip what does not parse and report it as diagnostics.
    #[default]
    Lenient,
    /// Reject the schema on the first error-severity diagnostic; warnings pass.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParseOutput {
    pub schema: ParsedSchema,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse leniently: never fails, unparseable input becomes diagnostics.
pub fn parse_schema(input: &str) -> ParseOutput {
    Parser::new(input).parse()
}

pub fn parse_strict(input: &str) -> Result<ParsedSchema, ParseError> {
    parse_with(input, ParseMode::Strict).map(|output| output.schema)
}

pub fn parse_with(input: &str, mode: ParseMode) -> Result<ParseOutput, ParseError> {
    let output = Parser::new(input).parse();
    if mode == ParseMode::Strict {
        if let Some(first) = output.diagnostics.iter().find(|d| d.is_error()) {
            return Err(ParseError::Rejected(first.clone()));
        }
    }
    Ok(output)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnd {
    Newline,
    BlockClose,
    Eof,
}

/// A parsed `@name(args)` attribute.
struct Attribute {
    name: String,
    raw: String,
    args: Option<Vec<Arg>>,
    inner: Option<Span>,
}

struct Arg {
    key: Option<String>,
    value: Vec<SpannedToken>,
}

pub struct Parser {
    /// Comment-free source; line structure matches the input.
    source: String,
    tokens: Vec<SpannedToken>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let source = strip_comments(input);
        let (tokens, lex_errors) = Lexer::new(&source).tokenize();

        let diagnostics = lex_errors
            .into_iter()
            .map(|err| {
                Diagnostic::new(
                    &source,
                    Severity::Warning,
                    DiagnosticKind::UnterminatedString,
                    err.value.to_string(),
                    err.span,
                )
            })
            .collect();

        Self {
            source,
            tokens,
            pos: 0,
            diagnostics,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.source.len(), self.source.len()))
    }

    /// Move forward, never past the trailing `Eof`.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while *self.peek() == Token::Newline {
            self.advance();
        }
    }

    fn report(&mut self, severity: Severity, kind: DiagnosticKind, message: String, span: Span) {
        tracing::trace!(?kind, %message, "diagnostic");
        self.diagnostics
            .push(Diagnostic::new(&self.source, severity, kind, message, span));
    }

    fn warn(&mut self, kind: DiagnosticKind, message: String, span: Span) {
        self.report(Severity::Warning, kind, message, span);
    }

    fn line_span(line: &[SpannedToken]) -> Span {
        match (line.first(), line.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::default(),
        }
    }

    fn raw(&self, line: &[SpannedToken]) -> String {
        Self::line_span(line).text(&self.source).to_string()
    }

    pub fn parse(mut self) -> ParseOutput {
        let mut schema = ParsedSchema::default();

        loop {
            self.skip_newlines();
            let start = self.current_span();

            match self.peek().clone() {
                Token::Eof => break,
                Token::Ident(kw) if kw == "model" => {
                    self.advance();
                    if let Some(model) = self.parse_model(start) {
                        schema.models.push(model);
                    }
                }
                Token::Ident(kw) if kw == "enum" => {
                    self.advance();
                    if let Some(enum_def) = self.parse_enum(start) {
                        schema.enums.push(enum_def);
                    }
                }
                Token::Ident(kw) if IGNORED_BLOCKS.contains(&kw.as_str()) => {
                    self.skip_statement();
                }
                tok => {
                    self.report(
                        Severity::Warning,
                        DiagnosticKind::UnexpectedToken,
                        format!("expected `model` or `enum`, found {}", describe(&tok)),
                        start,
                    );
                    self.skip_statement();
                }
            }
        }

        schema.relations = schema
            .models
            .iter()
            .flat_map(|m| m.fields.iter().filter_map(|f| relation::edge(&m.name, f)))
            .collect();

        self.diagnostics.sort_by_key(|d| d.span.start);

        tracing::debug!(
            models = schema.models.len(),
            enums = schema.enums.len(),
            relations = schema.relations.len(),
            diagnostics = self.diagnostics.len(),
            "parsed schema"
        );

        ParseOutput {
            schema,
            diagnostics: self.diagnostics,
        }
    }

    /// Skip the rest of the line, or the whole block if one opens on it.
    fn skip_statement(&mut self) {
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::Newline => {
                    self.advance();
                    return;
                }
                Token::LBrace => {
                    self.skip_braced();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    fn skip_braced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Parse `<Name> {` after a block keyword.
    fn parse_block_header(&mut self, keyword: &str) -> Option<String> {
        let name = match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                name
            }
            tok => {
                let span = self.current_span();
                self.report(
                    Severity::Error,
                    DiagnosticKind::MalformedBlock,
                    format!("expected a name after `{}`, found {}", keyword, describe(&tok)),
                    span,
                );
                self.skip_statement();
                return None;
            }
        };

        if *self.peek() != Token::LBrace {
            let tok = self.peek().clone();
            let span = self.current_span();
            self.report(
                Severity::Error,
                DiagnosticKind::MalformedBlock,
                format!("expected `{{` after {} `{}`, found {}", keyword, name, describe(&tok)),
                span,
            );
            self.skip_statement();
            return None;
        }
        self.advance();

        Some(name)
    }

    /// Collect one declaration. Newlines inside balanced parentheses or
    /// brackets do not end it; an unbalanced line falls back to its
    /// first physical line.
    fn take_line(&mut self) -> (Vec<SpannedToken>, LineEnd) {
        let start = self.pos;
        let mut depth = 0usize;
        let mut nested_newline: Option<usize> = None;

        loop {
            let token = match self.tokens.get(self.pos) {
                Some(t) => t.token.clone(),
                None => Token::Eof,
            };

            match token {
                Token::Eof | Token::RBrace => {
                    if depth > 0 {
                        if let Some(at) = nested_newline {
                            let line = self.collect(start, at);
                            self.pos = at + 1;
                            return (line, LineEnd::Newline);
                        }
                    }
                    let line = self.collect(start, self.pos);
                    if token == Token::Eof {
                        return (line, LineEnd::Eof);
                    }
                    self.advance();
                    return (line, LineEnd::BlockClose);
                }
                Token::Newline if depth == 0 => {
                    let line = self.collect(start, self.pos);
                    self.advance();
                    return (line, LineEnd::Newline);
                }
                Token::Newline => {
                    nested_newline.get_or_insert(self.pos);
                }
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn collect(&self, start: usize, end: usize) -> Vec<SpannedToken> {
        self.tokens[start..end]
            .iter()
            .filter(|t| t.token != Token::Newline)
            .cloned()
            .collect()
    }

    fn unclosed(&mut self, keyword: &str, name: &str, span: Span) {
        self.report(
            Severity::Error,
            DiagnosticKind::UnclosedBlock,
            format!("{} `{}` is missing a closing `}}`; block dropped", keyword, name),
            span,
        );
    }

    fn parse_model(&mut self, keyword_span: Span) -> Option<SchemaModel> {
        let name = self.parse_block_header("model")?;
        let mut model = SchemaModel {
            name,
            span: keyword_span,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        loop {
            let (line, end) = self.take_line();
            if !line.is_empty() {
                self.model_line(&mut model, &mut seen, &line);
            }
            match end {
                LineEnd::Newline => {}
                LineEnd::BlockClose => {
                    let close = self.tokens[self.pos.saturating_sub(1)].span;
                    model.span = keyword_span.merge(close);
                    tracing::trace!(
                        model = %model.name,
                        fields = model.fields.len(),
                        "parsed model"
                    );
                    return Some(model);
                }
                LineEnd::Eof => {
                    self.unclosed("model", &model.name, keyword_span);
                    return None;
                }
            }
        }
    }

    fn model_line(
        &mut self,
        model: &mut SchemaModel,
        seen: &mut HashSet<String>,
        line: &[SpannedToken],
    ) {
        if line[0].token == Token::AtAt {
            let raw = self.raw(line);
            match line.get(1).map(|t| &t.token) {
                Some(Token::Ident(n)) if n == "index" => model.indexes.push(raw),
                Some(Token::Ident(n)) if n == "unique" => model.unique_constraints.push(raw),
                _ => {
                    tracing::trace!(
                        model = %model.name,
                        directive = %raw,
                        "ignored block attribute"
                    )
                }
            }
            return;
        }

        let Some(field) = self.parse_field(line) else {
            return;
        };

        if seen.insert(field.name.clone()) {
            model.fields.push(field);
        } else {
            self.warn(
                DiagnosticKind::DuplicateField,
                format!(
                    "duplicate field `{}` in model `{}`; keeping the first declaration",
                    field.name, model.name
                ),
                field.span,
            );
        }
    }

    fn malformed(&mut self, message: String, span: Span) -> Option<SchemaField> {
        self.warn(DiagnosticKind::MalformedField, message, span);
        None
    }

    /// `<name> <Type>[]? ? @attr...`
    fn parse_field(&mut self, line: &[SpannedToken]) -> Option<SchemaField> {
        let line_span = Self::line_span(line);

        if let Some(bad) = line.iter().find(|t| matches!(t.token, Token::Unknown(_))) {
            let message = format!(
                "unexpected character {}; declaration skipped",
                describe(&bad.token)
            );
            self.warn(DiagnosticKind::UnexpectedCharacter, message, bad.span);
            return None;
        }

        let name = match &line[0].token {
            Token::Ident(name) => name.clone(),
            tok => {
                return self.malformed(
                    format!("expected a field name, found {}", describe(tok)),
                    line[0].span,
                );
            }
        };

        let (ty, ty_span) = match line.get(1) {
            Some(SpannedToken {
                token: Token::Ident(ty),
                span,
            }) => (ty.clone(), *span),
            Some(other) => {
                return self.malformed(
                    format!(
                        "expected a type after field `{}`, found {}",
                        name,
                        describe(&other.token)
                    ),
                    other.span,
                );
            }
            None => {
                return self.malformed(format!("field `{}` is missing a type", name), line_span);
            }
        };

        let mut i = 2;
        let mut end = ty_span.end;

        let mut is_array = false;
        if let Some(open) = line.get(i).filter(|t| t.token == Token::LBracket) {
            match line.get(i + 1) {
                Some(close)
                    if close.token == Token::RBracket
                        && open.span.start == end
                        && close.span.start == open.span.end =>
                {
                    is_array = true;
                    end = close.span.end;
                    i += 2;
                }
                _ => {
                    return self.malformed(
                        format!("field `{}`: `[]` must directly follow the type", name),
                        open.span,
                    );
                }
            }
        }

        let mut is_optional = false;
        if let Some(mark) = line.get(i).filter(|t| t.token == Token::Question) {
            if mark.span.start != end {
                return self.malformed(
                    format!("field `{}`: `?` must directly follow the type", name),
                    mark.span,
                );
            }
            is_optional = true;
            i += 1;
        }

        let mut field = SchemaField {
            name,
            ty,
            is_array,
            is_optional,
            span: line_span,
            ..Default::default()
        };

        while i < line.len() {
            if line[i].token != Token::At {
                return self.malformed(
                    format!(
                        "unexpected {} in field `{}`; attributes must start with `@`",
                        describe(&line[i].token),
                        field.name
                    ),
                    line[i].span,
                );
            }
            let attr = self.parse_attribute(line, &mut i, &field.name)?;
            self.apply_attribute(&mut field, attr);
        }

        Some(field)
    }

    /// Parse `@name(.name)*` with an optional balanced argument list.
    fn parse_attribute(
        &mut self,
        line: &[SpannedToken],
        i: &mut usize,
        field: &str,
    ) -> Option<Attribute> {
        let start = line[*i].span.start;
        *i += 1;

        let mut name = match line.get(*i) {
            Some(SpannedToken {
                token: Token::Ident(n),
                ..
            }) => n.clone(),
            _ => {
                self.warn(
                    DiagnosticKind::MalformedField,
                    format!("field `{}`: expected an attribute name after `@`", field),
                    line[*i - 1].span,
                );
                return None;
            }
        };
        let mut end = line[*i].span.end;
        *i += 1;

        while let (Some(dot), Some(next)) = (line.get(*i), line.get(*i + 1)) {
            match (&dot.token, &next.token) {
                (Token::Dot, Token::Ident(part)) => {
                    name.push('.');
                    name.push_str(part);
                    end = next.span.end;
                    *i += 2;
                }
                _ => break,
            }
        }

        let mut args = None;
        let mut inner = None;
        if line.get(*i).is_some_and(|t| t.token == Token::LParen) {
            let open = *i;
            let Some(close) = matching_paren(line, open) else {
                self.warn(
                    DiagnosticKind::MalformedField,
                    format!("field `{}`: unclosed `(` in attribute `@{}`", field, name),
                    line[open].span,
                );
                return None;
            };
            let body = &line[open + 1..close];
            if !body.is_empty() {
                inner = Some(Span::new(line[open].span.end, line[close].span.start));
            }
            args = Some(split_args(body));
            end = line[close].span.end;
            *i = close + 1;
        }

        Some(Attribute {
            name,
            raw: Span::new(start, end).text(&self.source).to_string(),
            args,
            inner,
        })
    }

    fn apply_attribute(&mut self, field: &mut SchemaField, attr: Attribute) {
        field.attributes.push(attr.raw);

        match attr.name.as_str() {
            "id" => field.is_primary_key = true,
            "unique" => field.is_unique = true,
            "default" => {
                field.has_default = true;
                field.default_value = attr
                    .inner
                    .map(|span| span.text(&self.source).trim().to_string())
                    .filter(|value| !value.is_empty());
            }
            "relation" => {
                let Some(args) = attr.args else {
                    return;
                };
                if is_scalar_type(&field.ty) {
                    self.warn(
                        DiagnosticKind::ScalarRelation,
                        format!(
                            "`@relation` on field `{}` of scalar type `{}` is ignored",
                            field.name, field.ty
                        ),
                        field.span,
                    );
                    return;
                }

                let mut relation = RelationRef {
                    model: field.ty.clone(),
                    ..Default::default()
                };
                for arg in &args {
                    match arg.key.as_deref() {
                        Some("fields") => relation.fields = Some(ident_list(&arg.value)),
                        Some("references") => relation.references = Some(ident_list(&arg.value)),
                        Some("onDelete") => relation.on_delete = first_ident(&arg.value),
                        Some("onUpdate") => relation.on_update = first_ident(&arg.value),
                        _ => {}
                    }
                }
                field.relation = Some(relation);
            }
            _ => {}
        }
    }

    fn parse_enum(&mut self, keyword_span: Span) -> Option<SchemaEnum> {
        let name = self.parse_block_header("enum")?;
        let mut values = Vec::new();

        loop {
            let (line, end) = self.take_line();
            if !line.is_empty() {
                values.push(self.raw(&line));
            }
            match end {
                LineEnd::Newline => {}
                LineEnd::BlockClose => {
                    let close = self.tokens[self.pos.saturating_sub(1)].span;
                    return Some(SchemaEnum {
                        name,
                        values,
                        span: keyword_span.merge(close),
                    });
                }
                LineEnd::Eof => {
                    self.unclosed("enum", &name, keyword_span);
                    return None;
                }
            }
        }
    }
}

fn matching_paren(line: &[SpannedToken], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, tok) in line.iter().enumerate().skip(open) {
        match tok.token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => {
                depth = depth.saturating_sub(1);
                if depth == 0 && tok.token == Token::RParen {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split attribute arguments at top-level commas into `key: value` or positional args.
fn split_args(tokens: &[SpannedToken]) -> Vec<Arg> {
    let mut pieces: Vec<Vec<SpannedToken>> = vec![Vec::new()];
    let mut depth = 0usize;

    for tok in tokens {
        match tok.token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                pieces.push(Vec::new());
                continue;
            }
            _ => {}
        }
        if let Some(piece) = pieces.last_mut() {
            piece.push(tok.clone());
        }
    }

    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|piece| match (piece.first(), piece.get(1)) {
            (
                Some(SpannedToken {
                    token: Token::Ident(key),
                    ..
                }),
                Some(SpannedToken {
                    token: Token::Colon,
                    ..
                }),
            ) => Arg {
                key: Some(key.clone()),
                value: piece[2..].to_vec(),
            },
            _ => Arg {
                key: None,
                value: piece,
            },
        })
        .collect()
}

/// Identifiers of a `[a, b]` list, skipping arguments of nested calls.
fn ident_list(tokens: &[SpannedToken]) -> Vec<String> {
    let mut parens = 0usize;
    let mut out = Vec::new();
    for tok in tokens {
        match &tok.token {
            Token::LParen => parens += 1,
            Token::RParen => parens = parens.saturating_sub(1),
            Token::Ident(name) if parens == 0 => out.push(name.clone()),
            _ => {}
        }
    }
    out
}

fn first_ident(tokens: &[SpannedToken]) -> Option<String> {
    tokens.iter().find_map(|t| match &t.token {
        Token::Ident(name) => Some(name.clone()),
        _ => None,
    })
}

fn describe(token: &Token) -> String {
    let symbol = match token {
        Token::Ident(s) => return format!("`{}`", s),
        Token::Str(s) => return format!("string \"{}\"", s),
        Token::Num(n) => return format!("number `{}`", n),
        Token::Unknown(c) => return format!("`{}`", c),
        Token::Newline => return "end of line".to_string(),
        Token::Eof => return "end of input".to_string(),
        Token::LBrace => "{",
        Token::RBrace => "}",
        Token::LParen => "(",
        Token::RParen => ")",
        Token::LBracket => "[",
        Token::RBracket => "]",
        Token::Comma => ",",
        Token::Colon => ":",
        Token::Question => "?",
        Token::Eq => "=",
        Token::Dot => ".",
        Token::At => "@",
        Token::AtAt => "@@",
    };
    format!("`{}`", symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_clean(input: &str) -> ParsedSchema {
        let output = parse_schema(input);
        assert_eq!(output.diagnostics, vec![]);
        output.schema
    }

    #[test]
    fn test_parse_model() {
        let schema = parse_clean("model User { id String @id\n name String }");
        assert_eq!(schema.models.len(), 1);

        let user = &schema.models[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.fields.len(), 2);
        assert!(user.fields[0].is_primary_key);
        assert_eq!(user.fields[0].attributes, vec!["@id"]);
        assert_eq!(user.fields[1].name, "name");
        assert!(user.fields[1].attributes.is_empty());
    }

    #[test]
    fn test_parse_enum() {
        let schema = parse_clean("enum Status { OPEN\nCLOSED }");
        assert_eq!(schema.enums.len(), 1);
        assert_eq!(schema.enums[0].name, "Status");
        assert_eq!(schema.enums[0].values, vec!["OPEN", "CLOSED"]);
    }

    #[test]
    fn test_enum_values_are_verbatim() {
        let schema = parse_clean(
            r#"
            enum Role {
                ADMIN @map("admin")

                USER
                USER
            }
            enum Role { GUEST }
        "#,
        );
        assert_eq!(schema.enums.len(), 2);
        assert_eq!(schema.enums[0].values, vec![r#"ADMIN @map("admin")"#, "USER", "USER"]);
        assert_eq!(schema.enums[1].values, vec!["GUEST"]);
    }

    #[test]
    fn test_array_field_with_relation() {
        let schema = parse_clean(
            r#"
            model User {
                id    Int    @id
                roles Role[] @relation("UserRoles", fields: [id], references: [userId])
            }
        "#,
        );
        let roles = &schema.models[0].fields[1];
        assert!(roles.is_array);
        assert!(!roles.is_optional);
        assert_eq!(schema.relations.len(), 1);
        assert_eq!(schema.relations[0].cardinality, Cardinality::OneToMany);
        assert_eq!(schema.relations[0].to, "Role");
    }

    #[test]
    fn test_relation_arguments() {
        let schema = parse_clean(
            r#"
            model Post {
                id       Int   @id @default(autoincrement())
                authorId Int
                author   User? @relation(onUpdate: NoAction, references: [id], fields: [authorId], onDelete: Cascade, map: "fk")
            }
        "#,
        );
        let author = &schema.models[0].fields[2];
        assert!(author.is_optional);
        assert_eq!(
            author.relation,
            Some(RelationRef {
                model: "User".into(),
                fields: Some(vec!["authorId".into()]),
                references: Some(vec!["id".into()]),
                on_delete: Some("Cascade".into()),
                on_update: Some("NoAction".into()),
            })
        );
        assert_eq!(
            schema.relations,
            vec![SchemaRelation {
                from: "Post".into(),
                to: "User".into(),
                from_field: "author".into(),
                cardinality: Cardinality::OneToOne,
                on_delete: Some("Cascade".into()),
            }]
        );
    }

    #[test]
    fn test_relation_without_arguments_is_not_a_relation() {
        let schema = parse_clean("model Post {\n author User @relation\n}");
        assert!(schema.models[0].fields[0].relation.is_none());
        assert!(schema.relations.is_empty());
    }

    #[test]
    fn test_relation_on_scalar_is_ignored() {
        let output = parse_schema("model Post {\n authorId Int @relation(fields: [x])\n}");
        assert!(output.schema.models[0].fields[0].relation.is_none());
        assert!(output.schema.relations.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::ScalarRelation);
        assert_eq!(output.diagnostics[0].line, 2);
    }

    #[test]
    fn test_default_values_are_raw() {
        let schema = parse_clean(
            r#"
            model Item {
                id        String   @id @default(cuid())
                createdAt DateTime @default(now())
                label     String   @default("a, b")
                count     Int      @default( 0 )
                flag      Boolean  @default
            }
        "#,
        );
        let fields = &schema.models[0].fields;
        assert_eq!(fields[0].default_value.as_deref(), Some("cuid()"));
        assert_eq!(fields[1].default_value.as_deref(), Some("now()"));
        assert_eq!(fields[2].default_value.as_deref(), Some("\"a, b\""));
        assert_eq!(fields[3].default_value.as_deref(), Some("0"));
        assert!(fields[4].has_default);
        assert_eq!(fields[4].default_value, None);
        assert_eq!(fields[1].attributes, vec!["@default(now())"]);
    }

    #[test]
    fn test_attribute_names_match_exactly() {
        let schema = parse_clean("model A {\n id String @db.Uuid @unique\n}");
        let id = &schema.models[0].fields[0];
        assert!(!id.is_primary_key);
        assert!(id.is_unique);
        assert_eq!(id.attributes, vec!["@db.Uuid", "@unique"]);
    }

    #[test]
    fn test_block_annotations() {
        let schema = parse_clean(
            r#"
            model Post {
                id    Int    @id
                title String
                slug  String

                @@index([title])
                @@unique([title, slug])
                @@map("posts")
                @@index([slug], name: "posts_slug")
            }
        "#,
        );
        let post = &schema.models[0];
        assert_eq!(post.fields.len(), 3);
        assert_eq!(
            post.indexes,
            vec!["@@index([title])", r#"@@index([slug], name: "posts_slug")"#]
        );
        assert_eq!(post.unique_constraints, vec!["@@unique([title, slug])"]);
    }

    #[test]
    fn test_multiline_attribute_arguments() {
        let schema = parse_clean(
            "model Post {\n  author User @relation(\n    fields: [authorId],\n    references: [id]\n  )\n  authorId Int\n}",
        );
        let post = &schema.models[0];
        assert_eq!(post.fields.len(), 2);
        let relation = post.fields[0].relation.as_ref().unwrap();
        assert_eq!(relation.fields, Some(vec!["authorId".to_string()]));
        assert_eq!(relation.references, Some(vec!["id".to_string()]));
    }

    #[test]
    fn test_comments_are_stripped() {
        let schema = parse_clean(
            r#"
            // Users of the system
            model User {
                id   Int    @id // primary key
                /// doc comment
                site String @default("https://example.com")
            }
        "#,
        );
        let user = &schema.models[0];
        assert_eq!(user.fields.len(), 2);
        assert_eq!(
            user.fields[1].default_value.as_deref(),
            Some("\"https://example.com\"")
        );
    }

    #[test]
    fn test_ignored_blocks() {
        let schema = parse_clean(
            r#"
            datasource db {
                provider = "postgresql"
                url      = env("DATABASE_URL")
            }

            generator client {
                provider = "prisma-client-js"
            }

            model A {
                id Int @id
            }
        "#,
        );
        assert_eq!(schema.models.len(), 1);
        assert_eq!(schema.models[0].name, "A");
    }

    #[test]
    fn test_malformed_lines_are_skipped_with_diagnostics() {
        let input = "model User {\n  id Int @id\n  broken\n  name String ??\n  age Int\n}";
        let output = parse_schema(input);

        let user = &output.schema.models[0];
        let names: Vec<&str> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "age"]);

        assert_eq!(output.diagnostics.len(), 2);
        assert!(output.diagnostics.iter().all(|d| d.kind == DiagnosticKind::MalformedField));
        assert_eq!(output.diagnostics[0].line, 3);
        assert_eq!(output.diagnostics[0].column, 3);
        assert_eq!(output.diagnostics[1].line, 4);
        assert!(!output.has_errors());
    }

    #[test]
    fn test_non_adjacent_modifiers_do_not_match() {
        let output = parse_schema("model A {\n tags String []\n bio String ?\n ok String?\n}");
        let fields = &output.schema.models[0].fields;
        assert_eq!(fields.len(), 1);
        assert!(fields[0].is_optional);
        assert_eq!(output.diagnostics.len(), 2);
    }

    #[test]
    fn test_parameterized_type_is_skipped() {
        let output = parse_schema("model A {\n geo Unsupported(\"polygon\")\n id Int\n}");
        assert_eq!(output.schema.models[0].fields.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::MalformedField);
    }

    #[test]
    fn test_unexpected_character() {
        let output = parse_schema("model A {\n id Int $weird\n}");
        assert!(output.schema.models[0].fields.is_empty());
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnexpectedCharacter);
        assert_eq!(output.diagnostics[0].column, 9);
    }

    #[test]
    fn test_duplicate_field_keeps_first() {
        let output = parse_schema("model A {\n id Int\n id String\n}");
        let fields = &output.schema.models[0].fields;
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].ty, "Int");
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::DuplicateField);
        assert_eq!(output.diagnostics[0].line, 3);
    }

    #[test]
    fn test_unclosed_block_is_dropped() {
        let output = parse_schema("model A { id Int }\nmodel B {\n id Int\n");
        assert_eq!(output.schema.models.len(), 1);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnclosedBlock);
        assert_eq!(output.diagnostics[0].line, 2);
        assert!(output.has_errors());
    }

    #[test]
    fn test_unbalanced_paren_only_spoils_its_line() {
        let output = parse_schema("model A {\n id Int @default(\n name String\n}");
        let names: Vec<&str> = output.schema.models[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["name"]);
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[test]
    fn test_unexpected_top_level_tokens() {
        let output = parse_schema("modle User {\n id Int\n}\nmodel A { id Int }");
        assert_eq!(output.schema.models.len(), 1);
        assert_eq!(output.schema.models[0].name, "A");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnexpectedToken);
    }

    #[test]
    fn test_malformed_header() {
        let output = parse_schema("model {\n id Int\n}\nenum E\nmodel A { id Int }");
        assert_eq!(output.schema.models.len(), 1);
        assert_eq!(output.diagnostics.len(), 2);
        assert!(output.diagnostics.iter().all(|d| d.kind == DiagnosticKind::MalformedBlock));
    }

    #[test]
    fn test_empty_and_garbage_input() {
        let empty = parse_schema("");
        assert_eq!(empty.schema, ParsedSchema::default());
        assert!(empty.diagnostics.is_empty());

        let garbage = parse_schema("this is not a schema");
        assert_eq!(garbage.schema, ParsedSchema::default());
        assert!(!garbage.diagnostics.is_empty());
    }

    #[test]
    fn test_strict_mode() {
        assert!(parse_strict("model A { id Int @id }").is_ok());

        let err = parse_strict("model A {\n id Int\n").unwrap_err();
        assert_eq!(err.diagnostic().kind, DiagnosticKind::UnclosedBlock);
        assert_eq!(err.diagnostic().severity, Severity::Error);

        let lenient = parse_with("model A {\n id\n}", ParseMode::Lenient).unwrap();
        assert_eq!(lenient.schema.models.len(), 1);
        assert_eq!(lenient.diagnostics[0].kind, DiagnosticKind::MalformedField);
    }

    #[test]
    fn test_strict_mode_accepts_warnings() {
        let input = "model A {\n id Int\n id String\n bad\n}";
        let lenient = parse_schema(input);
        let kinds: Vec<DiagnosticKind> = lenient.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DuplicateField, DiagnosticKind::MalformedField]
        );
        assert!(!lenient.has_errors());

        let schema = parse_strict(input).unwrap();
        assert_eq!(schema, lenient.schema);
        assert_eq!(schema.models[0].fields.len(), 1);
    }

    #[test]
    fn test_spans_point_into_source() {
        let input = "model User {\n  email String @unique\n}";
        let schema = parse_clean(input);
        let email = &schema.models[0].fields[0];
        assert_eq!(email.span.text(input), "email String @unique");
        assert_eq!(schema.models[0].span.text(input), input);
    }
}
