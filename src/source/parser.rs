//! Tolerant, declaration-level parser for TypeScript/TSX modules.
//!
//! The parser understands imports, exports, function headers, type aliases,
//! interfaces and enums. Statement bodies, initializers and JSX are skipped by
//! bracket matching, with automatic semicolon insertion approximated from the
//! line breaks recorded by the lexer. Unknown top-level statements are skipped
//! rather than rejected; only structural damage (unclosed brackets, malformed
//! declaration headers) produces a [`ParseError`].

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use super::ast::{
    Declaration, DefaultExport, EnumDecl, EnumMember, EnumValue, Export, FunctionDecl, Import,
    ImportedName, InterfaceDecl, Module, Param, PropertySignature, TypeAliasDecl, TypeExpr,
    TypeKeyword,
};
use super::lexer::{tokenize, unescape, Spanned, Token};

/// A syntax error in a source file.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(rplite::parse::syntax))]
pub struct ParseError {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    /// Byte offset of the error in the source file.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

struct Stop {
    message: String,
    start: usize,
    end: usize,
}

type PResult<T> = Result<T, Stop>;

/// Parse one source file into its declaration-level [`Module`].
pub fn parse_module(path: &Path, source: &str) -> Result<Module, ParseError> {
    let mut parser = Parser {
        source,
        tokens: tokenize(source),
        pos: 0,
    };
    let mut module = Module::new(path);

    match parser.parse_into(&mut module) {
        Ok(()) => Ok(module),
        Err(stop) => Err(ParseError {
            message: stop.message,
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            span: (stop.start, stop.end.saturating_sub(stop.start)).into(),
        }),
    }
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Spanned<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<Token<'src>> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + n).map(|t| t.token)
    }

    fn bump(&mut self) -> Option<Token<'src>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, token: Token<'src>) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: Token<'src>) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn word_at(&self, n: usize, word: &str) -> bool {
        matches!(self.peek_at(n), Some(Token::Ident(w)) if w == word)
    }

    fn at_word(&self, word: &str) -> bool {
        self.word_at(0, word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident_at(&self, n: usize) -> Option<&'src str> {
        match self.peek_at(n) {
            Some(Token::Ident(name)) => Some(name),
            _ => None,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn newline_before(&self) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| t.newline_before)
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(t) => format!("`{}`", &self.source[t.start..t.end]),
            None => "end of file".to_string(),
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        let (start, end) = match self.tokens.get(self.pos) {
            Some(t) => (t.start, t.end),
            None => (self.source.len(), self.source.len()),
        };
        Err(Stop {
            message: message.into(),
            start,
            end,
        })
    }

    fn expect(&mut self, token: Token<'src>, what: &str) -> PResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            self.error(format!("expected {what}, found {}", self.describe_current()))
        }
    }

    fn expect_word(&mut self, word: &str) -> PResult<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            self.error(format!("expected `{word}`, found {}", self.describe_current()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<&'src str> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => self.error(format!("expected {what}, found {}", self.describe_current())),
        }
    }

    fn expect_string(&mut self, what: &str) -> PResult<String> {
        match self.peek() {
            Some(Token::Str(raw)) => {
                self.pos += 1;
                Ok(unescape(raw))
            }
            _ => self.error(format!("expected {what}, found {}", self.describe_current())),
        }
    }

    // ------------------------------------------------------------------
    // Skipping
    // ------------------------------------------------------------------

    /// Consume a bracketed group starting at the current `open` token.
    fn skip_balanced(&mut self, open: Token<'src>, close: Token<'src>) -> PResult<()> {
        let opener = self.pos;
        self.pos += 1;
        let mut depth = 1usize;

        while let Some(token) = self.bump() {
            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }

        let t = self.tokens[opener];
        Err(Stop {
            message: format!("unclosed `{}`", &self.source[t.start..t.end]),
            start: t.start,
            end: t.end,
        })
    }

    /// Index of the `)` matching the `(` at `from`, without consuming.
    fn matching_paren(&self, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, t) in self.tokens.iter().enumerate().skip(from) {
            match t.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Whether the current token starts a new statement on a fresh line.
    fn at_statement_boundary(&self) -> bool {
        if !self.newline_before() {
            return false;
        }
        match self.peek() {
            Some(Token::Ident(
                "export" | "import" | "const" | "let" | "var" | "function" | "interface" | "enum"
                | "class" | "declare" | "abstract",
            )) => true,
            Some(Token::Ident("async")) => self.word_at(1, "function"),
            Some(Token::Ident("type")) => self.is_type_alias_start(),
            _ => false,
        }
    }

    /// Skip an expression up to a `;`, an unmatched closer, a statement
    /// boundary, or (when `stop_at_comma`) a top-level comma.
    fn skip_expression(&mut self, stop_at_comma: bool) -> PResult<()> {
        while let Some(token) = self.peek() {
            if self.at_statement_boundary() {
                break;
            }
            match token {
                Token::Semi | Token::RParen | Token::RBracket | Token::RBrace => break,
                Token::Comma if stop_at_comma => break,
                Token::LBrace => self.skip_balanced(Token::LBrace, Token::RBrace)?,
                Token::LParen => self.skip_balanced(Token::LParen, Token::RParen)?,
                Token::LBracket => self.skip_balanced(Token::LBracket, Token::RBracket)?,
                _ => {
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }

    fn skip_statement(&mut self) -> PResult<()> {
        let start = self.pos;
        self.skip_expression(false)?;
        self.eat(Token::Semi);
        if self.pos == start {
            self.bump();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_into(&mut self, module: &mut Module) -> PResult<()> {
        while !self.is_eof() {
            self.parse_statement(module)?;
        }
        Ok(())
    }

    fn parse_statement(&mut self, module: &mut Module) -> PResult<()> {
        if self.at_word("import")
            && !matches!(self.peek_at(1), Some(Token::LParen) | Some(Token::Dot))
        {
            return self.parse_import(module);
        }
        if self.at_word("export") {
            return self.parse_export(module);
        }
        if self.at_word("declare") && matches!(self.peek_at(1), Some(Token::Ident(_))) {
            self.bump();
            return self.parse_statement(module);
        }
        if self.at(Token::Semi) {
            self.bump();
            return Ok(());
        }
        if self.at(Token::LBrace) {
            return self.skip_balanced(Token::LBrace, Token::RBrace);
        }
        if self.parse_declaration(module)?.is_none() {
            self.skip_statement()?;
        }
        Ok(())
    }

    fn is_type_alias_start(&self) -> bool {
        self.at_word("type")
            && self.ident_at(1).is_some()
            && matches!(self.peek_at(2), Some(Token::Eq) | Some(Token::Lt))
    }

    /// Parse a declaration at the cursor, returning the names it binds, or
    /// `None` (consuming nothing) when the cursor is not at a declaration.
    fn parse_declaration(&mut self, module: &mut Module) -> PResult<Option<Vec<String>>> {
        let names = match self.peek() {
            Some(Token::Ident("function")) => self.function_declaration(module)?,
            Some(Token::Ident("async")) if self.word_at(1, "function") => {
                self.function_declaration(module)?
            }
            Some(Token::Ident("const")) if self.word_at(1, "enum") => {
                self.bump();
                self.enum_declaration(module)?
            }
            Some(Token::Ident("const" | "let" | "var")) => self.variable_statement(module)?,
            Some(Token::Ident("type")) if self.is_type_alias_start() => {
                self.type_alias_declaration(module)?
            }
            Some(Token::Ident("interface")) if self.ident_at(1).is_some() => {
                self.interface_declaration(module)?
            }
            Some(Token::Ident("enum")) if self.ident_at(1).is_some() => {
                self.enum_declaration(module)?
            }
            Some(Token::Ident("class")) => self.class_declaration(module)?,
            Some(Token::Ident("abstract")) if self.word_at(1, "class") => {
                self.bump();
                self.class_declaration(module)?
            }
            Some(Token::Ident("namespace" | "module"))
                if matches!(self.peek_at(1), Some(Token::Ident(_)) | Some(Token::Str(_))) =>
            {
                self.skip_namespace()?;
                Vec::new()
            }
            Some(Token::Ident("global")) if self.peek_at(1) == Some(Token::LBrace) => {
                self.skip_namespace()?;
                Vec::new()
            }
            _ => return Ok(None),
        };
        Ok(Some(names))
    }

    fn parse_import(&mut self, module: &mut Module) -> PResult<()> {
        self.expect_word("import")?;

        let type_only_default = self.word_at(1, "from") && matches!(self.peek_at(2), Some(Token::Str(_)));
        if self.at_word("type") && !type_only_default && self.peek_at(1) != Some(Token::Comma) {
            self.bump();
        }

        if let Some(Token::Str(_)) = self.peek() {
            self.bump();
            self.eat(Token::Semi);
            return Ok(());
        }

        if self.ident_at(0).is_some() && self.peek_at(1) == Some(Token::Eq) {
            return self.skip_statement();
        }

        let mut bindings: Vec<(String, ImportedName)> = Vec::new();

        if let Some(name) = self.ident_at(0) {
            if name != "from" || self.peek_at(1) == Some(Token::Comma) {
                self.bump();
                bindings.push((name.to_string(), ImportedName::Default));
                self.eat(Token::Comma);
            }
        }

        if self.eat(Token::Star) {
            self.expect_word("as")?;
            let local = self.expect_ident("a namespace name")?;
            bindings.push((local.to_string(), ImportedName::Namespace));
        } else if self.at(Token::LBrace) {
            for (imported, local) in self.specifier_list()? {
                let imported = if imported == "default" {
                    ImportedName::Default
                } else {
                    ImportedName::Named(imported)
                };
                bindings.push((local, imported));
            }
        }

        self.expect_word("from")?;
        let source = self.expect_string("a module specifier")?;
        self.skip_import_attributes()?;
        self.eat(Token::Semi);

        module.imports.extend(bindings.into_iter().map(|(local, imported)| Import {
            local,
            imported,
            source: source.clone(),
        }));
        Ok(())
    }

    fn skip_import_attributes(&mut self) -> PResult<()> {
        if (self.at_word("with") || self.at_word("assert"))
            && self.peek_at(1) == Some(Token::LBrace)
            && !self.newline_before()
        {
            self.bump();
            self.skip_balanced(Token::LBrace, Token::RBrace)?;
        }
        Ok(())
    }

    /// Parse `{ a, b as c, type d }` into `(name, alias)` pairs.
    fn specifier_list(&mut self) -> PResult<Vec<(String, String)>> {
        self.expect(Token::LBrace, "`{`")?;
        let mut specifiers = Vec::new();

        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            if self.at_word("type") && self.ident_at(1).is_some_and(|w| w != "as") {
                self.bump();
            }
            let name = self.module_export_name()?;
            let alias = if self.eat_word("as") {
                self.module_export_name()?
            } else {
                name.clone()
            };
            specifiers.push((name, alias));

            if !self.eat(Token::Comma) {
                self.expect(Token::RBrace, "`}`")?;
                break;
            }
        }

        Ok(specifiers)
    }

    fn module_export_name(&mut self) -> PResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.bump();
                Ok(name.to_string())
            }
            Some(Token::Str(raw)) => {
                self.bump();
                Ok(unescape(raw))
            }
            _ => self.error(format!("expected an export name, found {}", self.describe_current())),
        }
    }

    fn parse_export(&mut self, module: &mut Module) -> PResult<()> {
        self.expect_word("export")?;

        if self.eat_word("default") {
            return self.parse_default_export(module);
        }

        if self.eat(Token::Star) {
            let namespace = if self.eat_word("as") {
                Some(self.module_export_name()?)
            } else {
                None
            };
            self.expect_word("from")?;
            let source = self.expect_string("a module specifier")?;
            self.skip_import_attributes()?;
            self.eat(Token::Semi);
            if namespace.is_none() {
                module.exports.push(Export::ReExportAll { source });
            }
            return Ok(());
        }

        if self.at_word("type") && self.peek_at(1) == Some(Token::LBrace) {
            self.bump();
        }

        if self.at(Token::LBrace) {
            let specifiers = self.specifier_list()?;
            let source = if self.eat_word("from") {
                Some(self.expect_string("a module specifier")?)
            } else {
                None
            };
            self.skip_import_attributes()?;
            self.eat(Token::Semi);

            for (name, exported) in specifiers {
                module.exports.push(match &source {
                    Some(source) => Export::ReExport {
                        imported: name,
                        exported,
                        source: source.clone(),
                    },
                    None => Export::Local {
                        local: name,
                        exported,
                    },
                });
            }
            return Ok(());
        }

        if self.at_word("import") || self.at(Token::Eq) || self.at_word("as") {
            return self.skip_statement();
        }

        if self.at_word("declare") {
            self.bump();
        }

        match self.parse_declaration(module)? {
            Some(names) => {
                module.exports.extend(names.into_iter().map(|name| Export::Local {
                    local: name.clone(),
                    exported: name,
                }));
                Ok(())
            }
            None => self.skip_statement(),
        }
    }

    fn parse_default_export(&mut self, module: &mut Module) -> PResult<()> {
        if self.at_word("function") || (self.at_word("async") && self.word_at(1, "function")) {
            let function = self.function_header()?;
            if function.name.is_some() {
                module.declarations.push(Declaration::Function(function.clone()));
            }
            module.exports.push(Export::Default(DefaultExport::Function(function)));
            return Ok(());
        }

        if self.at_word("interface") || self.at_word("class") || self.at_word("abstract") {
            let names = self.parse_declaration(module)?.unwrap_or_default();
            match names.into_iter().next() {
                Some(local) => module.exports.push(Export::Local {
                    local,
                    exported: "default".to_string(),
                }),
                None => module.exports.push(Export::Default(DefaultExport::Expression)),
            }
            return Ok(());
        }

        if let Some(function) = self.function_expression()? {
            self.skip_expression(false)?;
            self.eat(Token::Semi);
            module.exports.push(Export::Default(DefaultExport::Function(function)));
            return Ok(());
        }

        if let Some(name) = self.ident_at(0) {
            let ends_here = match self.tokens.get(self.pos + 1) {
                None => true,
                Some(next) => {
                    next.token == Token::Semi
                        || (next.newline_before
                            && !matches!(
                                next.token,
                                Token::Dot | Token::LParen | Token::LBracket | Token::Lt
                            ))
                }
            };
            if ends_here {
                self.bump();
                self.eat(Token::Semi);
                module
                    .exports
                    .push(Export::Default(DefaultExport::Ident(name.to_string())));
                return Ok(());
            }
        }

        self.skip_statement()?;
        module.exports.push(Export::Default(DefaultExport::Expression));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn function_declaration(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        let function = self.function_header()?;
        let names = function.name.iter().cloned().collect();
        module.declarations.push(Declaration::Function(function));
        Ok(names)
    }

    /// `[async] function [*] [name] [<T>] (params) [: R] [{ body }]`
    fn function_header(&mut self) -> PResult<FunctionDecl> {
        self.eat_word("async");
        self.expect_word("function")?;
        self.eat(Token::Star);

        let name = self.ident_at(0).map(str::to_string);
        if name.is_some() {
            self.bump();
        }
        if self.at(Token::Lt) {
            self.type_parameters()?;
        }

        let params = self.parameters()?;
        if self.eat(Token::Colon) {
            self.return_type()?;
        }
        if self.at(Token::LBrace) {
            self.skip_balanced(Token::LBrace, Token::RBrace)?;
        } else {
            self.eat(Token::Semi);
        }

        Ok(FunctionDecl { name, params })
    }

    /// Try to parse a function expression or arrow function at the cursor.
    /// Restores the cursor and returns `None` when the expression is
    /// something else.
    fn function_expression(&mut self) -> PResult<Option<FunctionDecl>> {
        let start = self.pos;

        if self.eat(Token::LParen) {
            if let Some(function) = self.function_expression()? {
                if self.eat(Token::RParen) {
                    return Ok(Some(function));
                }
            }
            self.pos = start;
        }

        if self.at_word("async")
            && !self.tokens.get(self.pos + 1).is_some_and(|t| t.newline_before)
            && (self.word_at(1, "function")
                || matches!(self.peek_at(1), Some(Token::LParen) | Some(Token::Lt))
                || (self.ident_at(1).is_some() && self.peek_at(2) == Some(Token::Arrow)))
        {
            self.bump();
        }

        if self.at_word("function") {
            let mut function = self.function_header()?;
            function.name = None;
            return Ok(Some(function));
        }

        if let Some(name) = self.ident_at(0) {
            if self.peek_at(1) == Some(Token::Arrow) {
                self.pos += 2;
                self.arrow_body()?;
                return Ok(Some(FunctionDecl {
                    name: None,
                    params: vec![Param {
                        name: Some(name.to_string()),
                        ty: None,
                        rest: false,
                    }],
                }));
            }
        }

        if self.at(Token::Lt) {
            if self.skip_balanced(Token::Lt, Token::Gt).is_err() || !self.at(Token::LParen) {
                self.pos = start;
                return Ok(None);
            }
        }

        if self.at(Token::LParen) {
            let Some(close) = self.matching_paren(self.pos) else {
                self.pos = start;
                return Ok(None);
            };
            let after = self.tokens.get(close + 1).map(|t| t.token);
            if !matches!(after, Some(Token::Arrow) | Some(Token::Colon)) {
                self.pos = start;
                return Ok(None);
            }

            let params = match self.parameters() {
                Ok(params) => params,
                Err(_) => {
                    self.pos = start;
                    return Ok(None);
                }
            };
            if self.eat(Token::Colon) && self.return_type().is_err() {
                self.pos = start;
                return Ok(None);
            }
            if !self.eat(Token::Arrow) {
                self.pos = start;
                return Ok(None);
            }
            self.arrow_body()?;
            return Ok(Some(FunctionDecl { name: None, params }));
        }

        self.pos = start;
        Ok(None)
    }

    fn arrow_body(&mut self) -> PResult<()> {
        if self.at(Token::LBrace) {
            self.skip_balanced(Token::LBrace, Token::RBrace)
        } else {
            self.skip_expression(true)
        }
    }

    fn parameters(&mut self) -> PResult<Vec<Param>> {
        self.expect(Token::LParen, "`(`")?;
        let mut params = Vec::new();

        loop {
            if self.eat(Token::RParen) {
                break;
            }

            while self.eat(Token::At) {
                self.expect_ident("a decorator name")?;
                while self.eat(Token::Dot) {
                    self.expect_ident("a decorator name")?;
                }
                if self.at(Token::LParen) {
                    self.skip_balanced(Token::LParen, Token::RParen)?;
                }
            }
            while matches!(
                self.ident_at(0),
                Some("public" | "private" | "protected" | "readonly" | "override")
            ) && matches!(
                self.peek_at(1),
                Some(Token::Ident(_)) | Some(Token::LBrace) | Some(Token::LBracket)
            ) {
                self.bump();
            }

            let rest = self.eat(Token::Ellipsis);
            let name = match self.peek() {
                Some(Token::Ident(name)) => {
                    self.bump();
                    Some(name.to_string())
                }
                Some(Token::LBrace) => {
                    self.skip_balanced(Token::LBrace, Token::RBrace)?;
                    None
                }
                Some(Token::LBracket) => {
                    self.skip_balanced(Token::LBracket, Token::RBracket)?;
                    None
                }
                _ => {
                    return self.error(format!(
                        "expected a parameter, found {}",
                        self.describe_current()
                    ))
                }
            };
            self.eat(Token::Question);
            let ty = if self.eat(Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            if self.eat(Token::Eq) {
                self.skip_expression(true)?;
            }

            if name.as_deref() != Some("this") {
                params.push(Param { name, ty, rest });
            }

            if !self.eat(Token::Comma) {
                self.expect(Token::RParen, "`)`")?;
                break;
            }
        }

        Ok(params)
    }

    fn return_type(&mut self) -> PResult<()> {
        self.eat_word("asserts");
        self.parse_type()?;
        if self.eat_word("is") {
            self.parse_type()?;
        }
        Ok(())
    }

    fn variable_statement(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        self.bump();
        let mut names = Vec::new();

        loop {
            let name = match self.peek() {
                Some(Token::Ident(name)) => {
                    self.bump();
                    Some(name.to_string())
                }
                Some(Token::LBrace) => {
                    self.skip_balanced(Token::LBrace, Token::RBrace)?;
                    None
                }
                Some(Token::LBracket) => {
                    self.skip_balanced(Token::LBracket, Token::RBracket)?;
                    None
                }
                _ => {
                    self.skip_statement()?;
                    break;
                }
            };

            self.eat(Token::Bang);
            if self.eat(Token::Colon) {
                self.parse_type()?;
            }

            let function = if self.eat(Token::Eq) {
                let function = self.function_expression()?;
                self.skip_expression(true)?;
                function
            } else {
                None
            };

            if let Some(name) = name {
                module.declarations.push(match function {
                    Some(mut function) => {
                        function.name = Some(name.clone());
                        Declaration::Function(function)
                    }
                    None => Declaration::Variable(name.clone()),
                });
                names.push(name);
            }

            if !self.eat(Token::Comma) {
                self.eat(Token::Semi);
                break;
            }
        }

        Ok(names)
    }

    fn type_alias_declaration(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        self.expect_word("type")?;
        let name = self.expect_ident("a type name")?.to_string();
        let type_params = if self.at(Token::Lt) {
            self.type_parameters()?
        } else {
            Vec::new()
        };
        self.expect(Token::Eq, "`=`")?;
        let ty = self.parse_type()?;
        self.eat(Token::Semi);

        module.declarations.push(Declaration::TypeAlias(TypeAliasDecl {
            name: name.clone(),
            type_params,
            ty,
        }));
        Ok(vec![name])
    }

    fn interface_declaration(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        self.expect_word("interface")?;
        let name = self.expect_ident("an interface name")?.to_string();
        let type_params = if self.at(Token::Lt) {
            self.type_parameters()?
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        if self.eat_word("extends") {
            loop {
                extends.push(self.parse_postfix_type()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }

        let members = match self.object_type()? {
            TypeExpr::Object(members) => members,
            _ => Vec::new(),
        };

        module.declarations.push(Declaration::Interface(InterfaceDecl {
            name: name.clone(),
            type_params,
            extends,
            members,
        }));
        Ok(vec![name])
    }

    fn enum_declaration(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        self.expect_word("enum")?;
        let name = self.expect_ident("an enum name")?.to_string();
        self.expect(Token::LBrace, "`{`")?;

        let mut members = Vec::new();
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            let member = self.module_export_name()?;
            let value = if self.eat(Token::Eq) {
                Some(self.enum_initializer()?)
            } else {
                None
            };
            members.push(EnumMember {
                name: member,
                value,
            });
            if !self.eat(Token::Comma) {
                self.expect(Token::RBrace, "`}`")?;
                break;
            }
        }

        module.declarations.push(Declaration::Enum(EnumDecl {
            name: name.clone(),
            members,
        }));
        Ok(vec![name])
    }

    fn ends_enum_member(&self, n: usize) -> bool {
        matches!(self.peek_at(n), Some(Token::Comma) | Some(Token::RBrace))
    }

    fn enum_initializer(&mut self) -> PResult<EnumValue> {
        let value = match self.peek() {
            Some(Token::Str(raw)) if self.ends_enum_member(1) => {
                Some(EnumValue::String(unescape(raw)))
            }
            Some(Token::Template(raw)) if self.ends_enum_member(1) && !raw.contains("${") => {
                Some(EnumValue::String(unescape(raw)))
            }
            Some(Token::Number(n)) if self.ends_enum_member(1) => {
                Some(EnumValue::Number(n.to_string()))
            }
            Some(Token::Minus) if self.ends_enum_member(2) => match self.peek_at(1) {
                Some(Token::Number(n)) => {
                    self.bump();
                    Some(EnumValue::Number(format!("-{n}")))
                }
                _ => None,
            },
            _ => None,
        };

        match value {
            Some(value) => {
                self.bump();
                Ok(value)
            }
            None => {
                self.skip_expression(true)?;
                Ok(EnumValue::Computed)
            }
        }
    }

    fn class_declaration(&mut self, module: &mut Module) -> PResult<Vec<String>> {
        self.expect_word("class")?;
        let name = self
            .ident_at(0)
            .filter(|w| *w != "extends" && *w != "implements")
            .map(str::to_string);
        if name.is_some() {
            self.bump();
        }

        loop {
            match self.peek() {
                Some(Token::LBrace) => {
                    self.skip_balanced(Token::LBrace, Token::RBrace)?;
                    break;
                }
                Some(Token::LParen) => self.skip_balanced(Token::LParen, Token::RParen)?,
                Some(_) => {
                    self.bump();
                }
                None => return self.error("expected a class body"),
            }
        }

        match name {
            Some(name) => {
                module.declarations.push(Declaration::Variable(name.clone()));
                Ok(vec![name])
            }
            None => Ok(Vec::new()),
        }
    }

    fn skip_namespace(&mut self) -> PResult<()> {
        self.bump();
        while matches!(
            self.peek(),
            Some(Token::Ident(_)) | Some(Token::Str(_)) | Some(Token::Dot)
        ) {
            self.bump();
        }
        if self.at(Token::LBrace) {
            self.skip_balanced(Token::LBrace, Token::RBrace)?;
        } else {
            self.eat(Token::Semi);
        }
        Ok(())
    }

    /// `<A, B extends X = Y>`, returning the parameter names.
    fn type_parameters(&mut self) -> PResult<Vec<String>> {
        self.expect(Token::Lt, "`<`")?;
        let mut names = Vec::new();

        loop {
            if self.eat(Token::Gt) {
                break;
            }
            while matches!(self.ident_at(0), Some("const" | "in" | "out"))
                && self.ident_at(1).is_some()
            {
                self.bump();
            }
            names.push(self.expect_ident("a type parameter")?.to_string());
            if self.eat_word("extends") {
                self.parse_type()?;
            }
            if self.eat(Token::Eq) {
                self.parse_type()?;
            }
            if !self.eat(Token::Comma) {
                self.expect(Token::Gt, "`>`")?;
                break;
            }
        }

        Ok(names)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        if self.at_function_type() {
            return self.function_type();
        }

        let ty = self.union_type()?;

        if self.at_word("extends") && !self.newline_before() {
            self.bump();
            self.union_type()?;
            self.expect(Token::Question, "`?`")?;
            self.parse_type()?;
            self.expect(Token::Colon, "`:`")?;
            self.parse_type()?;
            return Ok(TypeExpr::Other);
        }

        Ok(ty)
    }

    fn at_function_type(&self) -> bool {
        match self.peek() {
            Some(Token::Lt) => true,
            Some(Token::Ident("new")) => true,
            Some(Token::Ident("abstract")) => self.word_at(1, "new"),
            Some(Token::LParen) => self
                .matching_paren(self.pos)
                .and_then(|close| self.tokens.get(close + 1))
                .is_some_and(|t| t.token == Token::Arrow),
            _ => false,
        }
    }

    fn function_type(&mut self) -> PResult<TypeExpr> {
        self.eat_word("abstract");
        self.eat_word("new");
        if self.at(Token::Lt) {
            self.type_parameters()?;
        }
        if self.at(Token::LParen) {
            self.skip_balanced(Token::LParen, Token::RParen)?;
        }
        self.expect(Token::Arrow, "`=>`")?;
        self.return_type()?;
        Ok(TypeExpr::Function)
    }

    fn union_type(&mut self) -> PResult<TypeExpr> {
        self.eat(Token::Pipe);
        let mut arms = vec![self.intersection_type()?];
        while self.eat(Token::Pipe) {
            arms.push(self.intersection_type()?);
        }
        Ok(if arms.len() == 1 {
            arms.remove(0)
        } else {
            TypeExpr::Union(arms)
        })
    }

    fn intersection_type(&mut self) -> PResult<TypeExpr> {
        self.eat(Token::Amp);
        let mut parts = vec![self.operand_type()?];
        while self.eat(Token::Amp) {
            parts.push(self.operand_type()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            TypeExpr::Intersection(parts)
        })
    }

    /// A union or intersection operand, which may itself be a function type.
    fn operand_type(&mut self) -> PResult<TypeExpr> {
        if self.at_function_type() {
            return self.function_type();
        }
        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> PResult<TypeExpr> {
        let mut ty = self.primary_type()?;

        while self.at(Token::LBracket) && !self.newline_before() {
            match (self.peek_at(1), self.peek_at(2)) {
                (Some(Token::RBracket), _) => {
                    self.pos += 2;
                    ty = TypeExpr::Array(Box::new(ty));
                }
                (Some(Token::Str(key)), Some(Token::RBracket)) => {
                    self.pos += 3;
                    ty = TypeExpr::Indexed {
                        object: Box::new(ty),
                        key: unescape(key),
                    };
                }
                _ => {
                    self.skip_balanced(Token::LBracket, Token::RBracket)?;
                    ty = TypeExpr::Other;
                }
            }
        }

        Ok(ty)
    }

    fn primary_type(&mut self) -> PResult<TypeExpr> {
        let Some(token) = self.peek() else {
            return self.error("expected a type, found end of file");
        };

        match token {
            Token::LParen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(ty)
            }
            Token::LBrace => self.object_type(),
            Token::LBracket => {
                self.skip_balanced(Token::LBracket, Token::RBracket)?;
                Ok(TypeExpr::Other)
            }
            Token::Str(raw) => {
                self.bump();
                Ok(TypeExpr::StringLiteral(unescape(raw)))
            }
            Token::Template(raw) => {
                self.bump();
                Ok(if raw.contains("${") {
                    TypeExpr::Other
                } else {
                    TypeExpr::StringLiteral(unescape(raw))
                })
            }
            Token::Number(n) => {
                self.bump();
                Ok(TypeExpr::NumberLiteral(n.to_string()))
            }
            Token::Minus => match self.peek_at(1) {
                Some(Token::Number(n)) => {
                    self.pos += 2;
                    Ok(TypeExpr::NumberLiteral(format!("-{n}")))
                }
                _ => self.error(format!("expected a type, found {}", self.describe_current())),
            },
            Token::Ident(word) => self.named_type(word),
            _ => self.error(format!("expected a type, found {}", self.describe_current())),
        }
    }

    fn named_type(&mut self, word: &'src str) -> PResult<TypeExpr> {
        match word {
            "true" | "false" => {
                self.bump();
                return Ok(TypeExpr::BooleanLiteral(word == "true"));
            }
            "typeof" => {
                self.bump();
                if self.eat_word("import") {
                    self.skip_balanced(Token::LParen, Token::RParen)?;
                } else {
                    self.expect_ident("an entity name")?;
                }
                while self.eat(Token::Dot) {
                    self.expect_ident("an entity name")?;
                }
                if self.at(Token::Lt) && !self.newline_before() {
                    self.type_arguments()?;
                }
                return Ok(TypeExpr::Other);
            }
            "keyof" | "unique" | "infer"
                if matches!(
                    self.peek_at(1),
                    Some(Token::Ident(_)) | Some(Token::LParen) | Some(Token::LBrace)
                ) =>
            {
                self.bump();
                self.parse_postfix_type()?;
                return Ok(TypeExpr::Other);
            }
            "readonly"
                if !matches!(
                    self.peek_at(1),
                    Some(Token::Pipe) | Some(Token::Amp) | Some(Token::Comma) | Some(Token::Gt) | None
                ) =>
            {
                self.bump();
                return self.parse_postfix_type();
            }
            "import" if self.peek_at(1) == Some(Token::LParen) => {
                self.bump();
                self.skip_balanced(Token::LParen, Token::RParen)?;
                while self.eat(Token::Dot) {
                    self.expect_ident("an entity name")?;
                }
                if self.at(Token::Lt) {
                    self.type_arguments()?;
                }
                return Ok(TypeExpr::Other);
            }
            _ => {}
        }

        if let Some(keyword) = TypeKeyword::from_word(word) {
            if self.peek_at(1) != Some(Token::Dot) {
                self.bump();
                return Ok(TypeExpr::Keyword(keyword));
            }
        }

        self.bump();
        let mut name = vec![word.to_string()];
        while self.at(Token::Dot) {
            self.bump();
            name.push(self.expect_ident("a type name")?.to_string());
        }

        let args = if self.at(Token::Lt) && !self.newline_before() {
            self.type_arguments()?
        } else {
            Vec::new()
        };

        Ok(TypeExpr::Reference { name, args })
    }

    fn type_arguments(&mut self) -> PResult<Vec<TypeExpr>> {
        self.expect(Token::Lt, "`<`")?;
        let mut args = Vec::new();
        loop {
            if self.eat(Token::Gt) {
                break;
            }
            args.push(self.parse_type()?);
            if !self.eat(Token::Comma) {
                self.expect(Token::Gt, "`>`")?;
                break;
            }
        }
        Ok(args)
    }

    fn is_mapped_type_start(&self) -> bool {
        let mut n = 0;
        if matches!(self.peek_at(n), Some(Token::Plus) | Some(Token::Minus)) {
            n += 1;
        }
        if self.word_at(n, "readonly") {
            n += 1;
        }
        self.peek_at(n) == Some(Token::LBracket)
            && self.ident_at(n + 1).is_some()
            && self.word_at(n + 2, "in")
    }

    fn object_type(&mut self) -> PResult<TypeExpr> {
        let opener = self.pos;
        self.expect(Token::LBrace, "`{`")?;

        if self.is_mapped_type_start() {
            self.pos = opener;
            self.skip_balanced(Token::LBrace, Token::RBrace)?;
            return Ok(TypeExpr::Other);
        }

        let mut members = Vec::new();
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            if self.eat(Token::Semi) || self.eat(Token::Comma) {
                continue;
            }
            if self.is_eof() {
                self.pos = opener;
                return self.skip_balanced(Token::LBrace, Token::RBrace).map(|_| TypeExpr::Other);
            }
            self.type_member(&mut members)?;
        }

        Ok(TypeExpr::Object(members))
    }

    fn is_member_name(&self, n: usize) -> bool {
        matches!(
            self.peek_at(n),
            Some(Token::Ident(_)) | Some(Token::Str(_)) | Some(Token::Number(_)) | Some(Token::LBracket)
        )
    }

    fn type_member(&mut self, members: &mut Vec<PropertySignature>) -> PResult<()> {
        if self.at_word("readonly") && self.is_member_name(1) {
            self.bump();
        }

        if self.at(Token::LBracket) {
            self.skip_balanced(Token::LBracket, Token::RBracket)?;
            self.eat(Token::Question);
            if self.eat(Token::Colon) {
                self.parse_type()?;
            } else if self.at(Token::LParen) || self.at(Token::Lt) {
                self.signature_tail()?;
            }
            return Ok(());
        }

        if self.at(Token::LParen) || self.at(Token::Lt) {
            return self.signature_tail();
        }

        if self.at_word("new") && matches!(self.peek_at(1), Some(Token::LParen) | Some(Token::Lt)) {
            self.bump();
            return self.signature_tail();
        }

        if (self.at_word("get") || self.at_word("set")) && self.is_member_name(1) {
            self.bump();
            if self.at(Token::LBracket) {
                self.skip_balanced(Token::LBracket, Token::RBracket)?;
            } else {
                self.bump();
            }
            return self.signature_tail();
        }

        let name = match self.peek() {
            Some(Token::Ident(name)) | Some(Token::Number(name)) => name.to_string(),
            Some(Token::Str(raw)) => unescape(raw),
            _ => {
                return self.error(format!(
                    "expected a property name, found {}",
                    self.describe_current()
                ))
            }
        };
        self.bump();
        let optional = self.eat(Token::Question);

        let ty = if self.at(Token::LParen) || self.at(Token::Lt) {
            self.signature_tail()?;
            TypeExpr::Function
        } else if self.eat(Token::Colon) {
            self.parse_type()?
        } else {
            TypeExpr::Keyword(TypeKeyword::Any)
        };

        members.push(PropertySignature { name, optional, ty });
        Ok(())
    }

    /// `[<T>] (params) [: R]` of a method, call or construct signature.
    fn signature_tail(&mut self) -> PResult<()> {
        if self.at(Token::Lt) {
            self.type_parameters()?;
        }
        self.skip_balanced(Token::LParen, Token::RParen)?;
        if self.eat(Token::Colon) {
            self.return_type()?;
        }
        Ok(())
    }
}
