//! Generic type-name grammar.
//!
//! Swagger documents produced by Java tooling encode generic titles with
//! guillemets (`HttpResponse«Page«Version»»`). We parse that notation (and
//! plain angle brackets) into a small expression tree, apply the `Api`
//! namespace policy, and render standard angle-bracket syntax.
//!
//! Everything here is pure string/tree work. Normalization is idempotent by
//! construction: identifiers already carrying the namespace tag, built-in
//! names, and `T<n>` placeholders are never prefixed again.

/// Namespace tag prepended to every user-defined type name.
pub const NAMESPACE: &str = "Api";

/// Target-language names that are never namespaced and never imported.
pub const BUILTINS: &[&str] = &["string", "number", "boolean", "object", "Map", "Array"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    Generic(String, Vec<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type name {0:?} does not parse as Identifier(<Args>)?")]
pub struct InvalidTypeName(pub String);

impl TypeExpr {
    pub fn head(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::Generic(head, _) => head,
        }
    }
}

pub fn is_builtin(ident: &str) -> bool {
    BUILTINS.contains(&ident) || is_placeholder(ident)
}

/// `T0`, `T1`, … — positional generic parameters of the emitted interface.
fn is_placeholder(ident: &str) -> bool {
    let Some(rest) = ident.strip_prefix('T') else { return false };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Open,  // « or <
    Close, // » or >
    Comma,
}

fn lex(src: &str) -> Result<Vec<Tok>, InvalidTypeName> {
    let mut toks = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '«' | '<' => {
                toks.push(Tok::Open);
                chars.next();
            }
            '»' | '>' => {
                toks.push(Tok::Close);
                chars.next();
            }
            ',' => {
                toks.push(Tok::Comma);
                chars.next();
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                toks.push(Tok::Ident(ident));
            }
            _ => return Err(InvalidTypeName(src.to_string())),
        }
    }
    Ok(toks)
}

struct Parser<'a> {
    raw: &'a str,
    toks: Vec<Tok>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn fail<T>(&self) -> Result<T, InvalidTypeName> {
        Err(InvalidTypeName(self.raw.to_string()))
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    // TypeExpr := Ident ( Open TypeExpr (Comma TypeExpr)* Close )?
    fn type_expr(&mut self) -> Result<TypeExpr, InvalidTypeName> {
        let head = match self.next() {
            Some(Tok::Ident(name)) => name,
            _ => return self.fail(),
        };
        if self.peek() != Some(&Tok::Open) {
            return Ok(TypeExpr::Named(head));
        }
        self.next(); // consume Open
        let mut args = vec![self.type_expr()?];
        loop {
            match self.next() {
                Some(Tok::Comma) => args.push(self.type_expr()?),
                Some(Tok::Close) => break,
                _ => return self.fail(),
            }
        }
        Ok(TypeExpr::Generic(head, args))
    }
}

/// Parse a raw type-name string (guillemet or angle-bracket notation).
pub fn parse(raw: &str) -> Result<TypeExpr, InvalidTypeName> {
    let toks = lex(raw)?;
    let mut parser = Parser { raw, toks, pos: 0 };
    let expr = parser.type_expr()?;
    if parser.pos != parser.toks.len() {
        return parser.fail();
    }
    Ok(expr)
}

// ————————————————————————————————————————————————————————————————————————————
// NORMALIZE + RENDER
// ————————————————————————————————————————————————————————————————————————————

/// Prefix every user-defined identifier in the tree with [`NAMESPACE`].
pub fn normalize(expr: &TypeExpr) -> TypeExpr {
    match expr {
        TypeExpr::Named(name) => TypeExpr::Named(qualify(name)),
        TypeExpr::Generic(head, args) => {
            TypeExpr::Generic(qualify(head), args.iter().map(normalize).collect())
        }
    }
}

fn qualify(ident: &str) -> String {
    if is_builtin(ident) || ident.starts_with(NAMESPACE) {
        ident.to_string()
    } else {
        format!("{NAMESPACE}{ident}")
    }
}

/// Render with angle brackets: `ApiPage<Map<string,ApiVersion>>`.
pub fn render(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Generic(head, args) => {
            let args = args.iter().map(render).collect::<Vec<_>>().join(",");
            format!("{head}<{args}>")
        }
    }
}

/// parse → normalize → render in one step.
pub fn normalize_name(raw: &str) -> Result<String, InvalidTypeName> {
    Ok(render(&normalize(&parse(raw)?)))
}

/// CamelCase → hyphenated lowercase, e.g. `ApiHttpResponse` → `api-http-response`.
/// File names and import paths are both this function of the type name.
pub fn hyphenate(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + 4);
    for (i, c) in type_name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ------------------------------- Tests ------------------------------------ //
