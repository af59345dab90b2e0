//! Identifier and type normalization shared by all backends

/// A declared column type split into its parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSpec {
    /// `TYPE`, `TYPE(len)` or `TYPE(precision,scale)`
    pub data_type: String,

    /// Base type without parameters
    pub raw_type: String,

    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl TypeSpec {
    /// Whether the type is one of the auto-numbering serial types
    pub fn is_serial(&self) -> bool {
        matches!(
            self.raw_type.as_str(),
            "SERIAL" | "BIGSERIAL" | "SMALLSERIAL" | "SERIAL2" | "SERIAL4" | "SERIAL8"
        )
    }
}

/// Modifiers that carry no structural meaning for the diagram
const IGNORED_TYPE_WORDS: &[&str] = &["UNSIGNED", "SIGNED", "ZEROFILL"];

/// Normalize a declared type such as `decimal (10, 2) unsigned`
///
/// The base name is upper-cased with whitespace collapsed; parameters are
/// re-joined without spaces. One numeric parameter becomes the length, two
/// become precision and scale. Text after the closing parenthesis is dropped.
pub fn parse_type(declared: &str) -> TypeSpec {
    let declared = declared.trim();

    let (base, args) = match declared.find('(') {
        Some(open) => {
            let close = declared[open..]
                .find(')')
                .map(|i| open + i)
                .unwrap_or(declared.len());
            let inner = &declared[open + 1..close];
            let args: Vec<String> = inner
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            (&declared[..open], args)
        }
        None => (declared, Vec::new()),
    };

    let raw_type = base
        .split_whitespace()
        .filter(|w| !IGNORED_TYPE_WORDS.contains(&w.to_uppercase().as_str()))
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ");

    let mut spec = TypeSpec {
        data_type: raw_type.clone(),
        raw_type,
        ..TypeSpec::default()
    };

    if args.is_empty() {
        return spec;
    }

    spec.data_type = format!("{}({})", spec.raw_type, args.join(","));

    let numbers: Vec<Option<u32>> = args.iter().map(|a| a.parse::<u32>().ok()).collect();
    match numbers.as_slice() {
        [Some(len)] => spec.length = Some(*len),
        [Some(p), Some(s)] => {
            spec.precision = Some(*p);
            spec.scale = Some(*s);
        }
        _ => {}
    }

    spec
}

/// Strip identifier quoting: backticks, double quotes, brackets
pub fn clean_identifier(name: &str) -> String {
    name.trim()
        .trim_matches(|c| matches!(c, '`' | '"' | '[' | ']' | '\''))
        .to_string()
}

/// Last segment of a possibly schema-qualified name, unquoted
pub fn object_name(qualified: &str) -> String {
    let qualified = qualified.trim();
    let last = split_qualified(qualified).pop().unwrap_or_default();
    clean_identifier(&last)
}

/// Schema part of a qualified name, if present
pub fn schema_name(qualified: &str) -> Option<String> {
    let parts = split_qualified(qualified.trim());
    if parts.len() < 2 {
        return None;
    }
    parts.get(parts.len() - 2).map(|s| clean_identifier(s))
}

/// Split on dots outside of quotes
fn split_qualified(qualified: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in qualified.chars() {
        match (quote, c) {
            (None, '`' | '"' | '[') => {
                quote = Some(if c == '[' { ']' } else { c });
                current.push(c);
            }
            (Some(q), _) if c == q => {
                quote = None;
                current.push(c);
            }
            (None, '.') => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Split a comma-separated column list and clean each name
pub fn split_columns(list: &str) -> Vec<String> {
    list.split(',')
        .map(|c| {
            // Drop ordering / prefix length: `name(10) DESC`
            let c = c.trim();
            let c = c.split('(').next().unwrap_or(c);
            let c = c.split_whitespace().next().unwrap_or(c);
            clean_identifier(c)
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// Strip single quotes from a string literal, unescaping `''`
pub fn unquote_literal(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    }
}

/// Normalize a referential action: `set null` -> `SET_NULL`
pub fn normalize_action(action: &str) -> String {
    action
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Split text at commas that are not nested inside parentheses or quotes
pub fn split_top_level(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }

    if !current.trim().is_empty() {
        parts.push(current);
    }

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
