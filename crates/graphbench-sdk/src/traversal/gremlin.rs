//! Gremlin-Groovy rendering of traversals

use std::fmt::Write as _;

use super::{IdFormat, OrderKey, Source, Step, Traversal, P};
use crate::graph::PropertyValue;

pub(crate) fn render(traversal: &Traversal, ids: IdFormat) -> String {
    let mut out = String::new();
    match traversal.source() {
        Source::AllVertices => out.push_str("g.V()"),
        Source::Vertices(vertex_ids) => {
            let literals: Vec<String> = vertex_ids.iter().map(|id| id_literal(id, ids)).collect();
            let _ = write!(out, "g.V({})", literals.join(", "));
        }
        // `in`, `not` and friends are Groovy keywords or clash with Groovy
        // methods, so anonymous traversals always spawn from `__`.
        Source::Anonymous => out.push_str("__"),
    }
    for step in traversal.steps() {
        out.push('.');
        render_step(step, ids, &mut out);
    }
    out
}

fn render_step(step: &Step, ids: IdFormat, out: &mut String) {
    let _ = match step {
        Step::Out(label) => write!(out, "out({})", quote(label)),
        Step::In(label) => write!(out, "in({})", quote(label)),
        Step::OutE(label) => write!(out, "outE({})", quote(label)),
        Step::Has(key, p) => write!(out, "has({}, {})", quote(key), predicate(p)),
        Step::HasKey(key) => write!(out, "has({})", quote(key)),
        Step::HasId(id) => write!(out, "hasId({})", id_literal(id, ids)),
        // `value(key)` throws on elements without the key, and a plain
        // String would answer `contains` as a substring test. Collect every
        // value as a list of members first so missing means empty.
        Step::Contains { key, value } => write!(
            out,
            "has({k}).filter{{ it.get().values({k}).collectMany{{ p -> \
             p instanceof Collection ? p : p.toString().split(',')*.trim() }}\
             .contains({v}) }}",
            k = quote(key),
            v = quote(value)
        ),
        Step::Where(sub) => write!(out, "where({})", render(sub, ids)),
        Step::Not(sub) => write!(out, "not({})", render(sub, ids)),
        Step::Union(branches) => {
            let rendered: Vec<String> = branches.iter().map(|b| render(b, ids)).collect();
            write!(out, "union({})", rendered.join(", "))
        }
        Step::Dedup => write!(out, "dedup()"),
        Step::Count => write!(out, "count()"),
        Step::Is(p) => write!(out, "is({})", predicate(p)),
        Step::Limit(n) => write!(out, "limit({})", n),
        Step::Tail(n) => write!(out, "tail({})", n),
        Step::Skip(n) => write!(out, "skip({})", n),
        Step::Range(low, high) => write!(out, "range({}, {})", low, high),
        Step::Order(OrderKey::Property(key)) => write!(out, "order().by({})", quote(key)),
        Step::Order(OrderKey::Traversal(sub)) => write!(out, "order().by({})", render(sub, ids)),
        Step::Values(key) => write!(out, "values({})", quote(key)),
        Step::Id => write!(out, "id()"),
    };
}

fn predicate(p: &P) -> String {
    format!("{}({})", p.name(), literal(p.operand()))
}

fn literal(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => quote(s),
        PropertyValue::Integer(i) => i.to_string(),
        PropertyValue::Float(f) => format!("{}d", f),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        PropertyValue::Null => "null".to_string(),
    }
}

/// Element id literal. `g.V('4')` does not match a `4L` id, so the store's
/// id type decides the literal.
fn id_literal(id: &str, ids: IdFormat) -> String {
    match (ids, id.parse::<i64>()) {
        (IdFormat::Long, Ok(n)) => format!("{}L", n),
        _ => quote(id),
    }
}

/// Single-quoted Groovy string literal. `$` needs no escaping inside single
/// quotes.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
