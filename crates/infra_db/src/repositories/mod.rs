//! Repository implementations for domain entities
//!
//! Repositories own the SQL and map between rows and plain column values.
//! Writes that span several statements run inside one transaction.

pub mod fundo;
pub mod relatorio;

pub use fundo::FundoRepository;
pub use relatorio::RelatorioRepository;

/// Builds a case-insensitive `ILIKE` pattern matching `term` anywhere
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
