use crate::model::SymbolInfo;
use blake3::Hasher;

/// Content digest of a symbol: 64 lowercase hex characters.
///
/// The digest covers `kind`, `name`, `params` and `body`, joined with NUL
/// separators. Line numbers are not part of the digest, so moving a symbol
/// within a file does not invalidate documents written against it. The text
/// is hashed byte for byte as the extractor hands it over; a comment edit
/// inside a body is a content change.
pub fn hash_symbol(symbol: &SymbolInfo) -> String {
    let mut hasher = Hasher::new();
    hasher.update(symbol.kind.as_str().as_bytes());
    hasher.update(b"\x00");
    hasher.update(symbol.name.as_bytes());
    hasher.update(b"\x00");
    hasher.update(symbol.params.as_bytes());
    hasher.update(b"\x00");
    hasher.update(symbol.body.as_bytes());
    hasher.finalize().to_hex().to_string()
}
