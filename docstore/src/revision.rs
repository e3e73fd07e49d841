use uuid::Uuid;

/// Produces the next `_rev` token given the previous one, if any.
///
/// `prev` is the substring before the first `-`; an absent, missing, or
/// non-numeric prefix is treated as generation 0, so `next_rev(None)` and
/// `next_rev(Some("garbage"))` both yield `"1-<nonce>"`. Callers that need to
/// reject a malformed `_rev` outright should validate with `parse_rev` before
/// calling this.
pub fn next_rev(prev: Option<&str>) -> String {
    let generation = prev
        .and_then(|rev| rev.split_once('-'))
        .and_then(|(gen, _)| gen.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{}-{}", generation + 1, nonce())
}

/// An 8-hex-character opaque nonce drawn from a UUIDv4, distinguishing
/// concurrently-derived revisions that happen to share a generation.
fn nonce() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..8].to_string()
}

/// Splits a revision token into `(generation, nonce)`. Used by callers that
/// need to compare generations directly rather than just string-equality
/// the whole token.
pub fn parse_rev(rev: &str) -> Option<(u64, &str)> {
    let (gen, nonce) = rev.split_once('-')?;
    let gen = gen.parse::<u64>().ok()?;
    Some((gen, nonce))
}
