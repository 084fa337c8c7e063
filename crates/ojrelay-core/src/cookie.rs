//! `Set-Cookie` reduction for the session store.
//!
//! The store keeps one flat cookie string per session key. Upstream
//! `Set-Cookie` values carry attributes (`Path`, `Expires`, `HttpOnly`, …)
//! that must not be echoed back in a `Cookie` request header, so only the
//! leading `name=value` of each survives.

/// Reduce `Set-Cookie` header values to a `Cookie` request-header string.
///
/// Keeps the `name=value` part of each value, drops everything after the
/// first `;`, skips empties, and joins the survivors with `"; "`. Returns
/// `None` when nothing usable remains.
pub fn reduce_set_cookies<I, S>(values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs: Vec<String> = values
        .into_iter()
        .filter_map(|value| {
            let pair = value.as_ref().split(';').next().unwrap_or("").trim();
            if pair.is_empty() {
                None
            } else {
                Some(pair.to_string())
            }
        })
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
