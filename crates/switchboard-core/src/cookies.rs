//! Diff-based cookie tracking.
//!
//! A [`CookieLedger`] snapshots the inbound cookie header once (`origin`)
//! and records every mutation against a working copy (`current`). At the
//! end of a request only the keys whose value differs from the baseline
//! are serialized, so a handler that never touches its cookies emits no
//! header at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Value written by [`CookieLedger::unset`]: an empty value with an
/// already-elapsed expiry, which downstream consumers treat as a
/// deletion instruction.
const EXPIRE_MARKER: &str = "\"\"; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// HTTP-date layout for the Expires attribute.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// SameSite policy for a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    Lax,
    /// `SameSite=None` — forces the `Secure` attribute.
    None,
}

/// Optional attributes encoded onto a stored cookie value.
///
/// Attributes are appended in a fixed order: Expires, Max-Age, Domain,
/// Path, SameSite, Secure, HttpOnly.
#[derive(Debug, Clone, Default)]
pub struct CookieAttributes {
    expires: Option<DateTime<Utc>>,
    max_age: Option<u64>,
    domain: Option<String>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl CookieAttributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute expiry instant, formatted as an HTTP-date.
    #[must_use]
    pub fn expires(mut self, instant: DateTime<Utc>) -> Self {
        self.expires = Some(instant);
        self
    }

    /// Set `Max-Age` in seconds.
    #[must_use]
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Set the `Domain` attribute.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the `Path` attribute.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the `Secure` attribute.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `HttpOnly` attribute.
    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the `SameSite` attribute. `SameSite::None` implies `Secure`
    /// regardless of the `secure` setting.
    #[must_use]
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Encode these attributes onto a cookie value.
    fn encode_onto(&self, value: &str) -> String {
        let mut out = String::from(value);

        if let Some(instant) = self.expires {
            out.push_str("; Expires=");
            out.push_str(&instant.format(HTTP_DATE).to_string());
        }

        if let Some(seconds) = self.max_age {
            out.push_str("; Max-Age=");
            out.push_str(&seconds.to_string());
        }

        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }

        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }

        let mut secure = self.secure;

        match self.same_site {
            None => {}
            Some(SameSite::Strict) => out.push_str("; SameSite=Strict"),
            Some(SameSite::Lax) => out.push_str("; SameSite=Lax"),
            Some(SameSite::None) => {
                out.push_str("; SameSite=None");
                secure = true;
            }
        }

        if secure {
            out.push_str("; Secure");
        }

        if self.http_only {
            out.push_str("; HttpOnly");
        }

        out
    }
}

/// Per-request cookie state tracked as a diff against the inbound set.
///
/// Invariant: `origin` is never mutated after construction; `set` and
/// `unset` touch only `current`.
#[derive(Debug, Clone, Default)]
pub struct CookieLedger {
    origin: BTreeMap<String, String>,
    current: BTreeMap<String, String>,
}

impl CookieLedger {
    /// Create an empty ledger (no inbound cookies).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inbound `k=v; k2=v2` cookie header into the baseline.
    ///
    /// Entries that do not split on `=` into exactly two parts are
    /// discarded.
    #[must_use]
    pub fn from_header(raw: &str) -> Self {
        let mut origin = BTreeMap::new();
        for entry in raw.split("; ") {
            let parts: Vec<&str> = entry.split('=').collect();
            if parts.len() != 2 {
                continue;
            }
            origin.insert(parts[0].to_string(), parts[1].to_string());
        }
        let current = origin.clone();
        Self { origin, current }
    }

    /// The current value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.current.get(key).map(String::as_str)
    }

    /// Set `key` to a bare value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.current.insert(key.into(), value.into());
    }

    /// Set `key` to a value with encoded attributes.
    pub fn set_with(
        &mut self,
        key: impl Into<String>,
        value: &str,
        attributes: &CookieAttributes,
    ) {
        self.current.insert(key.into(), attributes.encode_onto(value));
    }

    /// Mark `key` for deletion.
    ///
    /// The key is overwritten with an expire-immediately marker rather
    /// than removed, so the diff against the baseline still carries a
    /// deletion instruction downstream. Unknown keys are ignored.
    pub fn unset(&mut self, key: &str) {
        if self.current.contains_key(key) {
            self.current.insert(key.to_string(), EXPIRE_MARKER.to_string());
        }
    }

    /// Serialize the diff against the baseline.
    ///
    /// Returns `None` when nothing changed. Otherwise returns a single
    /// JSON-encoded blob of only the differing pairs, with `; Secure`
    /// appended to the envelope when `secure` is set.
    #[must_use]
    pub fn stringify(&self, secure: bool) -> Option<String> {
        let diff: BTreeMap<&str, &str> = self
            .current
            .iter()
            .filter(|(key, value)| self.origin.get(*key) != Some(value))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        if diff.is_empty() {
            return None;
        }

        // BTreeMap keys serialize in a stable order.
        let mut out = serde_json::to_string(&diff).ok()?;
        if secure {
            out.push_str("; Secure");
        }
        Some(out)
    }

    /// Extract just the value portion of a stored cookie string, i.e.
    /// everything before the first attribute delimiter.
    ///
    /// Useful for re-reading a value previously written by
    /// [`CookieLedger::set_with`].
    #[must_use]
    pub fn strip(cookie: &str) -> Option<&str> {
        let value = cookie.split(';').next().unwrap_or("");
        if value.is_empty() { None } else { Some(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_inbound_header() {
        let ledger = CookieLedger::from_header("cookieOne=one; cookieTwo=two");
        assert_eq!(ledger.get("cookieOne"), Some("one"));
        assert_eq!(ledger.get("cookieTwo"), Some("two"));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let ledger = CookieLedger::from_header("good=1; noequals; a=b=c; =empty");
        assert_eq!(ledger.get("good"), Some("1"));
        assert_eq!(ledger.get("noequals"), None);
        assert_eq!(ledger.get("a"), None);
        // An empty key with one `=` still splits into two parts.
        assert_eq!(ledger.get(""), Some("empty"));
    }

    #[test]
    fn untouched_ledger_emits_nothing() {
        let ledger = CookieLedger::from_header("a=1; b=2");
        assert_eq!(ledger.stringify(true), None);
    }

    #[test]
    fn diff_contains_only_changed_keys() {
        let mut ledger = CookieLedger::from_header("a=1; b=2");
        ledger.set("c", "3");
        assert_eq!(ledger.stringify(true).unwrap(), r#"{"c":"3"}; Secure"#);
        assert_eq!(ledger.stringify(false).unwrap(), r#"{"c":"3"}"#);
    }

    #[test]
    fn unset_emits_expiry_marker_for_that_key_only() {
        let mut ledger = CookieLedger::from_header("a=1; b=2");
        ledger.unset("a");
        let diff = ledger.stringify(false).unwrap();
        assert!(diff.contains(r#""a":"#));
        assert!(diff.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(!diff.contains(r#""b":"#));
    }

    #[test]
    fn unset_unknown_key_is_a_no_op() {
        let mut ledger = CookieLedger::from_header("a=1");
        ledger.unset("missing");
        assert_eq!(ledger.stringify(false), None);
    }

    #[test]
    fn overwriting_with_the_same_value_is_not_a_change() {
        let mut ledger = CookieLedger::from_header("a=1");
        ledger.set("a", "1");
        assert_eq!(ledger.stringify(false), None);
        ledger.set("a", "2");
        assert_eq!(ledger.stringify(false).unwrap(), r#"{"a":"2"}"#);
    }

    #[test]
    fn attributes_encode_in_fixed_order() {
        let mut ledger = CookieLedger::new();
        let expiry = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let attrs = CookieAttributes::new()
            .expires(expiry)
            .max_age(3000)
            .domain("localhost")
            .path("/")
            .http_only(true)
            .same_site(SameSite::None);
        ledger.set_with("session", "four", &attrs);

        assert_eq!(
            ledger.get("session"),
            Some(
                "four; Expires=Sat, 01 Jan 2000 00:00:00 GMT; Max-Age=3000; \
                 Domain=localhost; Path=/; SameSite=None; Secure; HttpOnly"
            )
        );
    }

    #[test]
    fn same_site_none_forces_secure() {
        let mut ledger = CookieLedger::new();
        let attrs = CookieAttributes::new().secure(false).same_site(SameSite::None);
        ledger.set_with("k", "v", &attrs);
        assert_eq!(ledger.get("k"), Some("v; SameSite=None; Secure"));
    }

    #[test]
    fn strip_extracts_value_before_attributes() {
        assert_eq!(
            CookieLedger::strip("four; Expires=Sat, 01 Jan 2000 00:00:00 GMT"),
            Some("four")
        );
        assert_eq!(CookieLedger::strip("bare"), Some("bare"));
        assert_eq!(CookieLedger::strip(""), None);
        assert_eq!(CookieLedger::strip("; Secure"), None);
    }
}
