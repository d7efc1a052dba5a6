//! The two interchangeable substring-search algorithms.
//!
//! Both matchers implement the same containment contract and must agree
//! on every `(text, pattern)` pair; the integration tests cross-check
//! them. Neither holds per-call mutable state, so one instance is safe
//! to share across all scan workers.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::ScanError;
use crate::metrics::ScanMetrics;

/// Rolling-hash base, coprime to the modulus
const HASH_BASE: u64 = 257;

/// Prime modulus above 2^31; small toy moduli collide constantly on
/// short patterns, which confirmation would mask but at real cost
const HASH_MODULUS: u64 = 1_000_000_007;

/// Immutable prefix tables keyed by pattern, shared across all scans.
/// The same signature table is applied to every file, so each pattern's
/// table is computed once per process.
static PREFIX_TABLE_CACHE: Lazy<DashMap<Vec<u8>, Arc<Vec<usize>>>> = Lazy::new(DashMap::new);

/// Decides whether `pattern` occurs as a contiguous substring of `text`.
///
/// Contract: an empty pattern matches any text; a pattern longer than
/// the text never matches. Implementations are stateless per call and
/// shareable across threads.
pub trait SubstringMatcher: Send + Sync {
    fn contains(&self, text: &[u8], pattern: &[u8]) -> bool;
}

/// Which substring algorithm to run, selected once at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    #[default]
    Kmp,
    RabinKarp,
}

impl MatcherKind {
    /// Builds the matcher, wiring it to the given metrics
    pub fn build(&self, metrics: Arc<ScanMetrics>) -> Box<dyn SubstringMatcher> {
        match self {
            MatcherKind::Kmp => Box::new(KmpMatcher::with_metrics(metrics)),
            MatcherKind::RabinKarp => Box::new(RabinKarpMatcher::with_metrics(metrics)),
        }
    }
}

impl FromStr for MatcherKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kmp" => Ok(MatcherKind::Kmp),
            "rabin-karp" | "rk" => Ok(MatcherKind::RabinKarp),
            other => Err(ScanError::config_error(format!(
                "unknown matcher algorithm {other:?} (expected \"kmp\" or \"rabin-karp\")"
            ))),
        }
    }
}

/// Exact automaton search via the Knuth-Morris-Pratt prefix function
#[derive(Debug, Clone)]
pub struct KmpMatcher {
    metrics: Arc<ScanMetrics>,
}

impl KmpMatcher {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(ScanMetrics::new()))
    }

    pub fn with_metrics(metrics: Arc<ScanMetrics>) -> Self {
        Self { metrics }
    }

    /// `table[i]` = length of the longest proper prefix of
    /// `pattern[..=i]` that is also a suffix of it
    fn prefix_table(pattern: &[u8]) -> Vec<usize> {
        let mut table = vec![0usize; pattern.len()];
        for i in 1..pattern.len() {
            let mut j = table[i - 1];
            while j > 0 && pattern[i] != pattern[j] {
                j = table[j - 1];
            }
            if pattern[i] == pattern[j] {
                j += 1;
            }
            table[i] = j;
        }
        table
    }

    fn table_for(&self, pattern: &[u8]) -> Arc<Vec<usize>> {
        if let Some(entry) = PREFIX_TABLE_CACHE.get(pattern) {
            self.metrics.record_cache_lookup(true);
            return entry.clone();
        }
        self.metrics.record_cache_lookup(false);
        let table = Arc::new(Self::prefix_table(pattern));
        PREFIX_TABLE_CACHE.insert(pattern.to_vec(), table.clone());
        table
    }
}

impl Default for KmpMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstringMatcher for KmpMatcher {
    fn contains(&self, text: &[u8], pattern: &[u8]) -> bool {
        if pattern.is_empty() {
            return true;
        }
        if pattern.len() > text.len() {
            return false;
        }

        let table = self.table_for(pattern);
        let mut j = 0;
        for &byte in text {
            while j > 0 && byte != pattern[j] {
                j = table[j - 1];
            }
            if byte == pattern[j] {
                j += 1;
            }
            if j == pattern.len() {
                // First occurrence is enough for containment
                return true;
            }
        }
        false
    }
}

/// Rabin-Karp search with a confirmed rolling polynomial hash
#[derive(Debug, Clone)]
pub struct RabinKarpMatcher {
    metrics: Arc<ScanMetrics>,
}

impl RabinKarpMatcher {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(ScanMetrics::new()))
    }

    pub fn with_metrics(metrics: Arc<ScanMetrics>) -> Self {
        Self { metrics }
    }

    fn hash(window: &[u8]) -> u64 {
        window
            .iter()
            .fold(0u64, |acc, &b| (mul_mod(acc, HASH_BASE) + u64::from(b)) % HASH_MODULUS)
    }
}

impl Default for RabinKarpMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstringMatcher for RabinKarpMatcher {
    fn contains(&self, text: &[u8], pattern: &[u8]) -> bool {
        if pattern.is_empty() {
            return true;
        }
        let len = pattern.len();
        if len > text.len() {
            return false;
        }

        let pattern_hash = Self::hash(pattern);
        let mut window_hash = Self::hash(&text[..len]);
        // base^(len-1), the weight of the byte leaving the window
        let lead_weight = pow_mod(HASH_BASE, (len - 1) as u64);

        for start in 0..=text.len() - len {
            if start > 0 {
                let outgoing = mul_mod(u64::from(text[start - 1]), lead_weight);
                window_hash = (window_hash + HASH_MODULUS - outgoing) % HASH_MODULUS;
                window_hash =
                    (mul_mod(window_hash, HASH_BASE) + u64::from(text[start + len - 1])) % HASH_MODULUS;
            }
            if window_hash == pattern_hash {
                // Hash equality is necessary but not sufficient
                if &text[start..start + len] == pattern {
                    return true;
                }
                self.metrics.record_hash_collision();
            }
        }
        false
    }
}

fn mul_mod(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(HASH_MODULUS)) as u64
}

fn pow_mod(base: u64, mut exp: u64) -> u64 {
    let mut result = 1u64;
    let mut base = base % HASH_MODULUS;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base);
        }
        base = mul_mod(base, base);
        exp >>= 1;
    }
    result
}
