//! Near-duplicate clustering over SimHash fingerprints
//!
//! Clusters are seed-anchored: a page joins the first earlier seed it is
//! similar enough to, so two members of one cluster may be less similar to
//! each other than either is to the seed.

use crate::model::{DuplicateCluster, PageResult};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

const HASH_BITS: u32 = 64;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("token pattern"));

/// 64-bit SimHash of the lowercased word tokens in `text`; 0 for text without tokens
pub fn simhash(text: &str) -> u64 {
    let lowered = text.to_lowercase();
    let mut accumulators = [0i64; HASH_BITS as usize];
    let mut tokens = 0usize;

    for token in TOKEN.find_iter(&lowered) {
        tokens += 1;
        let hash = token_hash(token.as_str());
        for (bit, acc) in accumulators.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *acc += 1;
            } else {
                *acc -= 1;
            }
        }
    }

    if tokens == 0 {
        return 0;
    }

    accumulators
        .iter()
        .enumerate()
        .filter(|(_, acc)| **acc >= 0)
        .fold(0u64, |fingerprint, (bit, _)| fingerprint | (1 << bit))
}

/// `1 - hamming(a, b) / 64`
pub fn simhash_similarity(a: u64, b: u64) -> f64 {
    1.0 - f64::from((a ^ b).count_ones()) / f64::from(HASH_BITS)
}

/// Stable per-token hash: the first eight bytes of the token's SHA-256
fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Greedy single-pass clustering of `pages` by text similarity
///
/// Only clusters with at least two members are returned. A cluster's
/// similarity is the mean similarity of its absorbed pages to the seed.
pub fn cluster_pages<'a, I>(pages: I, threshold: f64) -> Vec<DuplicateCluster>
where
    I: IntoIterator<Item = &'a PageResult>,
{
    let (urls, texts): (Vec<&str>, Vec<&str>) = pages
        .into_iter()
        .map(|page| (page.url.as_str(), page.text.as_str()))
        .unzip();
    cluster_texts(&urls, &texts, threshold)
}

/// Clusters parallel `urls`/`texts` slices; see [`cluster_pages`]
pub fn cluster_texts(urls: &[&str], texts: &[&str], threshold: f64) -> Vec<DuplicateCluster> {
    let fingerprints: Vec<u64> = texts.iter().map(|text| simhash(text)).collect();
    let mut assigned = vec![false; fingerprints.len()];
    let mut clusters = Vec::new();

    for seed in 0..fingerprints.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut members = vec![urls[seed].to_string()];
        let mut similarities = Vec::new();
        for other in seed + 1..fingerprints.len() {
            if assigned[other] {
                continue;
            }
            let similarity = simhash_similarity(fingerprints[seed], fingerprints[other]);
            if similarity >= threshold {
                assigned[other] = true;
                members.push(urls[other].to_string());
                similarities.push(similarity);
            }
        }

        if !similarities.is_empty() {
            let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
            clusters.push(DuplicateCluster {
                urls: members,
                similarity: mean,
            });
        }
    }

    clusters
}
