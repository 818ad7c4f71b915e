//! Proof-of-work nonce search.
//!
//! The search walks nonces upward from the header's starting nonce, patching
//! only the nonce bytes of the serialized header between attempts. A round
//! covers one header time; when it runs out of nonces the
//! [`ExhaustionPolicy`] decides whether to fail or move the time forward.
//!
//! With more than one thread, workers claim disjoint nonce batches from a
//! shared counter. Batches are claimed in increasing order and nobody claims
//! a batch past the best nonce found so far, so the parallel search returns
//! the same (lowest) nonce as the sequential one.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::algorithm::Algorithm;
use crate::block::{set_nonce, BlockHeader, BLOCK_HEADER_SIZE};
use crate::difficulty::{DifficultyTarget, Threshold};
use crate::error::{GenesisError, Result};
use crate::hash::{header_hash, PowHasher};
use crate::progress::{HashrateMeter, LogProgress, ProgressSink, DEFAULT_PROGRESS_INTERVAL};

/// Default number of nonces a worker claims at a time.
pub const DEFAULT_BATCH_SIZE: u32 = 65_536;

/// Nonces between cancellation checks in the sequential loop.
const CANCEL_CHECK_MASK: u32 = 0x3ff;

/// What to do once every nonce for the current header time has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Stop with [`GenesisError::NonceSpaceExhausted`].
    #[default]
    Fail,
    /// Advance the header time by one second and restart from nonce 0.
    BumpTime,
}

impl core::str::FromStr for ExhaustionPolicy {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(ExhaustionPolicy::Fail),
            "bump-time" | "bump_time" => Ok(ExhaustionPolicy::BumpTime),
            other => Err(format!("unknown exhaustion policy {:?}, expected fail or bump-time", other)),
        }
    }
}

/// Tuning for a search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Worker threads; 0 uses every available core, 1 runs in the caller.
    pub threads: usize,
    /// Nonces between progress reports.
    pub progress_interval: u32,
    /// Nonces a worker claims at a time (parallel search only).
    pub batch_size: u32,
    /// Behaviour when a header time has no solution.
    pub on_exhaustion: ExhaustionPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            threads: 1,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            on_exhaustion: ExhaustionPolicy::Fail,
        }
    }
}

impl SearchOptions {
    /// Number of threads to actually run.
    pub fn effective_threads(&self) -> usize {
        match self.threads {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        }
    }
}

/// A solved header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Algorithm the header was mined with.
    pub algorithm: Algorithm,
    /// Reported genesis hash (display byte order).
    pub hash: Vec<u8>,
    /// Proof-of-work digest that met the target.
    pub pow_digest: Vec<u8>,
    /// Winning nonce.
    pub nonce: u32,
    /// Header time of the solution (differs from the input after time bumps).
    pub time: u32,
    /// The solved header.
    pub header: BlockHeader,
    /// Hashes computed across all rounds.
    pub hashes: u64,
}

impl SearchResult {
    /// Reported hash as hex.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// The solved header, serialized.
    pub fn header_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        self.header.serialize()
    }
}

/// Outcome of searching one header time.
enum Round {
    Found { nonce: u32, digest: Vec<u8> },
    Exhausted,
    Cancelled,
}

/// Searches nonces until a header digest is below the target.
pub struct Miner<'a> {
    hasher: &'a dyn PowHasher,
    target: DifficultyTarget,
    threshold: Threshold,
    options: SearchOptions,
    progress: Box<dyn ProgressSink + 'a>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Miner<'a> {
    /// Create a miner for `target` using `hasher`.
    pub fn new(hasher: &'a dyn PowHasher, target: DifficultyTarget, options: SearchOptions) -> Self {
        let threshold = target.threshold(hasher.digest_len());
        Miner {
            hasher,
            target,
            threshold,
            options,
            progress: Box::new(LogProgress),
            cancel: None,
        }
    }

    /// Send progress reports to `sink` instead of the log.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'a) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Abort the search with [`GenesisError::Cancelled`] once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The target being searched for.
    pub fn target(&self) -> &DifficultyTarget {
        &self.target
    }

    /// Check whether a header already satisfies the target.
    pub fn check(&self, header: &BlockHeader) -> bool {
        let mut digest = vec![0u8; self.hasher.digest_len()];
        self.hasher.compute(&header.serialize(), &mut digest);
        self.threshold.is_met_by(&digest)
    }

    /// Search from `header.nonce` upward for a header meeting the target.
    pub fn search(&self, header: &BlockHeader) -> Result<SearchResult> {
        let threads = self.options.effective_threads();
        info!(
            algorithm = %self.hasher.algorithm(),
            bits = %format!("{:#010x}", self.target.bits()),
            start_nonce = header.nonce,
            threads,
            "Searching for genesis hash"
        );

        let mut meter = HashrateMeter::new(self.options.progress_interval);
        let mut template = *header;
        let mut hashes = 0u64;

        loop {
            let round = if threads > 1 {
                self.parallel_round(&template, threads, &mut meter, &mut hashes)
            } else {
                self.sequential_round(&template, &mut meter, &mut hashes)
            };

            match round {
                Round::Found { nonce, digest } => {
                    return Ok(self.finish(&template, nonce, digest, hashes));
                }
                Round::Cancelled => return Err(GenesisError::Cancelled),
                Round::Exhausted => {
                    let exhausted = GenesisError::NonceSpaceExhausted {
                        time: template.time,
                        start_nonce: header.nonce,
                    };
                    match self.options.on_exhaustion {
                        ExhaustionPolicy::Fail => return Err(exhausted),
                        ExhaustionPolicy::BumpTime => {
                            template.time = template.time.checked_add(1).ok_or(exhausted)?;
                            template.nonce = 0;
                            warn!(time = template.time, "Nonce space exhausted, advancing header time");
                        }
                    }
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn sequential_round(
        &self,
        template: &BlockHeader,
        meter: &mut HashrateMeter,
        hashes: &mut u64,
    ) -> Round {
        let mut header = template.serialize();
        let mut digest = vec![0u8; self.hasher.digest_len()];
        let mut nonce = template.nonce;

        loop {
            self.hasher.compute(&header, &mut digest);
            *hashes += 1;

            if meter.is_boundary(nonce) {
                self.progress.report(&meter.record(nonce, template.time));
            }

            if self.threshold.is_met_by(&digest) {
                return Round::Found { nonce, digest };
            }

            if nonce & CANCEL_CHECK_MASK == 0 && self.is_cancelled() {
                return Round::Cancelled;
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => return Round::Exhausted,
            };
            set_nonce(&mut header, nonce);
        }
    }

    fn parallel_round(
        &self,
        template: &BlockHeader,
        threads: usize,
        meter: &mut HashrateMeter,
        hashes: &mut u64,
    ) -> Round {
        let header = template.serialize();
        let start = template.nonce as u64;
        let end = u32::MAX as u64 + 1;
        let batch_size = self.options.batch_size.max(1) as u64;
        let interval = meter.interval() as u64;

        let next_batch = AtomicU64::new(start);
        let best = AtomicU64::new(u64::MAX);
        let round_hashes = AtomicU64::new(0);
        let shared_meter = Mutex::new(meter.clone());

        thread::scope(|scope| {
            for worker_id in 0..threads {
                let next_batch = &next_batch;
                let best = &best;
                let round_hashes = &round_hashes;
                let shared_meter = &shared_meter;

                scope.spawn(move || {
                    let mut header = header;
                    let mut digest = vec![0u8; self.hasher.digest_len()];

                    loop {
                        if self.is_cancelled() {
                            break;
                        }

                        let batch_start = next_batch.fetch_add(batch_size, Ordering::Relaxed);
                        if batch_start >= end || batch_start >= best.load(Ordering::Acquire) {
                            break;
                        }
                        let batch = batch_start..(batch_start + batch_size).min(end);

                        let (found, done) = self.sweep_batch(&mut header, &mut digest, batch, best);
                        if let Some(nonce) = found {
                            best.fetch_min(nonce as u64, Ordering::AcqRel);
                            debug!(worker_id, nonce, "Worker found a solution");
                        }

                        let total = round_hashes.fetch_add(done, Ordering::Relaxed) + done;
                        if total / interval > (total - done) / interval {
                            let covered = (start + total - 1).min(u32::MAX as u64) as u32;
                            let report = shared_meter
                                .lock()
                                .unwrap_or_else(|poisoned| poisoned.into_inner())
                                .record(covered, template.time);
                            self.progress.report(&report);
                        }
                    }
                });
            }
        });

        *hashes += round_hashes.load(Ordering::Relaxed);
        *meter = shared_meter
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match best.load(Ordering::Acquire) {
            u64::MAX if self.is_cancelled() => Round::Cancelled,
            u64::MAX => Round::Exhausted,
            nonce => {
                let nonce = nonce as u32;
                let mut digest = vec![0u8; self.hasher.digest_len()];
                let mut solved = header;
                set_nonce(&mut solved, nonce);
                self.hasher.compute(&solved, &mut digest);
                Round::Found { nonce, digest }
            }
        }
    }

    /// Try every nonce in `batch`, stopping at the first hit or once another
    /// worker has found a lower nonce. Returns the hit and the hash count.
    fn sweep_batch(
        &self,
        header: &mut [u8; BLOCK_HEADER_SIZE],
        digest: &mut [u8],
        batch: Range<u64>,
        best: &AtomicU64,
    ) -> (Option<u32>, u64) {
        let mut done = 0u64;

        for nonce in batch {
            if nonce & (CANCEL_CHECK_MASK as u64) == 0 && nonce >= best.load(Ordering::Relaxed) {
                break;
            }

            set_nonce(header, nonce as u32);
            self.hasher.compute(header, digest);
            done += 1;

            if self.threshold.is_met_by(digest) {
                return (Some(nonce as u32), done);
            }
        }

        (None, done)
    }

    fn finish(&self, template: &BlockHeader, nonce: u32, digest: Vec<u8>, hashes: u64) -> SearchResult {
        let header = BlockHeader { nonce, ..*template };
        let algorithm = self.hasher.algorithm();

        let hash = if algorithm.reports_pow_digest() {
            digest.clone()
        } else {
            header_hash(&header.serialize()).to_vec()
        };

        info!(
            nonce,
            time = header.time,
            hashes,
            hash = %hex::encode(&hash),
            "Genesis hash found"
        );

        SearchResult {
            algorithm,
            hash,
            pow_digest: digest,
            nonce,
            time: header.time,
            header,
            hashes,
        }
    }
}
