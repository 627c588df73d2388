//! Human-readable record ids (`ACC-1234`, `CL-123`, ...).
//!
//! Ids are a fixed prefix plus a random suffix of a fixed digit count. A
//! candidate is checked against the store before use and regenerated on a
//! collision, up to a bounded number of attempts. The check is read-then-write
//! with no isolation, so two concurrent creators can still collide.

use std::collections::HashSet;

use rand_distr::{Distribution, Uniform};
use regex::Regex;

use crate::error::ConsoleError;

/// Attempts made before giving up on a unique id.
pub const DEFAULT_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPattern {
    pub prefix: &'static str,
    pub digits: u32,
}

impl IdPattern {
    pub const fn new(prefix: &'static str, digits: u32) -> Self {
        IdPattern { prefix, digits }
    }

    /// Smallest and one-past-largest suffix with exactly `digits` digits.
    fn bounds(&self) -> (u32, u32) {
        let upper = 10u32.pow(self.digits);
        (upper / 10, upper)
    }

    pub fn format(&self, suffix: u32) -> String {
        format!("{}-{:0width$}", self.prefix, suffix, width = self.digits as usize)
    }

    pub fn regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            r"^{}-\d{{{}}}$",
            regex::escape(self.prefix),
            self.digits
        ))
    }

    pub fn matches(&self, id: &str) -> bool {
        self.regex().map(|re| re.is_match(id)).unwrap_or(false)
    }
}

/// Source of random id suffixes.
pub trait SuffixSource {
    /// Return a value in `low..high`.
    fn next_suffix(&mut self, low: u32, high: u32) -> u32;
}

/// Thread-local RNG suffixes.
#[derive(Debug, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&mut self, low: u32, high: u32) -> u32 {
        match Uniform::new(low, high) {
            Ok(dist) => {
                let mut rng = rand::rng();
                dist.sample(&mut rng)
            }
            Err(_) => low,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdGenerator {
    attempts: usize,
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator {
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl IdGenerator {
    pub fn with_attempts(attempts: usize) -> Self {
        IdGenerator {
            attempts: attempts.max(1),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Generate an id for `pattern` that `is_taken` reports as free.
    pub fn generate<F>(
        &self,
        pattern: IdPattern,
        source: &mut dyn SuffixSource,
        mut is_taken: F,
    ) -> Result<String, ConsoleError>
    where
        F: FnMut(&str) -> Result<bool, ConsoleError>,
    {
        let (low, high) = pattern.bounds();
        for attempt in 1..=self.attempts {
            let candidate = pattern.format(source.next_suffix(low, high));
            if !is_taken(&candidate)? {
                return Ok(candidate);
            }
            log::debug!(
                "Generated id {} already in use (attempt {}/{})",
                candidate,
                attempt,
                self.attempts
            );
        }
        log::warn!(
            "Gave up generating a {} id after {} attempts",
            pattern.prefix,
            self.attempts
        );
        Err(ConsoleError::IdGeneration {
            prefix: pattern.prefix.to_string(),
            attempts: self.attempts,
        })
    }

    /// Generate an id absent from an in-memory set, then reserve it there.
    pub fn generate_unique_in(
        &self,
        pattern: IdPattern,
        source: &mut dyn SuffixSource,
        existing: &mut HashSet<String>,
    ) -> Result<String, ConsoleError> {
        let id = self.generate(pattern, source, |candidate| Ok(existing.contains(candidate)))?;
        existing.insert(id.clone());
        Ok(id)
    }
}
