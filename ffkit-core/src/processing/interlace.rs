// ============================================================================
// ffkit-core/src/processing/interlace.rs
// ============================================================================
//
// INTERLACE CLASSIFICATION: idet Statistics -> Interlacing Verdict
//
// ffmpeg's idet filter prints per-category frame counts to stderr when the
// run ends. This module sums those counts into an InterlaceSample and wraps
// it in an InterlaceGuess that answers two independent questions:
//
// - best_guess: which category has the most frames, provided that category
//   also reaches the threshold proportion
// - is_interlaced_tff / is_interlaced_bff: does that one category reach the
//   threshold, regardless of rank
//
// The two can disagree for the same sample and are kept separate.

use std::fmt;
use std::ops::{Add, AddAssign};

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filters::{EmptyFilter, FilterChain, FilterExpr, YadifFilter};

/// Lines carrying the statistics of the first idet instance start with this.
pub const IDET_LOG_PREFIX: &str = "[Parsed_idet_0";

/// Proportion a category must reach to count as detected.
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.2;

static IDET_COUNTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TFF:([0-9]+)BFF:([0-9]+)Progressive:([0-9]+)Undetermined:([0-9]+)")
        .expect("valid idet regex")
});

/// Frame categories reported by idet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameCategory {
    Tff,
    Bff,
    Progressive,
    Undetermined,
}

impl FrameCategory {
    /// All categories, in the order used to break ranking ties.
    pub const ALL: [FrameCategory; 4] = [
        FrameCategory::Tff,
        FrameCategory::Bff,
        FrameCategory::Progressive,
        FrameCategory::Undetermined,
    ];
}

impl fmt::Display for FrameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameCategory::Tff => write!(f, "TFF"),
            FrameCategory::Bff => write!(f, "BFF"),
            FrameCategory::Progressive => write!(f, "Progressive"),
            FrameCategory::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// Frame counts summed over every matched idet line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterlaceSample {
    pub tff: u64,
    pub bff: u64,
    pub progressive: u64,
    pub undetermined: u64,
}

impl InterlaceSample {
    #[must_use]
    pub fn new(tff: u64, bff: u64, progressive: u64, undetermined: u64) -> Self {
        Self {
            tff,
            bff,
            progressive,
            undetermined,
        }
    }

    #[must_use]
    pub fn count(&self, category: FrameCategory) -> u64 {
        match category {
            FrameCategory::Tff => self.tff,
            FrameCategory::Bff => self.bff,
            FrameCategory::Progressive => self.progressive,
            FrameCategory::Undetermined => self.undetermined,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.tff
            .saturating_add(self.bff)
            .saturating_add(self.progressive)
            .saturating_add(self.undetermined)
    }
}

impl Add for InterlaceSample {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            tff: self.tff.saturating_add(other.tff),
            bff: self.bff.saturating_add(other.bff),
            progressive: self.progressive.saturating_add(other.progressive),
            undetermined: self.undetermined.saturating_add(other.undetermined),
        }
    }
}

impl AddAssign for InterlaceSample {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Sums the idet counters found in `stderr`.
///
/// Only lines starting with [`IDET_LOG_PREFIX`] are considered. Whitespace is
/// removed before matching, so `TFF:   10 BFF:    3` parses the same as
/// `TFF:10BFF:3`. Lines that do not match are skipped.
#[must_use]
pub fn parse_idet_output(stderr: &str) -> InterlaceSample {
    stderr
        .lines()
        .filter(|line| line.starts_with(IDET_LOG_PREFIX))
        .filter_map(|line| {
            let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            let caps = IDET_COUNTS_RE.captures(&compact)?;
            let field = |i: usize| caps[i].parse::<u64>().ok();
            let sample = InterlaceSample::new(field(1)?, field(2)?, field(3)?, field(4)?);
            trace!("idet line {:?} -> {:?}", line, sample);
            Some(sample)
        })
        .fold(InterlaceSample::default(), Add::add)
}

/// Interlacing verdict derived from an [`InterlaceSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterlaceGuess {
    sample: InterlaceSample,
}

impl InterlaceGuess {
    #[must_use]
    pub fn new(sample: InterlaceSample) -> Self {
        Self { sample }
    }

    /// Parses idet stderr and wraps the resulting sample.
    #[must_use]
    pub fn from_idet_output(stderr: &str) -> Self {
        Self::new(parse_idet_output(stderr))
    }

    #[must_use]
    pub fn sample(&self) -> &InterlaceSample {
        &self.sample
    }

    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.sample.total()
    }

    /// Share of frames in `category`, between 0 and 1. An empty sample counts
    /// as entirely undetermined.
    #[must_use]
    pub fn proportion(&self, category: FrameCategory) -> f64 {
        let total = self.sample.total();
        if total == 0 {
            return if category == FrameCategory::Undetermined {
                1.0
            } else {
                0.0
            };
        }
        self.sample.count(category) as f64 / total as f64
    }

    /// Categories by frame count, highest first. Equal counts keep the order
    /// of [`FrameCategory::ALL`].
    #[must_use]
    pub fn ranked(&self) -> [(FrameCategory, u64); 4] {
        let mut ranked = FrameCategory::ALL.map(|category| (category, self.sample.count(category)));
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Best guess at the default threshold.
    #[must_use]
    pub fn best_guess(&self) -> FrameCategory {
        self.best_guess_at(DEFAULT_DETECTION_THRESHOLD)
    }

    /// Top-ranked category if its proportion reaches `threshold`, otherwise
    /// [`FrameCategory::Undetermined`]. An empty sample is always undetermined.
    #[must_use]
    pub fn best_guess_at(&self, threshold: f64) -> FrameCategory {
        if self.sample.total() == 0 {
            return FrameCategory::Undetermined;
        }
        let (top, _) = self.ranked()[0];
        if self.proportion(top) >= threshold {
            top
        } else {
            FrameCategory::Undetermined
        }
    }

    #[must_use]
    pub fn is_interlaced_tff(&self) -> bool {
        self.is_interlaced_tff_at(DEFAULT_DETECTION_THRESHOLD)
    }

    #[must_use]
    pub fn is_interlaced_tff_at(&self, threshold: f64) -> bool {
        self.proportion(FrameCategory::Tff) >= threshold
    }

    #[must_use]
    pub fn is_interlaced_bff(&self) -> bool {
        self.is_interlaced_bff_at(DEFAULT_DETECTION_THRESHOLD)
    }

    #[must_use]
    pub fn is_interlaced_bff_at(&self, threshold: f64) -> bool {
        self.proportion(FrameCategory::Bff) >= threshold
    }

    #[must_use]
    pub fn is_interlaced(&self) -> bool {
        self.is_interlaced_at(DEFAULT_DETECTION_THRESHOLD)
    }

    #[must_use]
    pub fn is_interlaced_at(&self, threshold: f64) -> bool {
        self.is_interlaced_tff_at(threshold) || self.is_interlaced_bff_at(threshold)
    }

    #[must_use]
    pub fn is_progressive(&self) -> bool {
        self.is_progressive_at(DEFAULT_DETECTION_THRESHOLD)
    }

    #[must_use]
    pub fn is_progressive_at(&self, threshold: f64) -> bool {
        self.proportion(FrameCategory::Progressive) >= threshold
    }

    #[must_use]
    pub fn is_undetermined(&self) -> bool {
        self.is_undetermined_at(DEFAULT_DETECTION_THRESHOLD)
    }

    #[must_use]
    pub fn is_undetermined_at(&self, threshold: f64) -> bool {
        self.proportion(FrameCategory::Undetermined) >= threshold
    }

    /// Deinterlace filter at the default threshold.
    #[must_use]
    pub fn deinterlace_filter(&self, denoise: Option<FilterExpr>) -> FilterExpr {
        self.deinterlace_filter_at(DEFAULT_DETECTION_THRESHOLD, denoise)
    }

    /// No-op filter for material that is not interlaced. Otherwise yadif with
    /// the detected field parity (BFF wins when both qualify), followed by
    /// `denoise` when one is given.
    #[must_use]
    pub fn deinterlace_filter_at(&self, threshold: f64, denoise: Option<FilterExpr>) -> FilterExpr {
        if !self.is_interlaced_at(threshold) {
            return FilterExpr::from(EmptyFilter);
        }

        let parity = if self.is_interlaced_bff_at(threshold) {
            YadifFilter::PARITY_BFF
        } else if self.is_interlaced_tff_at(threshold) {
            YadifFilter::PARITY_TFF
        } else {
            YadifFilter::DEFAULT_PARITY
        };
        let deinterlace = FilterExpr::from(YadifFilter::with_parity(parity));

        match denoise {
            Some(denoise) => FilterChain::new()
                .add_filter(deinterlace)
                .add_filter(denoise)
                .into(),
            None => deinterlace,
        }
    }
}

impl From<InterlaceSample> for InterlaceGuess {
    fn from(sample: InterlaceSample) -> Self {
        Self::new(sample)
    }
}

impl fmt::Display for InterlaceGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TFF {:.1}%, BFF {:.1}%, progressive {:.1}%, undetermined {:.1}% of {} frames",
            self.proportion(FrameCategory::Tff) * 100.0,
            self.proportion(FrameCategory::Bff) * 100.0,
            self.proportion(FrameCategory::Progressive) * 100.0,
            self.proportion(FrameCategory::Undetermined) * 100.0,
            self.total_frames()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Hqdn3dFilter;

    const IDET_STDERR: &str = "\
frame=  100 fps=0.0 q=-0.0 Lsize=N/A time=00:00:04.00 bitrate=N/A speed=25.3x
[Parsed_idet_0 @ 0x55d5c8e0a9c0] Repeated Fields: Neither:   101 Top:     0 Bottom:     0
[Parsed_idet_0 @ 0x55d5c8e0a9c0] Single frame detection: TFF:     4 BFF:     1 Progressive:     1 Undetermined:     0
[Parsed_idet_0 @ 0x55d5c8e0a9c0] Multi frame detection: TFF:     6 BFF:     2 Progressive:     1 Undetermined:     1
[Parsed_idet_1 @ 0x55d5c8e0a9c0] Multi frame detection: TFF:   900 BFF:     0 Progressive:     0 Undetermined:     0
  [Parsed_idet_0 @ 0x1] Multi frame detection: TFF: 500 BFF: 0 Progressive: 0 Undetermined: 0
[Parsed_idet_0 @ 0x55d5c8e0a9c0] Multi frame detection: TFF: garbled
";

    fn sample_guess() -> InterlaceGuess {
        InterlaceGuess::new(InterlaceSample::new(10, 3, 2, 1))
    }

    #[test]
    fn test_parse_sums_matching_lines_only() {
        let sample = parse_idet_output(IDET_STDERR);
        assert_eq!(sample, InterlaceSample::new(10, 3, 2, 1));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let sample = parse_idet_output("[Parsed_idet_0 @ 0x1] tff: 2 bff: 0 progressive: 7 undetermined: 1");
        assert_eq!(sample, InterlaceSample::new(2, 0, 7, 1));
    }

    #[test]
    fn test_parse_empty_and_unrelated_input() {
        assert_eq!(parse_idet_output(""), InterlaceSample::default());
        assert_eq!(parse_idet_output("no stats here\n"), InterlaceSample::default());
    }

    #[test]
    fn test_proportions() {
        let guess = sample_guess();
        assert_eq!(guess.total_frames(), 16);
        assert_eq!(guess.proportion(FrameCategory::Tff), 10.0 / 16.0);
        assert_eq!(guess.proportion(FrameCategory::Bff), 3.0 / 16.0);
        assert_eq!(guess.proportion(FrameCategory::Progressive), 2.0 / 16.0);
        assert_eq!(guess.proportion(FrameCategory::Undetermined), 1.0 / 16.0);
    }

    #[test]
    fn test_empty_sample_is_fully_undetermined() {
        let guess = InterlaceGuess::new(InterlaceSample::default());
        assert_eq!(guess.proportion(FrameCategory::Undetermined), 1.0);
        assert_eq!(guess.proportion(FrameCategory::Tff), 0.0);
        assert_eq!(guess.best_guess(), FrameCategory::Undetermined);
        assert_eq!(guess.best_guess_at(0.0), FrameCategory::Undetermined);
        assert!(!guess.is_interlaced());
        assert!(guess.is_undetermined());
    }

    #[test]
    fn test_threshold_classification() {
        let guess = sample_guess();
        assert!(guess.is_interlaced_tff());
        assert!(!guess.is_interlaced_tff_at(0.65));
        assert!(!guess.is_interlaced_bff());
        assert!(guess.is_interlaced());
        assert!(!guess.is_progressive());
        assert!(guess.is_progressive_at(0.1));
    }

    #[test]
    fn test_best_guess() {
        let guess = sample_guess();
        assert_eq!(guess.best_guess(), FrameCategory::Tff);
        assert_eq!(guess.best_guess_at(0.999), FrameCategory::Undetermined);
    }

    #[test]
    fn test_best_guess_and_threshold_tests_are_independent() {
        // progressive wins the ranking, yet TFF alone also clears the threshold
        let guess = InterlaceGuess::new(InterlaceSample::new(30, 0, 60, 10));
        assert_eq!(guess.best_guess(), FrameCategory::Progressive);
        assert!(guess.is_interlaced_tff());

        // TFF wins the ranking, but at 0.5 nothing qualifies
        let guess = InterlaceGuess::new(InterlaceSample::new(40, 30, 20, 10));
        assert_eq!(guess.best_guess_at(0.5), FrameCategory::Undetermined);
        assert!(guess.is_interlaced_bff_at(0.3));
    }

    #[test]
    fn test_ranking_ties_follow_fixed_order() {
        let guess = InterlaceGuess::new(InterlaceSample::new(5, 5, 5, 5));
        let order: Vec<FrameCategory> = guess.ranked().iter().map(|(c, _)| *c).collect();
        assert_eq!(order, FrameCategory::ALL.to_vec());
        assert_eq!(guess.best_guess(), FrameCategory::Tff);

        let guess = InterlaceGuess::new(InterlaceSample::new(1, 4, 4, 0));
        assert_eq!(guess.best_guess(), FrameCategory::Bff);
    }

    #[test]
    fn test_deinterlace_filter_parity() {
        assert_eq!(
            sample_guess().deinterlace_filter(None).render(),
            "yadif=mode=0:parity=0:deint=0"
        );

        let bff = InterlaceGuess::new(InterlaceSample::new(40, 50, 10, 0));
        assert_eq!(
            bff.deinterlace_filter(None).render(),
            "yadif=mode=0:parity=1:deint=0"
        );

        let progressive = InterlaceGuess::new(InterlaceSample::new(0, 1, 99, 0));
        assert!(progressive.deinterlace_filter(None).is_empty());
        assert!(
            progressive
                .deinterlace_filter(Some(Hqdn3dFilter::default().into()))
                .is_empty()
        );
    }

    #[test]
    fn test_deinterlace_filter_with_denoise() {
        let filter = sample_guess().deinterlace_filter(Some(Hqdn3dFilter::default().into()));
        assert_eq!(filter.render(), "yadif=mode=0:parity=0:deint=0,hqdn3d=4:3:6:4.5");
        assert!(matches!(filter, FilterExpr::Chain(ref chain) if chain.len() == 2));
    }

    #[test]
    fn test_display_summary() {
        let guess = InterlaceGuess::new(InterlaceSample::new(1, 1, 1, 0));
        assert_eq!(
            guess.to_string(),
            "TFF 33.3%, BFF 33.3%, progressive 33.3%, undetermined 0.0% of 3 frames"
        );
    }
}
