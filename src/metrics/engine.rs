use std::collections::BTreeMap;

use super::types::{FillerWordInstance, Pause, SpeechMetrics, Transcription, WordTiming};

/// Tunables for the metrics engine.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Filler dictionary: single words and multi-word phrases, matched
    /// case-insensitively.
    pub filler_words: Vec<String>,
    /// Minimum inter-word gap counted as a pause, in seconds.
    pub pause_threshold: f64,
    /// Speaking pace the pace subscore is centered on.
    pub target_wpm: f64,
    /// Pause cadence the pause subscore is centered on.
    pub target_pauses_per_minute: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            filler_words: [
                "um",
                "uh",
                "like",
                "so",
                "actually",
                "basically",
                "literally",
                "you know",
                "i mean",
                "kind of",
                "sort of",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            pause_threshold: 0.5,
            target_wpm: 150.0,
            target_pauses_per_minute: 4.0,
        }
    }
}

/// A normalized token with the start time it was spoken at.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    start: f64,
}

/// Lowercase and strip surrounding punctuation; apostrophes survive so
/// contractions keep matching.
fn normalize(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

/// Token stream for analysis: word timings when present, otherwise the
/// whitespace-split transcript with zeroed timestamps.
fn tokens(transcription: &Transcription) -> Vec<Token> {
    if !transcription.word_timings.is_empty() {
        transcription
            .word_timings
            .iter()
            .map(|w| Token {
                text: normalize(&w.word),
                start: w.start_time,
            })
            .filter(|t| !t.text.is_empty())
            .collect()
    } else {
        transcription
            .transcript
            .split_whitespace()
            .map(|w| Token {
                text: normalize(w),
                start: 0.0,
            })
            .filter(|t| !t.text.is_empty())
            .collect()
    }
}

/// Detect filler words and phrases, in spoken order.
///
/// Multi-word phrases are matched by locating the first token and
/// confirming the following tokens align; matched tokens are consumed so
/// overlapping phrases do not double-count. Longer phrases win over
/// shorter ones starting at the same position.
pub fn detect_fillers(
    transcription: &Transcription,
    config: &MetricsConfig,
) -> Vec<FillerWordInstance> {
    let tokens = tokens(transcription);
    detect_fillers_in(&tokens, config)
}

fn detect_fillers_in(tokens: &[Token], config: &MetricsConfig) -> Vec<FillerWordInstance> {
    let mut phrases: Vec<Vec<String>> = config
        .filler_words
        .iter()
        .map(|p| p.split_whitespace().map(normalize).collect())
        .filter(|p: &Vec<String>| !p.is_empty())
        .collect();
    // Longest phrase first so "you know" beats a hypothetical "you".
    phrases.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut found = Vec::new();
    let mut i = 0;

    'scan: while i < tokens.len() {
        for phrase in &phrases {
            if i + phrase.len() > tokens.len() {
                continue;
            }
            let matches = phrase
                .iter()
                .enumerate()
                .all(|(k, part)| tokens[i + k].text == *part);
            if matches {
                found.push(FillerWordInstance {
                    word: phrase.join(" "),
                    timestamp: tokens[i].start,
                });
                i += phrase.len();
                continue 'scan;
            }
        }
        i += 1;
    }

    found
}

/// Detect pauses: inter-word gaps longer than `threshold` seconds.
pub fn detect_pauses(word_timings: &[WordTiming], threshold: f64) -> Vec<Pause> {
    word_timings
        .windows(2)
        .filter_map(|pair| {
            let gap = pair[1].start_time - pair[0].end_time;
            (gap > threshold).then(|| Pause {
                start_time: pair[0].end_time,
                duration: gap,
            })
        })
        .collect()
}

/// Composite clarity score, clamped to [0, 100].
///
/// Weighted blend of three subscores, each clamped to >= 0: filler rate
/// (40%), pause cadence deviation (30%), pace deviation (30%).
pub fn clarity_score(
    filler_percentage: f64,
    pauses_per_minute: f64,
    words_per_minute: f64,
    config: &MetricsConfig,
) -> u8 {
    let filler = (100.0 - filler_percentage * 5.0).max(0.0);
    let pause = (100.0 - (pauses_per_minute - config.target_pauses_per_minute).abs() * 5.0).max(0.0);
    let pace = (100.0 - (words_per_minute - config.target_wpm).abs() * 0.5).max(0.0);

    (filler * 0.4 + pause * 0.3 + pace * 0.3).round().clamp(0.0, 100.0) as u8
}

/// Analyze one transcription into [`SpeechMetrics`].
///
/// Never fails: an empty transcription yields zero-valued metrics.
pub fn analyze(transcription: &Transcription, config: &MetricsConfig) -> SpeechMetrics {
    let tokens = tokens(transcription);
    let duration = transcription.duration_seconds.max(0.0);

    if tokens.is_empty() {
        return SpeechMetrics {
            duration_seconds: duration,
            ..SpeechMetrics::default()
        };
    }

    let total_words = tokens.len() as u32;
    let words_per_minute = if duration > 0.0 {
        total_words as f64 / duration * 60.0
    } else {
        0.0
    };

    let fillers = detect_fillers_in(&tokens, config);
    let mut filler_word_counts: BTreeMap<String, u32> = BTreeMap::new();
    for filler in &fillers {
        *filler_word_counts.entry(filler.word.clone()).or_insert(0) += 1;
    }
    let total_filler_words = fillers.len() as u32;
    let filler_word_percentage = total_filler_words as f64 / total_words as f64 * 100.0;

    let pauses = detect_pauses(&transcription.word_timings, config.pause_threshold);
    let avg_pause_duration = if pauses.is_empty() {
        0.0
    } else {
        pauses.iter().map(|p| p.duration).sum::<f64>() / pauses.len() as f64
    };
    let pauses_per_minute = if duration > 0.0 {
        pauses.len() as f64 / duration * 60.0
    } else {
        0.0
    };

    let clarity = clarity_score(
        filler_word_percentage,
        pauses_per_minute,
        words_per_minute,
        config,
    );

    SpeechMetrics {
        words_per_minute,
        total_words,
        duration_seconds: duration,
        filler_word_counts,
        total_filler_words,
        filler_word_percentage,
        avg_pause_duration,
        pauses_per_minute,
        clarity_score: clarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(words: &[(&str, f64, f64)]) -> Vec<WordTiming> {
        words
            .iter()
            .map(|(w, s, e)| WordTiming {
                word: w.to_string(),
                start_time: *s,
                end_time: *e,
                confidence: None,
            })
            .collect()
    }

    #[test]
    fn normalize_strips_punctuation_keeps_contractions() {
        assert_eq!(normalize("Hello,"), "hello");
        assert_eq!(normalize("(um)"), "um");
        assert_eq!(normalize("don't"), "don't");
    }

    #[test]
    fn multi_word_phrase_consumes_tokens() {
        let transcription = Transcription {
            transcript: "you know this is you know hard".to_string(),
            word_timings: Vec::new(),
            duration_seconds: 5.0,
        };
        let fillers = detect_fillers(&transcription, &MetricsConfig::default());
        let phrases: Vec<&str> = fillers.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(phrases, vec!["you know", "you know"]);
    }

    #[test]
    fn pause_needs_gap_above_threshold() {
        let words = timed(&[("a", 0.0, 2.0), ("b", 2.4, 3.0), ("c", 3.6, 4.0)]);
        let pauses = detect_pauses(&words, 0.5);
        assert_eq!(pauses.len(), 1);
        assert_eq!(pauses[0].start_time, 3.0);
        assert!((pauses[0].duration - 0.6).abs() < 1e-9);
    }

    #[test]
    fn empty_input_degrades_to_zeroed_metrics() {
        let metrics = analyze(&Transcription::default(), &MetricsConfig::default());
        assert_eq!(metrics, SpeechMetrics::default());
    }
}
