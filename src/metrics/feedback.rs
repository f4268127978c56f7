use serde::{Deserialize, Serialize};

use super::types::SpeechMetrics;

/// Deterministic coaching feedback derived from one metrics record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub encouragement: String,
}

/// Produce templated feedback from thresholds on pace, filler usage and
/// the clarity score. No generation involved; the same metrics always
/// yield the same text.
pub fn generate_feedback(metrics: &SpeechMetrics) -> Feedback {
    let mut feedback = Feedback::default();
    let wpm = metrics.words_per_minute;

    if wpm > 0.0 && wpm < 120.0 {
        feedback.improvements.push(format!(
            "Your pace of {:.0} words per minute is on the slow side.",
            wpm
        ));
        feedback.suggestions.push(
            "Try tightening transitions between thoughts to keep listeners engaged.".to_string(),
        );
    } else if wpm > 160.0 {
        feedback.improvements.push(format!(
            "Your pace of {:.0} words per minute is faster than most listeners follow comfortably.",
            wpm
        ));
        feedback
            .suggestions
            .push("Build in a breath at the end of each sentence to slow down.".to_string());
    } else if wpm > 0.0 {
        feedback.positives.push(format!(
            "Your pace of {:.0} words per minute sits in the comfortable listening range.",
            wpm
        ));
    }

    let filler_pct = metrics.filler_word_percentage;
    if filler_pct <= 2.0 {
        feedback
            .positives
            .push("Filler words are rare in this run. Nice control.".to_string());
    } else if filler_pct <= 5.0 {
        feedback.improvements.push(format!(
            "Filler words made up {:.1}% of what you said.",
            filler_pct
        ));
    } else {
        feedback.improvements.push(format!(
            "Filler words made up {:.1}% of what you said, enough to distract listeners.",
            filler_pct
        ));
        feedback.suggestions.push(
            "Pause silently instead of reaching for a filler. Silence reads as confidence."
                .to_string(),
        );
    }

    feedback.encouragement = if metrics.clarity_score >= 85 {
        "Excellent delivery. Keep this up and the polish will stick.".to_string()
    } else if metrics.clarity_score >= 70 {
        "Good delivery overall. A little focused practice will push it further.".to_string()
    } else {
        "Every practice run counts. Pick one habit above and work on just that next time."
            .to_string()
    };

    feedback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_pace_gets_flagged() {
        let metrics = SpeechMetrics {
            words_per_minute: 190.0,
            clarity_score: 72,
            ..SpeechMetrics::default()
        };
        let feedback = generate_feedback(&metrics);
        assert!(feedback.improvements.iter().any(|s| s.contains("190")));
        assert!(feedback.encouragement.starts_with("Good delivery"));
    }

    #[test]
    fn clean_run_is_praised() {
        let metrics = SpeechMetrics {
            words_per_minute: 150.0,
            filler_word_percentage: 1.0,
            clarity_score: 92,
            ..SpeechMetrics::default()
        };
        let feedback = generate_feedback(&metrics);
        assert_eq!(feedback.improvements.len(), 0);
        assert_eq!(feedback.positives.len(), 2);
        assert!(feedback.encouragement.starts_with("Excellent"));
    }
}
