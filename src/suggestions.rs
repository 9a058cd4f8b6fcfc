//! Suggested opening prompts
//!
//! Shown while the conversation has nothing but (at most) the greeting.
//! Picking one must behave exactly like typing it, so callers turn it into
//! a normal submission rather than a shortcut.

/// Fixed, ordered prompt list
pub const SUGGESTIONS: &[&str] = &[
    "Làm thế nào để đặt lịch hẹn?",
    "Phòng khám có những dịch vụ nào?",
    "Tôi muốn tìm hiểu về đội ngũ bác sĩ",
    "Bạn có thể giúp gì cho tôi?",
];

/// Whether suggestions should be offered for a transcript of this size
pub fn should_show_suggestions(transcript_size: usize) -> bool {
    transcript_size <= 1
}

/// Suggestions to render for a transcript of this size (empty when hidden)
pub fn visible_suggestions(transcript_size: usize) -> &'static [&'static str] {
    if should_show_suggestions(transcript_size) {
        SUGGESTIONS
    } else {
        &[]
    }
}

/// Look up a suggestion by position
pub fn suggestion(index: usize) -> Option<&'static str> {
    SUGGESTIONS.get(index).copied()
}
