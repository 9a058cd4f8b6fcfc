//! Keyword reply rules
//!
//! Rules are evaluated in declaration order and the first match wins, so a
//! message mentioning both an appointment and a doctor gets the booking
//! guidance. Keyword lists are plain data; extend them freely.

use serde::Serialize;

/// What a rule answers about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Appointment,
    Services,
    Practitioner,
    Help,
    Fallback,
}

/// One keyword rule: any keyword found in the input selects `reply`
#[derive(Debug, Clone, Copy)]
pub struct ReplyRule {
    pub topic: Topic,
    /// Lower-case keywords, matched as substrings
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

impl ReplyRule {
    fn matches(&self, folded_input: &str) -> bool {
        self.keywords.iter().any(|kw| folded_input.contains(kw))
    }
}

pub const APPOINTMENT_REPLY: &str = "Để đặt lịch hẹn, bạn vui lòng vào mục \"Đặt lịch khám\" trên thanh menu, \
chọn chuyên khoa, bác sĩ và khung giờ phù hợp rồi xác nhận thông tin. \
Bạn sẽ nhận được email xác nhận sau khi hoàn tất.";

pub const SERVICES_REPLY: &str = "Chúng tôi cung cấp các dịch vụ: khám tổng quát, khám chuyên khoa, \
xét nghiệm, chẩn đoán hình ảnh và tư vấn sức khỏe từ xa. \
Bạn có thể xem chi tiết và bảng giá tại trang \"Dịch vụ\".";

pub const PRACTITIONER_REPLY: &str = "Đội ngũ bác sĩ của chúng tôi gồm nhiều chuyên gia giàu kinh nghiệm \
ở các chuyên khoa. Bạn có thể xem hồ sơ, lịch làm việc và đánh giá của từng bác sĩ \
tại trang \"Đội ngũ bác sĩ\".";

pub const HELP_REPLY: &str = "Tôi có thể giúp bạn:\n\
1. Đặt lịch hẹn khám bệnh\n\
2. Tìm hiểu các dịch vụ y tế\n\
3. Thông tin về đội ngũ bác sĩ\n\
4. Tra cứu kết quả xét nghiệm\n\
5. Hướng dẫn thanh toán";

pub const FALLBACK_REPLY: &str = "Cảm ơn bạn đã liên hệ. Tôi chưa hiểu rõ câu hỏi của bạn. \
Bạn có thể hỏi về đặt lịch hẹn, dịch vụ, bác sĩ hoặc gõ \"giúp đỡ\" để xem những gì tôi có thể hỗ trợ.";

/// Greeting shown the first time the widget opens
pub const GREETING: &str = "Xin chào! Tôi là trợ lý ảo của phòng khám. Tôi có thể giúp gì cho bạn hôm nay?";

/// Shown in place of a reply when resolution fails
pub const APOLOGY: &str = "Xin lỗi, đã có lỗi xảy ra. Vui lòng thử lại sau.";

/// Ordered rule table
pub const RULES: &[ReplyRule] = &[
    ReplyRule {
        topic: Topic::Appointment,
        keywords: &["đặt lịch", "lịch hẹn", "hẹn khám", "appointment", "booking", "book"],
        reply: APPOINTMENT_REPLY,
    },
    ReplyRule {
        topic: Topic::Services,
        keywords: &["dịch vụ", "gói khám", "bảng giá", "chi phí", "service", "price"],
        reply: SERVICES_REPLY,
    },
    ReplyRule {
        topic: Topic::Practitioner,
        keywords: &["bác sĩ", "bác sỹ", "chuyên gia", "doctor", "practitioner"],
        reply: PRACTITIONER_REPLY,
    },
    ReplyRule {
        topic: Topic::Help,
        keywords: &["giúp", "hỗ trợ", "help", "support"],
        reply: HELP_REPLY,
    },
];

/// Rule selected for a fallback (no keyword matched)
pub const FALLBACK_RULE: ReplyRule = ReplyRule {
    topic: Topic::Fallback,
    keywords: &[],
    reply: FALLBACK_REPLY,
};

/// Case-fold and trim input the way rules expect it
pub fn fold(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Pick the built-in rule for `input`
#[cfg(test)]
pub fn match_rule(input: &str) -> &'static ReplyRule {
    match_rule_in(RULES, input)
}

/// Pick the first rule of `rules` matching `input`, or the fallback
pub fn match_rule_in<'a>(rules: &'a [ReplyRule], input: &str) -> &'a ReplyRule {
    let folded = fold(input);
    rules
        .iter()
        .find(|rule| rule.matches(&folded))
        .unwrap_or(&FALLBACK_RULE)
}
