use chrono::{DateTime, Utc};

/// `ORD-yyyyMMddHHmmss-NNN`; `NNN` is the last three digits of the id,
/// zero-padded when shorter.
pub fn format_order_number(order_id: i32, at: DateTime<Utc>) -> String {
    let digits = order_id.to_string();
    let suffix = if digits.len() > 3 {
        digits[digits.len() - 3..].to_string()
    } else {
        format!("{:0>3}", digits)
    };
    format!("ORD-{}-{}", at.format("%Y%m%d%H%M%S"), suffix)
}
