use std::borrow::Cow;

/// Render a raw fixed-point amount with `decimals` fractional digits.
///
/// The integer part is grouped with `,` every three digits, trailing zeros of
/// the fraction are dropped and the point is omitted when nothing remains.
/// Works on the decimal digit string, so any `decimals` up to 255 is exact.
pub fn format_amount(raw_amount: u128, decimals: u8) -> String {
    let mut buffer = itoa::Buffer::new();
    let digits = buffer.format(raw_amount);
    let scale = decimals as usize;

    if scale == 0 {
        return group_thousands(digits);
    }

    let (integer, fraction) = if digits.len() > scale {
        let split = digits.len() - scale;
        (&digits[..split], Cow::Borrowed(&digits[split..]))
    } else {
        ("0", Cow::Owned(format!("{digits:0>scale$}")))
    };

    let mut out = group_thousands(integer);
    let fraction = fraction.trim_end_matches('0');
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
