//! wa.me share links

use reqwest::Url;

const WA_BASE: &str = "https://wa.me/";

/// Build a `https://wa.me/[phone]?text=...` link.
///
/// Without a phone number WhatsApp lets the user pick the recipient.
/// Non-digit characters are stripped from the phone number.
pub fn share_link(message: &str, phone: Option<&str>) -> String {
    let digits: String = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let Ok(mut url) = Url::parse(WA_BASE).and_then(|base| base.join(&digits)) else {
        return WA_BASE.to_string();
    };
    url.query_pairs_mut().append_pair("text", message);
    url.into()
}
