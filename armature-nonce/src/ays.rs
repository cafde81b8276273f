//! "Are you sure?" messages shown after a nonce fails to verify.

use crate::encoding::escape_html_attribute;

/// Action whose confirmation asks about logging out instead of an expired link
pub const LOG_OUT_ACTION: &str = "log-out";

/// Build the confirmation markup for `action`
///
/// `link` points back to where the user can retry; for the log-out action it is
/// the confirmed log-out URL. All dynamic text is escaped.
pub fn confirmation(action: &str, explanation: Option<&str>, link: Option<&str>) -> String {
    let mut html = String::new();

    if action == LOG_OUT_ACTION {
        html.push_str("<p>You are attempting to log out.</p>");
        match link {
            Some(link) => html.push_str(&format!(
                "<p>Do you really want to <a href=\"{}\">log out</a>?</p>",
                escape_html_attribute(link)
            )),
            None => html.push_str("<p>Do you really want to log out?</p>"),
        }
        return html;
    }

    html.push_str("<p>");
    if let Some(explanation) = explanation.filter(|e| !e.is_empty()) {
        html.push_str(&escape_html_attribute(explanation));
        html.push(' ');
    }
    html.push_str("The link you followed has expired.</p>");

    if let Some(link) = link {
        html.push_str(&format!(
            "<p><a href=\"{}\">Please try again.</a></p>",
            escape_html_attribute(link)
        ));
    }

    html
}
