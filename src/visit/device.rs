//! User-agent based device sniffing
//!
//! Best effort only: the result drives responsive layout choices on the page
//! and never fails a request.

use regex::Regex;
use std::sync::LazyLock;

static MOBILE_USER_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("mobile user-agent pattern is valid")
});

/// Whether the user-agent names a known mobile device family
pub fn is_mobile(user_agent: &str) -> bool {
    MOBILE_USER_AGENT.is_match(user_agent)
}
