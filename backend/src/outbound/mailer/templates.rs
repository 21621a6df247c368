//! Plain-text bodies for the two transactional mails.

pub(crate) const ACTIVATION_SUBJECT: &str = "Activate your account";
pub(crate) const RESET_SUBJECT: &str = "Reset your password";

pub(crate) fn activation_body(username: &str, activation_url: &str) -> String {
    format!(
        "Hi {username},\n\n\
         thanks for signing up. Please confirm your email address by opening\n\
         the link below:\n\n\
         {activation_url}\n\n\
         The link is valid for three days. If you did not create this\n\
         account, you can ignore this mail.\n"
    )
}

pub(crate) fn reset_body(username: &str, reset_url: &str) -> String {
    format!(
        "Hi {username},\n\n\
         a password reset was requested for your account. Open the link below\n\
         to choose a new password:\n\n\
         {reset_url}\n\n\
         The link is valid for 24 hours. If you did not request a reset, you\n\
         can ignore this mail and your password stays unchanged.\n"
    )
}
