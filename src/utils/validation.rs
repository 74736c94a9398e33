use crate::error::{AppError, AppResult};
use regex::Regex;

/// 校验邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address.".to_string(),
        ));
    }

    Ok(())
}

/// 校验手机号: 允许数字/空格/括号/连字符, 可带 + 前缀, 7-15 位数字
pub fn validate_mobile(mobile: &str) -> AppResult<()> {
    let digits = mobile.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = mobile
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '(' | ')' | '-'));

    if !allowed || !(7..=15).contains(&digits) {
        return Err(AppError::ValidationError(
            "Invalid mobile number.".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane.doe@example.com").is_ok());
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_mobile() {
        assert!(validate_mobile("+12345678901").is_ok());
        assert!(validate_mobile("(234) 567-8901").is_ok());
        assert!(validate_mobile("123").is_err());
        assert!(validate_mobile("not-a-number").is_err());
    }
}
