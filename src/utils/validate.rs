// src/utils/validate.rs

use url::Url;
use validator::ValidationError;

/// Validates that an image reference is a correctly formatted URL.
pub fn validate_image_ref(reference: &str) -> Result<(), ValidationError> {
    if Url::parse(reference).is_err() {
        return Err(ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Exercise options: two to four, none blank, none too long.
pub fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    check_options(options, 2, 4)
}

/// Exam questions always carry exactly four options.
pub fn validate_exam_options(options: &[String]) -> Result<(), ValidationError> {
    check_options(options, 4, 4)
}

fn check_options(options: &[String], min: usize, max: usize) -> Result<(), ValidationError> {
    if options.len() < min || options.len() > max {
        return Err(ValidationError::new("wrong_number_of_options"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(ValidationError::new("option_cannot_be_blank"));
        }
        if opt.len() > 500 {
            return Err(ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_must_be_url() {
        assert!(validate_image_ref("https://cdn.example.com/a.png").is_ok());
        assert!(validate_image_ref("a.png").is_err());
    }

    #[test]
    fn test_options_bounds() {
        let two = vec!["a".to_string(), "b".to_string()];
        assert!(validate_options(&two).is_ok());
        assert!(validate_options(&["a".to_string()]).is_err());
        let five: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        assert!(validate_options(&five).is_err());
        assert!(validate_options(&["a".to_string(), " ".to_string()]).is_err());
    }

    #[test]
    fn test_exam_options_need_exactly_four() {
        let options = |n: usize| -> Vec<String> { (0..n).map(|i| format!("opt {}", i)).collect() };
        assert!(validate_exam_options(&options(4)).is_ok());
        assert!(validate_exam_options(&options(3)).is_err());
        assert!(validate_exam_options(&options(5)).is_err());
        assert!(validate_options(&options(3)).is_ok());
    }
}
