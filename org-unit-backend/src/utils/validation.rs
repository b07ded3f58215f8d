use std::borrow::Cow;
use validator::ValidationError;

/// 空白のみの名前を拒否する
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::from("Name must not be blank"));
        Err(error)
    } else {
        Ok(())
    }
}
