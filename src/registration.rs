use uuid::Uuid;

use crate::error::PortalError;
use crate::r#struct::book::is_known_center;
use crate::r#struct::participant::{Identity, Registrant};
use crate::utils::now_rfc3339;

pub const NAME_ERROR: &str = "يرجى إدخال الاسم الرباعي بالكامل";
pub const NATIONAL_ID_ERROR: &str = "الرقم القومي يجب أن يتكون من ١٤ رقماً";
pub const PHONE_ERROR: &str = "يرجى إدخال رقم هاتف صحيح";
pub const CENTER_ERROR: &str = "يرجى اختيار المركز";

const NAME_MIN_TOKENS: usize = 4;
const NATIONAL_ID_LEN: usize = 14;
const PHONE_MIN_LEN: usize = 11;

// 四段式全名
pub fn is_valid_full_name(name: &str) -> bool {
    name.split_whitespace().count() >= NAME_MIN_TOKENS
}

// 身份证号必须恰好14位数字
pub fn is_valid_national_id(id: &str) -> bool {
    id.len() == NATIONAL_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() >= PHONE_MIN_LEN
}

/// 按表单顺序校验，返回第一个错误
pub fn validate(identity: &Identity) -> Result<(), PortalError> {
    if !is_valid_full_name(&identity.full_name) {
        return Err(PortalError::Validation(NAME_ERROR.to_string()));
    }
    if !is_valid_national_id(&identity.national_id) {
        return Err(PortalError::Validation(NATIONAL_ID_ERROR.to_string()));
    }
    if !is_valid_phone(&identity.phone) {
        return Err(PortalError::Validation(PHONE_ERROR.to_string()));
    }
    if identity.center.is_empty() || !is_known_center(&identity.center) {
        return Err(PortalError::Validation(CENTER_ERROR.to_string()));
    }
    Ok(())
}

/// 校验通过后生成新的报名记录
pub fn register(identity: Identity) -> Result<Registrant, PortalError> {
    validate(&identity)?;
    Ok(Registrant {
        id: Uuid::new_v4().to_string(),
        identity: Identity {
            full_name: identity.full_name.trim().to_string(),
            ..identity
        },
        registration_date: now_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            full_name: "محمد أحمد عبد الله".to_string(),
            national_id: "29001011234567".to_string(),
            phone: "01012345678".to_string(),
            center: "طنطا".to_string(),
        }
    }

    #[test]
    fn national_id_must_be_exactly_fourteen_digits() {
        assert!(is_valid_national_id("29001011234567"));
        for bad in ["", "2900101123456", "290010112345678", "2900101123456a", "٢٩٠٠١٠١١٢٣٤٥٦٧", "29001011 34567"] {
            assert!(!is_valid_national_id(bad), "{bad:?}");
        }
    }

    #[test]
    fn full_name_needs_four_tokens() {
        assert!(is_valid_full_name("أ ب ج د"));
        assert!(is_valid_full_name("  أ   ب\tج د هـ "));
        assert!(!is_valid_full_name("أ ب ج"));
        assert!(!is_valid_full_name("    "));
    }

    #[test]
    fn errors_follow_form_order() {
        let mut bad = identity();
        bad.full_name = "اسم".to_string();
        bad.national_id = "1".to_string();
        assert_eq!(validate(&bad), Err(PortalError::Validation(NAME_ERROR.to_string())));

        let mut bad = identity();
        bad.national_id = "1".to_string();
        bad.phone = String::new();
        assert_eq!(validate(&bad), Err(PortalError::Validation(NATIONAL_ID_ERROR.to_string())));

        let mut bad = identity();
        bad.phone = "0101".to_string();
        assert_eq!(validate(&bad), Err(PortalError::Validation(PHONE_ERROR.to_string())));

        let mut bad = identity();
        bad.center = "القاهرة".to_string();
        assert_eq!(validate(&bad), Err(PortalError::Validation(CENTER_ERROR.to_string())));
    }

    #[test]
    fn registration_creates_fresh_record() {
        let a = register(identity()).unwrap();
        let b = register(identity()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.identity, identity());
        assert!(!a.registration_date.is_empty());
    }
}
