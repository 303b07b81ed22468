//! Form validation performed at the point of input.
//!
//! Every function here either returns a cleaned-up request body or a
//! [`ValidationError`]; nothing in this module touches the network.

use crate::constants::MIN_PASSWORD_LEN;
use crate::error::ValidationError;
use crate::protocol::{CommentRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};

pub fn login(username: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    Ok(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn registration(
    email: &str,
    full_name: &str,
    username: &str,
    password: &str,
) -> Result<RegisterRequest, ValidationError> {
    let email = email.trim();
    let username = username.trim();

    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if username.is_empty() {
        return Err(ValidationError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(RegisterRequest {
        email: email.to_string(),
        full_name: full_name.trim().to_string(),
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn comment(content: &str) -> Result<CommentRequest, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(CommentRequest {
        content: content.to_string(),
    })
}

/// Trim every field, turn blanks into `None`, and check the URL fields.
///
/// `profile_picture` may be an absolute URL or a `data:` URI from the
/// image pipeline.
pub fn profile_update(
    full_name: &str,
    bio: &str,
    website: &str,
    profile_picture: Option<&str>,
) -> Result<UpdateProfileRequest, ValidationError> {
    let website = non_blank(website);
    if let Some(ref site) = website {
        if !is_valid_url(site) {
            return Err(ValidationError::InvalidUrl {
                field: "website",
                value: site.clone(),
            });
        }
    }

    let profile_picture = profile_picture.and_then(non_blank);
    if let Some(ref picture) = profile_picture {
        if !picture.starts_with("data:image/") && !is_valid_url(picture) {
            return Err(ValidationError::InvalidUrl {
                field: "profile picture",
                value: picture.clone(),
            });
        }
    }

    Ok(UpdateProfileRequest {
        full_name: non_blank(full_name),
        bio: non_blank(bio),
        website,
        profile_picture,
    })
}

pub fn is_valid_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            login("  ", "secret").unwrap_err(),
            ValidationError::MissingField("username")
        );
        assert_eq!(
            login("ana", "").unwrap_err(),
            ValidationError::MissingField("password")
        );
        assert_eq!(login(" ana ", "pw").unwrap().username, "ana");
    }

    #[test]
    fn test_registration_password_length() {
        let err = registration("a@b.c", "", "ana", "12345").unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort { min: 6 });
        assert!(registration("a@b.c", "", "ana", "123456").is_ok());
    }

    #[test]
    fn test_registration_full_name_optional() {
        let req = registration("a@b.c", "  ", "ana", "hunter22").unwrap();
        assert_eq!(req.full_name, "");
    }

    #[test]
    fn test_comment_is_trimmed() {
        assert_eq!(comment("   ").unwrap_err(), ValidationError::EmptyComment);
        assert_eq!(comment(" nice ").unwrap().content, "nice");
    }

    #[test]
    fn test_profile_update_blank_fields_become_null() {
        let req = profile_update(" Ana ", "", "   ", None).unwrap();
        assert_eq!(req.full_name.as_deref(), Some("Ana"));
        assert_eq!(req.bio, None);
        assert_eq!(req.website, None);
        assert_eq!(req.profile_picture, None);
    }

    #[test]
    fn test_profile_update_rejects_bad_urls() {
        let err = profile_update("", "", "not a url", None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { field: "website", .. }));

        let err = profile_update("", "", "", Some("pic.jpg")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidUrl {
                field: "profile picture",
                ..
            }
        ));
    }

    #[test]
    fn test_profile_update_accepts_data_uri_picture() {
        let req = profile_update("", "", "https://ana.dev", Some("data:image/jpeg;base64,AAAA"))
            .unwrap();
        assert_eq!(req.website.as_deref(), Some("https://ana.dev"));
        assert!(req.profile_picture.unwrap().starts_with("data:image/jpeg"));
    }
}
