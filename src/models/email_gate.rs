//! Email gate policy and evaluation.
//!
//! A published page can require an email address before its content is
//! shown. The restriction is a discriminated policy: admit anyone, admit a
//! single domain, or admit an explicit allowlist of addresses. Evaluation
//! happens server-side and denial messages never reveal which policy is in
//! effect.

use crate::error::AppError;

/// Generic denial message for domain/allowlist mismatches.
///
/// Deliberately does not say what was required, so probing users cannot
/// learn the configured domain or allowlist.
const ACCESS_RESTRICTED: &str = "Access restricted";

/// Restriction policy attached to a page with an enabled email gate.
#[derive(Debug, Clone, PartialEq)]
pub enum EmailGatePolicy {
    /// Any syntactically valid email is admitted.
    Any,

    /// Only emails whose domain part matches (case-insensitive).
    Domain(String),

    /// Only emails listed exactly (case-insensitive full match).
    Allowlist(Vec<String>),
}

impl EmailGatePolicy {
    /// Reconstruct the policy from the page's gate columns.
    ///
    /// Returns `None` when the gate is disabled. An enabled gate with an
    /// unknown or inconsistent discriminant (e.g. `domain` with a NULL
    /// domain column) degrades to `Any` rather than locking the page.
    pub fn from_columns(
        enabled: bool,
        gate_type: Option<&str>,
        domain: Option<&str>,
        allowlist: Option<&[String]>,
    ) -> Option<Self> {
        if !enabled {
            return None;
        }

        match gate_type {
            Some("domain") => match domain {
                Some(d) => Some(EmailGatePolicy::Domain(d.to_string())),
                None => Some(EmailGatePolicy::Any),
            },
            Some("allowlist") => match allowlist {
                Some(list) => Some(EmailGatePolicy::Allowlist(list.to_vec())),
                None => Some(EmailGatePolicy::Any),
            },
            _ => Some(EmailGatePolicy::Any),
        }
    }

    /// Decide whether `email` passes this policy.
    ///
    /// The email must already have passed [`validate_email_syntax`];
    /// this method only checks the restriction itself.
    pub fn admits(&self, email: &str) -> bool {
        match self {
            EmailGatePolicy::Any => true,
            EmailGatePolicy::Domain(required) => match email.split_once('@') {
                Some((_, domain)) => domain.eq_ignore_ascii_case(required),
                None => false,
            },
            EmailGatePolicy::Allowlist(allowed) => {
                allowed.iter().any(|entry| entry.eq_ignore_ascii_case(email))
            }
        }
    }

    /// Full evaluation: syntax check, then policy check.
    ///
    /// Malformed emails fail with a validation message; policy mismatches
    /// fail with the generic access-restricted message.
    pub fn evaluate(&self, email: &str) -> Result<(), AppError> {
        validate_email_syntax(email)?;

        if self.admits(email) {
            Ok(())
        } else {
            Err(AppError::Forbidden(ACCESS_RESTRICTED))
        }
    }
}

/// Basic syntactic email validation.
///
/// Requires a single `@` with a non-empty local part, no whitespace, and a
/// domain containing at least one `.` with non-empty segments around the
/// final dot. This mirrors the `local@domain.tld` shape checked at the gate
/// form; full RFC 5321 parsing is out of scope.
pub fn validate_email_syntax(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(
            "Please enter a valid email address".to_string(),
        ))
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // The domain needs at least one dot with something on both sides.
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email_shapes() {
        assert!(is_valid_email("user@acme.com"));
        assert!(is_valid_email("first.last@sub.acme.co"));
        assert!(is_valid_email("u+tag@acme.io"));
    }

    #[test]
    fn test_invalid_email_shapes() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@acme"));
        assert!(!is_valid_email("user@acme."));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("@acme.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@acme.com"));
        assert!(!is_valid_email("us er@acme.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_domain_policy_case_insensitive() {
        let policy = EmailGatePolicy::Domain("acme.com".to_string());
        assert!(policy.admits("user@acme.com"));
        assert!(policy.admits("USER@ACME.COM"));
        assert!(!policy.admits("user@other.com"));
        assert!(!policy.admits("user@sub.acme.com"));
    }

    #[test]
    fn test_allowlist_policy_case_insensitive() {
        let policy = EmailGatePolicy::Allowlist(vec!["a@x.com".to_string()]);
        assert!(policy.admits("a@x.com"));
        assert!(policy.admits("A@X.COM"));
        assert!(!policy.admits("b@x.com"));
    }

    #[test]
    fn test_any_policy_admits_valid_emails() {
        assert!(EmailGatePolicy::Any.admits("anyone@anywhere.org"));
    }

    #[test]
    fn test_malformed_email_rejected_under_every_policy() {
        let policies = [
            EmailGatePolicy::Any,
            EmailGatePolicy::Domain("acme.com".to_string()),
            EmailGatePolicy::Allowlist(vec!["a@x.com".to_string()]),
        ];
        for policy in policies {
            let result = policy.evaluate("not-an-email");
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_denial_message_is_generic() {
        let policy = EmailGatePolicy::Domain("acme.com".to_string());
        match policy.evaluate("user@other.com") {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "Access restricted");
                assert!(!msg.contains("acme.com"));
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_from_columns_disabled_gate() {
        assert_eq!(
            EmailGatePolicy::from_columns(false, Some("domain"), Some("acme.com"), None),
            None
        );
    }

    #[test]
    fn test_from_columns_variants() {
        assert_eq!(
            EmailGatePolicy::from_columns(true, Some("any"), None, None),
            Some(EmailGatePolicy::Any)
        );
        assert_eq!(
            EmailGatePolicy::from_columns(true, Some("domain"), Some("acme.com"), None),
            Some(EmailGatePolicy::Domain("acme.com".to_string()))
        );
        let list = vec!["a@x.com".to_string()];
        assert_eq!(
            EmailGatePolicy::from_columns(true, Some("allowlist"), None, Some(&list)),
            Some(EmailGatePolicy::Allowlist(list.clone()))
        );
    }

    #[test]
    fn test_from_columns_inconsistent_discriminant_degrades_to_any() {
        assert_eq!(
            EmailGatePolicy::from_columns(true, Some("domain"), None, None),
            Some(EmailGatePolicy::Any)
        );
        assert_eq!(
            EmailGatePolicy::from_columns(true, None, None, None),
            Some(EmailGatePolicy::Any)
        );
    }
}
