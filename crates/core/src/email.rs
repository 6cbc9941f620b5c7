/// True when `email` belongs to none of the institution's domains.
///
/// Matching is on the full `@domain` suffix, ignoring ASCII case, so
/// `a@student.uni.edu` is not covered by `uni.edu`.
#[must_use]
pub fn is_external_email<S: AsRef<str>>(email: &str, institution_domains: &[S]) -> bool {
    let email = email.trim().to_ascii_lowercase();
    !institution_domains.iter().any(|domain| {
        let domain = domain.as_ref().trim_start_matches('@').to_ascii_lowercase();
        email.ends_with(&format!("@{domain}"))
    })
}
