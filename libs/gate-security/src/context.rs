use uuid::Uuid;

/// `IdentityContext` encapsulates the caller's identity for a single request.
///
/// Built by an identity provider once per request and passed through the
/// request lifecycle. The access gate consults it when converting a denial
/// into a redirect or a rejection; downstream handlers may read it from
/// request extensions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IdentityContext {
    /// Subject ID of the authenticated caller. `None` for anonymous requests.
    subject_id: Option<Uuid>,
    /// Subject type classification (e.g., "user", "service").
    subject_type: Option<String>,
    /// Role names granted to the subject.
    #[serde(default)]
    roles: Vec<String>,
}

impl IdentityContext {
    /// Create a new `IdentityContext` builder
    #[must_use]
    pub fn builder() -> IdentityContextBuilder {
        IdentityContextBuilder::default()
    }

    /// Create an anonymous `IdentityContext` with no subject and no roles
    #[must_use]
    pub fn anonymous() -> Self {
        IdentityContextBuilder::default().build()
    }

    /// Get the subject ID of the caller, if authenticated
    #[must_use]
    pub fn subject_id(&self) -> Option<Uuid> {
        self.subject_id
    }

    /// Get the subject type classification (e.g., "user", "service").
    #[must_use]
    pub fn subject_type(&self) -> Option<&str> {
        self.subject_type.as_deref()
    }

    /// Get the roles granted to the subject.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether the caller has an established identity.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.subject_id.is_some()
    }

    /// Whether the subject holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Default)]
pub struct IdentityContextBuilder {
    subject_id: Option<Uuid>,
    subject_type: Option<String>,
    roles: Vec<String>,
}

impl IdentityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn subject_type(mut self, subject_type: &str) -> Self {
        self.subject_type = Some(subject_type.to_owned());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn role(mut self, role: &str) -> Self {
        self.roles.push(role.to_owned());
        self
    }

    #[must_use]
    pub fn build(self) -> IdentityContext {
        IdentityContext {
            subject_id: self.subject_id,
            subject_type: self.subject_type,
            roles: self.roles,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_identity_context_builder_full() {
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let ctx = IdentityContext::builder()
            .subject_id(subject_id)
            .subject_type("user")
            .roles(["Administrator", "Auditor"])
            .build();

        assert_eq!(ctx.subject_id(), Some(subject_id));
        assert_eq!(ctx.subject_type(), Some("user"));
        assert_eq!(ctx.roles(), &["Administrator", "Auditor"]);
        assert!(ctx.is_logged_in());
    }

    #[test]
    fn test_identity_context_anonymous() {
        let ctx = IdentityContext::anonymous();

        assert_eq!(ctx.subject_id(), None);
        assert_eq!(ctx.subject_type(), None);
        assert!(ctx.roles().is_empty());
        assert!(!ctx.is_logged_in());
    }

    #[test]
    fn test_has_role() {
        let ctx = IdentityContext::builder()
            .subject_id(Uuid::new_v4())
            .role("Operator")
            .build();

        assert!(ctx.has_role("Operator"));
        assert!(!ctx.has_role("Administrator"));
        // Role names are case sensitive
        assert!(!ctx.has_role("operator"));
    }

    #[test]
    fn test_logged_in_without_roles() {
        let ctx = IdentityContext::builder()
            .subject_id(Uuid::new_v4())
            .build();

        assert!(ctx.is_logged_in());
        assert!(ctx.roles().is_empty());
    }

    #[test]
    fn test_identity_context_clone() {
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let ctx1 = IdentityContext::builder()
            .subject_id(subject_id)
            .subject_type("service")
            .role("Reader")
            .build();
        let ctx2 = ctx1.clone();

        assert_eq!(ctx2.subject_id(), ctx1.subject_id());
        assert_eq!(ctx2.subject_type(), ctx1.subject_type());
        assert_eq!(ctx2.roles(), ctx1.roles());
    }

    #[test]
    fn test_identity_context_serialize_deserialize() {
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let original = IdentityContext::builder()
            .subject_id(subject_id)
            .subject_type("user")
            .roles(["Administrator"])
            .build();

        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: IdentityContext = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.subject_id(), original.subject_id());
        assert_eq!(deserialized.subject_type(), original.subject_type());
        assert_eq!(deserialized.roles(), original.roles());
    }

    #[test]
    fn test_anonymous_deserializes_without_roles_field() {
        let deserialized: IdentityContext =
            serde_json::from_str(r#"{"subject_id":null,"subject_type":null}"#).unwrap();

        assert!(!deserialized.is_logged_in());
        assert!(deserialized.roles().is_empty());
    }
}
