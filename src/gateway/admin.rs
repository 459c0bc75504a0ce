/// Shared-secret check gating deletion.
///
/// The secret is handed in at construction; nothing here reads the
/// environment. There is no rate limiting, lockout or audit trail, so this is
/// only suitable for low-stakes moderation.
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if secret.is_empty() {
            return Self::disabled();
        }
        Self {
            secret: Some(secret),
        }
    }

    /// A gate that refuses every caller. Used when no admin key is configured.
    pub fn disabled() -> Self {
        Self { secret: None }
    }

    pub fn from_config(secret: Option<String>) -> Self {
        match secret {
            Some(secret) => Self::new(secret),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Verbatim comparison, no trimming or case folding.
    pub fn authorized(&self, supplied: &str) -> bool {
        match &self.secret {
            Some(secret) => secret == supplied,
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_verbatim() {
        let gate = AdminGate::new("s3cret");
        assert!(gate.authorized("s3cret"));
        assert!(!gate.authorized("s3cret "));
        assert!(!gate.authorized("S3CRET"));
        assert!(!gate.authorized(""));
    }

    #[test]
    fn unconfigured_gate_denies_everyone() {
        let gate = AdminGate::from_config(None);
        assert!(!gate.is_enabled());
        assert!(!gate.authorized(""));

        let gate = AdminGate::new("");
        assert!(!gate.authorized(""));
    }

    #[test]
    fn debug_output_hides_secret() {
        let gate = AdminGate::new("s3cret");
        assert!(!format!("{gate:?}").contains("s3cret"));
    }
}
