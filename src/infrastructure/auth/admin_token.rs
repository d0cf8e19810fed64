use std::fmt;

use zeroize::Zeroizing;

/// Holds the shared admin secret and checks presented credentials.
#[derive(Clone)]
pub struct AdminGate {
    secret: Zeroizing<String>,
}

impl AdminGate {
    pub fn new(secret: Zeroizing<String>) -> Self {
        AdminGate { secret }
    }

    /// Comparison time does not depend on where the inputs first differ.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = self.secret.as_bytes();
        let presented = presented.as_bytes();

        let mut diff = expected.len() ^ presented.len();
        for (i, byte) in expected.iter().enumerate() {
            let other = presented.get(i).copied().unwrap_or(0);
            diff |= usize::from(byte ^ other);
        }
        diff == 0
    }

    /// Extracts and verifies a `Bearer` credential from an Authorization value.
    pub fn verify_bearer(&self, header: &str) -> bool {
        header
            .strip_prefix("Bearer ")
            .map(|token| self.verify(token.trim()))
            .unwrap_or(false)
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate").field("secret", &"[REDACTED]").finish()
    }
}
