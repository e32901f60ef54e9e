//! Credential Verification

/// Decides whether a username/password pair may log in
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts every credential pair.
///
/// Placeholder check for setups without a user database.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CredentialVerifier for AllowAll {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        true
    }
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn verify(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.verify("alice", "pw"));
        assert!(AllowAll.verify("", ""));
    }

    #[test]
    fn test_closure_verifier() {
        let verifier = |username: &str, password: &str| username == "bob" && password == "hunter2";

        assert!(verifier.verify("bob", "hunter2"));
        assert!(!verifier.verify("bob", "hunter3"));
        assert!(!verifier.verify("alice", "hunter2"));
    }
}
