/// Identity attached to a request that passed the admin gate.
///
/// Only a truncated form of the supplied key is kept so audit rows never
/// contain the full secret.
#[derive(Debug, Clone)]
pub struct AdminCaller {
    pub label: String,
}

impl AdminCaller {
    pub fn from_key(key: &str) -> Self {
        let prefix: String = key.chars().take(4).collect();
        Self {
            label: format!("admin_api:{}...", prefix),
        }
    }
}
