//! Cache key catalogue and TTL policy

use std::time::Duration;

/// Everything the read path caches
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Sales,
    /// Intake listing across every store
    Customers,
    CustomersByStore(String),
    /// Intake listing for one calendar day (`YYYY/M/D`)
    CustomersToday(String),
    /// Goals and salaries
    Goals,
    /// Settings and staff roster
    Settings,
    /// Redacted credential view
    Passwords,
    /// `get-all` aggregate
    All,
}

impl CacheKey {
    pub fn key(&self) -> String {
        match self {
            Self::Sales => "sales".into(),
            Self::Customers => "customers".into(),
            Self::CustomersByStore(store) => format!("customers:store:{store}"),
            Self::CustomersToday(date) => format!("customers:today:{date}"),
            Self::Goals => "goals".into(),
            Self::Settings => "settings".into(),
            Self::Passwords => "passwords".into(),
            Self::All => "all".into(),
        }
    }

    pub fn ttl(&self) -> Duration {
        let secs = match self {
            Self::Sales => 300,
            Self::Customers => 120,
            Self::CustomersByStore(_) | Self::CustomersToday(_) => 30,
            Self::Goals => 600,
            Self::Settings | Self::Passwords => 3600,
            Self::All => 120,
        };
        Duration::from_secs(secs)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_and_ttls() {
        assert_eq!(CacheKey::CustomersByStore("chiba".into()).key(), "customers:store:chiba");
        assert_eq!(CacheKey::CustomersToday("2024/5/1".into()).key(), "customers:today:2024/5/1");
        assert_eq!(CacheKey::Sales.ttl(), Duration::from_secs(300));
        assert_eq!(CacheKey::Passwords.ttl(), Duration::from_secs(3600));
        assert_eq!(CacheKey::CustomersToday(String::new()).ttl(), Duration::from_secs(30));
    }
}
