//! Narrow read interfaces onto external state.
//!
//! The authorization core consumes the delegate-relationship store and the
//! patient registry through these traits only; production wiring backs them
//! with the database and the patient registry client, tests with in-memory
//! doubles.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceResult;
use gateway_db::db::DbProvider;
use gateway_db::db::query::resource_delegate;

/// Read access to user-granted delegation relationships.
#[async_trait]
pub trait ResourceDelegateStore: Send + Sync {
    /// Whether an active delegation exists permitting `delegate_hdid` to act
    /// on `resource_owner_hdid`'s records.
    async fn exists(&self, resource_owner_hdid: &str, delegate_hdid: &str) -> ServiceResult<bool>;
}

/// Read access to patient demographics, reduced to what authorization needs.
#[async_trait]
pub trait PatientLookup: Send + Sync {
    /// The patient's birthdate, or `None` when the registry has no record.
    async fn birthdate(&self, hdid: &str) -> ServiceResult<Option<chrono::NaiveDate>>;
}

/// Database-backed delegate store.
pub struct DbResourceDelegateStore {
    provider: Arc<dyn DbProvider>,
}

impl DbResourceDelegateStore {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ResourceDelegateStore for DbResourceDelegateStore {
    async fn exists(&self, resource_owner_hdid: &str, delegate_hdid: &str) -> ServiceResult<bool> {
        let mut conn = self.provider.get_connection().await?;
        Ok(resource_delegate::exists(&mut conn, resource_owner_hdid, delegate_hdid).await?)
    }
}

#[cfg(test)]
pub mod doubles {
    //! In-memory store doubles shared by the handler tests.

    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;

    use super::{PatientLookup, ResourceDelegateStore};
    use crate::error::ServiceResult;

    /// Delegate store over a fixed set of (owner, delegate) pairs.
    #[derive(Debug, Default)]
    pub struct FixedDelegates {
        pairs: HashSet<(String, String)>,
    }

    impl FixedDelegates {
        #[must_use]
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                pairs: pairs
                    .iter()
                    .map(|(o, d)| ((*o).to_string(), (*d).to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ResourceDelegateStore for FixedDelegates {
        async fn exists(
            &self,
            resource_owner_hdid: &str,
            delegate_hdid: &str,
        ) -> ServiceResult<bool> {
            Ok(self.pairs.contains(&(
                resource_owner_hdid.to_string(),
                delegate_hdid.to_string(),
            )))
        }
    }

    /// Patient lookup over fixed birthdates.
    #[derive(Debug, Default)]
    pub struct FixedPatients {
        birthdates: HashMap<String, chrono::NaiveDate>,
    }

    impl FixedPatients {
        #[must_use]
        pub fn with(entries: &[(&str, chrono::NaiveDate)]) -> Self {
            Self {
                birthdates: entries
                    .iter()
                    .map(|(h, d)| ((*h).to_string(), *d))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PatientLookup for FixedPatients {
        async fn birthdate(&self, hdid: &str) -> ServiceResult<Option<chrono::NaiveDate>> {
            Ok(self.birthdates.get(hdid).copied())
        }
    }
}
