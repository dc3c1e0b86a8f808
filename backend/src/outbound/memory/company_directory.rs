//! Fixed company directory seeded at construction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::ActorId;
use crate::domain::orders::{CompanyId, LabelId};
use crate::domain::ports::{CompanyDirectory, CompanyDirectoryError};

/// Company directory backed by in-memory maps.
///
/// # Examples
///
/// ```
/// use labelflow::domain::ActorId;
/// use labelflow::domain::orders::{CompanyId, LabelId};
/// use labelflow::outbound::memory::InMemoryCompanyDirectory;
/// use uuid::Uuid;
///
/// let owner = ActorId::random();
/// let company = CompanyId::from_uuid(Uuid::new_v4());
/// let label = LabelId::from_uuid(Uuid::new_v4());
/// let directory = InMemoryCompanyDirectory::default().with_company(owner, company, [label]);
/// assert_eq!(directory.company_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCompanyDirectory {
    owners: HashMap<ActorId, CompanyId>,
    labels: HashSet<(CompanyId, LabelId)>,
}

impl InMemoryCompanyDirectory {
    /// Register a company, its owner, and its labels.
    #[must_use]
    pub fn with_company(
        mut self,
        owner_id: ActorId,
        company_id: CompanyId,
        labels: impl IntoIterator<Item = LabelId>,
    ) -> Self {
        self.owners.insert(owner_id, company_id);
        self.labels
            .extend(labels.into_iter().map(|label_id| (company_id, label_id)));
        self
    }

    /// Number of registered companies.
    pub fn company_count(&self) -> usize {
        self.owners.values().collect::<HashSet<_>>().len()
    }
}

#[async_trait]
impl CompanyDirectory for InMemoryCompanyDirectory {
    async fn company_for_owner(
        &self,
        owner_id: &ActorId,
    ) -> Result<Option<CompanyId>, CompanyDirectoryError> {
        Ok(self.owners.get(owner_id).copied())
    }

    async fn label_belongs_to(
        &self,
        company_id: &CompanyId,
        label_id: &LabelId,
    ) -> Result<bool, CompanyDirectoryError> {
        Ok(self.labels.contains(&(*company_id, *label_id)))
    }
}
