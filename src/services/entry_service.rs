use crate::models::entry::{EntryFilter, EntryStatus, EntryType, FinancialEntry, NewEntry};
use crate::repositories::{EntryRepository, RepositoryError};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Field-level rule violations, reported one at a time in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EntryValidationError {
    #[error("provide a valid description")]
    Description,
    #[error("provide a valid month")]
    Month,
    #[error("provide a valid year")]
    Year,
    #[error("provide a user")]
    User,
    #[error("provide a valid value")]
    Value,
    #[error("provide an entry type")]
    EntryType,
}

#[derive(Debug, thiserror::Error)]
pub enum EntryServiceError {
    #[error(transparent)]
    Validation(#[from] EntryValidationError),
    #[error("entry has not been persisted")]
    NotPersisted,
    #[error("entry not found")]
    NotFound,
    #[error("balance exceeds the representable range")]
    BalanceOverflow,
    #[error("Repository error: {0}")]
    RepositoryError(RepositoryError),
}

impl From<RepositoryError> for EntryServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => EntryServiceError::NotFound,
            other => EntryServiceError::RepositoryError(other),
        }
    }
}

pub struct EntryService {
    repository: Arc<dyn EntryRepository>,
}

impl EntryService {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self { repository }
    }

    /// Checks the business rules and returns the fields ready for the store.
    pub fn validate(entry: &FinancialEntry) -> Result<NewEntry, EntryValidationError> {
        let description = entry
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(EntryValidationError::Description)?;

        let month = entry
            .month
            .filter(|m| (1..=12).contains(m))
            .ok_or(EntryValidationError::Month)?;

        // exactly four digits
        let year = entry
            .year
            .filter(|y| (1000..=9999).contains(y))
            .ok_or(EntryValidationError::Year)?;

        let user_id = entry.user_id.ok_or(EntryValidationError::User)?;

        let value = entry
            .value
            .filter(|v| *v > Decimal::ZERO)
            .ok_or(EntryValidationError::Value)?;

        let entry_type = entry.entry_type.ok_or(EntryValidationError::EntryType)?;

        Ok(NewEntry {
            description: description.to_string(),
            month,
            year,
            value,
            entry_type,
            user_id,
        })
    }

    pub async fn save(&self, entry: FinancialEntry) -> Result<FinancialEntry, EntryServiceError> {
        let new_entry = Self::validate(&entry)?;
        let saved = self
            .repository
            .insert(&new_entry, EntryStatus::Pending)
            .await?;

        tracing::info!(entry_id = ?saved.id, user_id = new_entry.user_id, "saved entry");
        Ok(saved)
    }

    pub async fn update(&self, entry: FinancialEntry) -> Result<FinancialEntry, EntryServiceError> {
        let id = entry.id.ok_or(EntryServiceError::NotPersisted)?;
        let new_entry = Self::validate(&entry)?;

        Ok(self.repository.update(id, &new_entry, entry.status).await?)
    }

    pub async fn delete(&self, entry: &FinancialEntry) -> Result<(), EntryServiceError> {
        let id = entry.id.ok_or(EntryServiceError::NotPersisted)?;
        self.repository.delete(id).await?;

        tracing::info!(entry_id = id, "deleted entry");
        Ok(())
    }

    /// Any status may be set from any other; there is no transition table.
    pub async fn update_status(
        &self,
        mut entry: FinancialEntry,
        status: EntryStatus,
    ) -> Result<FinancialEntry, EntryServiceError> {
        tracing::info!(entry_id = ?entry.id, from = ?entry.status, to = %status, "updating entry status");
        entry.status = Some(status);
        self.update(entry).await
    }

    pub async fn search(
        &self,
        filter: &EntryFilter,
    ) -> Result<Vec<FinancialEntry>, EntryServiceError> {
        tracing::debug!(?filter, "searching entries");
        Ok(self.repository.search(filter).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FinancialEntry>, EntryServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Confirmed income minus confirmed expenses for one user.
    pub async fn balance(&self, user_id: i64) -> Result<Decimal, EntryServiceError> {
        let filter = EntryFilter {
            status: Some(EntryStatus::Confirmed),
            ..EntryFilter::for_user(user_id)
        };
        let entries = self.repository.search(&filter).await?;

        entries.iter().try_fold(Decimal::ZERO, |total, entry| {
            let value = entry.value.unwrap_or_default();
            let next = match entry.entry_type {
                Some(EntryType::Income) => total.checked_add(value),
                Some(EntryType::Expense) => total.checked_sub(value),
                None => Some(total),
            };
            next.ok_or(EntryServiceError::BalanceOverflow)
        })
    }
}
