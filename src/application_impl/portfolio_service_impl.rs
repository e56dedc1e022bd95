use super::record_mutation::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RealPortfolioService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RealPortfolioService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Apply `edit` to the stored document and stamp `updatedAt` when it succeeds.
    async fn edit<R, F>(&self, mut edit: F) -> Result<R, PortfolioError>
    where
        F: FnMut(&mut PortfolioDocument) -> Result<R, PortfolioError>,
    {
        let clock = self.clock.clone();
        mutate_record::<PortfolioDocument, R, PortfolioError, _>(
            self.store.as_ref(),
            &RecordKey::portfolio(),
            |doc| {
                let outcome = edit(doc)?;
                doc.updated_at = Some(clock.now());
                Ok(outcome)
            },
        )
        .await
        .map_err(|e| match e {
            MutationError::Missing => PortfolioError::NotFound,
            MutationError::Rejected(e) => e,
            other => PortfolioError::Store(other.to_string()),
        })
    }
}

#[async_trait::async_trait]
impl PortfolioService for RealPortfolioService {
    async fn get(&self) -> Result<PortfolioDocument, PortfolioError> {
        load_record::<PortfolioDocument>(self.store.as_ref(), &RecordKey::portfolio())
            .await
            .map_err(|e| PortfolioError::Store(e.to_string()))?
            .map(|(doc, _)| doc)
            .ok_or(PortfolioError::NotFound)
    }

    async fn initialize_if_absent(
        &self,
        mut default_document: PortfolioDocument,
    ) -> Result<bool, PortfolioError> {
        default_document.updated_at = Some(self.clock.now());
        let inserted =
            insert_record_if_absent(self.store.as_ref(), &RecordKey::portfolio(), &default_document)
                .await
                .map_err(|e| PortfolioError::Store(e.to_string()))?;
        if inserted {
            info!("default portfolio initialized");
        }
        Ok(inserted)
    }

    async fn replace_personal_info(&self, info: PersonalInfo) -> Result<(), PortfolioError> {
        info.validate().map_err(PortfolioError::InvalidInput)?;
        self.edit(|doc| {
            doc.personal_info = info.clone();
            Ok(())
        })
        .await
    }

    async fn replace_social_links(&self, links: SocialLinks) -> Result<(), PortfolioError> {
        self.edit(|doc| {
            doc.social_links = links.clone();
            Ok(())
        })
        .await
    }

    async fn append_list_item(&self, item: ListItem) -> Result<ListItem, PortfolioError> {
        let list = item.list_name();
        let appended = self
            .edit(|doc| {
                doc.push(item.clone())
                    .map_err(|e| PortfolioError::from_edit(list, e))
            })
            .await?;
        debug!(%list, id = ?appended.id(), "list item appended");
        Ok(appended)
    }

    async fn replace_list_item(
        &self,
        list: ListName,
        id: &ItemId,
        item: ListItem,
    ) -> Result<ListItem, PortfolioError> {
        if item.list_name() != list {
            return Err(PortfolioError::InvalidInput(format!(
                "{} item supplied for the {} list",
                item.list_name().label(),
                list
            )));
        }
        self.edit(|doc| {
            doc.replace(id, item.clone())
                .map_err(|e| PortfolioError::from_edit(list, e))
        })
        .await
    }

    async fn remove_list_item(&self, list: ListName, id: &ItemId) -> Result<(), PortfolioError> {
        self.edit(|doc| {
            doc.remove(list, id)
                .map(|_| ())
                .map_err(|e| PortfolioError::from_edit(list, e))
        })
        .await?;
        debug!(%list, %id, "list item removed");
        Ok(())
    }
}
