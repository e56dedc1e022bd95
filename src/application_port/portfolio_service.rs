use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("portfolio not found")]
    NotFound,
    #[error("{} not found", .0.label())]
    ItemNotFound(ListName),
    #[error("{list} item id already in use: {id}")]
    DuplicateItemId { list: ListName, id: ItemId },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store error: {0}")]
    Store(String),
}

impl PortfolioError {
    pub(crate) fn from_edit(list: ListName, error: ListEditError) -> Self {
        match error {
            ListEditError::ItemNotFound => PortfolioError::ItemNotFound(list),
            ListEditError::DuplicateId(id) => PortfolioError::DuplicateItemId { list, id },
            ListEditError::Invalid(reason) => PortfolioError::InvalidInput(reason),
        }
    }
}

#[async_trait::async_trait]
pub trait PortfolioService: Send + Sync {
    async fn get(&self) -> Result<PortfolioDocument, PortfolioError>;

    /// Insert `default_document` unless a portfolio already exists.
    /// Returns `true` if the document was inserted.
    async fn initialize_if_absent(
        &self,
        default_document: PortfolioDocument,
    ) -> Result<bool, PortfolioError>;

    async fn replace_personal_info(&self, info: PersonalInfo) -> Result<(), PortfolioError>;

    async fn replace_social_links(&self, links: SocialLinks) -> Result<(), PortfolioError>;

    /// Append to the end of the item's list; the returned item carries its id.
    async fn append_list_item(&self, item: ListItem) -> Result<ListItem, PortfolioError>;

    async fn replace_list_item(
        &self,
        list: ListName,
        id: &ItemId,
        item: ListItem,
    ) -> Result<ListItem, PortfolioError>;

    async fn remove_list_item(&self, list: ListName, id: &ItemId) -> Result<(), PortfolioError>;
}
