use crate::domain_model::PortfolioDocument;
use chrono::{DateTime, Utc};

const SEED_PORTFOLIO: &str = include_str!("seed_portfolio.json");

/// Portfolio content inserted on first start when no document exists.
pub fn seed_portfolio(now: DateTime<Utc>) -> Result<PortfolioDocument, serde_json::Error> {
    let mut document: PortfolioDocument = serde_json::from_str(SEED_PORTFOLIO)?;
    document.updated_at = Some(now);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::ListName;

    #[test]
    fn seed_parses_with_ids() {
        let doc = seed_portfolio(Utc::now()).unwrap();
        assert_eq!(doc.ids(ListName::Experience).len(), 2);
        assert_eq!(doc.ids(ListName::Certifications).len(), 3);
        assert_eq!(doc.ids(ListName::Skills).len(), 8);
        assert!(doc.personal_info.validate().is_ok());
    }
}
